// ==========================================
// 餐厅外卖预订系统 - 通知发送端口
// ==========================================
// 职责: 定义订单通知 trait，实现依赖倒置
// 说明: Engine 层定义 trait，外层（SMTP 适配等）提供实现
// 约束: 发送失败只记日志，绝不回滚已成功的预订/取消
// ==========================================

use crate::domain::order::Order;
use chrono::NaiveDate;

/// 订单通知发送者 Trait
///
/// fire-and-forget 语义：调用方对 Err 只做记录，不上抛。
pub trait OrderNotifier: Send + Sync {
    /// 预订完成通知
    fn send_complete(&self, order: &Order) -> anyhow::Result<()>;

    /// 取消通知
    fn send_cancel(&self, order: &Order) -> anyhow::Result<()>;

    /// 当日订单汇总通知（由外部定时触发器调用）
    fn send_daily_summary(&self, orders: &[Order], date: NaiveDate) -> anyhow::Result<()>;
}

/// 空实现（测试/禁用通知场景）
pub struct NoOpNotifier;

impl OrderNotifier for NoOpNotifier {
    fn send_complete(&self, _order: &Order) -> anyhow::Result<()> {
        Ok(())
    }

    fn send_cancel(&self, _order: &Order) -> anyhow::Result<()> {
        Ok(())
    }

    fn send_daily_summary(&self, _orders: &[Order], _date: NaiveDate) -> anyhow::Result<()> {
        Ok(())
    }
}

/// 日志实现（默认装配，未接邮件网关时使用）
pub struct LoggingNotifier;

impl OrderNotifier for LoggingNotifier {
    fn send_complete(&self, order: &Order) -> anyhow::Result<()> {
        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            pickup_at = %crate::domain::ranges::format_date_time(order.pickup_at),
            total = order.total_price(),
            "预订完成通知"
        );
        Ok(())
    }

    fn send_cancel(&self, order: &Order) -> anyhow::Result<()> {
        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            "取消通知"
        );
        Ok(())
    }

    fn send_daily_summary(&self, orders: &[Order], date: NaiveDate) -> anyhow::Result<()> {
        tracing::info!(
            date = %crate::domain::ranges::format_date(date),
            order_count = orders.len(),
            "当日订单汇总通知"
        );
        Ok(())
    }
}
