// ==========================================
// 餐厅外卖预订系统 - 订单API
// ==========================================
// 职责: 下单/取消/查询的对外入口, 参数解析与错误映射
// 红线: API 层不含业务规则; 业务逻辑全部委托给 OrderUseCase
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::order::Order;
use crate::domain::ranges::parse_date;
use crate::engine::order_factory::CreateOrderRequest;
use crate::engine::OrderUseCase;
use std::sync::Arc;

/// 订单API
pub struct OrderApi {
    use_case: Arc<OrderUseCase>,
}

impl OrderApi {
    pub fn new(use_case: Arc<OrderUseCase>) -> Self {
        Self { use_case }
    }

    /// 创建订单; as_admin 为 true 时跳过"每用户一笔在途订单"限制
    pub fn create_order(&self, req: &CreateOrderRequest, as_admin: bool) -> ApiResult<Order> {
        Ok(self.use_case.create(req, as_admin)?)
    }

    /// 取消订单并回补库存
    pub fn cancel_order(&self, id: &str) -> ApiResult<Order> {
        Ok(self.use_case.cancel(id)?)
    }

    /// 查询用户未取消的订单
    pub fn list_active_orders(&self, user_id: &str) -> ApiResult<Vec<Order>> {
        Ok(self.use_case.list_active(user_id)?)
    }

    /// 推送指定取货日的订单汇总, 返回汇总订单数
    pub fn notify_daily_order(&self, date: &str) -> ApiResult<usize> {
        let date = parse_date(date)
            .map_err(|e| ApiError::Validation(format!("取货日期格式错误: {}", e)))?;
        Ok(self.use_case.notify_daily_order(date)?)
    }
}
