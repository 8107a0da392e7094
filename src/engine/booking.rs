// ==========================================
// 餐厅外卖预订系统 - 预订事务编排引擎
// ==========================================
// 职责: 下单/取消的 check-then-act 编排
// 红线: 窗口判定 -> 扣库存 -> 日上限 -> 落库 必须是
//       同一事务内的 all-or-nothing 单元
// ==========================================

use crate::config::ConfigManager;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::order::Order;
use crate::engine::availability::{AvailabilityResolver, ScheduleSnapshot};
use crate::engine::daily_demand::DailyDemandAggregator;
use crate::engine::notifier::OrderNotifier;
use crate::engine::repositories::BookingRepositories;
use crate::repository::{Datastore, ItemRepository, OrderRepository, RepositoryError};
use chrono::{Local, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// 预订流程错误类型
///
/// 领域校验与仓储故障原样透传，不在引擎层改写语义。
#[derive(Error, Debug)]
pub enum BookingError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type BookingResult<T> = Result<T, BookingError>;

pub use crate::engine::order_factory::{CreateOrderRequest, ItemRequest, OrderFactory};

// ==========================================
// OrderUseCase - 预订用例
// ==========================================

/// 预订用例编排器
pub struct OrderUseCase {
    datastore: Datastore,
    repos: BookingRepositories,
    config: Arc<ConfigManager>,
    notifier: Arc<dyn OrderNotifier>,
}

impl OrderUseCase {
    pub fn new(
        datastore: Datastore,
        repos: BookingRepositories,
        config: Arc<ConfigManager>,
        notifier: Arc<dyn OrderNotifier>,
    ) -> Self {
        Self {
            datastore,
            repos,
            config,
            notifier,
        }
    }

    /// 创建订单（以系统当前时刻为 now）
    pub fn create(&self, req: &CreateOrderRequest, as_admin: bool) -> BookingResult<Order> {
        self.create_at(req, as_admin, Local::now().naive_local())
    }

    /// 创建订单（显式注入 now，供测试与回放使用）
    ///
    /// # 流程
    /// 1. 非管理员调用时检查"一人一张未取消订单"策略
    /// 2. 事务内: 装配订单 -> 窗口判定 -> 扣库存 -> 日上限 -> 落库
    /// 3. 事务成功后尽力发送完成通知（失败只记日志）
    pub fn create_at(
        &self,
        req: &CreateOrderRequest,
        as_admin: bool,
        now: NaiveDateTime,
    ) -> BookingResult<Order> {
        if !as_admin {
            let active = self.repos.order_repo.find_active_by_user(&req.user_id)?;
            if !active.is_empty() {
                return Err(DomainError::validation(format!(
                    "用户已存在未取消的订单: user_id={}",
                    req.user_id
                ))
                .into());
            }
        }

        let offset = self.config.order_offset_minutes()?;
        let unit = self.config.round_unit_minutes()?;

        let order = self.datastore.transact(|conn| -> BookingResult<Order> {
            let snapshot = ScheduleSnapshot::load_in(conn)?;
            let food_catalog = snapshot.food_items.clone();

            // 目录存在性与单笔上限在装配时校验
            let order = OrderFactory::create(req, &snapshot.stock_items, &snapshot.food_items, now)?;

            // a. 取货时刻必须落在当前可下单窗口内
            let resolver = AvailabilityResolver::new(snapshot, offset, unit);
            if !resolver.is_orderable(order.pickup_at, now) {
                return Err(DomainError::validation(format!(
                    "取货时间不在营业时间内: {}",
                    crate::domain::ranges::format_date_time(order.pickup_at)
                ))
                .into());
            }

            // b. 扣减库存（权威闸口: 事务内读改写，串行裁决）
            for line in &order.stock_items {
                let mut item = ItemRepository::find_stock_in(conn, &line.item_id)?.ok_or_else(
                    || DomainError::validation(format!("商品不存在: id={}", line.item_id)),
                )?;
                item.remain.consume(line.quantity)?;
                ItemRepository::update_stock_remain_in(conn, &line.item_id, item.remain.value())?;
            }

            // c. 餐品当日上限（越线的那一单失败，之前的不受影响）
            if !order.food_items.is_empty() {
                let day_orders =
                    OrderRepository::find_by_pickup_date_in(conn, order.pickup_at.date())?;
                // 同单内重复明细先按商品合并，再与已订数量合计判定
                let mut requested: BTreeMap<&str, u32> = BTreeMap::new();
                for line in &order.food_items {
                    *requested.entry(line.item_id.as_str()).or_insert(0) += line.quantity;
                }
                for (item_id, total) in requested {
                    let item = food_catalog
                        .iter()
                        .find(|f| f.common.id == item_id)
                        .ok_or_else(|| {
                            DomainError::validation(format!("商品不存在: id={}", item_id))
                        })?;
                    Self::check_daily_cap(&day_orders, item_id, total, item.max_order_per_day)?;
                }
            }

            // d. 落库
            OrderRepository::insert_in(conn, &order)?;
            Ok(order)
        })?;

        if let Err(e) = self.notifier.send_complete(&order) {
            tracing::warn!(order_id = %order.id, error = %e, "完成通知发送失败（不影响预订结果）");
        }

        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            pickup_at = %crate::domain::ranges::format_date_time(order.pickup_at),
            "订单创建成功"
        );
        Ok(order)
    }

    /// 日上限检查
    fn check_daily_cap(
        day_orders: &[Order],
        item_id: &str,
        requested: u32,
        max_order_per_day: u32,
    ) -> DomainResult<()> {
        let already = DailyDemandAggregator::quantity_ordered(day_orders, item_id);
        if already + requested > max_order_per_day {
            return Err(DomainError::validation(format!(
                "当日订购量超限: item={}, already={}, requested={}, max_per_day={}",
                item_id, already, requested, max_order_per_day
            )));
        }
        Ok(())
    }

    /// 取消订单
    ///
    /// # 流程
    /// 事务内: 加载订单(缺失 -> NotFound) -> 置取消标记(幂等校验)
    /// -> 逐明细回补库存 -> 更新状态; 之后尽力发送取消通知。
    pub fn cancel(&self, id: &str) -> BookingResult<Order> {
        let order = self.datastore.transact(|conn| -> BookingResult<Order> {
            let mut order = OrderRepository::find_in(conn, id)?
                .ok_or_else(|| DomainError::NotFound(format!("订单不存在: id={}", id)))?;
            order.cancel()?;

            for line in &order.stock_items {
                match ItemRepository::find_stock_in(conn, &line.item_id)? {
                    Some(mut item) => {
                        item.remain.increase(line.quantity)?;
                        ItemRepository::update_stock_remain_in(
                            conn,
                            &line.item_id,
                            item.remain.value(),
                        )?;
                    }
                    None => {
                        // 商品已从目录下架，无库存可回补
                        tracing::warn!(item_id = %line.item_id, "取消回补时商品已不存在");
                    }
                }
            }

            OrderRepository::update_status_in(conn, &order.id, true)?;
            Ok(order)
        })?;

        if let Err(e) = self.notifier.send_cancel(&order) {
            tracing::warn!(order_id = %order.id, error = %e, "取消通知发送失败（不影响取消结果）");
        }

        tracing::info!(order_id = %order.id, "订单已取消");
        Ok(order)
    }

    /// 查询用户的未取消订单
    pub fn list_active(&self, user_id: &str) -> BookingResult<Vec<Order>> {
        Ok(self.repos.order_repo.find_active_by_user(user_id)?)
    }

    /// 发送某取货日的订单汇总通知（由外部定时触发器按日调用）
    ///
    /// # 返回
    /// - Ok(n): 汇总的未取消订单数
    pub fn notify_daily_order(&self, date: NaiveDate) -> BookingResult<usize> {
        let orders: Vec<Order> = self
            .repos
            .order_repo
            .find_by_pickup_date(date)?
            .into_iter()
            .filter(|o| !o.canceled)
            .collect();
        if let Err(e) = self.notifier.send_daily_summary(&orders, date) {
            tracing::warn!(error = %e, "当日汇总通知发送失败");
        }
        Ok(orders.len())
    }
}
