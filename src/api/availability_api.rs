// ==========================================
// 餐厅外卖预订系统 - 可下单窗口查询 API
// ==========================================
// 职责: 对外暴露 resolve_availability(startDate, endDate)
// 说明: 在单个只读事务内取快照，保证同一请求视图一致
// ==========================================

use crate::api::error::ApiResult;
use crate::config::ConfigManager;
use crate::domain::order::Order;
use crate::domain::ranges::DateRange;
use crate::engine::availability::{demand_by_date, AvailabilityResolver, DayAvailability, ScheduleSnapshot};
use crate::engine::repositories::BookingRepositories;
use crate::repository::{Datastore, OrderRepository};
use chrono::{Local, NaiveDateTime};
use std::sync::Arc;

/// 可下单窗口查询 API
pub struct AvailabilityApi {
    datastore: Datastore,
    repos: BookingRepositories,
    config: Arc<ConfigManager>,
}

impl AvailabilityApi {
    pub fn new(datastore: Datastore, repos: BookingRepositories, config: Arc<ConfigManager>) -> Self {
        Self {
            datastore,
            repos,
            config,
        }
    }

    /// 解析日期区间内每一天的可下单窗口（以系统当前时刻为 now）
    ///
    /// # 参数
    /// - start/end: 边界日期字符串（YYYY/MM/DD，两端含）
    pub fn resolve_availability(&self, start: &str, end: &str) -> ApiResult<Vec<DayAvailability>> {
        let range = DateRange::parse(start, end)?;
        self.resolve_availability_at(range, Local::now().naive_local())
    }

    /// 解析可下单窗口（显式注入 now，供测试与回放使用）
    pub fn resolve_availability_at(
        &self,
        range: DateRange,
        now: NaiveDateTime,
    ) -> ApiResult<Vec<DayAvailability>> {
        self.repos.business_hour_repo.ensure_seeded()?;

        let offset = self.config.order_offset_minutes()?;
        let unit = self.config.round_unit_minutes()?;

        // 同一事务内读取快照与订单，避免半新半旧的视图
        let (snapshot, orders) = self
            .datastore
            .transact(|conn| -> ApiResult<(ScheduleSnapshot, Vec<Order>)> {
                let snapshot = ScheduleSnapshot::load_in(conn)?;
                let orders = OrderRepository::find_by_pickup_date_range_in(conn, range.start, range.end)?;
                Ok((snapshot, orders))
            })?;

        let demand = demand_by_date(&orders);
        let resolver = AvailabilityResolver::new(snapshot, offset, unit);
        Ok(resolver.resolve(range, now, &demand))
    }
}
