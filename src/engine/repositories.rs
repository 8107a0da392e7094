// ==========================================
// 餐厅外卖预订系统 - 引擎层仓储聚合
// ==========================================
// 职责: 聚合预订流程所需的所有 Repository
// 目标: 减少 OrderUseCase 的构造函数参数数量，提升可维护性
// ==========================================

use std::sync::Arc;

use crate::repository::{
    BusinessHourRepository, Datastore, HolidayRepository, ItemRepository, OrderRepository,
    SpecialHourRepository,
};

/// 预订流程仓储集合
///
/// 各仓储与 Datastore 共享同一把连接，事务内外的读写
/// 才能落在同一个串行化单元上。
#[derive(Clone)]
pub struct BookingRepositories {
    /// 营业时段仓储
    pub business_hour_repo: Arc<BusinessHourRepository>,
    /// 特别营业时段仓储
    pub special_hour_repo: Arc<SpecialHourRepository>,
    /// 特别休业期仓储
    pub holiday_repo: Arc<HolidayRepository>,
    /// 商品目录仓储
    pub item_repo: Arc<ItemRepository>,
    /// 订单仓储
    pub order_repo: Arc<OrderRepository>,
}

impl BookingRepositories {
    /// 从 Datastore 的共享连接装配全部仓储
    pub fn from_datastore(datastore: &Datastore) -> Self {
        Self {
            business_hour_repo: Arc::new(BusinessHourRepository::from_connection(
                datastore.connection(),
            )),
            special_hour_repo: Arc::new(SpecialHourRepository::from_connection(
                datastore.connection(),
            )),
            holiday_repo: Arc::new(HolidayRepository::from_connection(datastore.connection())),
            item_repo: Arc::new(ItemRepository::from_connection(datastore.connection())),
            order_repo: Arc::new(OrderRepository::from_connection(datastore.connection())),
        }
    }
}
