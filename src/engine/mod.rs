// ==========================================
// 餐厅外卖预订系统 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎,不拼 SQL
// 红线: Engine 不拼 SQL, 所有规则失败必须输出可解释原因
// ==========================================

pub mod availability;
pub mod availability_core;
pub mod booking;
pub mod daily_demand;
pub mod notifier;
pub mod order_factory;
pub mod repositories;

// 重导出核心引擎
pub use availability::{
    demand_by_date, AvailabilityResolver, BusinessWindow, DayAvailability, ItemAvailability,
    ScheduleSnapshot,
};
pub use availability_core::{AvailabilityCore, WindowSlot};
pub use booking::{BookingError, BookingResult, OrderUseCase};
pub use daily_demand::DailyDemandAggregator;
pub use notifier::{LoggingNotifier, NoOpNotifier, OrderNotifier};
pub use order_factory::{CreateOrderRequest, ItemRequest, OrderFactory};
pub use repositories::BookingRepositories;
