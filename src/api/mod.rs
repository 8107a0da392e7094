// ==========================================
// 餐厅外卖预订系统 - API层
// ==========================================
// 职责: 对外服务入口, 错误映射与参数解析
// ==========================================

pub mod availability_api;
pub mod error;
pub mod order_api;
pub mod schedule_api;

pub use availability_api::AvailabilityApi;
pub use error::{ApiError, ApiResult};
pub use order_api::OrderApi;
pub use schedule_api::ScheduleApi;
