// ==========================================
// 餐厅外卖预订系统 - 核心库
// ==========================================
// 系统定位: 外卖可用性与预订引擎
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    BusinessHour, DateRange, FoodItem, Order, SpecialBusinessHour, SpecialHoliday, StockItem,
    StockRemain, TimeRange, WeeklySchedule,
};

// 领域错误
pub use domain::error::{DomainError, DomainResult};

// 引擎类型
pub use engine::{
    AvailabilityResolver, BookingError, BookingRepositories, BookingResult, CreateOrderRequest,
    DayAvailability, OrderFactory, OrderUseCase,
};

// 仓储基础设施
pub use repository::{Datastore, RepositoryError, RepositoryResult};

// API 类型
pub use api::{ApiError, ApiResult, AvailabilityApi, OrderApi, ScheduleApi};

// ==========================================
// 应用常量
// ==========================================

/// 应用版本号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用名称
pub const APP_NAME: &str = "takeout-booking";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_not_empty() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "takeout-booking");
    }
}
