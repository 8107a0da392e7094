// ==========================================
// 餐厅外卖预订系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、值对象、业务规则接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod business_hour;
pub mod error;
pub mod holiday;
pub mod item;
pub mod order;
pub mod ranges;
pub mod special_hour;

// 重导出核心类型
pub use business_hour::{weekday_of, BusinessHour, WeeklySchedule};
pub use error::{DomainError, DomainResult};
pub use holiday::SpecialHoliday;
pub use item::{FoodItem, ItemCommon, OrderableItem, StockItem, StockRemain};
pub use order::{Order, OrderedItem};
pub use ranges::{DateRange, TimeRange};
pub use special_hour::SpecialBusinessHour;
