// ==========================================
// 餐厅外卖预订系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod business_hour_repo;
pub mod datastore;
pub mod error;
pub mod holiday_repo;
pub mod item_repo;
pub mod order_repo;
pub mod special_hour_repo;

// 重导出核心仓储
pub use business_hour_repo::BusinessHourRepository;
pub use datastore::Datastore;
pub use error::{RepositoryError, RepositoryResult};
pub use holiday_repo::HolidayRepository;
pub use item_repo::ItemRepository;
pub use order_repo::OrderRepository;
pub use special_hour_repo::SpecialHourRepository;

/// 行转换器中字段损坏时的统一失败路径
///
/// 无法解析/越界的列值直接上浮为查询错误，不做哨兵值回退。
pub(crate) fn corrupt_column(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}
