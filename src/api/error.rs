// ==========================================
// 餐厅外卖预订系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，聚合领域/仓储错误
// 约束: 三类业务错误原样透传，由上游映射响应状态
// ==========================================

use crate::domain::error::DomainError;
use crate::engine::booking::BookingError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
/// 所有错误信息必须包含显式原因
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("校验失败: {0}")]
    Validation(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("更新目标未找到: {0}")]
    UpdateTargetNotFound(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::Validation(msg),
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::UpdateTargetNotFound(msg) => ApiError::UpdateTargetNotFound(msg),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={})", entity, id))
            }
            RepositoryError::ValidationError(msg) => ApiError::Validation(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::Validation(format!("{}: {}", field, message))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Domain(e) => e.into(),
            BookingError::Repository(e) => e.into(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
