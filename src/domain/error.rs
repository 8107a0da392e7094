// ==========================================
// 餐厅外卖预订系统 - 领域层错误类型
// ==========================================
// 职责: 定义业务规则校验的统一错误分类
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 领域层错误类型
///
/// 三类错误全部原样向上传递到 API 边界，由调用方映射响应状态：
/// - Validation: 输入不合法或业务规则被违反，调用方修正输入后可重试
/// - NotFound: 引用的实体不存在
/// - UpdateTargetNotFound: 更新/删除的目标 id 不存在
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("校验失败: {0}")]
    Validation(String),

    #[error("记录未找到: {0}")]
    NotFound(String),

    #[error("更新目标未找到: {0}")]
    UpdateTargetNotFound(String),
}

impl DomainError {
    /// 构造校验错误（常用快捷方式）
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }
}

/// Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;
