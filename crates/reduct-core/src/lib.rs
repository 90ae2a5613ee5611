//! # Reduct Core
//!
//! 不完備決策系統的核心資料模型與容差類基元

pub mod attribute;
pub mod changes;
pub mod instance;
pub mod snapshot;
pub mod tolerance;
pub mod universe;

// Re-export 主要類型
pub use attribute::{Attribute, AttributeSet};
pub use changes::{AttributeChanges, ChangeKind, InstanceChange, UpdateKind, ValueDelta};
pub use instance::{AttributeValue, Instance, InstanceId};
pub use snapshot::{ChangeBatch, RoundSnapshot};
pub use tolerance::{ToleranceClasses, ToleranceRelation};
pub use universe::{IdentityMap, Universe};

/// 引擎錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum ReductError {
    #[error("找不到物件: {0}")]
    UnknownInstance(InstanceId),

    #[error("物件已存在: {0}")]
    DuplicateInstance(InstanceId),

    #[error("條件屬性寬度不一致: 預期 {expected}，實際 {actual}")]
    ConditionWidthMismatch { expected: usize, actual: usize },

    #[error("條件屬性索引越界: {0}")]
    ConditionIndexOutOfRange(u32),

    #[error("容差類缺少物件 {0} 的條目")]
    MissingToleranceEntry(InstanceId),

    #[error("屬性前置條件違反: {0}")]
    AttributePrecondition(String),

    #[error("約簡擴張找不到候選屬性")]
    NoCandidateAttribute,

    #[error("約簡狀態不一致: {0}")]
    InconsistentReduct(String),

    #[error("其他錯誤: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ReductError>;
