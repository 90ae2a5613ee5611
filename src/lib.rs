//! # Reduct
//!
//! 不完備決策系統的容差類增量維護與屬性約簡引擎。
//!
//! 以容差關係（對稱、自反）刻畫含缺失值決策表中物件的不可分辨性；
//! 屬性值變更、物件增刪或兩者並發時，增量更新容差類而非從頭重算，
//! 並據以重整、擴張、檢視屬性約簡。

// Re-export 主要類型
pub use reduct_cache::CachedClassObtainer;
pub use reduct_calc::{
    AttributeUpdateCalculator, DirectClassObtainer, InstanceGroupCache, MixedUpdateCalculator,
    ObjectUpdateCalculator, PositiveRegionSignificance, ReductMaintainer, ReductSearch,
    RoundResult, Significance, SignificanceMeasure, SignificanceUpdate, ToleranceClassObtainer,
};
pub use reduct_core::{
    attribute, Attribute, AttributeChanges, AttributeSet, AttributeValue, ChangeBatch, ChangeKind,
    IdentityMap, Instance, InstanceChange, InstanceId, ReductError, Result, RoundSnapshot,
    ToleranceClasses, ToleranceRelation, UpdateKind, Universe, ValueDelta,
};
