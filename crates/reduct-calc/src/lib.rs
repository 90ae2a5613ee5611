//! # Reduct Calculation Engine
//!
//! 容差類增量維護與屬性約簡的核心計算引擎

pub mod attribute_update;
pub mod driver;
pub mod mixed_update;
pub mod object_update;
pub mod obtainer;
pub mod reduct;
pub mod significance;

// Re-export 主要類型
pub use attribute_update::AttributeUpdateCalculator;
pub use driver::{ReductMaintainer, SignificanceUpdate};
pub use mixed_update::MixedUpdateCalculator;
pub use object_update::ObjectUpdateCalculator;
pub use obtainer::{DirectClassObtainer, InstanceGroupCache, ToleranceClassObtainer};
pub use reduct::ReductSearch;
pub use significance::{PositiveRegionSignificance, Significance, SignificanceMeasure};

use serde::Serialize;

/// 動態回合計算結果
#[derive(Debug, Clone, Serialize)]
pub struct RoundResult {
    /// 新一輪穩定快照
    pub snapshot: reduct_core::RoundSnapshot,

    /// 本回合約簡的顯著度
    pub reduct_significance: Significance,

    /// 全條件屬性集的顯著度
    pub global_significance: Significance,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}
