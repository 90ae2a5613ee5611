//! # Reduct Cache
//!
//! 以物件分組快取加速的容差類取得器

pub mod grouped;

// Re-export 主要類型
pub use grouped::CachedClassObtainer;
