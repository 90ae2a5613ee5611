//! 屬性識別模型

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 屬性識別子
///
/// 決策屬性以獨立變體表示，取代以保留整數 0 編碼決策屬性的做法，
/// 避免條件屬性編號與決策屬性之間的無聲算術混淆。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attribute {
    /// 決策屬性
    Decision,
    /// 條件屬性（依決策表欄位索引編號）
    Condition(u32),
}

impl Attribute {
    /// 檢查是否為決策屬性
    pub fn is_decision(&self) -> bool {
        matches!(self, Attribute::Decision)
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Attribute::Decision => write!(f, "d"),
            Attribute::Condition(idx) => write!(f, "c{}", idx),
        }
    }
}

/// 屬性集合
///
/// 有序集合：迭代順序（決策屬性在前，條件屬性依索引遞增）即約簡搜尋
/// 決定性平手規則所依賴的固定屬性順序。
pub type AttributeSet = BTreeSet<Attribute>;

/// 由條件屬性索引建立屬性集合
pub fn condition_set<I: IntoIterator<Item = u32>>(indices: I) -> AttributeSet {
    indices.into_iter().map(Attribute::Condition).collect()
}

/// 集合聯集決策屬性
pub fn with_decision(attrs: &AttributeSet) -> AttributeSet {
    let mut joined = attrs.clone();
    joined.insert(Attribute::Decision);
    joined
}

/// 集合差
pub fn difference(lhs: &AttributeSet, rhs: &AttributeSet) -> AttributeSet {
    lhs.difference(rhs).copied().collect()
}

/// 集合交
pub fn intersection(lhs: &AttributeSet, rhs: &AttributeSet) -> AttributeSet {
    lhs.intersection(rhs).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_set() {
        let attrs = condition_set([2, 0, 1]);

        assert_eq!(attrs.len(), 3);
        assert!(attrs.contains(&Attribute::Condition(0)));
        assert!(!attrs.contains(&Attribute::Decision));
    }

    #[test]
    fn test_with_decision() {
        let attrs = condition_set([0, 1]);
        let joined = with_decision(&attrs);

        assert_eq!(joined.len(), 3);
        assert!(joined.contains(&Attribute::Decision));
        // 原集合不受影響
        assert!(!attrs.contains(&Attribute::Decision));
    }

    #[test]
    fn test_iteration_order_is_deterministic() {
        // 決策屬性在前，條件屬性依索引遞增
        let attrs = with_decision(&condition_set([3, 1, 2]));
        let ordered: Vec<Attribute> = attrs.iter().copied().collect();

        assert_eq!(
            ordered,
            vec![
                Attribute::Decision,
                Attribute::Condition(1),
                Attribute::Condition(2),
                Attribute::Condition(3),
            ]
        );
    }

    #[test]
    fn test_difference_and_intersection() {
        let lhs = condition_set([0, 1, 2]);
        let rhs = condition_set([1, 3]);

        assert_eq!(difference(&lhs, &rhs), condition_set([0, 2]));
        assert_eq!(intersection(&lhs, &rhs), condition_set([1]));
    }
}
