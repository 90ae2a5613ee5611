//! 物件模型

use crate::attribute::Attribute;
use serde::{Deserialize, Serialize};

/// 屬性值
///
/// 不完備決策系統以保留的缺失哨兵值表示未知的屬性值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AttributeValue {
    /// 缺失值（未知）
    Missing,
    /// 已編碼的類別值
    Coded(i64),
}

impl AttributeValue {
    /// 檢查是否為缺失值
    pub fn is_missing(&self) -> bool {
        matches!(self, AttributeValue::Missing)
    }

    /// 容差比較：值相等，或任一側為缺失值
    pub fn tolerates(&self, other: &AttributeValue) -> bool {
        self.is_missing() || other.is_missing() || self == other
    }
}

impl From<i64> for AttributeValue {
    fn from(code: i64) -> Self {
        AttributeValue::Coded(code)
    }
}

/// 物件識別子（跨回合穩定）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// 物件：索引化的條件屬性值向量加上決策值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// 物件ID
    pub id: InstanceId,

    /// 條件屬性值（依欄位索引）
    pub conditions: Vec<AttributeValue>,

    /// 決策屬性值
    pub decision: AttributeValue,
}

impl Instance {
    /// 創建新的物件
    pub fn new(id: InstanceId, conditions: Vec<AttributeValue>, decision: AttributeValue) -> Self {
        Self {
            id,
            conditions,
            decision,
        }
    }

    /// 由整數編碼建立物件（缺失值以 `None` 表示）
    pub fn from_codes(id: u32, conditions: &[Option<i64>], decision: i64) -> Self {
        Self {
            id: InstanceId(id),
            conditions: conditions
                .iter()
                .map(|code| match code {
                    Some(value) => AttributeValue::Coded(*value),
                    None => AttributeValue::Missing,
                })
                .collect(),
            decision: AttributeValue::Coded(decision),
        }
    }

    /// 查詢屬性值
    ///
    /// 條件屬性索引越界屬於程式錯誤，直接 panic。
    pub fn value(&self, attr: Attribute) -> AttributeValue {
        match attr {
            Attribute::Decision => self.decision,
            Attribute::Condition(idx) => self.conditions[idx as usize],
        }
    }

    /// 條件屬性個數
    pub fn condition_count(&self) -> usize {
        self.conditions.len()
    }

    /// 建構器模式：替換單一條件屬性值
    pub fn with_condition(mut self, idx: u32, value: AttributeValue) -> Self {
        self.conditions[idx as usize] = value;
        self
    }

    /// 建構器模式：替換決策值
    pub fn with_decision(mut self, value: AttributeValue) -> Self {
        self.decision = value;
        self
    }
}
