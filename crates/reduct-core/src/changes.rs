//! 變更描述模型

use crate::attribute::{difference, Attribute, AttributeSet};
use crate::instance::{AttributeValue, InstanceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 單一屬性值的新舊對照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueDelta {
    /// 舊值
    pub old: AttributeValue,
    /// 新值
    pub new: AttributeValue,
}

/// 屬性相關變更
///
/// 記錄本回合值被改寫的屬性集合、先前相關但沿用未變更的屬性子集，
/// 以及逐物件的新舊值對照。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChanges {
    altered: AttributeSet,
    selected_unaltered: AttributeSet,
    deltas: BTreeMap<InstanceId, BTreeMap<Attribute, ValueDelta>>,
}

impl AttributeChanges {
    /// 創建空的變更記錄
    pub fn new() -> Self {
        Self::default()
    }

    /// 檢查是否沒有任何屬性值變更
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// 變更的屬性集合
    pub fn altered(&self) -> &AttributeSet {
        &self.altered
    }

    /// 先前相關且沿用未變更的屬性子集
    pub fn selected_unaltered(&self) -> &AttributeSet {
        &self.selected_unaltered
    }

    /// 記錄一筆值變更（同一屬性多次改寫時保留最初舊值）
    pub(crate) fn record(&mut self, id: InstanceId, attr: Attribute, delta: ValueDelta) {
        self.altered.insert(attr);
        self.deltas
            .entry(id)
            .or_default()
            .entry(attr)
            .and_modify(|existing| existing.new = delta.new)
            .or_insert(delta);
    }

    /// 依先前相關的屬性集合重算沿用未變更子集
    pub(crate) fn refresh_selected_unaltered(&mut self, previously_relevant: &AttributeSet) {
        self.selected_unaltered = difference(previously_relevant, &self.altered);
    }

    /// 查詢單一物件單一屬性的變更對照
    pub fn delta(&self, id: InstanceId, attr: Attribute) -> Option<ValueDelta> {
        self.deltas.get(&id).and_then(|map| map.get(&attr)).copied()
    }

    /// 查詢變更前的舊值
    pub fn old_value(&self, id: InstanceId, attr: Attribute) -> Option<AttributeValue> {
        self.delta(id, attr).map(|delta| delta.old)
    }

    /// 查詢變更後的新值
    pub fn new_value(&self, id: InstanceId, attr: Attribute) -> Option<AttributeValue> {
        self.delta(id, attr).map(|delta| delta.new)
    }

    /// 值被改寫的物件（依ID遞增順序）
    pub fn altered_instances(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.deltas.keys().copied()
    }

    /// 單一物件的全部值變更
    pub fn deltas_of(&self, id: InstanceId) -> Option<&BTreeMap<Attribute, ValueDelta>> {
        self.deltas.get(&id)
    }
}

/// 物件變更種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    /// 插入
    Inserted,
    /// 移除
    Removed,
    /// 值變更（舊物件由新版本接替）
    ValueAltered,
}

/// 單一物件的變更項目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceChange {
    /// 最新物件ID（移除時為被移除的ID）
    pub id: InstanceId,

    /// 變更種類
    pub kind: ChangeKind,

    /// 值變更明細
    pub deltas: BTreeMap<Attribute, ValueDelta>,
}

impl InstanceChange {
    /// 插入項目
    pub fn inserted(id: InstanceId) -> Self {
        Self {
            id,
            kind: ChangeKind::Inserted,
            deltas: BTreeMap::new(),
        }
    }

    /// 移除項目
    pub fn removed(id: InstanceId) -> Self {
        Self {
            id,
            kind: ChangeKind::Removed,
            deltas: BTreeMap::new(),
        }
    }

    /// 值變更項目
    pub fn value_altered(id: InstanceId, deltas: BTreeMap<Attribute, ValueDelta>) -> Self {
        Self {
            id,
            kind: ChangeKind::ValueAltered,
            deltas,
        }
    }
}

/// 更新演算法種類（依變更批次內容推導）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateKind {
    /// 屬性相關
    AttributeRelated,
    /// 物件相關
    ObjectRelated,
    /// 屬性與物件同時相關
    BothRelated,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::condition_set;

    #[test]
    fn test_record_keeps_first_old_value() {
        let mut changes = AttributeChanges::new();
        let attr = Attribute::Condition(1);
        changes.record(
            InstanceId(4),
            attr,
            ValueDelta {
                old: AttributeValue::Coded(1),
                new: AttributeValue::Coded(2),
            },
        );
        changes.record(
            InstanceId(4),
            attr,
            ValueDelta {
                old: AttributeValue::Coded(2),
                new: AttributeValue::Coded(3),
            },
        );

        // 多次改寫：舊值取最初，新值取最終
        assert_eq!(
            changes.old_value(InstanceId(4), attr),
            Some(AttributeValue::Coded(1))
        );
        assert_eq!(
            changes.new_value(InstanceId(4), attr),
            Some(AttributeValue::Coded(3))
        );
        assert!(changes.altered().contains(&attr));
    }

    #[test]
    fn test_selected_unaltered_excludes_altered() {
        let mut changes = AttributeChanges::new();
        changes.record(
            InstanceId(1),
            Attribute::Condition(1),
            ValueDelta {
                old: AttributeValue::Coded(0),
                new: AttributeValue::Coded(1),
            },
        );
        changes.refresh_selected_unaltered(&condition_set([0, 1, 2]));

        assert_eq!(changes.selected_unaltered(), &condition_set([0, 2]));
    }
}
