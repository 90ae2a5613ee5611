//! 回合快照與變更批次

use crate::attribute::AttributeSet;
use crate::changes::{AttributeChanges, ChangeKind, InstanceChange, UpdateKind, ValueDelta};
use crate::instance::{AttributeValue, Instance, InstanceId};
use crate::tolerance::ToleranceClasses;
use crate::universe::{IdentityMap, Universe};
use crate::{Attribute, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// 穩定回合的不可變快照
///
/// 每一穩定回合建立一次，持有論域、約簡與四張容差類映射
/// （約簡、約簡∪決策、全條件屬性、全條件屬性∪決策），
/// 供下一回合的增量更新消費。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    id: Uuid,
    universe: Universe,
    reduct: AttributeSet,
    by_reduct: ToleranceClasses,
    by_reduct_with_decision: ToleranceClasses,
    by_conditions: ToleranceClasses,
    by_conditions_with_decision: ToleranceClasses,
}

impl RoundSnapshot {
    /// 組裝快照（四張容差類映射由呼叫端計算）
    pub fn new(
        universe: Universe,
        reduct: AttributeSet,
        by_reduct: ToleranceClasses,
        by_reduct_with_decision: ToleranceClasses,
        by_conditions: ToleranceClasses,
        by_conditions_with_decision: ToleranceClasses,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            universe,
            reduct,
            by_reduct,
            by_reduct_with_decision,
            by_conditions,
            by_conditions_with_decision,
        }
    }

    /// 快照ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 回合的論域
    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// 回合的約簡
    pub fn reduct(&self) -> &AttributeSet {
        &self.reduct
    }

    /// 約簡屬性集下的容差類
    pub fn by_reduct(&self) -> &ToleranceClasses {
        &self.by_reduct
    }

    /// 約簡聯集決策屬性下的容差類
    pub fn by_reduct_with_decision(&self) -> &ToleranceClasses {
        &self.by_reduct_with_decision
    }

    /// 全條件屬性下的容差類
    pub fn by_conditions(&self) -> &ToleranceClasses {
        &self.by_conditions
    }

    /// 全條件屬性聯集決策屬性下的容差類
    pub fn by_conditions_with_decision(&self) -> &ToleranceClasses {
        &self.by_conditions_with_decision
    }
}

/// 動態變更批次
///
/// 包裹前回合快照、本回合的屬性／物件變更描述、同一性對照表，
/// 以及套用變更後的最新論域。一切變更經由型別化的方法記錄，
/// 論域、變更明細與對照表因此恆保持一致。回合處理完畢後隨之銷毀。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBatch {
    id: Uuid,
    previous: RoundSnapshot,
    universe: Universe,
    attribute_changes: AttributeChanges,
    instance_changes: Vec<InstanceChange>,
    identity: IdentityMap,
    observed_at: Option<NaiveDateTime>,
}

impl ChangeBatch {
    /// 以前回合快照開啟新的變更批次
    pub fn new(previous: RoundSnapshot) -> Self {
        let universe = previous.universe().clone();
        let mut attribute_changes = AttributeChanges::new();
        attribute_changes.refresh_selected_unaltered(previous.reduct());
        Self {
            id: Uuid::new_v4(),
            previous,
            universe,
            attribute_changes,
            instance_changes: Vec::new(),
            identity: IdentityMap::new(),
            observed_at: None,
        }
    }

    /// 建構器模式：設置變更觀測時間
    pub fn with_observed_at(mut self, observed_at: NaiveDateTime) -> Self {
        self.observed_at = Some(observed_at);
        self
    }

    /// 就地改寫單一物件的屬性值（屬性相關變更）
    pub fn alter_value(
        &mut self,
        id: InstanceId,
        attr: Attribute,
        new_value: AttributeValue,
    ) -> Result<()> {
        let old = self.universe.set_value(id, attr, new_value)?;
        if old == new_value {
            // 無實際變更
            return Ok(());
        }
        self.attribute_changes
            .record(id, attr, ValueDelta { old, new: new_value });
        self.attribute_changes
            .refresh_selected_unaltered(self.previous.reduct());
        Ok(())
    }

    /// 插入物件（物件相關變更）
    pub fn insert_instance(&mut self, instance: Instance) -> Result<()> {
        let id = instance.id;
        self.universe.insert(instance)?;
        self.instance_changes.push(InstanceChange::inserted(id));
        Ok(())
    }

    /// 移除物件（物件相關變更）
    pub fn remove_instance(&mut self, id: InstanceId) -> Result<()> {
        self.universe.remove(id)?;
        self.instance_changes.push(InstanceChange::removed(id));
        Ok(())
    }

    /// 以新版本接替舊物件（同一性變更的物件相關變更）
    pub fn replace_instance(&mut self, previous_id: InstanceId, instance: Instance) -> Result<()> {
        if instance.condition_count() != self.universe.width() {
            return Err(crate::ReductError::ConditionWidthMismatch {
                expected: self.universe.width(),
                actual: instance.condition_count(),
            });
        }
        let old = self.universe.remove(previous_id)?;
        let latest_id = instance.id;

        // 逐屬性比對新舊版本，留下值變更明細
        let mut deltas = BTreeMap::new();
        for idx in 0..old.condition_count() as u32 {
            let attr = Attribute::Condition(idx);
            let (old_value, new_value) = (old.value(attr), instance.value(attr));
            if old_value != new_value {
                deltas.insert(
                    attr,
                    ValueDelta {
                        old: old_value,
                        new: new_value,
                    },
                );
            }
        }
        if old.decision != instance.decision {
            deltas.insert(
                Attribute::Decision,
                ValueDelta {
                    old: old.decision,
                    new: instance.decision,
                },
            );
        }

        self.universe.insert(instance)?;
        self.identity.record(previous_id, latest_id);
        self.instance_changes
            .push(InstanceChange::value_altered(latest_id, deltas));
        Ok(())
    }

    /// 批次ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 前回合快照
    pub fn previous(&self) -> &RoundSnapshot {
        &self.previous
    }

    /// 套用變更後的最新論域
    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// 屬性相關變更
    pub fn attribute_changes(&self) -> &AttributeChanges {
        &self.attribute_changes
    }

    /// 物件相關變更項目
    pub fn instance_changes(&self) -> &[InstanceChange] {
        &self.instance_changes
    }

    /// 同一性對照表
    pub fn identity(&self) -> &IdentityMap {
        &self.identity
    }

    /// 變更觀測時間
    pub fn observed_at(&self) -> Option<NaiveDateTime> {
        self.observed_at
    }

    /// 推導本批次適用的更新演算法
    ///
    /// 僅屬性值就地改寫走屬性相關路徑；僅物件插入／移除／接替走物件
    /// 相關路徑；兩者並存走混合路徑。空批次走屬性路徑的快速路徑。
    pub fn update_kind(&self) -> UpdateKind {
        let has_attribute = !self.attribute_changes.is_empty();
        let has_object = !self.instance_changes.is_empty() || !self.identity.is_identity();
        match (has_attribute, has_object) {
            (true, true) => UpdateKind::BothRelated,
            (false, true) => UpdateKind::ObjectRelated,
            _ => UpdateKind::AttributeRelated,
        }
    }

    /// 本批次中被移除或被接替的前回合物件ID
    pub fn retired_ids(&self) -> Vec<InstanceId> {
        let mut retired: Vec<InstanceId> = self
            .instance_changes
            .iter()
            .filter(|change| change.kind == ChangeKind::Removed)
            .map(|change| change.id)
            .collect();
        retired.extend(self.identity.superseded_ids());
        retired.sort_unstable();
        retired.dedup();
        retired
    }

    /// 本批次中類需要重建的最新物件ID（插入或值變更者，含就地改寫）
    pub fn altered_ids(&self) -> Vec<InstanceId> {
        let mut altered: Vec<InstanceId> = self
            .instance_changes
            .iter()
            .filter(|change| change.kind != ChangeKind::Removed)
            .map(|change| change.id)
            .collect();
        altered.extend(self.attribute_changes.altered_instances());
        altered.sort_unstable();
        altered.dedup();
        altered
    }

    /// 檢查某物件的全部值變更是否都落在指定屬性集合之外
    pub fn deltas_avoid(&self, attrs: &AttributeSet) -> bool {
        let object_deltas_avoid = self
            .instance_changes
            .iter()
            .flat_map(|change| change.deltas.keys())
            .all(|attr| !attrs.contains(attr));
        let attribute_deltas_avoid = self
            .attribute_changes
            .altered()
            .iter()
            .all(|attr| !attrs.contains(attr));
        object_deltas_avoid && attribute_deltas_avoid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::condition_set;

    fn stable_snapshot() -> RoundSnapshot {
        let universe = Universe::from_instances(
            2,
            vec![
                Instance::from_codes(1, &[Some(1), Some(2)], 0),
                Instance::from_codes(2, &[Some(1), None], 1),
            ],
        )
        .unwrap();

        let mut classes = ToleranceClasses::new();
        for id in universe.ids() {
            classes.ensure_reflexive(id);
        }

        RoundSnapshot::new(
            universe,
            condition_set([0, 1]),
            classes.clone(),
            classes.clone(),
            classes.clone(),
            classes,
        )
    }

    #[test]
    fn test_alter_value_records_delta_and_updates_universe() {
        let mut batch = ChangeBatch::new(stable_snapshot());
        batch
            .alter_value(
                InstanceId(1),
                Attribute::Condition(1),
                AttributeValue::Coded(9),
            )
            .unwrap();

        assert_eq!(
            batch.attribute_changes().old_value(InstanceId(1), Attribute::Condition(1)),
            Some(AttributeValue::Coded(2))
        );
        assert_eq!(
            batch.universe().get(InstanceId(1)).unwrap().value(Attribute::Condition(1)),
            AttributeValue::Coded(9)
        );
        // 前回合論域不受影響
        assert_eq!(
            batch.previous().universe().get(InstanceId(1)).unwrap().value(Attribute::Condition(1)),
            AttributeValue::Coded(2)
        );
        assert_eq!(batch.update_kind(), UpdateKind::AttributeRelated);
        assert_eq!(
            batch.attribute_changes().selected_unaltered(),
            &condition_set([0])
        );
    }

    #[test]
    fn test_alter_value_ignores_no_op_write() {
        let mut batch = ChangeBatch::new(stable_snapshot());
        batch
            .alter_value(
                InstanceId(1),
                Attribute::Condition(0),
                AttributeValue::Coded(1),
            )
            .unwrap();

        assert!(batch.attribute_changes().is_empty());
        assert_eq!(batch.update_kind(), UpdateKind::AttributeRelated);
    }

    #[test]
    fn test_insert_and_remove_drive_object_kind() {
        let mut batch = ChangeBatch::new(stable_snapshot());
        batch
            .insert_instance(Instance::from_codes(3, &[Some(1), Some(2)], 0))
            .unwrap();
        batch.remove_instance(InstanceId(2)).unwrap();

        assert_eq!(batch.update_kind(), UpdateKind::ObjectRelated);
        assert_eq!(batch.retired_ids(), vec![InstanceId(2)]);
        assert_eq!(batch.altered_ids(), vec![InstanceId(3)]);
        assert!(!batch.universe().contains(InstanceId(2)));
    }

    #[test]
    fn test_replace_instance_records_identity_and_deltas() {
        let mut batch = ChangeBatch::new(stable_snapshot());
        batch
            .replace_instance(
                InstanceId(2),
                Instance::from_codes(5, &[Some(1), Some(7)], 1),
            )
            .unwrap();

        assert_eq!(batch.identity().latest_of(InstanceId(2)), InstanceId(5));
        let change = &batch.instance_changes()[0];
        assert_eq!(change.kind, ChangeKind::ValueAltered);
        assert_eq!(
            change.deltas.get(&Attribute::Condition(1)),
            Some(&ValueDelta {
                old: AttributeValue::Missing,
                new: AttributeValue::Coded(7),
            })
        );
        assert_eq!(batch.update_kind(), UpdateKind::ObjectRelated);
    }

    #[test]
    fn test_mixed_changes_drive_both_kind() {
        let mut batch = ChangeBatch::new(stable_snapshot());
        batch
            .alter_value(
                InstanceId(1),
                Attribute::Condition(0),
                AttributeValue::Coded(4),
            )
            .unwrap();
        batch
            .insert_instance(Instance::from_codes(3, &[Some(1), Some(2)], 0))
            .unwrap();

        assert_eq!(batch.update_kind(), UpdateKind::BothRelated);
        // 值變更與插入同時列入重建對象
        assert_eq!(batch.altered_ids(), vec![InstanceId(1), InstanceId(3)]);
    }

    #[test]
    fn test_deltas_avoid() {
        let mut batch = ChangeBatch::new(stable_snapshot());
        batch
            .alter_value(
                InstanceId(1),
                Attribute::Condition(1),
                AttributeValue::Coded(9),
            )
            .unwrap();

        assert!(batch.deltas_avoid(&condition_set([0])));
        assert!(!batch.deltas_avoid(&condition_set([0, 1])));
    }
}
