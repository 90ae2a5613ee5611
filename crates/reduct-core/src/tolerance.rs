//! 容差關係與容差類

use crate::attribute::AttributeSet;
use crate::instance::{Instance, InstanceId};
use crate::universe::{IdentityMap, Universe};
use crate::{ReductError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 容差關係判定
pub struct ToleranceRelation;

impl ToleranceRelation {
    /// 判定兩物件在屬性集合下是否容差
    ///
    /// 每一屬性上兩值相等或至少一側缺失；遇首個不一致即短路返回。
    pub fn holds(a: &Instance, b: &Instance, attrs: &AttributeSet) -> bool {
        attrs
            .iter()
            .all(|&attr| a.value(attr).tolerates(&b.value(attr)))
    }

    /// 決策過濾：僅保留決策值與目標相容的容差夥伴
    ///
    /// 過濾結果逐類皆為原映射的子集。
    pub fn decision_filtered(
        classes: &ToleranceClasses,
        universe: &Universe,
    ) -> Result<ToleranceClasses> {
        let mut filtered = ToleranceClasses::new();
        for (id, class) in classes.iter() {
            let target = universe.expect_instance(id)?;
            let mut kept = BTreeSet::new();
            for &member in class {
                let partner = universe.expect_instance(member)?;
                if target.decision.tolerates(&partner.decision) {
                    kept.insert(member);
                }
            }
            filtered.insert_class(id, kept);
        }
        Ok(filtered)
    }
}

/// 容差類映射：物件 → 與其容差的物件集合
///
/// 不變量：對稱（y∈T(x) ⟺ x∈T(y)）、自反（x∈T(x)）。
/// `Clone` 即值語義深拷貝，取代來源實作的反射式集合建構。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToleranceClasses {
    classes: BTreeMap<InstanceId, BTreeSet<InstanceId>>,
}

impl ToleranceClasses {
    /// 創建空映射
    pub fn new() -> Self {
        Self::default()
    }

    /// 條目個數
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// 檢查映射是否為空
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// 查詢物件的容差類
    pub fn class(&self, id: InstanceId) -> Option<&BTreeSet<InstanceId>> {
        self.classes.get(&id)
    }

    /// 查詢物件的容差類（條目缺失即結構錯誤）
    pub fn expect_class(&self, id: InstanceId) -> Result<&BTreeSet<InstanceId>> {
        self.classes
            .get(&id)
            .ok_or(ReductError::MissingToleranceEntry(id))
    }

    /// 檢查配對是否存在
    pub fn contains_pair(&self, a: InstanceId, b: InstanceId) -> bool {
        self.classes.get(&a).is_some_and(|class| class.contains(&b))
    }

    /// 條目（依物件ID遞增順序）
    pub fn iter(&self) -> impl Iterator<Item = (InstanceId, &BTreeSet<InstanceId>)> {
        self.classes.iter().map(|(&id, class)| (id, class))
    }

    /// 具有條目的物件ID
    pub fn ids(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.classes.keys().copied()
    }

    /// 確保物件條目存在且包含自身
    pub fn ensure_reflexive(&mut self, id: InstanceId) {
        self.classes
            .entry(id)
            .or_insert_with(BTreeSet::new)
            .insert(id);
    }

    /// 對稱插入：雙方條目以自身惰性初始化後互相加入
    ///
    /// 每一對確認容差的物件都必須經由此操作收錄。
    pub fn insert_symmetric(&mut self, a: InstanceId, b: InstanceId) {
        self.classes
            .entry(a)
            .or_insert_with(|| BTreeSet::from([a]))
            .insert(b);
        self.classes
            .entry(b)
            .or_insert_with(|| BTreeSet::from([b]))
            .insert(a);
    }

    /// 對稱移除
    ///
    /// 條目尚不存在時先初始化為空集合再移除，不得出錯。
    pub fn remove_symmetric(&mut self, a: InstanceId, b: InstanceId) {
        self.classes.entry(a).or_default().remove(&b);
        self.classes.entry(b).or_default().remove(&a);
    }

    /// 類重設為僅含自身
    pub fn reset_to_self(&mut self, id: InstanceId) {
        self.classes.insert(id, BTreeSet::from([id]));
    }

    /// 覆寫物件的整個容差類
    pub fn insert_class(&mut self, id: InstanceId, class: BTreeSet<InstanceId>) {
        self.classes.insert(id, class);
    }

    /// 刪除物件的條目
    pub fn drop_entry(&mut self, id: InstanceId) {
        self.classes.remove(&id);
    }

    /// 自所有類中剔除指定成員
    pub fn strip_members(&mut self, members: &BTreeSet<InstanceId>) {
        for class in self.classes.values_mut() {
            for member in members {
                class.remove(member);
            }
        }
    }

    /// 同一性重映射：所有物件參照改寫為其最新ID（保持成員關係）
    pub fn remap(&self, identity: &IdentityMap) -> ToleranceClasses {
        if identity.is_identity() {
            return self.clone();
        }
        let mut remapped = ToleranceClasses::new();
        for (&id, class) in &self.classes {
            remapped.classes.insert(
                identity.latest_of(id),
                class.iter().map(|&member| identity.latest_of(member)).collect(),
            );
        }
        remapped
    }

    /// 驗證映射涵蓋整個論域
    ///
    /// 增量更新假定前回合映射對論域是全函數；違反即快速失敗。
    pub fn expect_entries_for(&self, universe: &Universe) -> Result<()> {
        for id in universe.ids() {
            if !self.classes.contains_key(&id) {
                return Err(ReductError::MissingToleranceEntry(id));
            }
        }
        Ok(())
    }

    /// 對稱性檢查
    pub fn is_symmetric(&self) -> bool {
        self.classes.iter().all(|(&id, class)| {
            class
                .iter()
                .all(|member| self.contains_pair(*member, id))
        })
    }

    /// 自反性檢查
    pub fn is_reflexive(&self) -> bool {
        self.classes.iter().all(|(id, class)| class.contains(id))
    }

    /// 檢查是否逐類皆為另一映射的子集
    pub fn is_subset_of(&self, other: &ToleranceClasses) -> bool {
        self.classes.iter().all(|(&id, class)| {
            other
                .class(id)
                .is_some_and(|other_class| class.is_subset(other_class))
        })
    }
}
