//! 論域模型

use crate::attribute::{condition_set, Attribute, AttributeSet};
use crate::instance::{AttributeValue, Instance, InstanceId};
use crate::{ReductError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 論域：以穩定物件ID為鍵的物件競技場
///
/// 物件ID跨回合穩定；同一物件的新版本藉由 [`IdentityMap`] 間接對照，
/// 不依賴物件的記憶體同一性。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Universe {
    /// 條件屬性個數（全論域一致）
    width: usize,
    instances: BTreeMap<InstanceId, Instance>,
}

impl Universe {
    /// 創建空的論域
    pub fn new(width: usize) -> Self {
        Self {
            width,
            instances: BTreeMap::new(),
        }
    }

    /// 由物件序列建立論域
    pub fn from_instances<I>(width: usize, instances: I) -> Result<Self>
    where
        I: IntoIterator<Item = Instance>,
    {
        let mut universe = Self::new(width);
        for instance in instances {
            universe.insert(instance)?;
        }
        Ok(universe)
    }

    /// 插入物件
    ///
    /// 條件屬性寬度不一致或物件ID重複皆視為資料錯誤。
    pub fn insert(&mut self, instance: Instance) -> Result<()> {
        if instance.condition_count() != self.width {
            return Err(ReductError::ConditionWidthMismatch {
                expected: self.width,
                actual: instance.condition_count(),
            });
        }
        if self.instances.contains_key(&instance.id) {
            return Err(ReductError::DuplicateInstance(instance.id));
        }
        self.instances.insert(instance.id, instance);
        Ok(())
    }

    /// 移除物件
    pub fn remove(&mut self, id: InstanceId) -> Result<Instance> {
        self.instances
            .remove(&id)
            .ok_or(ReductError::UnknownInstance(id))
    }

    /// 查詢物件
    pub fn get(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(&id)
    }

    /// 查詢物件（缺失即錯誤）
    pub fn expect_instance(&self, id: InstanceId) -> Result<&Instance> {
        self.instances
            .get(&id)
            .ok_or(ReductError::UnknownInstance(id))
    }

    /// 就地改寫單一屬性值，回傳舊值
    pub fn set_value(
        &mut self,
        id: InstanceId,
        attr: Attribute,
        value: AttributeValue,
    ) -> Result<AttributeValue> {
        let width = self.width;
        let instance = self
            .instances
            .get_mut(&id)
            .ok_or(ReductError::UnknownInstance(id))?;
        match attr {
            Attribute::Decision => Ok(std::mem::replace(&mut instance.decision, value)),
            Attribute::Condition(idx) => {
                if idx as usize >= width {
                    return Err(ReductError::ConditionIndexOutOfRange(idx));
                }
                Ok(std::mem::replace(
                    &mut instance.conditions[idx as usize],
                    value,
                ))
            }
        }
    }

    /// 檢查物件是否存在
    pub fn contains(&self, id: InstanceId) -> bool {
        self.instances.contains_key(&id)
    }

    /// 物件ID（依ID遞增順序）
    pub fn ids(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.instances.keys().copied()
    }

    /// 物件（依ID遞增順序）
    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.instances.values()
    }

    /// 物件個數
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// 檢查論域是否為空
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// 條件屬性個數
    pub fn width(&self) -> usize {
        self.width
    }

    /// 全部條件屬性
    pub fn condition_attributes(&self) -> AttributeSet {
        condition_set(0..self.width as u32)
    }
}

/// 同一性對照表：前回合物件ID → 最新物件ID
///
/// 全函數：未記錄的ID即為其自身，使「某物件的最新版本」查詢總是有解。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityMap {
    latest: BTreeMap<InstanceId, InstanceId>,
}

impl IdentityMap {
    /// 創建恆等對照表
    pub fn new() -> Self {
        Self::default()
    }

    /// 記錄前回合ID由最新ID接替
    pub fn record(&mut self, previous: InstanceId, latest: InstanceId) {
        if previous != latest {
            self.latest.insert(previous, latest);
        }
    }

    /// 查詢最新ID（未記錄者即其自身；接替鏈會被追到底）
    pub fn latest_of(&self, id: InstanceId) -> InstanceId {
        let mut current = id;
        // 接替鏈長度受對照表大小限制
        for _ in 0..=self.latest.len() {
            match self.latest.get(&current) {
                Some(&next) => current = next,
                None => break,
            }
        }
        current
    }

    /// 檢查是否為恆等對照（無任何接替記錄）
    pub fn is_identity(&self) -> bool {
        self.latest.is_empty()
    }

    /// 已被接替的前回合ID
    pub fn superseded_ids(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.latest.keys().copied()
    }
}
