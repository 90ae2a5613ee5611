//! 容差類取得器

use reduct_core::{
    AttributeSet, AttributeValue, Instance, InstanceId, Result, ToleranceClasses,
    ToleranceRelation, Universe,
};
use std::collections::{BTreeMap, BTreeSet};

/// 物件分組快取
///
/// 在指定屬性集合下，值完整的物件依值簽章分組；含缺失值的物件個別
/// 列為萬用物件。同簽章物件彼此必然容差，異簽章的完整物件必然不
/// 容差，取得器可藉此省去逐屬性比對。
#[derive(Debug, Clone, Default)]
pub struct InstanceGroupCache {
    groups: BTreeMap<Vec<AttributeValue>, Vec<InstanceId>>,
    wildcards: Vec<InstanceId>,
}

impl InstanceGroupCache {
    /// 依屬性集合對論域物件分組
    pub fn build(universe: &Universe, attrs: &AttributeSet) -> Self {
        let mut cache = Self::default();
        for instance in universe.instances() {
            match Self::signature(instance, attrs) {
                Some(signature) => cache
                    .groups
                    .entry(signature)
                    .or_default()
                    .push(instance.id),
                None => cache.wildcards.push(instance.id),
            }
        }
        cache
    }

    /// 完整值簽章；任一屬性缺失即回傳 `None`
    fn signature(instance: &Instance, attrs: &AttributeSet) -> Option<Vec<AttributeValue>> {
        attrs
            .iter()
            .map(|&attr| {
                let value = instance.value(attr);
                (!value.is_missing()).then_some(value)
            })
            .collect()
    }

    /// 查詢某完整物件所屬的同簽章群組
    pub fn group_of(&self, instance: &Instance, attrs: &AttributeSet) -> Option<&[InstanceId]> {
        Self::signature(instance, attrs)
            .and_then(|signature| self.groups.get(&signature))
            .map(Vec::as_slice)
    }

    /// 含缺失值的萬用物件
    pub fn wildcards(&self) -> &[InstanceId] {
        &self.wildcards
    }

    /// 同簽章群組個數
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

/// 容差類取得器能力
///
/// 給定目標物件、候選物件、屬性集合與預建快取，回傳每一目標物件
/// 在候選範圍內的容差類。
pub trait ToleranceClassObtainer {
    /// 取得容差類
    fn obtain(
        &self,
        targets: &[InstanceId],
        candidates: &[InstanceId],
        attrs: &AttributeSet,
        universe: &Universe,
        cache: &InstanceGroupCache,
    ) -> Result<ToleranceClasses>;

    /// 預建物件分組快取
    fn cache_instance_groups(
        &self,
        universe: &Universe,
        attrs: &AttributeSet,
    ) -> InstanceGroupCache {
        InstanceGroupCache::build(universe, attrs)
    }

    /// 取得決策過濾後的容差類（逐類皆為未過濾結果的子集）
    fn obtain_with_decision(
        &self,
        targets: &[InstanceId],
        candidates: &[InstanceId],
        attrs: &AttributeSet,
        universe: &Universe,
        cache: &InstanceGroupCache,
    ) -> Result<ToleranceClasses> {
        let classes = self.obtain(targets, candidates, attrs, universe, cache)?;
        ToleranceRelation::decision_filtered(&classes, universe)
    }
}

/// 逐對掃描的直接取得器（不使用分組快取）
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectClassObtainer;

impl ToleranceClassObtainer for DirectClassObtainer {
    fn obtain(
        &self,
        targets: &[InstanceId],
        candidates: &[InstanceId],
        attrs: &AttributeSet,
        universe: &Universe,
        _cache: &InstanceGroupCache,
    ) -> Result<ToleranceClasses> {
        let mut classes = ToleranceClasses::new();
        for &target in targets {
            let instance = universe.expect_instance(target)?;
            let mut class = BTreeSet::new();
            for &candidate in candidates {
                let partner = universe.expect_instance(candidate)?;
                if ToleranceRelation::holds(instance, partner, attrs) {
                    class.insert(candidate);
                }
            }
            classes.insert_class(target, class);
        }
        Ok(classes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reduct_core::attribute::condition_set;
    use reduct_core::Instance;

    /// 五物件、三條件屬性、物件3於c1缺失、二元決策的測試論域
    fn sample_universe() -> Universe {
        Universe::from_instances(
            3,
            vec![
                Instance::from_codes(1, &[Some(1), Some(0), Some(1)], 0),
                Instance::from_codes(2, &[Some(1), Some(2), Some(2)], 0),
                Instance::from_codes(3, &[Some(1), None, Some(1)], 1),
                Instance::from_codes(4, &[Some(2), Some(1), Some(1)], 1),
                Instance::from_codes(5, &[Some(2), Some(1), Some(2)], 0),
            ],
        )
        .unwrap()
    }

    fn ids(universe: &Universe) -> Vec<InstanceId> {
        universe.ids().collect()
    }

    #[test]
    fn test_direct_obtain_full_attribute_set() {
        let universe = sample_universe();
        let attrs = condition_set([0, 1, 2]);
        let obtainer = DirectClassObtainer;
        let cache = obtainer.cache_instance_groups(&universe, &attrs);
        let ids = ids(&universe);

        let classes = obtainer
            .obtain(&ids, &ids, &attrs, &universe, &cache)
            .unwrap();

        // 僅 x1 與 x3 容差（c1 缺失彌合，其餘屬性相等）
        assert_eq!(
            classes.class(InstanceId(1)).unwrap(),
            &BTreeSet::from([InstanceId(1), InstanceId(3)])
        );
        assert_eq!(
            classes.class(InstanceId(3)).unwrap(),
            &BTreeSet::from([InstanceId(1), InstanceId(3)])
        );
        assert_eq!(
            classes.class(InstanceId(2)).unwrap(),
            &BTreeSet::from([InstanceId(2)])
        );
        assert!(classes.is_symmetric());
        assert!(classes.is_reflexive());
    }

    #[test]
    fn test_direct_obtain_subset_attributes() {
        let universe = sample_universe();
        let attrs = condition_set([0, 1]);
        let obtainer = DirectClassObtainer;
        let cache = obtainer.cache_instance_groups(&universe, &attrs);
        let ids = ids(&universe);

        let classes = obtainer
            .obtain(&ids, &ids, &attrs, &universe, &cache)
            .unwrap();

        // {c0,c1} 下 x3 的缺失值彌合 x1 與 x2，x4 與 x5 同值
        assert_eq!(
            classes.class(InstanceId(3)).unwrap(),
            &BTreeSet::from([InstanceId(1), InstanceId(2), InstanceId(3)])
        );
        assert_eq!(
            classes.class(InstanceId(4)).unwrap(),
            &BTreeSet::from([InstanceId(4), InstanceId(5)])
        );
    }

    #[test]
    fn test_obtain_with_decision_is_subset() {
        let universe = sample_universe();
        let attrs = condition_set([0, 1, 2]);
        let obtainer = DirectClassObtainer;
        let cache = obtainer.cache_instance_groups(&universe, &attrs);
        let ids = ids(&universe);

        let plain = obtainer
            .obtain(&ids, &ids, &attrs, &universe, &cache)
            .unwrap();
        let filtered = obtainer
            .obtain_with_decision(&ids, &ids, &attrs, &universe, &cache)
            .unwrap();

        assert!(filtered.is_subset_of(&plain));
        // x1 (d=0) 與 x3 (d=1) 決策不相容，過濾後各自獨立
        assert_eq!(
            filtered.class(InstanceId(1)).unwrap(),
            &BTreeSet::from([InstanceId(1)])
        );
    }

    #[test]
    fn test_cache_groups_and_wildcards() {
        let universe = sample_universe();
        let attrs = condition_set([0, 1, 2]);
        let cache = InstanceGroupCache::build(&universe, &attrs);

        // x3 於 c1 缺失，列為萬用物件；其餘四物件簽章皆異
        assert_eq!(cache.wildcards(), &[InstanceId(3)]);
        assert_eq!(cache.group_count(), 4);
    }
}
