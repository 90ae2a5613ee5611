//! 分組快取取得器

use reduct_calc::{InstanceGroupCache, ToleranceClassObtainer};
use reduct_core::{
    AttributeSet, InstanceId, Result, ToleranceClasses, ToleranceRelation, Universe,
};
use std::collections::BTreeSet;

/// 分組快取取得器
///
/// 以預建的物件分組快取省去逐屬性比對：同簽章群組整組互相收錄；
/// 異簽章的完整物件必有已知值不一致，不經比對即排除；萬用物件
/// （含缺失值）仍與候選逐對測試。
///
/// 快取必須以與呼叫相同的論域與屬性集合預建，結果方與逐對掃描
/// 一致。
#[derive(Debug, Clone, Copy, Default)]
pub struct CachedClassObtainer;

impl ToleranceClassObtainer for CachedClassObtainer {
    fn obtain(
        &self,
        targets: &[InstanceId],
        candidates: &[InstanceId],
        attrs: &AttributeSet,
        universe: &Universe,
        cache: &InstanceGroupCache,
    ) -> Result<ToleranceClasses> {
        let candidate_set: BTreeSet<InstanceId> = candidates.iter().copied().collect();
        let wildcard_set: BTreeSet<InstanceId> = cache.wildcards().iter().copied().collect();
        let mut classes = ToleranceClasses::new();

        for &target in targets {
            let instance = universe.expect_instance(target)?;
            let mut class = BTreeSet::new();

            if wildcard_set.contains(&target) {
                // 萬用物件：逐對測試全部候選
                for &candidate in candidates {
                    let partner = universe.expect_instance(candidate)?;
                    if ToleranceRelation::holds(instance, partner, attrs) {
                        class.insert(candidate);
                    }
                }
            } else {
                // 完整物件：同簽章群組整組收錄
                if let Some(group) = cache.group_of(instance, attrs) {
                    class.extend(group.iter().copied().filter(|id| candidate_set.contains(id)));
                }
                // 萬用候選仍需逐對測試
                for &wildcard in cache.wildcards() {
                    if !candidate_set.contains(&wildcard) {
                        continue;
                    }
                    let partner = universe.expect_instance(wildcard)?;
                    if ToleranceRelation::holds(instance, partner, attrs) {
                        class.insert(wildcard);
                    }
                }
            }

            classes.insert_class(target, class);
        }
        Ok(classes)
    }
}
