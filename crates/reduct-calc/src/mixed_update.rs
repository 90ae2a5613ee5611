//! 屬性與物件同時相關的增量更新

use reduct_core::attribute::{difference, intersection};
use reduct_core::{
    AttributeSet, ChangeBatch, ChangeKind, InstanceId, Result, ToleranceClasses,
    ToleranceRelation,
};
use std::collections::BTreeSet;

/// 混合更新計算器
///
/// 同一批次內既有屬性值就地改寫、又有物件插入／移除／接替時，
/// 將前回合的容差類轉換為變更後論域的容差類。
pub struct MixedUpdateCalculator;

impl MixedUpdateCalculator {
    /// 執行混合更新
    ///
    /// 變更屬性與本映射屬性集合無交集、且物件變更僅為集合之外的值
    /// 改寫時，前回合的類經同一性重映射後原樣有效（快速路徑）。
    /// 否則初始化同物件相關更新；變更物件的候選夥伴先於穩定屬性
    /// 子集（B 減全部變更屬性）上取得，再以變更後的值於變更屬性上
    /// 確認，獲確認者對稱收錄，未獲確認的候選逕行捨棄。
    pub fn apply(
        previous: &ToleranceClasses,
        attrs: &AttributeSet,
        batch: &ChangeBatch,
    ) -> Result<ToleranceClasses> {
        previous.expect_entries_for(batch.previous().universe())?;

        let universe = batch.universe();
        let all_altered = batch.attribute_changes().altered();
        let moving = intersection(all_altered, attrs);

        // 快速路徑：本映射不受任何值變更影響，僅需同一性重映射
        let only_value_alterations = batch
            .instance_changes()
            .iter()
            .all(|change| change.kind == ChangeKind::ValueAltered);
        if moving.is_empty() && only_value_alterations && batch.deltas_avoid(attrs) {
            return Ok(previous.remap(batch.identity()));
        }

        // 初始化同物件相關更新
        let retired = batch.retired_ids();
        let altered = batch.altered_ids();
        let mut working = previous.clone();
        for &id in &retired {
            working.drop_entry(id);
        }
        let stripped: BTreeSet<InstanceId> =
            retired.iter().chain(altered.iter()).copied().collect();
        working.strip_members(&stripped);
        for &id in &altered {
            working.reset_to_self(id);
        }

        // 候選於穩定屬性子集上取得，再於變更屬性上以新值確認
        let stable = difference(attrs, all_altered);
        for &id in &altered {
            let instance = universe.expect_instance(id)?;
            for candidate in universe.ids() {
                if candidate == id || working.contains_pair(id, candidate) {
                    continue;
                }
                let partner = universe.expect_instance(candidate)?;
                if !ToleranceRelation::holds(instance, partner, &stable) {
                    continue;
                }
                if ToleranceRelation::holds(instance, partner, &moving) {
                    working.insert_symmetric(id, candidate);
                }
                // 未獲確認的候選逕行捨棄
            }
        }

        Ok(working.remap(batch.identity()))
    }
}
