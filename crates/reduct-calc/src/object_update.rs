//! 物件相關增量更新

use reduct_core::{
    AttributeSet, ChangeBatch, InstanceId, Result, ToleranceClasses, ToleranceRelation,
};
use std::collections::BTreeSet;

/// 物件相關更新計算器
///
/// 物件插入、移除或由新版本接替後，將前回合的容差類轉換為
/// 變更後論域的容差類。
pub struct ObjectUpdateCalculator;

impl ObjectUpdateCalculator {
    /// 執行物件相關更新
    ///
    /// 卸下已移除與被接替物件的條目，將變更物件自未變更物件的類中
    /// 剔除並重設為僅含自身，再於完整屬性集合下對全論域重新測試
    /// 容差並成對收錄；最後套用同一性重映射。
    pub fn apply(
        previous: &ToleranceClasses,
        attrs: &AttributeSet,
        batch: &ChangeBatch,
    ) -> Result<ToleranceClasses> {
        previous.expect_entries_for(batch.previous().universe())?;

        let universe = batch.universe();
        let retired = batch.retired_ids();
        let altered = batch.altered_ids();
        let mut working = previous.clone();

        // 卸下已移除與被接替物件的條目
        for &id in &retired {
            working.drop_entry(id);
        }

        // 自未變更物件的類中剔除變更與移除的物件
        let stripped: BTreeSet<InstanceId> =
            retired.iter().chain(altered.iter()).copied().collect();
        working.strip_members(&stripped);

        // 變更物件的類重設為僅含自身
        for &id in &altered {
            working.reset_to_self(id);
        }

        // 於完整屬性集合下重新測試變更物件與論域成員的容差
        for &id in &altered {
            let instance = universe.expect_instance(id)?;
            for candidate in universe.ids() {
                if candidate == id || working.contains_pair(id, candidate) {
                    continue;
                }
                let partner = universe.expect_instance(candidate)?;
                if ToleranceRelation::holds(instance, partner, attrs) {
                    working.insert_symmetric(id, candidate);
                }
            }
        }

        // 同一性重映射：所有參照改寫為最新物件ID
        Ok(working.remap(batch.identity()))
    }
}
