//! 屬性相關增量更新

use reduct_core::attribute::{difference, intersection};
use reduct_core::{
    AttributeChanges, AttributeSet, InstanceId, ReductError, Result, ToleranceClasses,
    ToleranceRelation, Universe,
};

/// 屬性相關更新計算器
///
/// 將前回合於屬性集合 B 下有效的容差類，轉換為屬性值變更後的
/// 容差類，毋須從頭重算。
pub struct AttributeUpdateCalculator;

impl AttributeUpdateCalculator {
    /// 執行屬性相關更新
    ///
    /// 先於未變更屬性子集上補測先前被排除的配對，重建 B 減變更屬性
    /// 下的中介容差類；再以變更後的值於變更屬性上覆核每一配對，
    /// 不再容差者對稱移除（移除而非聯集，決策記錄見 DESIGN.md）。
    pub fn apply(
        previous: &ToleranceClasses,
        attrs: &AttributeSet,
        changes: &AttributeChanges,
        universe: &Universe,
    ) -> Result<ToleranceClasses> {
        let altered = intersection(changes.altered(), attrs);

        // 快速路徑：B 中無屬性被變更，容差類原樣沿用
        if altered.is_empty() {
            return Ok(previous.clone());
        }

        // 結構前置條件：沿用未變更子集必須落在本映射的屬性集合內
        if !changes.selected_unaltered().is_subset(attrs) {
            return Err(ReductError::AttributePrecondition(format!(
                "沿用未變更屬性子集超出更新屬性集合: {:?}",
                difference(changes.selected_unaltered(), attrs)
            )));
        }
        previous.expect_entries_for(universe)?;

        let unaltered = difference(attrs, &altered);
        let mut working = previous.clone();
        let ids: Vec<InstanceId> = universe.ids().collect();

        // (i) 先前僅因變更屬性而被排除的配對，於未變更子集上補測後
        //     對稱收錄，重建 B−C_ALT 下的中介容差類
        for (pos, &x) in ids.iter().enumerate() {
            let x_instance = universe.expect_instance(x)?;
            for &y in &ids[pos + 1..] {
                if working.contains_pair(x, y) {
                    continue;
                }
                let y_instance = universe.expect_instance(y)?;
                if ToleranceRelation::holds(x_instance, y_instance, &unaltered) {
                    working.insert_symmetric(x, y);
                }
            }
        }

        // (ii) 以變更後的值於變更屬性上覆核既有配對，失效者對稱移除
        let pairs: Vec<(InstanceId, InstanceId)> = working
            .iter()
            .flat_map(|(x, class)| {
                class
                    .iter()
                    .copied()
                    .filter(move |&y| y > x)
                    .map(move |y| (x, y))
            })
            .collect();
        for (x, y) in pairs {
            let x_instance = universe.expect_instance(x)?;
            let y_instance = universe.expect_instance(y)?;
            if !ToleranceRelation::holds(x_instance, y_instance, &altered) {
                working.remove_symmetric(x, y);
            }
        }

        Ok(working)
    }
}
