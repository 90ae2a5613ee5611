//! 約簡搜尋操作

use crate::obtainer::ToleranceClassObtainer;
use crate::significance::{Significance, SignificanceMeasure};
use reduct_core::attribute::difference;
use reduct_core::{
    Attribute, AttributeSet, InstanceId, ReductError, Result, ToleranceRelation, Universe,
};
use std::collections::BTreeMap;

/// 約簡搜尋計算器
///
/// 核屬性、最顯著屬性、約簡重整／擴張／檢視等搜尋操作，
/// 皆以注入的取得器與顯著度策略為參數。
pub struct ReductSearch;

impl ReductSearch {
    /// 計算屬性集合的顯著度（B 與 B∪決策的映射成對從頭取得）
    pub fn significance_of(
        universe: &Universe,
        attrs: &AttributeSet,
        obtainer: &dyn ToleranceClassObtainer,
        measure: &dyn SignificanceMeasure,
    ) -> Result<Significance> {
        let ids: Vec<InstanceId> = universe.ids().collect();
        let cache = obtainer.cache_instance_groups(universe, attrs);
        let plain = obtainer.obtain(&ids, &ids, attrs, universe, &cache)?;
        let with_decision = ToleranceRelation::decision_filtered(&plain, universe)?;
        measure.calculate(&plain, &with_decision)
    }

    /// 逐一檢查變更屬性以重整約簡
    ///
    /// 每一變更屬性比較其單屬性顯著度在前回合論域與最新論域上的
    /// 高下：在簡中且未見改善（偏差內）者剔除；不在簡中而重要性
    /// 上升者納入。
    pub fn reinitialize(
        previous_universe: &Universe,
        latest_universe: &Universe,
        previous_reduct: &AttributeSet,
        altered: &AttributeSet,
        obtainer: &dyn ToleranceClassObtainer,
        measure: &dyn SignificanceMeasure,
        deviation: Significance,
    ) -> Result<AttributeSet> {
        let mut reduct = previous_reduct.clone();
        for &attr in altered {
            if attr.is_decision() {
                continue;
            }
            let singleton = AttributeSet::from([attr]);
            let previous_sig =
                Self::significance_of(previous_universe, &singleton, obtainer, measure)?;
            let latest_sig = Self::significance_of(latest_universe, &singleton, obtainer, measure)?;
            let improved = measure.value1_is_better(latest_sig, previous_sig, deviation);
            if reduct.contains(&attr) {
                if !improved {
                    reduct.remove(&attr);
                }
            } else if improved {
                reduct.insert(attr);
            }
        }
        Ok(reduct)
    }

    /// 核屬性：旋轉式單屬性剔除窗口
    ///
    /// 一趟掃描求出每一被排除配對的阻擋屬性（至多記到兩個即可），
    /// 各窗口把唯一阻擋屬性為其自身的配對補回全集容差類；全集顯著度
    /// 嚴格優於窗口顯著度（超出偏差）者即核屬性。
    pub fn core(
        universe: &Universe,
        obtainer: &dyn ToleranceClassObtainer,
        measure: &dyn SignificanceMeasure,
        deviation: Significance,
    ) -> Result<AttributeSet> {
        let conditions = universe.condition_attributes();
        let ids: Vec<InstanceId> = universe.ids().collect();
        let cache = obtainer.cache_instance_groups(universe, &conditions);
        let full = obtainer.obtain(&ids, &ids, &conditions, universe, &cache)?;
        let full_with_decision = ToleranceRelation::decision_filtered(&full, universe)?;
        let global = measure.calculate(&full, &full_with_decision)?;

        // 逐對找出唯一阻擋屬性；阻擋屬性多於一個的配對不屬於任何窗口
        let mut sole_blocker: BTreeMap<Attribute, Vec<(InstanceId, InstanceId)>> = BTreeMap::new();
        for (pos, &x) in ids.iter().enumerate() {
            let x_instance = universe.expect_instance(x)?;
            for &y in &ids[pos + 1..] {
                let y_instance = universe.expect_instance(y)?;
                let mut blockers = conditions.iter().filter(|&&attr| {
                    !x_instance.value(attr).tolerates(&y_instance.value(attr))
                });
                if let (Some(&sole), None) = (blockers.next(), blockers.next()) {
                    sole_blocker.entry(sole).or_default().push((x, y));
                }
            }
        }

        let mut core = AttributeSet::new();
        for &attr in &conditions {
            // 窗口 = 全集容差類 ∪ 僅因該屬性被排除的配對
            let mut window = full.clone();
            if let Some(pairs) = sole_blocker.get(&attr) {
                for &(x, y) in pairs {
                    window.insert_symmetric(x, y);
                }
            }
            let window_with_decision = ToleranceRelation::decision_filtered(&window, universe)?;
            let without = measure.calculate(&window, &window_with_decision)?;
            if measure.value1_is_better(global, without, deviation) {
                core.insert(attr);
            }
        }
        Ok(core)
    }

    /// 最顯著屬性：線性掃描約簡之外的條件屬性
    ///
    /// 取 sig(約簡∪{a}) 最大者；平手由迭代順序中首個嚴格更優者勝出。
    /// 無候選屬性屬約簡狀態不一致，快速失敗。
    pub fn most_significant_attribute(
        universe: &Universe,
        reduct: &AttributeSet,
        obtainer: &dyn ToleranceClassObtainer,
        measure: &dyn SignificanceMeasure,
    ) -> Result<(Attribute, Significance)> {
        let candidates = difference(&universe.condition_attributes(), reduct);
        if candidates.is_empty() {
            return Err(ReductError::NoCandidateAttribute);
        }
        let mut best: Option<(Attribute, Significance)> = None;
        for &attr in &candidates {
            let mut extended = reduct.clone();
            extended.insert(attr);
            let significance = Self::significance_of(universe, &extended, obtainer, measure)?;
            match best {
                Some((_, best_sig))
                    if !measure.value1_is_better(significance, best_sig, Significance::ZERO) => {}
                _ => best = Some((attr, significance)),
            }
        }
        best.ok_or(ReductError::NoCandidateAttribute)
    }

    /// 檢視：依序試移除約簡屬性，剔除冗餘者
    ///
    /// 以進場時的屬性快照為序逐一試移除；移除後顯著度仍在進場顯著度
    /// 的偏差內者維持移除，否則還原。結果與移除順序相關。
    pub fn inspection(
        universe: &Universe,
        reduct: &AttributeSet,
        obtainer: &dyn ToleranceClassObtainer,
        measure: &dyn SignificanceMeasure,
        deviation: Significance,
    ) -> Result<AttributeSet> {
        let entry_sig = Self::significance_of(universe, reduct, obtainer, measure)?;
        let mut working = reduct.clone();
        for &attr in reduct {
            working.remove(&attr);
            let significance = Self::significance_of(universe, &working, obtainer, measure)?;
            if measure.value1_is_better(entry_sig, significance, deviation) {
                // 顯著度變差，還原
                working.insert(attr);
            }
        }
        Ok(working)
    }

    /// 擴張：反覆加入最顯著屬性，直到約簡顯著度貼齊全域顯著度
    pub fn seek(
        universe: &Universe,
        initial: &AttributeSet,
        global: Significance,
        obtainer: &dyn ToleranceClassObtainer,
        measure: &dyn SignificanceMeasure,
        deviation: Significance,
    ) -> Result<(AttributeSet, Significance)> {
        let mut reduct = initial.clone();
        let mut significance = Self::significance_of(universe, &reduct, obtainer, measure)?;
        while measure.value1_is_better(global, significance, deviation) {
            let (attr, extended_sig) =
                Self::most_significant_attribute(universe, &reduct, obtainer, measure)?;
            tracing::debug!("擴張約簡：納入 {}，顯著度 {}", attr, extended_sig);
            reduct.insert(attr);
            significance = extended_sig;
        }
        Ok((reduct, significance))
    }
}
