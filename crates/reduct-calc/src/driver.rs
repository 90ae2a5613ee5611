//! 約簡維護驅動器

use crate::attribute_update::AttributeUpdateCalculator;
use crate::mixed_update::MixedUpdateCalculator;
use crate::object_update::ObjectUpdateCalculator;
use crate::obtainer::ToleranceClassObtainer;
use crate::reduct::ReductSearch;
use crate::significance::{Significance, SignificanceMeasure};
use crate::RoundResult;
use reduct_core::attribute::with_decision;
use reduct_core::{
    AttributeSet, ChangeBatch, InstanceId, Result, RoundSnapshot, ToleranceClasses,
    ToleranceRelation, UpdateKind, Universe,
};

/// 單一屬性集合的顯著度更新結果
#[derive(Debug, Clone)]
pub struct SignificanceUpdate {
    /// 屬性集合下的容差類
    pub classes: ToleranceClasses,

    /// 屬性集合聯集決策下的容差類
    pub classes_with_decision: ToleranceClasses,

    /// 由兩張映射算得的顯著度
    pub significance: Significance,
}

/// 約簡維護驅動器
///
/// 注入容差類取得器與顯著度策略，跨回合驅動增量更新、顯著度重算
/// 與約簡的重整／擴張／檢視。
pub struct ReductMaintainer<'a> {
    obtainer: &'a dyn ToleranceClassObtainer,
    measure: &'a dyn SignificanceMeasure,
    deviation: Significance,
}

impl<'a> ReductMaintainer<'a> {
    /// 創建新的驅動器
    pub fn new(
        obtainer: &'a dyn ToleranceClassObtainer,
        measure: &'a dyn SignificanceMeasure,
        deviation: Significance,
    ) -> Self {
        Self {
            obtainer,
            measure,
            deviation,
        }
    }

    /// 偏差容許值
    pub fn deviation(&self) -> Significance {
        self.deviation
    }

    /// 由穩定論域與約簡建立初始快照（四張映射從頭計算）
    pub fn bootstrap(&self, universe: Universe, reduct: AttributeSet) -> Result<RoundSnapshot> {
        let conditions = universe.condition_attributes();
        let (by_reduct, by_reduct_d) = self.obtain_pair(&universe, &reduct)?;
        let (by_conditions, by_conditions_d) = self.obtain_pair(&universe, &conditions)?;
        Ok(RoundSnapshot::new(
            universe,
            reduct,
            by_reduct,
            by_reduct_d,
            by_conditions,
            by_conditions_d,
        ))
    }

    /// 屬性相關變更的顯著度更新
    pub fn update_significance_for_attribute_related(
        &self,
        batch: &ChangeBatch,
    ) -> Result<SignificanceUpdate> {
        self.update_significance(batch, UpdateKind::AttributeRelated)
    }

    /// 物件相關變更的顯著度更新
    pub fn update_significance_for_object_related(
        &self,
        batch: &ChangeBatch,
    ) -> Result<SignificanceUpdate> {
        self.update_significance(batch, UpdateKind::ObjectRelated)
    }

    /// 屬性與物件同時變更的顯著度更新
    pub fn update_significance_for_both_related(
        &self,
        batch: &ChangeBatch,
    ) -> Result<SignificanceUpdate> {
        self.update_significance(batch, UpdateKind::BothRelated)
    }

    /// 核屬性
    pub fn core(&self, universe: &Universe) -> Result<AttributeSet> {
        ReductSearch::core(universe, self.obtainer, self.measure, self.deviation)
    }

    /// 執行完整動態回合
    ///
    /// 狀態機：更新容差類 → 重算顯著度 → 重整約簡 → 擴張 → 檢視 →
    /// 產生新一輪快照。批次於回合結束後銷毀。
    pub fn run_round(&self, batch: ChangeBatch) -> Result<RoundResult> {
        let kind = batch.update_kind();
        tracing::info!(
            "開始動態回合：批次 {}，變更種類 {:?}，論域 {} 個物件",
            batch.id(),
            kind,
            batch.universe().len()
        );
        let start_time = std::time::Instant::now();

        // Step 1: 更新容差類（約簡與全條件屬性各一對映射）
        tracing::debug!("Step 1: 更新容差類");
        let previous = batch.previous();
        let reduct_attrs = previous.reduct().clone();
        let condition_attrs = previous.universe().condition_attributes();
        let (by_reduct, by_reduct_d) = self.update_pair(
            &batch,
            &reduct_attrs,
            previous.by_reduct(),
            previous.by_reduct_with_decision(),
            kind,
        )?;
        let (by_conditions, by_conditions_d) = self.update_pair(
            &batch,
            &condition_attrs,
            previous.by_conditions(),
            previous.by_conditions_with_decision(),
            kind,
        )?;

        // Step 2: 重算顯著度
        tracing::debug!("Step 2: 重算顯著度");
        let reduct_sig = self.measure.calculate(&by_reduct, &by_reduct_d)?;
        let global_sig = self.measure.calculate(&by_conditions, &by_conditions_d)?;
        tracing::debug!("約簡顯著度 {}，全域顯著度 {}", reduct_sig, global_sig);

        // Step 3: 逐一檢查變更屬性以重整約簡
        tracing::debug!("Step 3: 重整約簡");
        let reduct = ReductSearch::reinitialize(
            previous.universe(),
            batch.universe(),
            &reduct_attrs,
            batch.attribute_changes().altered(),
            self.obtainer,
            self.measure,
            self.deviation,
        )?;

        // Step 4: 擴張約簡直到顯著度貼齊全域
        tracing::debug!("Step 4: 擴張約簡");
        let (reduct, _) = ReductSearch::seek(
            batch.universe(),
            &reduct,
            global_sig,
            self.obtainer,
            self.measure,
            self.deviation,
        )?;

        // Step 5: 檢視並剔除冗餘屬性
        tracing::debug!("Step 5: 檢視約簡");
        let reduct = ReductSearch::inspection(
            batch.universe(),
            &reduct,
            self.obtainer,
            self.measure,
            self.deviation,
        )?;
        tracing::info!("本回合約簡: {:?}", reduct);

        // Step 6: 產生新一輪快照
        tracing::debug!("Step 6: 產生快照");
        let universe = batch.universe().clone();
        let (final_by_reduct, final_by_reduct_d) = if reduct == reduct_attrs {
            // 約簡未變，沿用增量更新結果
            (by_reduct, by_reduct_d)
        } else {
            self.obtain_pair(&universe, &reduct)?
        };
        let reduct_sig = self
            .measure
            .calculate(&final_by_reduct, &final_by_reduct_d)?;
        let snapshot = RoundSnapshot::new(
            universe,
            reduct,
            final_by_reduct,
            final_by_reduct_d,
            by_conditions,
            by_conditions_d,
        );

        tracing::info!("動態回合完成，耗時 {:?}", start_time.elapsed());
        Ok(RoundResult {
            snapshot,
            reduct_significance: reduct_sig,
            global_significance: global_sig,
            calculation_time_ms: Some(start_time.elapsed().as_millis()),
        })
    }

    /// 對前回合的約簡屬性集執行更新引擎兩次並量測顯著度
    fn update_significance(
        &self,
        batch: &ChangeBatch,
        kind: UpdateKind,
    ) -> Result<SignificanceUpdate> {
        let previous = batch.previous();
        let reduct = previous.reduct().clone();
        let (classes, classes_with_decision) = self.update_pair(
            batch,
            &reduct,
            previous.by_reduct(),
            previous.by_reduct_with_decision(),
            kind,
        )?;
        let significance = self.measure.calculate(&classes, &classes_with_decision)?;
        Ok(SignificanceUpdate {
            classes,
            classes_with_decision,
            significance,
        })
    }

    /// 依變更種類呼叫對應的更新引擎兩次：集合本身與集合聯集決策
    fn update_pair(
        &self,
        batch: &ChangeBatch,
        attrs: &AttributeSet,
        previous_plain: &ToleranceClasses,
        previous_with_decision: &ToleranceClasses,
        kind: UpdateKind,
    ) -> Result<(ToleranceClasses, ToleranceClasses)> {
        let attrs_with_decision = with_decision(attrs);
        match kind {
            UpdateKind::AttributeRelated => {
                let plain = AttributeUpdateCalculator::apply(
                    previous_plain,
                    attrs,
                    batch.attribute_changes(),
                    batch.universe(),
                )?;
                let with_d = AttributeUpdateCalculator::apply(
                    previous_with_decision,
                    &attrs_with_decision,
                    batch.attribute_changes(),
                    batch.universe(),
                )?;
                Ok((
                    plain.remap(batch.identity()),
                    with_d.remap(batch.identity()),
                ))
            }
            UpdateKind::ObjectRelated => {
                let plain = ObjectUpdateCalculator::apply(previous_plain, attrs, batch)?;
                let with_d = ObjectUpdateCalculator::apply(
                    previous_with_decision,
                    &attrs_with_decision,
                    batch,
                )?;
                Ok((plain, with_d))
            }
            UpdateKind::BothRelated => {
                let plain = MixedUpdateCalculator::apply(previous_plain, attrs, batch)?;
                let with_d = MixedUpdateCalculator::apply(
                    previous_with_decision,
                    &attrs_with_decision,
                    batch,
                )?;
                Ok((plain, with_d))
            }
        }
    }

    /// 從頭取得單一屬性集合的一對容差類映射
    fn obtain_pair(
        &self,
        universe: &Universe,
        attrs: &AttributeSet,
    ) -> Result<(ToleranceClasses, ToleranceClasses)> {
        let ids: Vec<InstanceId> = universe.ids().collect();
        let cache = self.obtainer.cache_instance_groups(universe, attrs);
        let plain = self.obtainer.obtain(&ids, &ids, attrs, universe, &cache)?;
        let with_decision = ToleranceRelation::decision_filtered(&plain, universe)?;
        Ok((plain, with_decision))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obtainer::DirectClassObtainer;
    use crate::significance::PositiveRegionSignificance;
    use reduct_core::attribute::condition_set;
    use reduct_core::{Attribute, AttributeValue, Instance};
    use rust_decimal::Decimal;

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

    #[test]
    fn test_bootstrap_builds_four_maps() {
        let obtainer = DirectClassObtainer;
        let measure = PositiveRegionSignificance;
        let maintainer = ReductMaintainer::new(&obtainer, &measure, Decimal::ZERO);

        let snapshot = maintainer
            .bootstrap(sample_universe(), condition_set([0, 2]))
            .unwrap();

        assert!(snapshot.by_reduct().is_symmetric());
        assert!(snapshot.by_reduct().is_reflexive());
        assert!(snapshot
            .by_reduct_with_decision()
            .is_subset_of(snapshot.by_reduct()));
        assert!(snapshot
            .by_conditions_with_decision()
            .is_subset_of(snapshot.by_conditions()));
    }

    #[test]
    fn test_update_significance_for_attribute_related() {
        let obtainer = DirectClassObtainer;
        let measure = PositiveRegionSignificance;
        let maintainer = ReductMaintainer::new(&obtainer, &measure, Decimal::ZERO);

        let snapshot = maintainer
            .bootstrap(sample_universe(), condition_set([0, 2]))
            .unwrap();
        let mut batch = ChangeBatch::new(snapshot);
        batch
            .alter_value(InstanceId(4), Attribute::Condition(0), AttributeValue::Coded(1))
            .unwrap();

        let update = maintainer
            .update_significance_for_attribute_related(&batch)
            .unwrap();

        // 與最新論域上的從頭計算一致
        let expected = ReductSearch::significance_of(
            batch.universe(),
            &condition_set([0, 2]),
            &obtainer,
            &measure,
        )
        .unwrap();
        assert_eq!(update.significance, expected);
        assert!(update
            .classes_with_decision
            .is_subset_of(&update.classes));
    }

    #[test]
    fn test_run_round_attribute_related_end_to_end() {
        let obtainer = DirectClassObtainer;
        let measure = PositiveRegionSignificance;
        let maintainer = ReductMaintainer::new(&obtainer, &measure, Decimal::ZERO);

        let snapshot = maintainer
            .bootstrap(sample_universe(), condition_set([0, 2]))
            .unwrap();
        let mut batch = ChangeBatch::new(snapshot);
        batch
            .alter_value(InstanceId(4), Attribute::Condition(1), AttributeValue::Coded(0))
            .unwrap();

        let result = maintainer.run_round(batch).unwrap();

        // 回合後約簡顯著度貼齊全域顯著度
        assert!(!measure.value1_is_better(
            result.global_significance,
            result.reduct_significance,
            Decimal::ZERO,
        ));
        // 新快照的四張映射維持不變量
        assert!(result.snapshot.by_reduct().is_symmetric());
        assert!(result.snapshot.by_conditions().is_reflexive());
        assert!(result
            .snapshot
            .by_reduct_with_decision()
            .is_subset_of(result.snapshot.by_reduct()));
        assert!(result.calculation_time_ms.is_some());
    }

    #[test]
    fn test_run_round_object_related_end_to_end() {
        let obtainer = DirectClassObtainer;
        let measure = PositiveRegionSignificance;
        let maintainer = ReductMaintainer::new(&obtainer, &measure, Decimal::ZERO);

        let snapshot = maintainer
            .bootstrap(sample_universe(), condition_set([0, 2]))
            .unwrap();
        let mut batch = ChangeBatch::new(snapshot);
        batch
            .insert_instance(Instance::from_codes(6, &[Some(1), Some(0), Some(3)], 1))
            .unwrap();

        let result = maintainer.run_round(batch).unwrap();

        assert_eq!(result.snapshot.universe().len(), 6);
        assert_eq!(
            result.global_significance,
            ReductSearch::significance_of(
                result.snapshot.universe(),
                &result.snapshot.universe().condition_attributes(),
                &obtainer,
                &measure,
            )
            .unwrap()
        );
        // 插入孤立物件後 {c0,c2} 仍與全集同力
        assert_eq!(result.snapshot.reduct(), &condition_set([0, 2]));
        assert_eq!(result.reduct_significance, result.global_significance);
    }
}
