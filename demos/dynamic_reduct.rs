//! 動態回合示範
//!
//! 建立一張含缺失值的小型決策表，先求初始約簡並建立快照，
//! 再套用一批屬性值變更與物件插入，執行完整動態回合。
//!
//! 執行：cargo run --example dynamic_reduct

use reduct::{
    Attribute, AttributeSet, AttributeValue, CachedClassObtainer, ChangeBatch, Instance,
    InstanceId, PositiveRegionSignificance, ReductMaintainer, ReductSearch, Universe,
};
use rust_decimal::Decimal;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // 1. 建立不完備決策表：五個物件、三個條件屬性、二元決策
    let universe = Universe::from_instances(
        3,
        vec![
            Instance::from_codes(1, &[Some(1), Some(0), Some(1)], 0),
            Instance::from_codes(2, &[Some(1), Some(2), Some(2)], 0),
            Instance::from_codes(3, &[Some(1), None, Some(1)], 1),
            Instance::from_codes(4, &[Some(2), Some(1), Some(1)], 1),
            Instance::from_codes(5, &[Some(2), Some(1), Some(2)], 0),
        ],
    )?;

    let obtainer = CachedClassObtainer;
    let measure = PositiveRegionSignificance;
    let maintainer = ReductMaintainer::new(&obtainer, &measure, Decimal::ZERO);

    // 2. 求初始約簡並建立穩定回合快照
    let global = ReductSearch::significance_of(
        &universe,
        &universe.condition_attributes(),
        &obtainer,
        &measure,
    )?;
    let (reduct, significance) = ReductSearch::seek(
        &universe,
        &AttributeSet::new(),
        global,
        &obtainer,
        &measure,
        Decimal::ZERO,
    )?;
    println!("初始約簡: {:?}（顯著度 {}，全域 {}）", reduct, significance, global);

    let snapshot = maintainer.bootstrap(universe, reduct)?;

    // 3. 套用一批變更：改寫物件4的屬性值並插入物件6
    let mut batch =
        ChangeBatch::new(snapshot).with_observed_at(chrono::Local::now().naive_local());
    batch.alter_value(
        InstanceId(4),
        Attribute::Condition(0),
        AttributeValue::Coded(1),
    )?;
    batch.insert_instance(Instance::from_codes(6, &[Some(1), None, Some(1)], 1))?;
    println!("變更批次 {}：種類 {:?}", batch.id(), batch.update_kind());

    // 4. 執行動態回合
    let result = maintainer.run_round(batch)?;
    println!("回合後約簡: {:?}", result.snapshot.reduct());
    println!(
        "約簡顯著度 {} / 全域顯著度 {}（耗時 {:?} ms）",
        result.reduct_significance,
        result.global_significance,
        result.calculation_time_ms.unwrap_or_default()
    );

    // 5. 輸出逐物件容差類摘要
    let summary = serde_json::json!({
        "round": result.snapshot.id(),
        "reduct": result.snapshot.reduct(),
        "classes_by_reduct": result.snapshot.by_reduct(),
        "significance": result.reduct_significance,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
