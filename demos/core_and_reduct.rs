//! 核屬性與約簡檢視示範
//!
//! 執行：cargo run --example core_and_reduct

use reduct::attribute::condition_set;
use reduct::{
    CachedClassObtainer, Instance, PositiveRegionSignificance, ReductSearch, Universe,
};
use rust_decimal::Decimal;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

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
    let deviation = Decimal::ZERO;

    // 核屬性：剔除後顯著度嚴格變差的屬性
    let core = ReductSearch::core(&universe, &obtainer, &measure, deviation)?;
    println!("核屬性: {:?}", core);

    // 以核為起點擴張至與全集同力
    let global = ReductSearch::significance_of(
        &universe,
        &universe.condition_attributes(),
        &obtainer,
        &measure,
    )?;
    let (reduct, significance) =
        ReductSearch::seek(&universe, &core, global, &obtainer, &measure, deviation)?;
    println!("擴張後約簡: {:?}（顯著度 {}）", reduct, significance);

    // 檢視：自人為膨脹的屬性集剔除冗餘屬性
    let inspected = ReductSearch::inspection(
        &universe,
        &condition_set([0, 1, 2]),
        &obtainer,
        &measure,
        deviation,
    )?;
    println!("檢視全屬性集後: {:?}", inspected);

    Ok(())
}
