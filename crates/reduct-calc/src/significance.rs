//! 顯著度量測

use reduct_core::{Result, ToleranceClasses};
use rust_decimal::Decimal;

/// 顯著度值
pub type Significance = Decimal;

/// 顯著度策略
///
/// 由一對容差類映射（屬性集合 B 與 B∪決策）計算顯著度，並提供
/// 帶偏差的優劣比較與逐部分貢獻的累加。
pub trait SignificanceMeasure {
    /// 計算顯著度
    fn calculate(
        &self,
        plain: &ToleranceClasses,
        with_decision: &ToleranceClasses,
    ) -> Result<Significance>;

    /// 帶偏差比較：`value1` 是否嚴格優於 `value2`
    fn value1_is_better(
        &self,
        value1: Significance,
        value2: Significance,
        deviation: Significance,
    ) -> bool {
        value1 - value2 > deviation
    }

    /// 顯著度貢獻累加
    fn plus(&self, lhs: Significance, rhs: Significance) -> Significance {
        lhs + rhs
    }
}

/// 正域顯著度
///
/// 物件在 B 下的容差類與 B∪決策下的容差類相等者屬正域（決策一致）；
/// 顯著度為正域物件佔論域的比例。正域物件數以 `plus` 逐一累加後
/// 作單次除法，避免逐份額相除的精度流失。
#[derive(Debug, Clone, Copy, Default)]
pub struct PositiveRegionSignificance;

impl SignificanceMeasure for PositiveRegionSignificance {
    fn calculate(
        &self,
        plain: &ToleranceClasses,
        with_decision: &ToleranceClasses,
    ) -> Result<Significance> {
        if plain.is_empty() {
            return Ok(Decimal::ZERO);
        }
        let mut consistent = Decimal::ZERO;
        for (id, class) in plain.iter() {
            let filtered = with_decision.expect_class(id)?;
            if class == filtered {
                consistent = self.plus(consistent, Decimal::ONE);
            }
        }
        Ok(consistent / Decimal::from(plain.len() as u64))
    }
}
