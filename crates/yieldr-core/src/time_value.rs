use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::YieldrError;
use crate::types::{Money, Percent, Rate};
use crate::YieldrResult;

/// Convert an annual percentage rate to a per-period decimal rate.
pub fn periodic_rate(annual_percent: Percent, periods_per_year: u32) -> YieldrResult<Rate> {
    if periods_per_year == 0 {
        return Err(YieldrError::invalid(
            "frequency",
            "Periods per year must be > 0",
        ));
    }
    Ok(annual_percent / dec!(100) / Decimal::from(periods_per_year))
}

/// Compounding factors `(1 + rate)^t` for `t = 1..=periods`, built by
/// iterative multiplication.
///
/// Overflow surfaces as `NumericalInstability` rather than a wrapped value.
pub fn compound_factors(rate: Rate, periods: u32) -> YieldrResult<Vec<Decimal>> {
    let one_plus_r = Decimal::ONE
        .checked_add(rate)
        .ok_or_else(|| YieldrError::overflow(format!("compounding at rate {rate}")))?;
    if one_plus_r <= Decimal::ZERO {
        return Err(YieldrError::overflow(format!(
            "compounding at rate {rate}: 1 + r must be positive"
        )));
    }

    let mut factors = Vec::with_capacity(periods as usize);
    let mut factor = Decimal::ONE;
    for t in 1..=periods {
        factor = factor.checked_mul(one_plus_r).ok_or_else(|| {
            YieldrError::overflow(format!("compound factor overflow at period {t}"))
        })?;
        factors.push(factor);
    }
    Ok(factors)
}

/// Discount a single amount by a compounding factor.
pub fn present_value(amount: Money, factor: Decimal) -> YieldrResult<Money> {
    if factor.is_zero() {
        return Err(YieldrError::overflow("present value: zero compounding factor"));
    }
    amount
        .checked_div(factor)
        .ok_or_else(|| YieldrError::overflow("present value division"))
}
