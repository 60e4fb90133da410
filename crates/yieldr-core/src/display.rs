//! Presentation helpers layered over raw results.
//!
//! The calculators never round; these functions are where rounding happens,
//! so callers can swap them for their own policy.

use rust_decimal::{Decimal, RoundingStrategy};

#[cfg(feature = "fixed_income")]
use crate::fixed_income::bonds::{BondSpec, PriceStatus};
#[cfg(feature = "fixed_income")]
use crate::fixed_income::pricing::PriceResult;
use crate::types::{Money, Percent};

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// US dollar amount with thousands separators, e.g. `$1,044.91`.
pub fn format_currency(value: Money) -> String {
    let rounded = round2(value);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${}.{frac_part}", group_thousands(int_part))
}

/// Percentage with two decimals, e.g. `5.26%`. Input is already in percent.
pub fn format_percent(value: Percent) -> String {
    format!("{:.2}%", round2(value))
}

/// One-sentence explanation of why a priced bond sits where it does.
#[cfg(feature = "fixed_income")]
pub fn describe_price_status(
    status: PriceStatus,
    coupon_rate_percent: Percent,
    market_rate_percent: Percent,
) -> String {
    let coupon = format_percent(coupon_rate_percent);
    let market = format_percent(market_rate_percent);
    match status {
        PriceStatus::Premium => format!(
            "Bond is trading at a premium because the coupon rate ({coupon}) is higher than the market rate ({market})."
        ),
        PriceStatus::Discount => format!(
            "Bond is trading at a discount because the coupon rate ({coupon}) is lower than the market rate ({market})."
        ),
        PriceStatus::Par => format!(
            "Bond is trading at par because the coupon rate ({coupon}) equals the market rate ({market})."
        ),
    }
}

/// The pricing formula with this bond's values substituted in.
#[cfg(feature = "fixed_income")]
pub fn formula_explanation(spec: &BondSpec, result: &PriceResult) -> String {
    let n = result.periods_total;
    let periodic_market_percent = result.periodic_market_rate.saturating_mul(Decimal::ONE_HUNDRED);
    [
        "P = Σ[C / (1 + r)^t] + [F / (1 + r)^n]".to_string(),
        String::new(),
        "Where:".to_string(),
        "P = Bond price".to_string(),
        format!(
            "C = {} (periodic coupon payment)",
            format_currency(result.coupon_payment_per_period)
        ),
        format!(
            "r = {} (periodic market rate)",
            format_percent(periodic_market_percent)
        ),
        format!("F = {} (face value)", format_currency(spec.face_value)),
        format!("n = {n} (total number of periods)"),
        format!("t = period number (1 to {n})"),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(dec!(1044.9129)), "$1,044.91");
        assert_eq!(format_currency(dec!(25)), "$25.00");
        assert_eq!(format_currency(dec!(1234567.005)), "$1,234,567.01");
        assert_eq!(format_currency(dec!(-12.5)), "-$12.50");
        assert_eq!(format_currency(dec!(-0.001)), "$0.00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(5.2631578947)), "5.26%");
        assert_eq!(format_percent(dec!(4)), "4.00%");
    }

    #[cfg(feature = "fixed_income")]
    #[test]
    fn test_describe_price_status() {
        let s = describe_price_status(PriceStatus::Premium, dec!(5), dec!(4));
        assert!(s.contains("premium"));
        assert!(s.contains("(5.00%)"));
        assert!(s.contains("(4.00%)"));
    }

    #[cfg(feature = "fixed_income")]
    #[test]
    fn test_formula_explanation_substitutes_values() {
        use crate::fixed_income::bonds::PaymentFrequency;
        use crate::fixed_income::pricing::price;

        let spec = BondSpec::new(dec!(1000), dec!(5), 5, PaymentFrequency::SemiAnnual);
        let result = price(&spec, dec!(4)).unwrap();
        let text = formula_explanation(&spec, &result);
        assert!(text.contains("C = $25.00"));
        assert!(text.contains("r = 2.00%"));
        assert!(text.contains("F = $1,000.00"));
        assert!(text.contains("n = 10"));
    }
}
