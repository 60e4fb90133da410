//! Bond pricing by discounted cash flow summation.
//!
//! P = Σ C / (1 + r)^t + F / (1 + r)^n, with simple periodic compounding.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::YieldrError;
use crate::fixed_income::bonds::{percent_of_par, BondSpec, PriceStatus};
use crate::time_value;
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::YieldrResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One coupon period of the pricing breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowEntry {
    /// 1-based period index
    pub period: u32,
    /// Coupon paid in this period
    pub payment: Money,
    /// Coupon discounted to today
    pub present_value: Money,
}

/// Output of bond pricing computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceResult {
    /// Clean price = PV of coupons + PV of face value
    pub price: Money,
    pub present_value_of_coupons: Money,
    pub present_value_of_face_value: Money,
    /// Per-period coupon breakdown in period order
    pub cash_flows: Vec<CashFlowEntry>,
    pub periods_total: u32,
    pub coupon_payment_per_period: Money,
    /// Market rate per period as a decimal
    pub periodic_market_rate: Rate,
    /// Price as a percentage of face value
    pub percent_of_par: Percent,
    pub price_status: PriceStatus,
}

/// Input parameters for bond pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondPricingInput {
    #[serde(flatten)]
    pub bond: BondSpec,
    /// Annual market (discount) rate in percent
    pub market_rate_percent: Percent,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Price a bond at an annual market rate (percent).
///
/// Pure: the same inputs always produce the same result and nothing is
/// recorded anywhere.
pub fn price(spec: &BondSpec, market_rate_percent: Percent) -> YieldrResult<PriceResult> {
    spec.validate()?;
    let periodic_market_rate = spec.periodic_market_rate(market_rate_percent)?;

    let n = spec.periods_total();
    let coupon = spec.coupon_payment_per_period()?;
    let factors = time_value::compound_factors(periodic_market_rate, n)?;

    let mut present_value_of_coupons = Decimal::ZERO;
    let mut cash_flows = Vec::with_capacity(factors.len());

    for (i, factor) in factors.iter().enumerate() {
        let pv = time_value::present_value(coupon, *factor)?;
        present_value_of_coupons = present_value_of_coupons
            .checked_add(pv)
            .ok_or_else(|| YieldrError::overflow("sum of coupon present values"))?;
        cash_flows.push(CashFlowEntry {
            period: i as u32 + 1,
            payment: coupon,
            present_value: pv,
        });
    }

    // n >= 1 after validation, so the final factor always exists
    let final_factor = factors.last().copied().unwrap_or(Decimal::ONE);
    let present_value_of_face_value = time_value::present_value(spec.face_value, final_factor)?;

    let price = present_value_of_coupons
        .checked_add(present_value_of_face_value)
        .ok_or_else(|| YieldrError::overflow("bond price"))?;

    tracing::debug!(
        face_value = %spec.face_value,
        coupon_rate = %spec.coupon_rate_percent,
        market_rate = %market_rate_percent,
        periods = n,
        price = %price,
        "priced bond"
    );

    Ok(PriceResult {
        price,
        present_value_of_coupons,
        present_value_of_face_value,
        cash_flows,
        periods_total: n,
        coupon_payment_per_period: coupon,
        periodic_market_rate,
        percent_of_par: percent_of_par(price, spec.face_value)?,
        price_status: PriceStatus::from_rates(spec.coupon_rate_percent, market_rate_percent),
    })
}

/// Price a bond and wrap the result in the standard output envelope.
pub fn price_bond(input: &BondPricingInput) -> YieldrResult<ComputationOutput<PriceResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let result = price(&input.bond, input.market_rate_percent)?;

    if input.market_rate_percent.is_zero() {
        warnings.push("Market rate is zero; cash flows are undiscounted".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Bond Pricing — PV of periodic coupons and face value",
        input,
        warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
