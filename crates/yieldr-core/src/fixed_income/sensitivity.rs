//! Price sensitivity curves for charting.
//!
//! Each curve re-prices the bond while one rate moves across a window
//! centred on its current value; everything else is held fixed.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::YieldrError;
use crate::fixed_income::bonds::BondSpec;
use crate::fixed_income::pricing;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::YieldrResult;

/// Upper bound on points per curve.
const MAX_SWEEP_POINTS: usize = 1_000;

/// Rate window `[max(floor, center - half_width), center + half_width]`
/// stepped by `step`, all in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepWindow {
    pub half_width: Percent,
    pub step: Percent,
    pub floor: Percent,
}

impl Default for SweepWindow {
    fn default() -> Self {
        Self {
            half_width: dec!(3),
            step: dec!(0.5),
            floor: dec!(0.5),
        }
    }
}

impl SweepWindow {
    /// Rates covered by the window around `center`, ascending.
    pub fn rates(&self, center: Percent) -> YieldrResult<Vec<Percent>> {
        if self.step <= Decimal::ZERO {
            return Err(YieldrError::invalid("window.step", "Step must be positive"));
        }
        if self.half_width < Decimal::ZERO {
            return Err(YieldrError::invalid(
                "window.half_width",
                "Half width cannot be negative",
            ));
        }
        if self.floor < Decimal::ZERO {
            return Err(YieldrError::invalid(
                "window.floor",
                "Floor cannot be negative",
            ));
        }

        let end = center
            .checked_add(self.half_width)
            .ok_or_else(|| YieldrError::overflow("sweep window upper bound"))?;
        let start = center
            .checked_sub(self.half_width)
            .ok_or_else(|| YieldrError::overflow("sweep window lower bound"))?;
        let mut current = self.floor.max(start);
        let mut values = Vec::new();
        while current <= end {
            if values.len() == MAX_SWEEP_POINTS {
                return Err(YieldrError::invalid(
                    "window.step",
                    format!("Window would produce more than {MAX_SWEEP_POINTS} points"),
                ));
            }
            values.push(current);
            current = match current.checked_add(self.step) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(values)
    }
}

/// One point on a sensitivity curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub rate_percent: Percent,
    pub price: Money,
}

/// Input for sensitivity curve generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityInput {
    #[serde(flatten)]
    pub bond: BondSpec,
    /// Base annual market rate in percent
    pub market_rate_percent: Percent,
    #[serde(default)]
    pub window: SweepWindow,
}

/// Both sensitivity curves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput {
    /// Price as the coupon rate varies, market rate fixed
    pub coupon_curve: Vec<SensitivityPoint>,
    /// Price as the market rate varies, coupon rate fixed
    pub market_curve: Vec<SensitivityPoint>,
}

/// Price against coupon rate around `spec.coupon_rate_percent`.
pub fn coupon_rate_curve(
    spec: &BondSpec,
    market_rate_percent: Percent,
    window: &SweepWindow,
) -> YieldrResult<Vec<SensitivityPoint>> {
    window
        .rates(spec.coupon_rate_percent)?
        .into_iter()
        .map(|rate| {
            let priced = pricing::price(&spec.with_coupon_rate(rate), market_rate_percent)?;
            Ok(SensitivityPoint {
                rate_percent: rate,
                price: priced.price,
            })
        })
        .collect()
}

/// Price against market rate around `market_rate_percent`.
pub fn market_rate_curve(
    spec: &BondSpec,
    market_rate_percent: Percent,
    window: &SweepWindow,
) -> YieldrResult<Vec<SensitivityPoint>> {
    window
        .rates(market_rate_percent)?
        .into_iter()
        .map(|rate| {
            let priced = pricing::price(spec, rate)?;
            Ok(SensitivityPoint {
                rate_percent: rate,
                price: priced.price,
            })
        })
        .collect()
}

/// Build both curves and wrap them in the standard output envelope.
pub fn sensitivity_curves(
    input: &SensitivityInput,
) -> YieldrResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let coupon_curve = coupon_rate_curve(&input.bond, input.market_rate_percent, &input.window)?;
    let market_curve = market_rate_curve(&input.bond, input.market_rate_percent, &input.window)?;

    if coupon_curve.is_empty() || market_curve.is_empty() {
        warnings.push("Sweep window is empty for at least one curve".into());
    }

    let output = SensitivityOutput {
        coupon_curve,
        market_curve,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Price sensitivity — re-pricing across coupon and market rate windows",
        input,
        warnings,
        elapsed,
        output,
    ))
}
