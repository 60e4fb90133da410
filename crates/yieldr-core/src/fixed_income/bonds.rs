//! Plain fixed-coupon bond description shared by the pricer and the yield solver.
//!
//! Compounding is simple periodic: a term of `n` whole years paid at frequency
//! `f` has exactly `n * f` coupon periods. No day count conventions apply.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::YieldrError;
use crate::time_value;
use crate::types::{Money, Percent, Rate};
use crate::YieldrResult;

// ---------------------------------------------------------------------------
// Payment frequency
// ---------------------------------------------------------------------------

/// Coupon payment frequency.
///
/// Serialised as `annual`, `semi-annual`, `quarterly` or `monthly`.
/// The default is semi-annual.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentFrequency {
    Annual,
    #[default]
    SemiAnnual,
    Quarterly,
    Monthly,
}

impl PaymentFrequency {
    pub const ALL: [PaymentFrequency; 4] = [
        PaymentFrequency::Annual,
        PaymentFrequency::SemiAnnual,
        PaymentFrequency::Quarterly,
        PaymentFrequency::Monthly,
    ];

    /// Coupon periods per year.
    pub fn periods_per_year(self) -> u32 {
        match self {
            PaymentFrequency::Annual => 1,
            PaymentFrequency::SemiAnnual => 2,
            PaymentFrequency::Quarterly => 4,
            PaymentFrequency::Monthly => 12,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentFrequency::Annual => "annual",
            PaymentFrequency::SemiAnnual => "semi-annual",
            PaymentFrequency::Quarterly => "quarterly",
            PaymentFrequency::Monthly => "monthly",
        }
    }

    /// Lenient parse: unrecognised input falls back to semi-annual.
    ///
    /// The fallback is logged at `warn` so it never happens silently. Use
    /// [`str::parse`] when unrecognised input should be rejected instead.
    pub fn parse_or_default(s: &str) -> Self {
        match s.parse() {
            Ok(freq) => freq,
            Err(_) => {
                tracing::warn!(
                    input = s,
                    fallback = PaymentFrequency::default().as_str(),
                    "unrecognised payment frequency, using default"
                );
                PaymentFrequency::default()
            }
        }
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentFrequency {
    type Err = YieldrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annual" | "annually" | "1" => Ok(PaymentFrequency::Annual),
            "semi-annual" | "semiannual" | "semi_annual" | "2" => Ok(PaymentFrequency::SemiAnnual),
            "quarterly" | "4" => Ok(PaymentFrequency::Quarterly),
            "monthly" | "12" => Ok(PaymentFrequency::Monthly),
            other => Err(YieldrError::invalid(
                "frequency",
                format!(
                    "Unrecognised payment frequency '{other}' (expected annual, semi-annual, quarterly or monthly)"
                ),
            )),
        }
    }
}

impl TryFrom<u8> for PaymentFrequency {
    type Error = YieldrError;

    fn try_from(periods: u8) -> Result<Self, Self::Error> {
        match periods {
            1 => Ok(PaymentFrequency::Annual),
            2 => Ok(PaymentFrequency::SemiAnnual),
            4 => Ok(PaymentFrequency::Quarterly),
            12 => Ok(PaymentFrequency::Monthly),
            _ => Err(YieldrError::invalid(
                "frequency",
                "Coupon frequency must be 1, 2, 4, or 12",
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Bond specification
// ---------------------------------------------------------------------------

/// Longest schedule accepted: 100 years of monthly coupons.
pub const MAX_COUPON_PERIODS: u32 = 1_200;

/// A plain fixed-coupon bond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondSpec {
    /// Principal repaid at maturity (typically 1000)
    pub face_value: Money,
    /// Annual coupon rate in percent (5 = 5%)
    pub coupon_rate_percent: Percent,
    /// Whole years to maturity
    pub term_years: u32,
    /// Coupon payment frequency
    #[serde(default)]
    pub frequency: PaymentFrequency,
}

impl BondSpec {
    pub fn new(
        face_value: Money,
        coupon_rate_percent: Percent,
        term_years: u32,
        frequency: PaymentFrequency,
    ) -> Self {
        Self {
            face_value,
            coupon_rate_percent,
            term_years,
            frequency,
        }
    }

    /// Same bond with a different coupon rate.
    pub fn with_coupon_rate(&self, coupon_rate_percent: Percent) -> Self {
        Self {
            coupon_rate_percent,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> YieldrResult<()> {
        if self.face_value <= Decimal::ZERO {
            return Err(YieldrError::invalid(
                "face_value",
                "Face value must be positive",
            ));
        }
        if self.coupon_rate_percent < Decimal::ZERO {
            return Err(YieldrError::invalid(
                "coupon_rate_percent",
                "Coupon rate cannot be negative",
            ));
        }
        if self.term_years == 0 {
            return Err(YieldrError::invalid(
                "term_years",
                "Term must be at least one year",
            ));
        }
        let periods = self
            .term_years
            .checked_mul(self.frequency.periods_per_year())
            .unwrap_or(u32::MAX);
        if periods > MAX_COUPON_PERIODS {
            return Err(YieldrError::invalid(
                "term_years",
                format!("Term exceeds {MAX_COUPON_PERIODS} coupon periods"),
            ));
        }
        Ok(())
    }

    /// Total number of coupon periods.
    pub fn periods_total(&self) -> u32 {
        self.term_years
            .saturating_mul(self.frequency.periods_per_year())
    }

    pub fn periodic_coupon_rate(&self) -> YieldrResult<Rate> {
        time_value::periodic_rate(self.coupon_rate_percent, self.frequency.periods_per_year())
    }

    pub fn coupon_payment_per_period(&self) -> YieldrResult<Money> {
        self.face_value
            .checked_mul(self.periodic_coupon_rate()?)
            .ok_or_else(|| YieldrError::overflow("coupon payment per period"))
    }

    pub fn annual_coupon(&self) -> YieldrResult<Money> {
        self.face_value
            .checked_mul(self.coupon_rate_percent)
            .and_then(|v| v.checked_div(dec!(100)))
            .ok_or_else(|| YieldrError::overflow("annual coupon"))
    }

    /// Periodic decimal market rate for an annual percentage, checked for sign.
    pub fn periodic_market_rate(&self, market_rate_percent: Percent) -> YieldrResult<Rate> {
        if market_rate_percent < Decimal::ZERO {
            return Err(YieldrError::invalid(
                "market_rate_percent",
                "Market rate cannot be negative",
            ));
        }
        time_value::periodic_rate(market_rate_percent, self.frequency.periods_per_year())
    }
}

// ---------------------------------------------------------------------------
// Premium / par / discount
// ---------------------------------------------------------------------------

/// Where a price sits relative to face value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceStatus {
    Premium,
    Par,
    Discount,
}

impl PriceStatus {
    /// Classify a priced bond from its coupon and market rates.
    ///
    /// Comparing the rates avoids misclassifying a par bond whose summed
    /// present values land a few ulps away from face.
    pub fn from_rates(coupon_rate_percent: Percent, market_rate_percent: Percent) -> Self {
        match coupon_rate_percent.cmp(&market_rate_percent) {
            std::cmp::Ordering::Greater => PriceStatus::Premium,
            std::cmp::Ordering::Equal => PriceStatus::Par,
            std::cmp::Ordering::Less => PriceStatus::Discount,
        }
    }

    /// Classify an observed price against face value.
    pub fn from_price(price: Money, face_value: Money) -> Self {
        match price.cmp(&face_value) {
            std::cmp::Ordering::Greater => PriceStatus::Premium,
            std::cmp::Ordering::Equal => PriceStatus::Par,
            std::cmp::Ordering::Less => PriceStatus::Discount,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PriceStatus::Premium => "premium",
            PriceStatus::Par => "par",
            PriceStatus::Discount => "discount",
        }
    }
}

impl fmt::Display for PriceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price as a percentage of face value.
pub fn percent_of_par(price: Money, face_value: Money) -> YieldrResult<Percent> {
    if face_value.is_zero() {
        return Ok(Decimal::ZERO);
    }
    price
        .checked_div(face_value)
        .and_then(|v| v.checked_mul(dec!(100)))
        .ok_or_else(|| YieldrError::overflow("percent of par"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
