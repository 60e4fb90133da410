//! Current yield and yield-to-maturity.
//!
//! YTM is the periodic rate `g` solving
//! `Σ C/(1+g)^t + F/(1+g)^n − P = 0`, found by Newton-Raphson and annualised
//! as `g * periods_per_year * 100`. Rates stay decimal fractions while
//! iterating and become percentages only on the way out.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::YieldrError;
use crate::fixed_income::bonds::{percent_of_par, BondSpec, PaymentFrequency, PriceStatus};
use crate::time_value;
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::YieldrResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum Newton-Raphson iterations for YTM solve.
pub const MAX_YTM_ITERATIONS: u32 = 100;

/// Convergence tolerance on successive periodic-rate estimates (1e-7).
pub const YTM_EPSILON: Decimal = dec!(0.0000001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Newton-Raphson tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Stop once |g_new − g_prev| falls below this
    pub tolerance: Decimal,
    /// Hard cap on iterations; hitting it yields an unconverged result
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: YTM_EPSILON,
            max_iterations: MAX_YTM_ITERATIONS,
        }
    }
}

impl SolverConfig {
    fn validate(&self) -> YieldrResult<()> {
        if self.tolerance <= Decimal::ZERO {
            return Err(YieldrError::invalid(
                "solver.tolerance",
                "Tolerance must be positive",
            ));
        }
        if self.max_iterations == 0 {
            return Err(YieldrError::invalid(
                "solver.max_iterations",
                "At least one iteration is required",
            ));
        }
        Ok(())
    }
}

/// Input for bond yield calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondYieldInput {
    /// Face (par) value of the bond.
    pub face_value: Money,
    /// Annual coupon rate in percent (5 = 5%).
    pub coupon_rate_percent: Percent,
    /// Observed market price of the bond.
    pub observed_price: Money,
    /// Whole years remaining until maturity.
    pub term_years: u32,
    /// Coupon payment frequency.
    #[serde(default)]
    pub frequency: PaymentFrequency,
    /// Newton-Raphson tuning; defaults to 1e-7 / 100 iterations.
    #[serde(default)]
    pub solver: SolverConfig,
}

impl BondYieldInput {
    pub fn bond(&self) -> BondSpec {
        BondSpec::new(
            self.face_value,
            self.coupon_rate_percent,
            self.term_years,
            self.frequency,
        )
    }
}

/// Output of bond yield calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YieldResult {
    /// Annual coupon / observed price, in percent.
    pub current_yield: Percent,
    /// Yield to maturity, annualised, in percent.
    pub ytm: Percent,
    /// Per-period yield as a decimal.
    pub periodic_ytm: Rate,
    /// Newton-Raphson iterations performed.
    pub iterations: u32,
    /// False when the iteration cap was hit before the tolerance was met.
    pub converged: bool,
    /// Size of the final Newton step.
    pub last_step: Decimal,
    /// Yield to worst call. Not computed by the core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yield_to_worst_call: Option<Percent>,
    pub price_status: PriceStatus,
    pub percent_of_par: Percent,
}

impl YieldResult {
    /// Reject results whose YTM did not converge.
    pub fn into_converged(self) -> YieldrResult<Self> {
        if self.converged {
            Ok(self)
        } else {
            Err(YieldrError::NonConvergence {
                function: "YTM Newton-Raphson".into(),
                iterations: self.iterations,
                last_delta: self.last_step,
            })
        }
    }
}

/// Periodic YTM solution before annualisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YtmSolution {
    pub periodic_rate: Rate,
    pub iterations: u32,
    pub converged: bool,
    pub last_step: Decimal,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Current yield in percent: annual coupon income over observed price.
pub fn current_yield(
    face_value: Money,
    coupon_rate_percent: Percent,
    observed_price: Money,
) -> YieldrResult<Percent> {
    check_observed_price(observed_price)?;
    face_value
        .checked_mul(coupon_rate_percent)
        .and_then(|v| v.checked_div(observed_price))
        .ok_or_else(|| YieldrError::overflow("current yield"))
}

/// Solve current yield and YTM with the default solver settings.
pub fn solve_yield(input: &BondYieldInput) -> YieldrResult<YieldResult> {
    solve_yield_with(input, &input.solver)
}

/// Solve current yield and YTM with explicit solver settings.
pub fn solve_yield_with(input: &BondYieldInput, config: &SolverConfig) -> YieldrResult<YieldResult> {
    let spec = input.bond();
    spec.validate()?;
    config.validate()?;

    let current_yield = current_yield(
        input.face_value,
        input.coupon_rate_percent,
        input.observed_price,
    )?;
    let solution = solve_periodic_ytm(&spec, input.observed_price, config)?;

    let periods_per_year = Decimal::from(spec.frequency.periods_per_year());
    let ytm = solution
        .periodic_rate
        .checked_mul(periods_per_year)
        .and_then(|v| v.checked_mul(dec!(100)))
        .ok_or_else(|| YieldrError::overflow("annualising YTM"))?;

    Ok(YieldResult {
        current_yield,
        ytm,
        periodic_ytm: solution.periodic_rate,
        iterations: solution.iterations,
        converged: solution.converged,
        last_step: solution.last_step,
        yield_to_worst_call: None,
        price_status: PriceStatus::from_price(input.observed_price, input.face_value),
        percent_of_par: percent_of_par(input.observed_price, input.face_value)?,
    })
}

/// Solve yields and wrap the result in the standard output envelope.
pub fn calculate_bond_yield(
    input: &BondYieldInput,
) -> YieldrResult<ComputationOutput<YieldResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let result = solve_yield(input)?;

    if !result.converged {
        warnings.push(format!(
            "YTM did not converge within {} iterations (last step {}); value is an approximation",
            result.iterations, result.last_step
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "ytm_method": "Newton-Raphson",
        "max_iterations": input.solver.max_iterations,
        "convergence_eps": input.solver.tolerance.to_string(),
        "compounding": "periodic",
        "frequency": input.frequency,
    });

    Ok(with_metadata(
        "Bond Yield Analysis — current yield and YTM",
        &assumptions,
        warnings,
        elapsed,
        result,
    ))
}

/// Newton-Raphson search for the periodic rate that prices the bond at
/// `observed_price`.
///
/// Starts from current yield `(coupon% / 100) / (P / F)` converted to its
/// per-period equivalent, and always takes at least one step.
pub fn solve_periodic_ytm(
    spec: &BondSpec,
    observed_price: Money,
    config: &SolverConfig,
) -> YieldrResult<YtmSolution> {
    spec.validate()?;
    check_observed_price(observed_price)?;

    let n = spec.periods_total();
    let coupon = spec.coupon_payment_per_period()?;
    let face = spec.face_value;

    let periodic_coupon_rate = spec.periodic_coupon_rate()?;
    let mut g = observed_price
        .checked_div(face)
        .and_then(|price_ratio| periodic_coupon_rate.checked_div(price_ratio))
        .ok_or_else(|| YieldrError::overflow("YTM initial guess"))?;
    let mut last_step = Decimal::ZERO;

    for iteration in 1..=config.max_iterations {
        let (model_price, derivative) = price_and_derivative(coupon, face, n, g)?;
        let f = model_price
            .checked_sub(observed_price)
            .ok_or_else(|| YieldrError::overflow("YTM residual"))?;

        if derivative.is_zero() {
            return Err(YieldrError::NumericalInstability {
                context: format!("YTM derivative is zero at periodic rate {g}"),
            });
        }

        let step = f
            .checked_div(derivative)
            .ok_or_else(|| YieldrError::overflow("YTM Newton step"))?;
        let next = g
            .checked_sub(step)
            .ok_or_else(|| YieldrError::overflow("YTM Newton step"))?;
        last_step = step.abs();

        tracing::debug!(iteration, rate = %next, residual = %f, step = %last_step, "ytm newton step");

        g = next;
        if last_step < config.tolerance {
            return Ok(YtmSolution {
                periodic_rate: g,
                iterations: iteration,
                converged: true,
                last_step,
            });
        }
    }

    tracing::warn!(
        iterations = config.max_iterations,
        rate = %g,
        step = %last_step,
        "ytm did not converge; returning best estimate"
    );

    Ok(YtmSolution {
        periodic_rate: g,
        iterations: config.max_iterations,
        converged: false,
        last_step,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn check_observed_price(observed_price: Money) -> YieldrResult<()> {
    if observed_price <= Decimal::ZERO {
        return Err(YieldrError::DomainError {
            field: "observed_price".into(),
            reason: "Observed price must be positive".into(),
        });
    }
    Ok(())
}

/// Model price at periodic rate `g` and its derivative with respect to `g`.
///
/// `factors[t - 1] = (1 + g)^t` for `t = 1..=n + 1`, so the derivative terms
/// `t·C / (1+g)^(t+1)` reuse the next factor.
fn price_and_derivative(
    coupon: Money,
    face: Money,
    n: u32,
    g: Rate,
) -> YieldrResult<(Money, Decimal)> {
    let horizon = n
        .checked_add(1)
        .ok_or_else(|| YieldrError::invalid("term_years", "Too many coupon periods"))?;
    let factors = time_value::compound_factors(g, horizon)?;

    let mut model_price = Decimal::ZERO;
    let mut derivative = Decimal::ZERO;

    let mut accumulate = |amount: Money, t: usize| -> YieldrResult<()> {
        let weighted = Decimal::from(t as u64)
            .checked_mul(amount)
            .ok_or_else(|| YieldrError::overflow("YTM derivative weight"))?;
        model_price = model_price
            .checked_add(time_value::present_value(amount, factors[t - 1])?)
            .ok_or_else(|| YieldrError::overflow("YTM model price"))?;
        derivative = derivative
            .checked_sub(time_value::present_value(weighted, factors[t])?)
            .ok_or_else(|| YieldrError::overflow("YTM derivative"))?;
        Ok(())
    };

    for t in 1..=n as usize {
        accumulate(coupon, t)?;
    }
    accumulate(face, n as usize)?;

    Ok((model_price, derivative))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed_income::pricing;

    fn yield_input(observed_price: Money) -> BondYieldInput {
        BondYieldInput {
            face_value: dec!(1000),
            coupon_rate_percent: dec!(5),
            observed_price,
            term_years: 5,
            frequency: PaymentFrequency::SemiAnnual,
            solver: SolverConfig::default(),
        }
    }

    #[test]
    fn test_current_yield_calculation() {
        let cy = current_yield(dec!(1000), dec!(5), dec!(950)).unwrap();
        assert!((cy - dec!(5.263157894)).abs() < dec!(0.000001), "cy = {cy}");
    }

    #[test]
    fn test_discount_bond_ytm_above_coupon() {
        let r = solve_yield(&yield_input(dec!(950))).unwrap();
        assert!(r.converged);
        assert!(r.ytm > dec!(5), "ytm = {}", r.ytm);
        assert!(r.ytm > r.current_yield);
        assert_eq!(r.price_status, PriceStatus::Discount);
        assert!(r.yield_to_worst_call.is_none());
    }

    #[test]
    fn test_par_price_gives_coupon_yield() {
        let r = solve_yield(&yield_input(dec!(1000))).unwrap();
        assert!((r.ytm - dec!(5)).abs() < dec!(0.0001), "ytm = {}", r.ytm);
        assert_eq!(r.price_status, PriceStatus::Par);
    }

    #[test]
    fn test_premium_bond_ytm_below_coupon() {
        let r = solve_yield(&yield_input(dec!(1044.91))).unwrap();
        assert!(r.ytm < dec!(5));
        assert!((r.ytm - dec!(4)).abs() < dec!(0.01));
    }

    #[test]
    fn test_round_trip_with_pricer() {
        let spec = BondSpec::new(dec!(1000), dec!(7), 10, PaymentFrequency::Quarterly);
        let priced = pricing::price(&spec, dec!(5.5)).unwrap();
        let input = BondYieldInput {
            face_value: spec.face_value,
            coupon_rate_percent: spec.coupon_rate_percent,
            observed_price: priced.price,
            term_years: spec.term_years,
            frequency: spec.frequency,
            solver: SolverConfig::default(),
        };
        let r = solve_yield(&input).unwrap();
        assert!((r.ytm - dec!(5.5)).abs() < dec!(0.0001), "ytm = {}", r.ytm);
    }

    #[test]
    fn test_zero_coupon_bond_iterates() {
        let input = BondYieldInput {
            coupon_rate_percent: Decimal::ZERO,
            observed_price: dec!(800),
            ..yield_input(dec!(800))
        };
        let r = solve_yield(&input).unwrap();
        assert!(r.converged);
        assert!(r.iterations > 1);
        assert!(r.current_yield.is_zero());
        // (1000/800)^(1/10) - 1 per half-year
        assert!((r.periodic_ytm - dec!(0.0225651)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_non_positive_price_is_domain_error() {
        assert!(matches!(
            solve_yield(&yield_input(Decimal::ZERO)),
            Err(YieldrError::DomainError { .. })
        ));
        assert!(matches!(
            current_yield(dec!(1000), dec!(5), dec!(-1)),
            Err(YieldrError::DomainError { .. })
        ));
    }

    #[test]
    fn test_invalid_bond_is_invalid_input() {
        let input = BondYieldInput {
            term_years: 0,
            ..yield_input(dec!(950))
        };
        assert!(matches!(
            solve_yield(&input),
            Err(YieldrError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_iteration_cap_flags_non_convergence() {
        let config = SolverConfig {
            tolerance: YTM_EPSILON,
            max_iterations: 1,
        };
        let r = solve_yield_with(&yield_input(dec!(950)), &config).unwrap();
        assert!(!r.converged);
        assert_eq!(r.iterations, 1);
        assert!(matches!(
            r.into_converged(),
            Err(YieldrError::NonConvergence { iterations: 1, .. })
        ));
    }

    #[test]
    fn test_envelope_warns_on_non_convergence() {
        let mut input = yield_input(dec!(950));
        input.solver.max_iterations = 1;
        let out = calculate_bond_yield(&input).unwrap();
        assert!(!out.result.converged);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_rate_collapse_is_numerical_instability() {
        // deep premium zero-coupon: first Newton step jumps below -100%
        let input = BondYieldInput {
            face_value: dec!(1000),
            coupon_rate_percent: Decimal::ZERO,
            observed_price: dec!(1000000),
            term_years: 1,
            frequency: PaymentFrequency::Annual,
            solver: SolverConfig::default(),
        };
        assert!(matches!(
            solve_yield(&input),
            Err(YieldrError::NumericalInstability { .. })
        ));
    }

    #[test]
    fn test_extreme_premium_overflow_is_numerical_instability() {
        // second iterate near -16% per month sends the discounted sums past Decimal::MAX
        let input = BondYieldInput {
            term_years: 30,
            frequency: PaymentFrequency::Monthly,
            ..yield_input(dec!(100000))
        };
        assert!(matches!(
            solve_yield(&input),
            Err(YieldrError::NumericalInstability { .. })
        ));
    }

    #[test]
    fn test_current_yield_overflow() {
        let face = Decimal::MAX / dec!(2);
        assert!(matches!(
            current_yield(face, dec!(50), Decimal::ONE),
            Err(YieldrError::NumericalInstability { .. })
        ));
        let input = BondYieldInput {
            face_value: face,
            coupon_rate_percent: dec!(50),
            observed_price: Decimal::ONE,
            term_years: 1,
            frequency: PaymentFrequency::Annual,
            solver: SolverConfig::default(),
        };
        assert!(matches!(
            solve_yield(&input),
            Err(YieldrError::NumericalInstability { .. })
        ));
    }

    #[test]
    fn test_derivative_underflow_to_zero() {
        let tiny = Decimal::new(1, 28);
        let (_, derivative) = price_and_derivative(Decimal::ZERO, tiny, 1, Decimal::ONE).unwrap();
        assert!(derivative.is_zero());

        // guess starts at g = 1, where every derivative term rounds below 1e-28
        let input = BondYieldInput {
            face_value: tiny,
            coupon_rate_percent: dec!(100),
            observed_price: tiny,
            term_years: 1,
            frequency: PaymentFrequency::Annual,
            solver: SolverConfig::default(),
        };
        assert!(matches!(
            solve_yield(&input),
            Err(YieldrError::NumericalInstability { ref context }) if context.contains("derivative is zero")
        ));
    }

    #[test]
    fn test_invalid_solver_config() {
        let config = SolverConfig {
            tolerance: Decimal::ZERO,
            max_iterations: 100,
        };
        assert!(solve_yield_with(&yield_input(dec!(950)), &config).is_err());
    }

    #[test]
    fn test_solver_config_partial_json() {
        let input: BondYieldInput = serde_json::from_str(
            r#"{"face_value":"1000","coupon_rate_percent":"5","observed_price":"950",
                "term_years":5,"solver":{"max_iterations":20}}"#,
        )
        .unwrap();
        assert_eq!(input.solver.max_iterations, 20);
        assert_eq!(input.solver.tolerance, YTM_EPSILON);
        assert_eq!(input.frequency, PaymentFrequency::SemiAnnual);
    }
}
