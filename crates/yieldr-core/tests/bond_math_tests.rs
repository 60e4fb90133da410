use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use yieldr_core::fixed_income::bonds::{BondSpec, PaymentFrequency, PriceStatus};
use yieldr_core::fixed_income::pricing::{self, BondPricingInput};
use yieldr_core::fixed_income::sensitivity::{self, SensitivityInput, SweepWindow};
use yieldr_core::fixed_income::yields::{self, BondYieldInput, SolverConfig};
use yieldr_core::YieldrError;

// ===========================================================================
// Pricing scenarios
// ===========================================================================

fn reference_bond() -> BondSpec {
    // 5y semi-annual 5% coupon, 1000 face
    BondSpec::new(dec!(1000), dec!(5), 5, PaymentFrequency::SemiAnnual)
}

#[test]
fn test_reference_premium_price() {
    let r = pricing::price(&reference_bond(), dec!(4)).unwrap();

    // 10 periods, 2.5% periodic coupon, 2% periodic market rate
    assert_eq!(r.periods_total, 10);
    assert_eq!(r.coupon_payment_per_period, dec!(25));
    assert_eq!(r.periodic_market_rate, dec!(0.02));

    // 25 * annuity(2%, 10) + 1000 / 1.02^10 ≈ 224.565 + 820.348
    assert!((r.price - dec!(1044.91)).abs() < dec!(0.005), "price = {}", r.price);
    assert!((r.present_value_of_face_value - dec!(820.348)).abs() < dec!(0.001));
    assert!((r.present_value_of_coupons - dec!(224.565)).abs() < dec!(0.001));
    assert_eq!(r.price_status, PriceStatus::Premium);
}

#[test]
fn test_par_for_every_frequency() {
    for frequency in PaymentFrequency::ALL {
        for term in [1u32, 3, 10, 30] {
            let spec = BondSpec::new(dec!(1000), dec!(5), term, frequency);
            let r = pricing::price(&spec, dec!(5)).unwrap();
            assert!(
                (r.price - dec!(1000)).abs() < dec!(0.000001),
                "{frequency} {term}y: price = {}",
                r.price
            );
        }
    }
}

#[test]
fn test_zero_rate_undiscounted_total() {
    let spec = BondSpec::new(dec!(1000), dec!(6), 10, PaymentFrequency::Monthly);
    let r = pricing::price(&spec, Decimal::ZERO).unwrap();
    let expected = spec.face_value + spec.coupon_payment_per_period().unwrap() * Decimal::from(120u32);
    assert_eq!(r.price, expected);
}

#[test]
fn test_pricing_envelope_metadata() {
    let input = BondPricingInput {
        bond: reference_bond(),
        market_rate_percent: dec!(4),
    };
    let out = pricing::price_bond(&input).unwrap();
    assert!(!out.metadata.version.is_empty());
    assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    assert!(out.methodology.contains("Bond Pricing"));
}

#[test]
fn test_pricing_input_from_json() {
    let input: BondPricingInput = serde_json::from_str(
        r#"{
            "face_value": "1000",
            "coupon_rate_percent": "5",
            "term_years": 5,
            "frequency": "semi-annual",
            "market_rate_percent": "4"
        }"#,
    )
    .unwrap();
    assert_eq!(input.bond, reference_bond());
    assert_eq!(input.market_rate_percent, dec!(4));
}

// ===========================================================================
// Yield scenarios
// ===========================================================================

fn discount_yield_input() -> BondYieldInput {
    BondYieldInput {
        face_value: dec!(1000),
        coupon_rate_percent: dec!(5),
        observed_price: dec!(950),
        term_years: 5,
        frequency: PaymentFrequency::SemiAnnual,
        solver: SolverConfig::default(),
    }
}

#[test]
fn test_reference_discount_yields() {
    let r = yields::solve_yield(&discount_yield_input()).unwrap();

    // 50 / 950 = 5.2631...%
    assert!((r.current_yield - dec!(5.2632)).abs() < dec!(0.0001));

    // priced below face, so YTM exceeds the coupon rate
    assert!(r.converged);
    assert!(r.ytm > dec!(5));
    // ≈ 6.1776% bond-equivalent
    assert!((r.ytm - dec!(6.1776)).abs() < dec!(0.0001), "ytm = {}", r.ytm);
    assert!(r.iterations <= 100);
}

#[test]
fn test_solved_ytm_reprices_observed_price() {
    let r = yields::solve_yield(&discount_yield_input()).unwrap();
    let repriced = pricing::price(&reference_bond(), r.ytm).unwrap();
    assert!((repriced.price - dec!(950)).abs() < dec!(0.0001));
}

#[test]
fn test_yield_envelope_has_assumptions() {
    let out = yields::calculate_bond_yield(&discount_yield_input()).unwrap();
    assert_eq!(out.assumptions["ytm_method"], "Newton-Raphson");
    assert_eq!(out.assumptions["max_iterations"], 100);
    assert!(out.warnings.is_empty());
}

#[test]
fn test_yield_to_worst_call_absent_from_json() {
    let r = yields::solve_yield(&discount_yield_input()).unwrap();
    let json = serde_json::to_value(&r).unwrap();
    assert!(json.get("yield_to_worst_call").is_none());
    assert_eq!(json["price_status"], "discount");
}

// ===========================================================================
// Error kinds
// ===========================================================================

#[test]
fn test_error_kinds_are_distinguishable() {
    let bad_face = BondSpec::new(Decimal::ZERO, dec!(5), 5, PaymentFrequency::Annual);
    assert!(matches!(
        pricing::price(&bad_face, dec!(4)),
        Err(YieldrError::InvalidInput { .. })
    ));

    let zero_price = BondYieldInput {
        observed_price: Decimal::ZERO,
        ..discount_yield_input()
    };
    assert!(matches!(
        yields::solve_yield(&zero_price),
        Err(YieldrError::DomainError { .. })
    ));

    let huge_rate = BondSpec::new(dec!(1000), dec!(5), 30, PaymentFrequency::Monthly);
    assert!(matches!(
        pricing::price(&huge_rate, dec!(50000)),
        Err(YieldrError::NumericalInstability { .. })
    ));

    let capped = yields::solve_yield_with(
        &discount_yield_input(),
        &SolverConfig {
            max_iterations: 1,
            ..SolverConfig::default()
        },
    )
    .unwrap();
    assert!(matches!(
        capped.into_converged(),
        Err(YieldrError::NonConvergence { .. })
    ));
}

#[test]
fn test_error_messages() {
    let err = pricing::price(
        &BondSpec::new(dec!(1000), dec!(5), 0, PaymentFrequency::Annual),
        dec!(4),
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid input: term_years — Term must be at least one year"
    );
}

// ===========================================================================
// Sensitivity
// ===========================================================================

#[test]
fn test_sensitivity_curves_share_base_point() {
    let input = SensitivityInput {
        bond: reference_bond(),
        market_rate_percent: dec!(4),
        window: SweepWindow::default(),
    };
    let out = sensitivity::sensitivity_curves(&input).unwrap().result;
    let base = pricing::price(&reference_bond(), dec!(4)).unwrap().price;

    let on_coupon = out
        .coupon_curve
        .iter()
        .find(|p| p.rate_percent == dec!(5))
        .unwrap();
    let on_market = out
        .market_curve
        .iter()
        .find(|p| p.rate_percent == dec!(4))
        .unwrap();
    assert_eq!(on_coupon.price, base);
    assert_eq!(on_market.price, base);
}
