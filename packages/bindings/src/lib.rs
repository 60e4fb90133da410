use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

#[napi]
pub fn price_bond(input_json: String) -> NapiResult<String> {
    let input: yieldr_core::fixed_income::pricing::BondPricingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        yieldr_core::fixed_income::pricing::price_bond(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn explain_price(input_json: String) -> NapiResult<String> {
    let input: yieldr_core::fixed_income::pricing::BondPricingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let result = yieldr_core::fixed_income::pricing::price(&input.bond, input.market_rate_percent)
        .map_err(to_napi_error)?;
    Ok(yieldr_core::display::formula_explanation(&input.bond, &result))
}

// ---------------------------------------------------------------------------
// Yields
// ---------------------------------------------------------------------------

#[napi]
pub fn solve_yield(input_json: String) -> NapiResult<String> {
    let input: yieldr_core::fixed_income::yields::BondYieldInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = yieldr_core::fixed_income::yields::calculate_bond_yield(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Sensitivity
// ---------------------------------------------------------------------------

#[napi]
pub fn sensitivity_curves(input_json: String) -> NapiResult<String> {
    let input: yieldr_core::fixed_income::sensitivity::SensitivityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = yieldr_core::fixed_income::sensitivity::sensitivity_curves(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
