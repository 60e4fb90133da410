pub mod display;
pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "fixed_income")]
pub mod fixed_income;

pub use error::YieldrError;
pub use types::*;

#[cfg(feature = "fixed_income")]
pub use fixed_income::bonds::{BondSpec, PaymentFrequency, PriceStatus};
#[cfg(feature = "fixed_income")]
pub use fixed_income::pricing::{price, price_bond, BondPricingInput, CashFlowEntry, PriceResult};
#[cfg(feature = "fixed_income")]
pub use fixed_income::yields::{
    calculate_bond_yield, current_yield, solve_yield, solve_yield_with, BondYieldInput,
    SolverConfig, YieldResult,
};
#[cfg(feature = "sensitivity")]
pub use fixed_income::sensitivity::{
    coupon_rate_curve, market_rate_curve, sensitivity_curves, SensitivityInput,
    SensitivityOutput, SensitivityPoint, SweepWindow,
};

/// Standard result type for all yieldr operations
pub type YieldrResult<T> = Result<T, YieldrError>;
