use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use yieldr_core::display;
use yieldr_core::fixed_income::bonds::{BondSpec, PaymentFrequency};
use yieldr_core::fixed_income::pricing::{self, BondPricingInput};
use yieldr_core::fixed_income::sensitivity::{self, SensitivityInput, SweepWindow};
use yieldr_core::fixed_income::yields::{self, BondYieldInput, SolverConfig};

use crate::input;

/// Bond terms shared by every command
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct BondArgs {
    /// Face (par) value, e.g. 1000
    #[arg(long)]
    pub face_value: Option<Decimal>,

    /// Annual coupon rate in percent (e.g. 5 for 5%)
    #[arg(long)]
    pub coupon_rate: Option<Decimal>,

    /// Whole years to maturity
    #[arg(long)]
    pub term_years: Option<u32>,

    /// Payment frequency: annual, semi-annual, quarterly, monthly
    #[arg(long, default_value = "semi-annual")]
    pub frequency: String,

    /// Fall back to semi-annual instead of rejecting an unknown frequency
    #[arg(long)]
    pub lenient_frequency: bool,

    /// Path to JSON or YAML input file (overrides individual flags and stdin)
    #[arg(long)]
    pub input: Option<String>,
}

impl BondArgs {
    fn frequency(&self) -> Result<PaymentFrequency, Box<dyn std::error::Error>> {
        if self.lenient_frequency {
            Ok(PaymentFrequency::parse_or_default(&self.frequency))
        } else {
            Ok(self.frequency.parse()?)
        }
    }

    fn bond(&self) -> Result<BondSpec, Box<dyn std::error::Error>> {
        Ok(BondSpec::new(
            self.face_value
                .ok_or("--face-value is required (or provide --input)")?,
            self.coupon_rate
                .ok_or("--coupon-rate is required (or provide --input)")?,
            self.term_years
                .ok_or("--term-years is required (or provide --input)")?,
            self.frequency()?,
        ))
    }
}

/// Arguments for bond pricing
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PriceArgs {
    #[command(flatten)]
    pub bond: BondArgs,

    /// Annual market (discount) rate in percent
    #[arg(long)]
    pub market_rate: Option<Decimal>,
}

fn pricing_input(args: &PriceArgs) -> Result<BondPricingInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.bond.input {
        return input::file::read_input(path);
    }
    if let Some(piped) = input::stdin::read_stdin()? {
        return Ok(piped);
    }
    Ok(BondPricingInput {
        bond: args.bond.bond()?,
        market_rate_percent: args
            .market_rate
            .ok_or("--market-rate is required (or provide --input)")?,
    })
}

pub fn run_price(args: PriceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let pricing_input = pricing_input(&args)?;
    let result = pricing::price_bond(&pricing_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Render the pricing formula and premium/discount explanation
pub fn run_explain(args: PriceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let pricing_input = pricing_input(&args)?;
    let result = pricing::price(&pricing_input.bond, pricing_input.market_rate_percent)?;
    Ok(json!({
        "price": display::format_currency(result.price),
        "percent_of_par": display::format_percent(result.percent_of_par),
        "present_value_of_coupons": display::format_currency(result.present_value_of_coupons),
        "present_value_of_face_value": display::format_currency(result.present_value_of_face_value),
        "status": display::describe_price_status(
            result.price_status,
            pricing_input.bond.coupon_rate_percent,
            pricing_input.market_rate_percent,
        ),
        "formula": display::formula_explanation(&pricing_input.bond, &result),
    }))
}

/// Arguments for current yield and YTM
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct YieldArgs {
    #[command(flatten)]
    pub bond: BondArgs,

    /// Observed market price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Newton-Raphson convergence tolerance on the periodic rate
    #[arg(long)]
    pub tolerance: Option<Decimal>,

    /// Newton-Raphson iteration cap
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Fail instead of returning an unconverged estimate
    #[arg(long)]
    pub strict: bool,
}

pub fn run_yield(args: YieldArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut yield_input: BondYieldInput = if let Some(ref path) = args.bond.input {
        input::file::read_input(path)?
    } else if let Some(piped) = input::stdin::read_stdin()? {
        piped
    } else {
        let bond = args.bond.bond()?;
        BondYieldInput {
            face_value: bond.face_value,
            coupon_rate_percent: bond.coupon_rate_percent,
            observed_price: args
                .price
                .ok_or("--price is required (or provide --input)")?,
            term_years: bond.term_years,
            frequency: bond.frequency,
            solver: SolverConfig::default(),
        }
    };

    if let Some(tolerance) = args.tolerance {
        yield_input.solver.tolerance = tolerance;
    }
    if let Some(max_iterations) = args.max_iterations {
        yield_input.solver.max_iterations = max_iterations;
    }

    let mut result = yields::calculate_bond_yield(&yield_input)?;
    if args.strict {
        result.result = result.result.into_converged()?;
    }
    Ok(serde_json::to_value(result)?)
}

/// Arguments for price sensitivity curves
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct SensitivityArgs {
    #[command(flatten)]
    pub bond: BondArgs,

    /// Base annual market rate in percent
    #[arg(long)]
    pub market_rate: Option<Decimal>,

    /// Rate step between points, in percent
    #[arg(long)]
    pub step: Option<Decimal>,

    /// Distance either side of the base rate, in percent
    #[arg(long)]
    pub half_width: Option<Decimal>,

    /// Lowest rate on either curve, in percent
    #[arg(long)]
    pub floor: Option<Decimal>,
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut sens_input: SensitivityInput = if let Some(ref path) = args.bond.input {
        input::file::read_input(path)?
    } else if let Some(piped) = input::stdin::read_stdin()? {
        piped
    } else {
        SensitivityInput {
            bond: args.bond.bond()?,
            market_rate_percent: args
                .market_rate
                .ok_or("--market-rate is required (or provide --input)")?,
            window: SweepWindow::default(),
        }
    };

    if let Some(step) = args.step {
        sens_input.window.step = step;
    }
    if let Some(half_width) = args.half_width {
        sens_input.window.half_width = half_width;
    }
    if let Some(floor) = args.floor {
        sens_input.window.floor = floor;
    }

    let result = sensitivity::sensitivity_curves(&sens_input)?;
    Ok(serde_json::to_value(result)?)
}
