mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::bond::{PriceArgs, SensitivityArgs, YieldArgs};

/// Fixed-coupon bond price and yield calculations
#[derive(Parser)]
#[command(
    name = "yieldr",
    version,
    about = "Fixed-coupon bond price and yield calculations",
    long_about = "A CLI for pricing plain fixed-coupon bonds from a market rate and \
                  recovering current yield and yield-to-maturity from an observed price, \
                  with decimal precision. Rates are given in percent."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Enable debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a bond from its market (discount) rate
    Price(PriceArgs),
    /// Current yield and yield-to-maturity from an observed price
    Yield(YieldArgs),
    /// Price sensitivity to coupon rate and market rate
    Sensitivity(SensitivityArgs),
    /// Show the pricing formula with values substituted
    Explain(PriceArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Price(args) => commands::bond::run_price(args),
        Commands::Yield(args) => commands::bond::run_yield(args),
        Commands::Sensitivity(args) => commands::bond::run_sensitivity(args),
        Commands::Explain(args) => commands::bond::run_explain(args),
        Commands::Version => {
            println!("yieldr {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
