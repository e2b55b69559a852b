mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::credit::AmortizeArgs;
use commands::mortgage::MortgageArgs;
use commands::savings::{SavingsArgs, ScenariosArgs, TargetArgs};

/// Household finance projections
#[derive(Parser)]
#[command(
    name = "finplan",
    version,
    about = "Household finance projections with decimal precision",
    long_about = "Deterministic projections for household finance decisions: \
                  debt payoff schedules, mortgage overpayment simulations, \
                  Low/Base/High investment and drawdown trajectories, savings \
                  growth, and time-to-target answers."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Loan payoff: time at a fixed payment, or payment for a fixed term
    Amortize(AmortizeArgs),
    /// Low/Base/High balance trajectories for growth or drawdown
    Scenarios(ScenariosArgs),
    /// Months until a target balance is reached
    Target(TargetArgs),
    /// Mortgage overpayment simulation (interest-only or repayment)
    Mortgage(MortgageArgs),
    /// Fixed-term savings projection
    Savings(SavingsArgs),
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

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Amortize(args) => commands::credit::run_amortize(args),
        Commands::Scenarios(args) => commands::savings::run_scenarios(args),
        Commands::Target(args) => commands::savings::run_target(args),
        Commands::Mortgage(args) => commands::mortgage::run_mortgage(args),
        Commands::Savings(args) => commands::savings::run_savings(args),
        Commands::Version => {
            println!("finplan {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
