mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::emi::EmiArgs;
use commands::prepayment::PrepaymentArgs;
use commands::schedule::ScheduleArgs;

/// Loan EMI and amortisation calculations
#[derive(Parser)]
#[command(
    name = "loan",
    version,
    about = "Loan EMI and amortisation calculations",
    long_about = "A CLI for loan calculations with decimal precision. Computes the \
                  equated monthly instalment, the month-by-month amortisation \
                  schedule, and the interest and time saved by one-time or \
                  recurring prepayments.\n\nExample: loan schedule --principal 7000000 \
                  --annual-rate 7.1 --tenure-months 161 --prepay-amount 50000 \
                  --prepay-start-month 12"
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
    /// Calculate the equated monthly instalment for a loan
    Emi(EmiArgs),
    /// Generate the month-by-month amortisation schedule
    Schedule(ScheduleArgs),
    /// Model the effect of prepayments on a loan
    Prepayment(PrepaymentArgs),
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
        Commands::Emi(args) => commands::emi::run_emi(args),
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::Prepayment(args) => commands::prepayment::run_prepayment(args),
        Commands::Version => {
            println!("loan {}", env!("CARGO_PKG_VERSION"));
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
