use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_calc_core::emi::{self, LoanInput};

use crate::input;

/// Arguments for EMI calculation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct EmiArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate as a percentage (7.1 = 7.1%)
    #[arg(long)]
    pub annual_rate: Option<Decimal>,

    /// Loan tenure in months
    #[arg(long, conflicts_with = "tenure_years")]
    pub tenure_months: Option<u32>,

    /// Loan tenure in years (converted to months)
    #[arg(long)]
    pub tenure_years: Option<u32>,
}

pub fn run_emi(args: EmiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan: LoanInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        LoanInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_pct: args
                .annual_rate
                .ok_or("--annual-rate is required (or provide --input)")?,
            tenure_months: super::resolve_tenure(args.tenure_months, args.tenure_years)?,
        }
    };

    let result = emi::compute_emi(&loan)?;
    Ok(serde_json::to_value(result)?)
}
