use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_calc_core::amortisation::{self, LoanAnalysisInput};
use loan_calc_core::emi::LoanInput;

use crate::input;

/// Arguments for the amortisation schedule
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ScheduleArgs {
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

    /// Extra payment amount per occurrence
    #[arg(long)]
    pub prepay_amount: Option<Decimal>,

    /// First month the extra payment applies (1-indexed)
    #[arg(long)]
    pub prepay_start_month: Option<u32>,

    /// Repeat the extra payment every N months (omit for one-time)
    #[arg(long)]
    pub prepay_every: Option<u32>,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let analysis_input: LoanAnalysisInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        LoanAnalysisInput {
            loan: LoanInput {
                principal: args
                    .principal
                    .ok_or("--principal is required (or provide --input)")?,
                annual_rate_pct: args
                    .annual_rate
                    .ok_or("--annual-rate is required (or provide --input)")?,
                tenure_months: super::resolve_tenure(args.tenure_months, args.tenure_years)?,
            },
            prepayment: super::policy_from_flags(
                args.prepay_amount,
                args.prepay_start_month,
                args.prepay_every,
            )?,
        }
    };

    let result = amortisation::analyze_loan(&analysis_input)?;
    Ok(serde_json::to_value(result)?)
}
