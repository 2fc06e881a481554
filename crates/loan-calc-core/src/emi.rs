//! Equated monthly instalment (EMI) calculation for level-pay loans.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LoanCalcError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::LoanCalcResult;

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

/// A level-pay loan request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    /// Amount borrowed.
    pub principal: Money,
    /// Annual interest rate as a percentage (7.1 = 7.1% p.a.).
    pub annual_rate_pct: Rate,
    /// Loan tenure in months. Callers working in years multiply by 12 first.
    pub tenure_months: u32,
}

/// Aggregate repayment figures, independent of any prepayment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSummary {
    /// Fixed monthly instalment.
    pub emi: Money,
    pub total_principal: Money,
    pub total_interest: Money,
    /// Paid over the life of the loan: principal + interest.
    pub total_amount: Money,
    pub tenure_months: u32,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the equated monthly instalment and aggregate totals for a loan.
pub fn compute_emi(input: &LoanInput) -> LoanCalcResult<ComputationOutput<LoanSummary>> {
    let start = Instant::now();

    let (summary, warnings) = summarise(input)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Equated Monthly Instalment (level-pay closed form)",
        input,
        warnings,
        elapsed,
        summary,
    ))
}

/// Summary without the output envelope. The amortisation analysis reuses this
/// and wraps its own envelope.
pub(crate) fn summarise(input: &LoanInput) -> LoanCalcResult<(LoanSummary, Vec<String>)> {
    let mut warnings: Vec<String> = Vec::new();
    validate_loan(input)?;

    if input.annual_rate_pct > dec!(50) {
        warnings.push(format!(
            "Annual rate {}% is unusually high; check the input is a percentage, not a decimal",
            input.annual_rate_pct
        ));
    }

    let rate = monthly_rate(input.annual_rate_pct);
    let emi = emi_payment(input.principal, rate, input.tenure_months)?;

    let total_amount = emi
        .checked_mul(Decimal::from(input.tenure_months))
        .ok_or_else(|| {
            LoanCalcError::FinancialImpossibility(format!(
                "Total repayment overflow: {} instalments of {emi}",
                input.tenure_months
            ))
        })?;
    let total_interest = total_amount - input.principal;

    Ok((
        LoanSummary {
            emi,
            total_principal: input.principal,
            total_interest,
            total_amount,
            tenure_months: input.tenure_months,
        },
        warnings,
    ))
}

// ---------------------------------------------------------------------------
// Rate and payment helpers
// ---------------------------------------------------------------------------

/// Convert an annual percentage rate to a per-month decimal rate.
pub fn monthly_rate(annual_rate_pct: Rate) -> Rate {
    annual_rate_pct / dec!(12) / dec!(100)
}

/// Level-pay instalment: P · r · (1+r)^n / ((1+r)^n − 1).
///
/// The closed form is 0/0 at a zero rate; that case degenerates to equal
/// principal instalments of P / n.
pub fn emi_payment(
    principal: Money,
    monthly_rate: Rate,
    tenure_months: u32,
) -> LoanCalcResult<Money> {
    if tenure_months == 0 {
        return Err(LoanCalcError::InvalidInput {
            field: "tenure_months".into(),
            reason: "Tenure must be at least 1 month".into(),
        });
    }
    if monthly_rate < Decimal::ZERO {
        return Err(LoanCalcError::InvalidInput {
            field: "monthly_rate".into(),
            reason: "Monthly rate cannot be negative".into(),
        });
    }

    if monthly_rate.is_zero() {
        return Ok(principal / Decimal::from(tenure_months));
    }

    let factor = compound(monthly_rate, tenure_months)?;
    // The factor alone can be representable while P · r · factor is not.
    principal
        .checked_mul(monthly_rate)
        .and_then(|v| v.checked_mul(factor))
        .and_then(|v| v.checked_div(factor - Decimal::ONE))
        .ok_or_else(|| {
            LoanCalcError::FinancialImpossibility(format!(
                "Instalment overflow: {principal} at monthly rate {monthly_rate} \
                 over {tenure_months} months"
            ))
        })
}

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
/// Overflow surfaces as `FinancialImpossibility` rather than a panic.
fn compound(rate: Rate, n: u32) -> LoanCalcResult<Decimal> {
    let mut result = Decimal::ONE;
    let factor = Decimal::ONE + rate;
    for _ in 0..n {
        result = result.checked_mul(factor).ok_or_else(|| {
            LoanCalcError::FinancialImpossibility(format!(
                "Growth factor overflow: (1 + {rate})^{n} is not representable"
            ))
        })?;
    }
    Ok(result)
}

fn validate_loan(input: &LoanInput) -> LoanCalcResult<()> {
    if input.principal <= Decimal::ZERO {
        return Err(LoanCalcError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if input.annual_rate_pct <= Decimal::ZERO {
        return Err(LoanCalcError::InvalidInput {
            field: "annual_rate_pct".into(),
            reason: "Annual rate must be positive".into(),
        });
    }
    if input.tenure_months == 0 {
        return Err(LoanCalcError::InvalidInput {
            field: "tenure_months".into(),
            reason: "Tenure must be at least 1 month".into(),
        });
    }
    Ok(())
}
