//! Month-by-month amortisation of a level-pay loan, with optional prepayment.
//!
//! The simulator walks the loan one month at a time: interest accrues on the
//! opening balance, the instalment covers interest first, and any prepayment
//! due that month is applied on top of the scheduled principal. A single loop
//! serves both the plain schedule view and the prepayment comparison, so the
//! two can never drift apart. All math in `rust_decimal::Decimal`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::emi::{self, LoanInput, LoanSummary};
use crate::error::LoanCalcError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::LoanCalcResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Balance below this is treated as fully repaid and snapped to zero.
pub const BALANCE_EPSILON: Decimal = dec!(0.01);

// ---------------------------------------------------------------------------
// Policy types
// ---------------------------------------------------------------------------

/// How often a prepayment recurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrepaymentKind {
    /// A single extra payment in `start_month`.
    OneTime,
    /// Repeats every `frequency_months`, starting in `start_month`.
    Recurring { frequency_months: u32 },
}

/// An extra-principal payment plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentPolicy {
    pub kind: PrepaymentKind,
    /// Amount per occurrence.
    pub amount: Money,
    /// First month the payment applies (1-indexed).
    pub start_month: u32,
}

impl PrepaymentPolicy {
    /// Whether the policy calls for a payment in `month`.
    pub fn applies_in(&self, month: u32) -> bool {
        match self.kind {
            PrepaymentKind::OneTime => month == self.start_month,
            PrepaymentKind::Recurring { frequency_months } => {
                if frequency_months == 0 {
                    return false;
                }
                month >= self.start_month && (month - self.start_month) % frequency_months == 0
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Schedule types
// ---------------------------------------------------------------------------

/// One month of the amortisation schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortisationRow {
    /// Month number, 1-indexed.
    pub month: u32,
    /// Cash out this month: interest + scheduled principal + any prepayment.
    pub total_payment: Money,
    /// Scheduled principal plus any prepayment applied this month.
    pub principal_component: Money,
    pub interest_component: Money,
    /// Balance after this month's payments.
    pub remaining_balance: Money,
    /// True when the policy called for a prepayment this month.
    pub is_prepayment_month: bool,
}

/// Raw simulator output: the schedule plus its aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRun {
    pub rows: Vec<AmortisationRow>,
    /// Month in which the balance reached zero.
    pub terminal_month: u32,
    pub total_interest_paid: Money,
    pub total_prepayment_paid: Money,
    pub prepayment_occurrence_count: u32,
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

/// Walk a loan month by month until the balance reaches zero.
///
/// `schedule_horizon_months` is the expected tenure. The loop is bounded at
/// twice the horizon so a pathological input (an instalment below the monthly
/// interest, say) ends in `NonConvergence` instead of spinning forever. A
/// balance that overflows `Decimal` before the cap is reported the same way.
pub fn simulate(
    principal: Money,
    monthly_rate: Rate,
    emi: Money,
    schedule_horizon_months: u32,
    policy: Option<&PrepaymentPolicy>,
) -> LoanCalcResult<SimulationRun> {
    if principal <= Decimal::ZERO {
        return Err(LoanCalcError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if monthly_rate < Decimal::ZERO {
        return Err(LoanCalcError::InvalidInput {
            field: "monthly_rate".into(),
            reason: "Monthly rate cannot be negative".into(),
        });
    }
    if schedule_horizon_months == 0 {
        return Err(LoanCalcError::InvalidInput {
            field: "schedule_horizon_months".into(),
            reason: "Horizon must be at least 1 month".into(),
        });
    }
    if let Some(p) = policy {
        validate_policy(p)?;
    }

    let safety_cap = schedule_horizon_months.saturating_mul(2);

    let mut rows = Vec::with_capacity(schedule_horizon_months as usize);
    let mut balance = principal;
    let mut month = 0u32;
    let mut total_interest_paid = Decimal::ZERO;
    let mut total_prepayment_paid = Decimal::ZERO;
    let mut prepayment_occurrence_count = 0u32;

    while balance > Decimal::ZERO && month < safety_cap {
        month += 1;

        // A diverging balance overflows Decimal long before any realistic
        // horizon; checked arithmetic turns that into non-convergence at the
        // last finite state instead of a panic.
        let diverged = |b: Decimal| LoanCalcError::NonConvergence {
            months_simulated: month - 1,
            remaining_balance: b,
        };

        let interest = balance
            .checked_mul(monthly_rate)
            .ok_or_else(|| diverged(balance))?;
        total_interest_paid = total_interest_paid
            .checked_add(interest)
            .ok_or_else(|| diverged(balance))?;

        // The instalment covers interest first; never repay more principal
        // than remains. A negative component means the instalment does not
        // even cover interest and the balance grows.
        let scheduled_principal = (emi - interest).min(balance);
        let after_scheduled = balance
            .checked_sub(scheduled_principal)
            .ok_or_else(|| diverged(balance))?;

        let mut prepayment = Decimal::ZERO;
        let mut is_prepayment_month = false;
        if let Some(p) = policy {
            if p.applies_in(month) {
                // Clamped so the balance cannot go below zero. An occurrence
                // clamped to zero still counts and still flags the row.
                prepayment = p.amount.min(after_scheduled.max(Decimal::ZERO));
                total_prepayment_paid = total_prepayment_paid
                    .checked_add(prepayment)
                    .ok_or_else(|| diverged(balance))?;
                prepayment_occurrence_count += 1;
                is_prepayment_month = true;
            }
        }

        let total_payment = interest
            .checked_add(scheduled_principal)
            .and_then(|v| v.checked_add(prepayment))
            .ok_or_else(|| diverged(balance))?;

        balance = after_scheduled - prepayment;
        if balance < BALANCE_EPSILON {
            // Snap residual rounding to a clean payoff.
            balance = Decimal::ZERO;
        }

        rows.push(AmortisationRow {
            month,
            total_payment,
            principal_component: scheduled_principal + prepayment,
            interest_component: interest,
            remaining_balance: balance,
            is_prepayment_month,
        });
    }

    if balance > Decimal::ZERO {
        return Err(LoanCalcError::NonConvergence {
            months_simulated: month,
            remaining_balance: balance,
        });
    }

    Ok(SimulationRun {
        rows,
        terminal_month: month,
        total_interest_paid,
        total_prepayment_paid,
        prepayment_occurrence_count,
    })
}

// ---------------------------------------------------------------------------
// Loan analysis
// ---------------------------------------------------------------------------

/// Effect of a prepayment plan against the original repayment path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentSummary {
    /// Months to payoff under the plan.
    pub new_tenure_months: u32,
    pub new_total_interest: Money,
    /// Principal plus interest actually paid under the plan.
    pub new_total_amount: Money,
    pub interest_saved: Money,
    pub time_saved_months: u32,
    pub total_prepayment_made: Money,
    pub prepayment_occurrence_count: u32,
}

/// Input for a full loan analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAnalysisInput {
    pub loan: LoanInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepayment: Option<PrepaymentPolicy>,
}

/// Full analysis: aggregate figures, the month-by-month schedule, and the
/// prepayment comparison when a policy was supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAnalysis {
    pub summary: LoanSummary,
    pub schedule: Vec<AmortisationRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepayment: Option<PrepaymentSummary>,
}

/// Analyse a loan: EMI summary, amortisation schedule, and the effect of the
/// prepayment policy if one is given.
///
/// The schedule is the with-prepayment schedule when a policy is present and
/// the plain schedule otherwise. The no-prepayment side of the comparison
/// needs no second simulation: a level-pay loan's base interest is
/// `emi × tenure − principal` in closed form.
pub fn analyze_loan(input: &LoanAnalysisInput) -> LoanCalcResult<ComputationOutput<LoanAnalysis>> {
    let start = Instant::now();

    let (summary, mut warnings) = emi::summarise(&input.loan)?;

    if let Some(p) = &input.prepayment {
        validate_policy(p)?;
        if p.start_month > input.loan.tenure_months {
            warnings.push(format!(
                "Prepayment starts in month {} but the loan runs {} months; it will never apply",
                p.start_month, input.loan.tenure_months
            ));
        }
    }

    let rate = emi::monthly_rate(input.loan.annual_rate_pct);
    let run = simulate(
        input.loan.principal,
        rate,
        summary.emi,
        input.loan.tenure_months,
        input.prepayment.as_ref(),
    )?;

    let prepayment = input.prepayment.as_ref().map(|_| PrepaymentSummary {
        new_tenure_months: run.terminal_month,
        new_total_interest: run.total_interest_paid,
        new_total_amount: input.loan.principal + run.total_interest_paid,
        interest_saved: summary.total_interest - run.total_interest_paid,
        time_saved_months: input.loan.tenure_months.saturating_sub(run.terminal_month),
        total_prepayment_made: run.total_prepayment_paid,
        prepayment_occurrence_count: run.prepayment_occurrence_count,
    });

    let methodology = if prepayment.is_some() {
        "Level-Pay Amortisation with Prepayment"
    } else {
        "Level-Pay Amortisation"
    };

    let analysis = LoanAnalysis {
        summary,
        schedule: run.rows,
        prepayment,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, warnings, elapsed, analysis))
}

fn validate_policy(policy: &PrepaymentPolicy) -> LoanCalcResult<()> {
    if policy.amount <= Decimal::ZERO {
        return Err(LoanCalcError::InvalidInput {
            field: "amount".into(),
            reason: "Prepayment amount must be positive".into(),
        });
    }
    if policy.start_month == 0 {
        return Err(LoanCalcError::InvalidInput {
            field: "start_month".into(),
            reason: "Start month is 1-indexed and must be at least 1".into(),
        });
    }
    if let PrepaymentKind::Recurring { frequency_months } = policy.kind {
        if frequency_months == 0 {
            return Err(LoanCalcError::InvalidInput {
                field: "frequency_months".into(),
                reason: "Recurring frequency must be at least 1 month".into(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
