pub mod emi;
pub mod prepayment;
pub mod schedule;

use rust_decimal::Decimal;

use loan_calc_core::amortisation::{PrepaymentKind, PrepaymentPolicy};

/// Months from whichever tenure flag was given. Years convert to months at
/// this boundary; the engine only ever sees months.
pub(crate) fn resolve_tenure(
    months: Option<u32>,
    years: Option<u32>,
) -> Result<u32, Box<dyn std::error::Error>> {
    if let Some(months) = months {
        return Ok(months);
    }
    if let Some(years) = years {
        return Ok(years.saturating_mul(12));
    }
    Err("--tenure-months or --tenure-years is required (or provide --input)".into())
}

/// Build a prepayment policy from the optional flag set. Passing
/// `--prepay-every` selects a recurring plan; otherwise the payment is
/// one-time. All-absent means no policy.
pub(crate) fn policy_from_flags(
    amount: Option<Decimal>,
    start_month: Option<u32>,
    every: Option<u32>,
) -> Result<Option<PrepaymentPolicy>, Box<dyn std::error::Error>> {
    if amount.is_none() && start_month.is_none() && every.is_none() {
        return Ok(None);
    }

    let amount = amount.ok_or("--prepay-amount is required when prepayment flags are used")?;
    let start_month =
        start_month.ok_or("--prepay-start-month is required when prepayment flags are used")?;
    let kind = match every {
        Some(frequency_months) => PrepaymentKind::Recurring { frequency_months },
        None => PrepaymentKind::OneTime,
    };

    Ok(Some(PrepaymentPolicy {
        kind,
        amount,
        start_month,
    }))
}
