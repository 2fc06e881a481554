use loan_calc_core::amortisation::{
    self, LoanAnalysisInput, PrepaymentKind, PrepaymentPolicy,
};
use loan_calc_core::emi::{self, LoanInput};
use loan_calc_core::LoanCalcError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// EMI calculation tests
// ===========================================================================

fn standard_loan() -> LoanInput {
    LoanInput {
        principal: dec!(7_000_000),
        annual_rate_pct: dec!(7.1),
        tenure_months: 161,
    }
}

#[test]
fn test_emi_standard_home_loan() {
    // 7,000,000 at 7.1% over 161 months => EMI 67,544.89
    let result = emi::compute_emi(&standard_loan()).unwrap();
    let summary = &result.result;

    assert!(
        (summary.emi - dec!(67_544.89)).abs() < dec!(0.01),
        "Expected EMI ~67,544.89, got {}",
        summary.emi
    );
    assert!(
        (summary.total_amount - dec!(10_874_727.22)).abs() < dec!(0.01),
        "Expected total ~10,874,727.22, got {}",
        summary.total_amount
    );
    assert!(
        (summary.total_interest - dec!(3_874_727.22)).abs() < dec!(0.01),
        "Expected interest ~3,874,727.22, got {}",
        summary.total_interest
    );
}

#[test]
fn test_emi_closed_form_matches_simulation() {
    // The simulator walking month by month must land on the same total
    // interest the closed form predicts.
    let loan = standard_loan();
    let summary = emi::compute_emi(&loan).unwrap().result;

    let run = amortisation::simulate(
        loan.principal,
        emi::monthly_rate(loan.annual_rate_pct),
        summary.emi,
        loan.tenure_months,
        None,
    )
    .unwrap();

    assert_eq!(run.terminal_month, loan.tenure_months);
    assert!(
        (run.total_interest_paid - summary.total_interest).abs() < dec!(0.05),
        "Simulated interest {} drifted from closed form {}",
        run.total_interest_paid,
        summary.total_interest
    );
}

// ===========================================================================
// Full analysis pipeline tests
// ===========================================================================

fn analysis(loan: LoanInput, prepayment: Option<PrepaymentPolicy>) -> LoanAnalysisInput {
    LoanAnalysisInput { loan, prepayment }
}

#[test]
fn test_schedule_reconciles_to_principal() {
    let result = amortisation::analyze_loan(&analysis(standard_loan(), None)).unwrap();
    let out = &result.result;

    assert_eq!(out.schedule.len(), 161);
    assert_eq!(out.schedule.last().unwrap().remaining_balance, Decimal::ZERO);

    let principal_paid: Decimal = out.schedule.iter().map(|r| r.principal_component).sum();
    let interest_paid: Decimal = out.schedule.iter().map(|r| r.interest_component).sum();

    assert!(
        (principal_paid - dec!(7_000_000)).abs() < dec!(0.05),
        "Principal components should sum to the principal, got {}",
        principal_paid
    );
    assert!(
        (interest_paid - out.summary.total_interest).abs() < dec!(0.05),
        "Interest components should sum to total interest, got {}",
        interest_paid
    );

    // Level pay: every instalment equals the EMI (the final one may be
    // fractionally smaller after the payoff snap).
    for row in &out.schedule[..out.schedule.len() - 1] {
        assert!(
            (row.total_payment - out.summary.emi).abs() < dec!(0.01),
            "Month {} payment {} should equal the EMI",
            row.month,
            row.total_payment
        );
    }
}

#[test]
fn test_one_time_prepayment_on_standard_loan() {
    // A 50k lump sum in month 12 trims one instalment and ~70k of interest.
    let policy = PrepaymentPolicy {
        kind: PrepaymentKind::OneTime,
        amount: dec!(50_000),
        start_month: 12,
    };
    let result = amortisation::analyze_loan(&analysis(standard_loan(), Some(policy))).unwrap();
    let prepayment = result.result.prepayment.as_ref().unwrap();

    assert_eq!(prepayment.new_tenure_months, 160);
    assert_eq!(prepayment.time_saved_months, 1);
    assert_eq!(prepayment.prepayment_occurrence_count, 1);
    assert_eq!(prepayment.total_prepayment_made, dec!(50_000));
    assert!(
        (prepayment.interest_saved - dec!(70_111.74)).abs() < dec!(0.01),
        "Expected ~70,111.74 saved, got {}",
        prepayment.interest_saved
    );
}

#[test]
fn test_analysis_input_parses_from_json() {
    // The documented input shape: decimals as strings, policy kind tagged.
    let input: LoanAnalysisInput = serde_json::from_str(
        r#"{
            "loan": {
                "principal": "500000",
                "annual_rate_pct": "6",
                "tenure_months": 60
            },
            "prepayment": {
                "kind": { "Recurring": { "frequency_months": 6 } },
                "amount": "10000",
                "start_month": 6
            }
        }"#,
    )
    .unwrap();

    let result = amortisation::analyze_loan(&input).unwrap();
    let prepayment = result.result.prepayment.as_ref().unwrap();

    assert_eq!(prepayment.new_tenure_months, 51);
    assert_eq!(prepayment.prepayment_occurrence_count, 8);
}

#[test]
fn test_analysis_output_serialises_decimals_as_strings() {
    let result = amortisation::analyze_loan(&analysis(standard_loan(), None)).unwrap();
    let value = serde_json::to_value(&result).unwrap();

    let emi_field = &value["result"]["summary"]["emi"];
    let text = emi_field
        .as_str()
        .expect("Decimal fields should serialise as JSON strings");
    let parsed: Decimal = text.parse().unwrap();
    assert!((parsed - dec!(67_544.89)).abs() < dec!(0.01));

    // Optional sections are omitted, not null.
    assert!(value["result"]["prepayment"].is_null());
    assert!(value["result"]["schedule"].is_array());
}

// ===========================================================================
// Prepayment effect properties
// ===========================================================================

fn ten_year_loan() -> LoanInput {
    LoanInput {
        principal: dec!(1_000_000),
        annual_rate_pct: dec!(8),
        tenure_months: 120,
    }
}

#[test]
fn test_larger_prepayment_never_hurts() {
    // 1M at 8% over 120 months; one-time prepayments of increasing size in
    // month 12. Tenure should only shrink and savings only grow.
    let amounts = [dec!(50_000), dec!(100_000), dec!(200_000), dec!(400_000)];
    let expected_tenures = [112u32, 104, 90, 65];

    let mut prev_tenure = 120u32;
    let mut prev_saved = Decimal::ZERO;
    for (amount, expected_tenure) in amounts.iter().zip(expected_tenures) {
        let policy = PrepaymentPolicy {
            kind: PrepaymentKind::OneTime,
            amount: *amount,
            start_month: 12,
        };
        let result = amortisation::analyze_loan(&analysis(ten_year_loan(), Some(policy))).unwrap();
        let prepayment = result.result.prepayment.as_ref().unwrap();

        assert_eq!(prepayment.new_tenure_months, expected_tenure);
        assert!(
            prepayment.new_tenure_months <= prev_tenure,
            "Prepaying {} should not lengthen the loan",
            amount
        );
        assert!(
            prepayment.interest_saved >= prev_saved,
            "Prepaying {} should not reduce the savings",
            amount
        );
        prev_tenure = prepayment.new_tenure_months;
        prev_saved = prepayment.interest_saved;
    }
}

#[test]
fn test_recurring_prepayment_end_to_end() {
    // 500k at 6% over 60 months, 10k every 6 months from month 6.
    let policy = PrepaymentPolicy {
        kind: PrepaymentKind::Recurring {
            frequency_months: 6,
        },
        amount: dec!(10_000),
        start_month: 6,
    };
    let loan = LoanInput {
        principal: dec!(500_000),
        annual_rate_pct: dec!(6),
        tenure_months: 60,
    };
    let result = amortisation::analyze_loan(&analysis(loan, Some(policy))).unwrap();
    let out = &result.result;
    let prepayment = out.prepayment.as_ref().unwrap();

    assert_eq!(prepayment.new_tenure_months, 51);
    assert_eq!(prepayment.time_saved_months, 9);
    assert_eq!(prepayment.prepayment_occurrence_count, 8);
    assert_eq!(prepayment.total_prepayment_made, dec!(80_000));
    assert!(
        (prepayment.interest_saved - dec!(12_520.56)).abs() < dec!(0.01),
        "Expected ~12,520.56 saved, got {}",
        prepayment.interest_saved
    );
    assert_eq!(
        prepayment.new_total_amount,
        dec!(500_000) + prepayment.new_total_interest
    );

    let flagged: Vec<u32> = out
        .schedule
        .iter()
        .filter(|r| r.is_prepayment_month)
        .map(|r| r.month)
        .collect();
    assert_eq!(flagged, vec![6, 12, 18, 24, 30, 36, 42, 48]);
}

#[test]
fn test_prepayment_conserves_principal() {
    // Extra payments change the path, never the amount of principal repaid.
    let policy = PrepaymentPolicy {
        kind: PrepaymentKind::OneTime,
        amount: dec!(100_000),
        start_month: 12,
    };
    let result = amortisation::analyze_loan(&analysis(ten_year_loan(), Some(policy))).unwrap();

    let principal_paid: Decimal = result
        .result
        .schedule
        .iter()
        .map(|r| r.principal_component)
        .sum();
    assert!(
        (principal_paid - dec!(1_000_000)).abs() < dec!(0.05),
        "Principal repaid should equal principal borrowed, got {}",
        principal_paid
    );
}

// ===========================================================================
// Error handling
// ===========================================================================

#[test]
fn test_invalid_loan_rejected() {
    let mut loan = standard_loan();
    loan.principal = Decimal::ZERO;
    let err = amortisation::analyze_loan(&analysis(loan, None)).unwrap_err();
    match err {
        LoanCalcError::InvalidInput { field, .. } => assert_eq!(field, "principal"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }

    let mut loan = standard_loan();
    loan.annual_rate_pct = dec!(-1);
    assert!(amortisation::analyze_loan(&analysis(loan, None)).is_err());

    let mut loan = standard_loan();
    loan.tenure_months = 0;
    assert!(amortisation::analyze_loan(&analysis(loan, None)).is_err());
}

#[test]
fn test_invalid_policy_rejected() {
    let policy = PrepaymentPolicy {
        kind: PrepaymentKind::OneTime,
        amount: dec!(-500),
        start_month: 12,
    };
    let err = amortisation::analyze_loan(&analysis(standard_loan(), Some(policy))).unwrap_err();
    match err {
        LoanCalcError::InvalidInput { field, .. } => assert_eq!(field, "amount"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_extreme_rate_surfaces_as_error() {
    // 710% p.a. over 30 years passes validation (with a warning) but the
    // growth factor is not representable; that comes back as an error value
    // for the caller to print, never an abort.
    let loan = LoanInput {
        principal: dec!(7_000_000),
        annual_rate_pct: dec!(710),
        tenure_months: 360,
    };
    let err = amortisation::analyze_loan(&analysis(loan, None)).unwrap_err();
    let message = err.to_string();
    assert!(
        message.starts_with("Financial impossibility"),
        "Unexpected message: {message}"
    );
    assert!(matches!(err, LoanCalcError::FinancialImpossibility(_)));
}

#[test]
fn test_error_messages_name_the_field() {
    let mut loan = standard_loan();
    loan.tenure_months = 0;
    let err = amortisation::analyze_loan(&analysis(loan, None)).unwrap_err();
    let message = err.to_string();
    assert!(
        message.contains("Invalid input: tenure_months"),
        "Unexpected message: {message}"
    );
}

#[test]
fn test_malformed_json_maps_to_serialization_error() {
    // Boundary callers convert parse failures with From<serde_json::Error>.
    let parse_error = serde_json::from_str::<LoanAnalysisInput>("{not json").unwrap_err();
    let err = LoanCalcError::from(parse_error);
    match err {
        LoanCalcError::SerializationError(_) => {}
        other => panic!("Expected SerializationError, got {other:?}"),
    }
}
