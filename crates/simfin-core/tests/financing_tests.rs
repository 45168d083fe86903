use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use simfin_core::financing::sac::simulate_by_term;
use simfin_core::financing::search::{simulate_by_budget, MIN_SEARCH_TERM};
use simfin_core::financing::{
    simulate_financing, ByBudgetRequest, ByTermRequest, FinancingOutput, FinancingRequest,
    LoanTerms,
};
use simfin_core::{round_money, SimfinError, MAX_TERM_MONTHS};

// ===========================================================================
// Fixtures
// ===========================================================================

fn reference_terms() -> LoanTerms {
    // 250k property, 35% down, 8.47% a.a., R$120 monthly charges
    LoanTerms {
        property_price: dec!(250_000),
        down_payment: dec!(87_500),
        annual_interest_rate: dec!(0.0847),
        annual_tr_rate: Decimal::ZERO,
        annual_ipca_rate: Decimal::ZERO,
        monthly_charges: dec!(120),
        official_max_term: 360,
    }
}

fn indexed_terms() -> LoanTerms {
    LoanTerms {
        annual_tr_rate: dec!(0.02),
        annual_ipca_rate: dec!(0.06),
        ..reference_terms()
    }
}

fn by_term(terms: LoanTerms, term_months: u32) -> ByTermRequest {
    ByTermRequest { terms, term_months }
}

// ===========================================================================
// By-term
// ===========================================================================

#[test]
fn test_reference_scenario_360_months() {
    let r = simulate_by_term(&by_term(reference_terms(), 360)).unwrap();

    assert_eq!(r.term_used, 360);
    assert_eq!(r.installments.len(), 360);
    assert!(r.installments[0].installment > Decimal::ZERO);
    assert!(r.first_installment >= r.last_installment);
    assert_eq!(r.first_installment, r.installments[0].installment);
    assert_eq!(r.last_installment, r.installments[359].installment);

    // 162500 / 360 = 451.388... per month
    assert_eq!(r.installments[0].amortization, dec!(451.39));
}

#[test]
fn test_final_balance_is_zero_without_indices() {
    for term in [1u32, 6, 7, 59, 120, 241, 360] {
        let r = simulate_by_term(&by_term(reference_terms(), term)).unwrap();
        assert_eq!(
            r.installments.last().unwrap().balance,
            dec!(0.00),
            "term {} left a balance",
            term
        );
    }
}

#[test]
fn test_indexed_schedule_amortizes_planned_amount_every_month() {
    for term in [6u32, 120, 360] {
        let r = simulate_by_term(&by_term(indexed_terms(), term)).unwrap();
        let planned = round_money(dec!(162_500) / Decimal::from(term));
        for line in &r.installments {
            assert!(
                line.amortization <= planned,
                "term {} month {} amortized {}",
                term,
                line.month,
                line.amortization
            );
        }
        // The correction-driven residual stays on the books after the final month.
        assert!(r.installments.last().unwrap().balance > Decimal::ZERO);
    }
}

#[test]
fn test_indexed_last_installment_is_not_a_balloon() {
    let r = simulate_by_term(&by_term(indexed_terms(), 360)).unwrap();
    let last = r.installments.last().unwrap();
    assert_eq!(last.amortization, dec!(451.39));
    // Recorded parts are rounded separately, so they may differ by a cent.
    assert!((last.installment - last.amortization - last.interest - dec!(120)).abs() <= dec!(0.01));
}

#[test]
fn test_balance_never_increases_without_indices() {
    let r = simulate_by_term(&by_term(reference_terms(), 240)).unwrap();
    let mut previous = dec!(162_500);
    for line in &r.installments {
        assert!(line.balance <= previous);
        previous = line.balance;
    }
}

#[test]
fn test_indices_raise_the_cost() {
    let flat = simulate_by_term(&by_term(reference_terms(), 360)).unwrap();
    let indexed = simulate_by_term(&by_term(indexed_terms(), 360)).unwrap();

    assert!(indexed.first_installment > flat.first_installment);
    assert!(indexed.total_paid > flat.total_paid);
    // Interest in month 1 is charged on the already-corrected balance.
    assert!(indexed.installments[0].interest > flat.installments[0].interest);
}

#[test]
fn test_strong_correction_can_push_last_installment_above_first() {
    let terms = LoanTerms {
        annual_interest_rate: dec!(0.01),
        annual_ipca_rate: dec!(0.12),
        ..reference_terms()
    };
    let r = simulate_by_term(&by_term(terms, 360)).unwrap();
    assert!(r.last_installment > r.first_installment);
}

#[test]
fn test_term_outside_ceiling_is_rejected() {
    let mut terms = reference_terms();
    terms.official_max_term = 240;
    let err = simulate_by_term(&by_term(terms, 300)).unwrap_err();
    assert!(matches!(
        err,
        SimfinError::InvalidTerm {
            term: 300,
            ceiling: 240
        }
    ));
}

// ===========================================================================
// By-budget
// ===========================================================================

#[test]
fn test_budget_result_is_within_budget() {
    for budget in [dec!(200_000), dec!(250_000), dec!(300_000), dec!(400_000)] {
        let outcome = simulate_by_budget(&ByBudgetRequest {
            terms: reference_terms(),
            max_total_paid: budget,
        })
        .unwrap();
        assert!(
            outcome.schedule.total_paid <= budget || outcome.schedule.term_used == MIN_SEARCH_TERM
        );
        if outcome.budget_met {
            assert!(outcome.schedule.total_paid <= budget);
        }
    }
}

#[test]
fn test_budget_schedule_matches_direct_simulation() {
    let outcome = simulate_by_budget(&ByBudgetRequest {
        terms: reference_terms(),
        max_total_paid: dec!(250_000),
    })
    .unwrap();
    assert!(outcome.budget_met);

    let direct = simulate_by_term(&by_term(reference_terms(), outcome.schedule.term_used)).unwrap();
    assert_eq!(outcome.schedule.installments, direct.installments);
    assert_eq!(outcome.schedule.total_paid, direct.total_paid);
}

#[test]
fn test_infeasible_budget_returns_minimum_term_schedule() {
    // Financing 162.5k can never cost less than the principal itself.
    let outcome = simulate_by_budget(&ByBudgetRequest {
        terms: reference_terms(),
        max_total_paid: dec!(100_000),
    })
    .unwrap();
    assert!(!outcome.budget_met);
    assert_eq!(outcome.schedule.term_used, 6);
    assert_eq!(outcome.schedule.installments.len(), 6);
    assert!(outcome.schedule.total_paid > dec!(100_000));
    assert_eq!(outcome.candidates_evaluated, 355);
}

#[test]
fn test_indexed_budget_search_stays_within_budget() {
    let outcome = simulate_by_budget(&ByBudgetRequest {
        terms: indexed_terms(),
        max_total_paid: dec!(400_000),
    })
    .unwrap();
    assert!(outcome.budget_met);
    assert!(outcome.schedule.total_paid <= dec!(400_000));

    let planned = round_money(dec!(162_500) / Decimal::from(outcome.schedule.term_used));
    for line in &outcome.schedule.installments {
        assert!(line.amortization <= planned);
    }
}

#[test]
fn test_oversized_official_term_is_rejected() {
    let mut terms = reference_terms();
    terms.official_max_term = MAX_TERM_MONTHS + 1;
    assert!(matches!(
        simulate_by_term(&by_term(terms.clone(), 12)),
        Err(SimfinError::InvalidInput { .. })
    ));
    assert!(matches!(
        simulate_by_budget(&ByBudgetRequest {
            terms,
            max_total_paid: dec!(400_000),
        }),
        Err(SimfinError::InvalidInput { .. })
    ));
}

#[test]
fn test_negative_budget_is_rejected() {
    let err = simulate_by_budget(&ByBudgetRequest {
        terms: reference_terms(),
        max_total_paid: dec!(-1),
    })
    .unwrap_err();
    assert!(matches!(err, SimfinError::InvalidBudget(_)));
}

// ===========================================================================
// Envelope
// ===========================================================================

#[test]
fn test_envelope_round_trips_through_json() {
    let req = FinancingRequest::ByTerm(by_term(reference_terms(), 12));
    let out = simulate_financing(&req).unwrap();
    let value = serde_json::to_value(&out).unwrap();

    assert_eq!(value["metadata"]["precision"], "rust_decimal_128bit");
    assert_eq!(value["assumptions"]["ByTerm"]["term_months"], 12);
    let installments = value["result"]["ByTerm"]["installments"].as_array().unwrap();
    assert_eq!(installments.len(), 12);
    // Decimals serialize as exact strings.
    assert!(installments[0]["installment"].is_string());
}

#[test]
fn test_envelope_by_budget_reports_outcome() {
    let req = FinancingRequest::ByBudget(ByBudgetRequest {
        terms: reference_terms(),
        max_total_paid: dec!(300_000),
    });
    let out = simulate_financing(&req).unwrap();
    assert!(out.warnings.is_empty());
    match out.result {
        FinancingOutput::ByBudget(outcome) => {
            assert!(outcome.budget_met);
            assert!(outcome.schedule.total_paid <= dec!(300_000));
        }
        _ => panic!("Expected ByBudget output"),
    }
}
