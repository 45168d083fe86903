use log::{debug, warn};
use rust_decimal::Decimal;

use crate::error::SimfinError;
use crate::financing::sac::simulate_by_term;
use crate::financing::{validate_terms, BudgetSearchOutcome, ByBudgetRequest, ByTermRequest};
use crate::SimfinResult;

/// Shortest term considered by the budget search, and the fallback term.
pub const MIN_SEARCH_TERM: u32 = 6;

/// Find the longest term whose total paid stays within the budget.
///
/// Terms are scanned in ascending order from [`MIN_SEARCH_TERM`] through the
/// official ceiling, and the last one that fits wins. The scan does not assume
/// total cost grows with the term; if it doesn't, the result is still the last
/// qualifying term in scan order.
///
/// When no term fits, the minimum-term schedule is returned with
/// `budget_met = false`.
pub fn simulate_by_budget(request: &ByBudgetRequest) -> SimfinResult<BudgetSearchOutcome> {
    validate_terms(&request.terms)?;

    if request.max_total_paid <= Decimal::ZERO {
        return Err(SimfinError::InvalidBudget(request.max_total_paid));
    }
    let ceiling = request.terms.official_max_term;
    if ceiling < MIN_SEARCH_TERM {
        return Err(SimfinError::InvalidTerm {
            term: MIN_SEARCH_TERM,
            ceiling,
        });
    }

    let mut best = None;
    let mut candidates_evaluated = 0u32;

    for term_months in MIN_SEARCH_TERM..=ceiling {
        let candidate = simulate_by_term(&ByTermRequest {
            terms: request.terms.clone(),
            term_months,
        })?;
        candidates_evaluated += 1;
        if candidate.total_paid <= request.max_total_paid {
            best = Some(candidate);
        }
    }

    let outcome = match best {
        Some(schedule) => {
            debug!(
                "budget {}: longest qualifying term {} months (total {}) after {} candidates",
                request.max_total_paid, schedule.term_used, schedule.total_paid, candidates_evaluated
            );
            BudgetSearchOutcome {
                budget_met: true,
                max_total_paid: request.max_total_paid,
                candidates_evaluated,
                schedule,
            }
        }
        None => {
            warn!(
                "budget {} not achievable within {} months; falling back to {} months",
                request.max_total_paid, ceiling, MIN_SEARCH_TERM
            );
            let schedule = simulate_by_term(&ByTermRequest {
                terms: request.terms.clone(),
                term_months: MIN_SEARCH_TERM,
            })?;
            BudgetSearchOutcome {
                budget_met: false,
                max_total_paid: request.max_total_paid,
                candidates_evaluated,
                schedule,
            }
        }
    };

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::financing::LoanTerms;
    use crate::types::{round_money, MAX_TERM_MONTHS};
    use rust_decimal_macros::dec;

    fn request(max_total_paid: Decimal, official_max_term: u32) -> ByBudgetRequest {
        ByBudgetRequest {
            terms: LoanTerms {
                property_price: dec!(100_000),
                down_payment: dec!(20_000),
                annual_interest_rate: dec!(0.10),
                annual_tr_rate: Decimal::ZERO,
                annual_ipca_rate: Decimal::ZERO,
                monthly_charges: dec!(25),
                official_max_term,
            },
            max_total_paid,
        }
    }

    #[test]
    fn test_picks_longest_term_within_budget() {
        let req = request(dec!(95_000), 120);
        let outcome = simulate_by_budget(&req).unwrap();
        assert!(outcome.budget_met);
        assert!(outcome.schedule.total_paid <= dec!(95_000));
        assert_eq!(outcome.candidates_evaluated, 115);

        // The next longer term must break the budget.
        let next = simulate_by_term(&ByTermRequest {
            terms: req.terms.clone(),
            term_months: outcome.schedule.term_used + 1,
        })
        .unwrap();
        assert!(next.total_paid > dec!(95_000));
    }

    #[test]
    fn test_generous_budget_reaches_ceiling() {
        let outcome = simulate_by_budget(&request(dec!(10_000_000), 48)).unwrap();
        assert!(outcome.budget_met);
        assert_eq!(outcome.schedule.term_used, 48);
    }

    #[test]
    fn test_infeasible_budget_falls_back_to_minimum_term() {
        let outcome = simulate_by_budget(&request(dec!(1_000), 360)).unwrap();
        assert!(!outcome.budget_met);
        assert_eq!(outcome.schedule.term_used, MIN_SEARCH_TERM);
        assert_eq!(outcome.schedule.installments.len(), 6);
    }

    #[test]
    fn test_rejects_non_positive_budget() {
        let err = simulate_by_budget(&request(Decimal::ZERO, 360)).unwrap_err();
        assert!(matches!(err, SimfinError::InvalidBudget(_)));
    }

    #[test]
    fn test_rejects_ceiling_below_minimum_term() {
        let err = simulate_by_budget(&request(dec!(90_000), 5)).unwrap_err();
        assert!(matches!(err, SimfinError::InvalidTerm { term: 6, ceiling: 5 }));
    }

    #[test]
    fn test_rejects_ceiling_above_maximum_term() {
        let err = simulate_by_budget(&request(dec!(90_000), MAX_TERM_MONTHS + 1)).unwrap_err();
        assert!(matches!(err, SimfinError::InvalidInput { .. }));
    }

    #[test]
    fn test_indexed_search_never_over_amortizes() {
        let mut req = request(dec!(150_000), 240);
        req.terms.annual_tr_rate = dec!(0.02);
        req.terms.annual_ipca_rate = dec!(0.05);
        let outcome = simulate_by_budget(&req).unwrap();
        assert!(outcome.budget_met);
        assert!(outcome.schedule.total_paid <= dec!(150_000));

        let planned = round_money(dec!(80_000) / Decimal::from(outcome.schedule.term_used));
        for line in &outcome.schedule.installments {
            assert!(line.amortization <= planned, "month {} over-amortized", line.month);
        }
    }
}
