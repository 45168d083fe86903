//! Constant-amortization (SAC) mortgage simulation.
//!
//! Two request shapes share the same loan terms: a fixed term in months, or a
//! ceiling on the total amount paid, in which case the longest affordable term
//! is searched for. All math in `rust_decimal::Decimal`.

pub mod sac;
pub mod search;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::SimfinError;
use crate::rates::validate_rate;
use crate::types::{with_metadata, ComputationOutput, Money, Rate, MAX_TERM_MONTHS};
use crate::SimfinResult;

/// Default ceiling on the loan term, in months.
pub const DEFAULT_OFFICIAL_TERM: u32 = 360;

fn default_official_term() -> u32 {
    DEFAULT_OFFICIAL_TERM
}

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Loan terms shared by both request shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Purchase price of the property.
    pub property_price: Money,
    /// Down payment; the financed principal is price minus down payment.
    pub down_payment: Money,
    /// Annual contract interest rate (e.g., 0.0847 = 8.47%).
    pub annual_interest_rate: Rate,
    /// Annual TR-type correction applied to the balance.
    #[serde(default)]
    pub annual_tr_rate: Rate,
    /// Annual inflation-type (IPCA) correction applied to the balance.
    #[serde(default)]
    pub annual_ipca_rate: Rate,
    /// Fixed monthly charges (insurance, fees) added to every installment.
    #[serde(default)]
    pub monthly_charges: Money,
    /// Longest term the lender accepts, in months.
    #[serde(default = "default_official_term")]
    pub official_max_term: u32,
}

impl LoanTerms {
    pub fn financed_principal(&self) -> Money {
        self.property_price - self.down_payment
    }
}

/// Simulate a fixed term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ByTermRequest {
    #[serde(flatten)]
    pub terms: LoanTerms,
    /// Requested term in months, within `[1, official_max_term]`.
    pub term_months: u32,
}

/// Find the longest term whose total paid fits in a budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ByBudgetRequest {
    #[serde(flatten)]
    pub terms: LoanTerms,
    /// Maximum acceptable total paid over the life of the loan.
    pub max_total_paid: Money,
}

/// Financing request selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FinancingRequest {
    ByTerm(ByTermRequest),
    ByBudget(ByBudgetRequest),
}

impl FinancingRequest {
    pub fn terms(&self) -> &LoanTerms {
        match self {
            FinancingRequest::ByTerm(r) => &r.terms,
            FinancingRequest::ByBudget(r) => &r.terms,
        }
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One month of the schedule. Every amount is rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyInstallment {
    /// 1-based month index.
    pub month: u32,
    pub installment: Money,
    pub interest: Money,
    pub amortization: Money,
    /// Outstanding balance after this month's amortization.
    pub balance: Money,
}

/// A complete SAC schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancingResult {
    /// Sum of the rounded installments.
    pub total_paid: Money,
    pub first_installment: Money,
    pub last_installment: Money,
    pub term_used: u32,
    pub installments: Vec<MonthlyInstallment>,
}

/// Outcome of a budget search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetSearchOutcome {
    /// False when no term fit and the minimum-term schedule was returned instead.
    pub budget_met: bool,
    pub max_total_paid: Money,
    pub candidates_evaluated: u32,
    pub schedule: FinancingResult,
}

/// Unified financing output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FinancingOutput {
    ByTerm(FinancingResult),
    ByBudget(BudgetSearchOutcome),
}

impl FinancingOutput {
    pub fn schedule(&self) -> &FinancingResult {
        match self {
            FinancingOutput::ByTerm(r) => r,
            FinancingOutput::ByBudget(o) => &o.schedule,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run a financing simulation for either request shape.
pub fn simulate_financing(
    request: &FinancingRequest,
) -> SimfinResult<ComputationOutput<FinancingOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let (output, methodology) = match request {
        FinancingRequest::ByTerm(req) => (
            FinancingOutput::ByTerm(sac::simulate_by_term(req)?),
            "SAC Amortization (fixed term)",
        ),
        FinancingRequest::ByBudget(req) => {
            let outcome = search::simulate_by_budget(req)?;
            if !outcome.budget_met {
                warnings.push(format!(
                    "Target not achievable: no term up to {} months costs at most {}; \
                     showing minimum-term scenario ({} months)",
                    req.terms.official_max_term, req.max_total_paid, outcome.schedule.term_used
                ));
            }
            (
                FinancingOutput::ByBudget(outcome),
                "SAC Amortization (longest term within budget)",
            )
        }
    };

    let terms = request.terms();
    if terms.financed_principal().is_zero() {
        warnings.push("Down payment covers the full price; nothing is financed".into());
    }
    if !terms.annual_tr_rate.is_zero() || !terms.annual_ipca_rate.is_zero() {
        let schedule = output.schedule();
        if let Some(last) = schedule.installments.last() {
            if last.balance > Decimal::ZERO {
                warnings.push(format!(
                    "Correction left a residual balance of {} after month {}",
                    last.balance, last.month
                ));
            }
        }
        if schedule.last_installment > schedule.first_installment {
            warnings.push(
                "Balance correction outpaces amortization: last installment exceeds the first"
                    .into(),
            );
        }
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, request, warnings, elapsed, output))
}

pub(crate) fn validate_terms(terms: &LoanTerms) -> SimfinResult<()> {
    if terms.property_price < Decimal::ZERO {
        return Err(SimfinError::InvalidInput {
            field: "property_price".into(),
            reason: "Property price cannot be negative".into(),
        });
    }
    if terms.down_payment < Decimal::ZERO {
        return Err(SimfinError::InvalidInput {
            field: "down_payment".into(),
            reason: "Down payment cannot be negative".into(),
        });
    }
    if terms.financed_principal() < Decimal::ZERO {
        return Err(SimfinError::InvalidInput {
            field: "down_payment".into(),
            reason: "Down payment cannot exceed the property price".into(),
        });
    }
    if terms.monthly_charges < Decimal::ZERO {
        return Err(SimfinError::InvalidInput {
            field: "monthly_charges".into(),
            reason: "Monthly charges cannot be negative".into(),
        });
    }
    if terms.official_max_term == 0 || terms.official_max_term > MAX_TERM_MONTHS {
        return Err(SimfinError::InvalidInput {
            field: "official_max_term".into(),
            reason: format!("Official term must be between 1 and {} months", MAX_TERM_MONTHS),
        });
    }
    validate_rate("annual_interest_rate", terms.annual_interest_rate)?;
    validate_rate("annual_tr_rate", terms.annual_tr_rate)?;
    validate_rate("annual_ipca_rate", terms.annual_ipca_rate)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn terms() -> LoanTerms {
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

    #[test]
    fn test_financed_principal() {
        assert_eq!(terms().financed_principal(), dec!(162_500));
    }

    #[test]
    fn test_envelope_by_term() {
        let req = FinancingRequest::ByTerm(ByTermRequest {
            terms: terms(),
            term_months: 120,
        });
        let out = simulate_financing(&req).unwrap();
        assert_eq!(out.methodology, "SAC Amortization (fixed term)");
        assert!(out.warnings.is_empty());
        assert_eq!(out.result.schedule().term_used, 120);
    }

    #[test]
    fn test_envelope_flags_infeasible_budget() {
        let req = FinancingRequest::ByBudget(ByBudgetRequest {
            terms: terms(),
            max_total_paid: dec!(1000),
        });
        let out = simulate_financing(&req).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].starts_with("Target not achievable"));
        match out.result {
            FinancingOutput::ByBudget(o) => assert!(!o.budget_met),
            _ => panic!("Expected ByBudget output"),
        }
    }

    #[test]
    fn test_request_deserializes_flattened_terms() {
        let json = r#"{"ByTerm": {
            "property_price": "250000", "down_payment": "87500",
            "annual_interest_rate": "0.0847", "term_months": 360
        }}"#;
        let req: FinancingRequest = serde_json::from_str(json).unwrap();
        let t = req.terms();
        assert_eq!(t.official_max_term, DEFAULT_OFFICIAL_TERM);
        assert_eq!(t.annual_tr_rate, Decimal::ZERO);
        assert_eq!(t.monthly_charges, Decimal::ZERO);
    }

    #[test]
    fn test_rejects_down_payment_above_price() {
        let mut t = terms();
        t.down_payment = dec!(300_000);
        assert!(matches!(
            validate_terms(&t),
            Err(SimfinError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_indexed_schedule_reports_residual_balance() {
        let mut t = terms();
        t.annual_ipca_rate = dec!(0.06);
        let req = FinancingRequest::ByTerm(ByTermRequest {
            terms: t,
            term_months: 120,
        });
        let out = simulate_financing(&req).unwrap();
        let last = out.result.schedule().installments.last().unwrap().clone();
        assert!(last.balance > Decimal::ZERO);
        assert!(out
            .warnings
            .iter()
            .any(|w| w.starts_with("Correction left a residual balance")));
    }

    #[test]
    fn test_rejects_official_term_above_maximum() {
        let mut t = terms();
        t.official_max_term = MAX_TERM_MONTHS + 1;
        let err = simulate_financing(&FinancingRequest::ByTerm(ByTermRequest {
            terms: t,
            term_months: 12,
        }))
        .unwrap_err();
        assert!(
            matches!(err, SimfinError::InvalidInput { ref field, .. } if field == "official_max_term")
        );
    }
}
