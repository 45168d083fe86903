use rust_decimal::Decimal;

use crate::error::SimfinError;
use crate::financing::{validate_terms, ByTermRequest, FinancingResult, MonthlyInstallment};
use crate::rates::{apply_monthly_corrections, checked_product, monthly_equivalent};
use crate::types::round_money;
use crate::SimfinResult;

/// Build the SAC schedule for a fixed term.
///
/// Each month the running balance is first corrected by TR then IPCA, interest
/// is charged on the corrected balance, and a constant `principal / term` is
/// amortized (never more than what is left). Without correction the schedule
/// closes at zero; with positive correction the part of the balance that the
/// indices added is still outstanding after the final month and shows in its
/// `balance`.
///
/// The running balance carries forward unrounded; rounding to cents happens
/// only on the recorded fields.
pub fn simulate_by_term(request: &ByTermRequest) -> SimfinResult<FinancingResult> {
    let terms = &request.terms;
    validate_terms(terms)?;

    let term = request.term_months;
    if term == 0 || term > terms.official_max_term {
        return Err(SimfinError::InvalidTerm {
            term,
            ceiling: terms.official_max_term,
        });
    }

    let monthly_interest = monthly_equivalent(terms.annual_interest_rate);
    let corrections = [
        monthly_equivalent(terms.annual_tr_rate),
        monthly_equivalent(terms.annual_ipca_rate),
    ];

    let principal = terms.financed_principal();
    let planned_amortization = principal / Decimal::from(term);

    let mut balance = principal;
    let mut installments = Vec::with_capacity(term as usize);

    for month in 1..=term {
        let corrected = apply_monthly_corrections(balance, &corrections)?;
        let interest = checked_product("annual_interest_rate", corrected, monthly_interest)?;
        let amortization = planned_amortization.min(corrected);

        let installment = amortization + interest + terms.monthly_charges;
        balance = corrected - amortization;

        installments.push(MonthlyInstallment {
            month,
            installment: round_money(installment),
            interest: round_money(interest),
            amortization: round_money(amortization),
            balance: round_money(balance),
        });
    }

    let total_paid = round_money(installments.iter().map(|i| i.installment).sum());
    let first_installment = installments
        .first()
        .map(|i| i.installment)
        .unwrap_or_default();
    let last_installment = installments
        .last()
        .map(|i| i.installment)
        .unwrap_or_default();

    Ok(FinancingResult {
        total_paid,
        first_installment,
        last_installment,
        term_used: term,
        installments,
    })
}
