//! Side-by-side comparison of mortgage financing and a consortium quota.
//!
//! Both schedules are run, then discounted at the same annual rate so the
//! alternatives can be compared on present value as well as nominal cost.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::consortium::{build_schedule, validate_input, ConsortiumInput, ConsortiumResult};
use crate::financing::sac::simulate_by_term;
use crate::financing::search::simulate_by_budget;
use crate::financing::{FinancingOutput, FinancingRequest};
use crate::rates::validate_rate;
use crate::time_value::present_value;
use crate::types::{round_money, with_metadata, ComputationOutput, Money, Rate};
use crate::SimfinResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonInput {
    pub financing: FinancingRequest,
    pub consortium: ConsortiumInput,
    /// Overrides the consortium hypotheses' discount rate when set.
    #[serde(default)]
    pub annual_discount_rate: Option<Rate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alternative {
    Financing,
    Consortium,
    Tie,
}

/// Headline figures of the financing schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancingSummary {
    pub term_used: u32,
    pub first_installment: Money,
    pub last_installment: Money,
    pub total_paid: Money,
    pub present_value: Money,
}

/// Headline figures of the consortium schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsortiumSummary {
    pub administrator: String,
    pub group: String,
    pub quota: String,
    pub initial_credit: Money,
    pub term_months: u32,
    pub contemplation_month: u32,
    pub total_paid: Money,
    pub total_paid_net: Money,
    pub present_value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonOutput {
    pub annual_discount_rate: Rate,
    pub financing: FinancingSummary,
    pub consortium: ConsortiumSummary,
    /// Consortium total minus financing total (negative: consortium is cheaper).
    pub nominal_difference: Money,
    /// Consortium PV minus financing PV.
    pub pv_difference: Money,
    /// Cheaper alternative on present value.
    pub cheaper: Alternative,
}

/// Run both simulations and compare them.
pub fn compare_alternatives(
    input: &ComparisonInput,
) -> SimfinResult<ComputationOutput<ComparisonOutput>> {
    validate_input(&input.consortium)?;

    let financing = match &input.financing {
        FinancingRequest::ByTerm(req) => FinancingOutput::ByTerm(simulate_by_term(req)?),
        FinancingRequest::ByBudget(req) => FinancingOutput::ByBudget(simulate_by_budget(req)?),
    };
    let consortium = build_schedule(&input.consortium)?;

    compare_schedules(input, &financing, &consortium)
}

/// Compare schedules the caller has already simulated from `input`.
///
/// Lets a caller that also needs the full schedules (for export, say) run
/// each engine once. The schedules are taken as given; only the discount
/// rate is validated here.
pub fn compare_schedules(
    input: &ComparisonInput,
    financing: &FinancingOutput,
    consortium: &ConsortiumResult,
) -> SimfinResult<ComputationOutput<ComparisonOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let discount_rate = input
        .annual_discount_rate
        .unwrap_or(input.consortium.hypotheses.annual_discount_rate);
    validate_rate("annual_discount_rate", discount_rate)?;

    if let FinancingOutput::ByBudget(outcome) = financing {
        if !outcome.budget_met {
            warnings.push(format!(
                "Financing budget {} not achievable; comparing the minimum-term scenario",
                outcome.max_total_paid
            ));
        }
    }
    let schedule = financing.schedule();

    if discount_rate.is_zero() {
        warnings.push("No discount rate given; present values equal nominal totals".into());
    }

    let financing_flows: Vec<Money> = schedule.installments.iter().map(|i| i.installment).collect();
    let consortium_flows: Vec<Money> = consortium.lines.iter().map(|l| l.installment).collect();

    let financing_pv = round_money(present_value(&financing_flows, discount_rate)?);
    let consortium_pv = round_money(present_value(&consortium_flows, discount_rate)?);

    let pv_difference = consortium_pv - financing_pv;
    let cheaper = if pv_difference < Decimal::ZERO {
        Alternative::Consortium
    } else if pv_difference > Decimal::ZERO {
        Alternative::Financing
    } else {
        Alternative::Tie
    };

    let c = &input.consortium;
    let output = ComparisonOutput {
        annual_discount_rate: discount_rate,
        financing: FinancingSummary {
            term_used: schedule.term_used,
            first_installment: schedule.first_installment,
            last_installment: schedule.last_installment,
            total_paid: schedule.total_paid,
            present_value: financing_pv,
        },
        consortium: ConsortiumSummary {
            administrator: c.administrator.clone(),
            group: c.group.clone(),
            quota: c.quota.clone(),
            initial_credit: c.initial_credit,
            term_months: c.term_months,
            contemplation_month: consortium.contemplation_month,
            total_paid: consortium.total_paid,
            total_paid_net: consortium.total_paid_net,
            present_value: consortium_pv,
        },
        nominal_difference: consortium.total_paid - schedule.total_paid,
        pv_difference,
        cheaper,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Financing vs Consortium (nominal and present value)",
        input,
        warnings,
        elapsed,
        output,
    ))
}
