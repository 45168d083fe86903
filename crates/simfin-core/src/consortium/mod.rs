//! Buyer's consortium cost simulation.
//!
//! A consortium participant pays monthly contributions toward a credit letter
//! and is contemplated (granted the credit) at some month, optionally by
//! placing a bid. The schedule includes the administrative fee, reserve fund,
//! insurance, one-time fees, monetary correction of the credit letter, a
//! reduced-installment window and the rent paid while waiting.

pub mod schedule;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::SimfinError;
use crate::rates::validate_rate;
use crate::types::{with_metadata, ComputationOutput, Money, Rate, MAX_TERM_MONTHS};
use crate::SimfinResult;

pub use schedule::build_schedule;

fn default_index_name() -> String {
    "INCC".to_string()
}

fn default_contemplation_month() -> u32 {
    12
}

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// How the credit letter is corrected month to month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionMode {
    /// A single annual rate, converted to its monthly equivalent.
    #[default]
    AnnualConstant,
    /// An explicit sequence of monthly rates.
    MonthlySeries,
}

/// Credit-letter correction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Correction {
    /// Informational name of the index (INCC, IPCA, ...).
    #[serde(default = "default_index_name")]
    pub index_name: String,
    #[serde(default)]
    pub mode: CorrectionMode,
    /// Annual rate used in `AnnualConstant` mode.
    #[serde(default)]
    pub annual_rate: Rate,
    /// Monthly rates used in `MonthlySeries` mode. When shorter than the term
    /// the last rate is held for the remaining months.
    #[serde(default)]
    pub monthly_series: Vec<Rate>,
}

impl Default for Correction {
    fn default() -> Self {
        Correction {
            index_name: default_index_name(),
            mode: CorrectionMode::AnnualConstant,
            annual_rate: Decimal::ZERO,
            monthly_series: Vec::new(),
        }
    }
}

/// Temporary reduction of the base contribution at the start of the plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReducedInstallment {
    /// Fraction of the base contribution charged (0.70 = pays 70%).
    pub ratio: Rate,
    /// Number of months, counted from month 1, the reduction lasts.
    pub months: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidKind {
    #[default]
    Free,
    Embedded,
}

/// Where the bid money comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidSource {
    /// Paid in cash on the contemplation month.
    #[default]
    OwnFunds,
    /// Taken out of the credit letter itself.
    EmbeddedInCredit,
}

/// Bid placed at contemplation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bid {
    #[serde(default)]
    pub kind: BidKind,
    /// Fraction of the corrected credit value offered (0.25 = 25%).
    pub percent_of_credit: Rate,
    #[serde(default)]
    pub source: BidSource,
}

/// Scenario assumptions used for comparison.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hypotheses {
    /// Rent paid every month before contemplation.
    #[serde(default)]
    pub monthly_rent_while_waiting: Money,
    /// Annual discount rate for present-value comparison.
    #[serde(default)]
    pub annual_discount_rate: Rate,
    /// Annual property appreciation. Recorded with the scenario, not used by
    /// the schedule.
    #[serde(default)]
    pub annual_property_appreciation: Rate,
}

/// Consortium quota parameters. All percentages are fractions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsortiumInput {
    #[serde(default)]
    pub administrator: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub quota: String,
    /// Face value of the credit letter at enrolment.
    pub initial_credit: Money,
    pub term_months: u32,
    #[serde(default)]
    pub correction: Correction,
    /// Total administrative fee as a fraction of the initial credit.
    #[serde(default)]
    pub admin_fee_rate: Rate,
    /// Total reserve fund as a fraction of the initial credit.
    #[serde(default)]
    pub reserve_fund_rate: Rate,
    #[serde(default)]
    pub monthly_insurance: Money,
    #[serde(default)]
    pub joining_fee: Money,
    #[serde(default)]
    pub contemplation_fee: Money,
    #[serde(default)]
    pub reduced_installment: Option<ReducedInstallment>,
    #[serde(default)]
    pub bid: Option<Bid>,
    /// Month the quota is expected to be contemplated; clamped to the term.
    #[serde(default = "default_contemplation_month")]
    pub target_contemplation_month: u32,
    #[serde(default)]
    pub hypotheses: Hypotheses,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One month of the consortium schedule. Every amount is rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsortiumMonthlyLine {
    pub month: u32,
    /// Credit-letter value after this month's correction.
    pub updated_credit: Money,
    pub base_contribution: Money,
    pub admin_fee: Money,
    pub reserve_fund: Money,
    pub insurance: Money,
    pub one_time_fees: Money,
    pub rent: Money,
    pub bid: Money,
    pub installment: Money,
    /// Face value still to be contributed after this month.
    pub remaining_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsortiumResult {
    pub lines: Vec<ConsortiumMonthlyLine>,
    /// Sum of the rounded installments.
    pub total_paid: Money,
    /// Total paid minus the reserve fund, which is refunded at the end.
    pub total_paid_net: Money,
    pub total_reserve_fund: Money,
    /// Bid paid in cash (own-funds bids only).
    pub total_bid_paid: Money,
    pub contemplation_month: u32,
    /// Corrected credit value in the contemplation month.
    pub credit_at_contemplation: Money,
    /// Portion of the credit consumed by an embedded bid.
    pub embedded_bid_amount: Money,
    /// Credit actually available to buy the property.
    pub credit_available: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Simulate the full consortium schedule.
pub fn simulate_consortium(
    input: &ConsortiumInput,
) -> SimfinResult<ComputationOutput<ConsortiumResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let correction = &input.correction;
    if correction.mode == CorrectionMode::MonthlySeries {
        let series_len = correction.monthly_series.len();
        if series_len == 0 {
            warnings.push(format!(
                "Monthly correction series is empty; using annual rate {} instead",
                correction.annual_rate
            ));
        } else if series_len < input.term_months as usize {
            warnings.push(format!(
                "Correction series covers {} of {} months; last rate held for the rest",
                series_len, input.term_months
            ));
        }
    }
    if input.target_contemplation_month == 0 || input.target_contemplation_month > input.term_months
    {
        warnings.push(format!(
            "Target contemplation month {} clamped into [1, {}]",
            input.target_contemplation_month, input.term_months
        ));
    }

    let result = schedule::build_schedule(input)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Consortium Contribution Schedule",
        input,
        warnings,
        elapsed,
        result,
    ))
}

pub(crate) fn validate_input(input: &ConsortiumInput) -> SimfinResult<()> {
    if input.term_months == 0 || input.term_months > MAX_TERM_MONTHS {
        return Err(SimfinError::InvalidInput {
            field: "term_months".into(),
            reason: format!("Term must be between 1 and {} months", MAX_TERM_MONTHS),
        });
    }
    if input.initial_credit <= Decimal::ZERO {
        return Err(SimfinError::InvalidInput {
            field: "initial_credit".into(),
            reason: "Credit letter value must be positive".into(),
        });
    }
    for (field, value) in [
        ("monthly_insurance", input.monthly_insurance),
        ("joining_fee", input.joining_fee),
        ("contemplation_fee", input.contemplation_fee),
        (
            "monthly_rent_while_waiting",
            input.hypotheses.monthly_rent_while_waiting,
        ),
    ] {
        if value < Decimal::ZERO {
            return Err(SimfinError::InvalidInput {
                field: field.into(),
                reason: "Amount cannot be negative".into(),
            });
        }
    }
    validate_fraction("admin_fee_rate", input.admin_fee_rate)?;
    validate_fraction("reserve_fund_rate", input.reserve_fund_rate)?;
    if let Some(reduced) = &input.reduced_installment {
        validate_fraction("reduced_installment.ratio", reduced.ratio)?;
    }
    if let Some(bid) = &input.bid {
        validate_fraction("bid.percent_of_credit", bid.percent_of_credit)?;
    }

    validate_rate("correction.annual_rate", input.correction.annual_rate)?;
    for rate in &input.correction.monthly_series {
        validate_rate("correction.monthly_series", *rate)?;
    }
    validate_rate(
        "hypotheses.annual_discount_rate",
        input.hypotheses.annual_discount_rate,
    )?;
    Ok(())
}

fn validate_fraction(field: &str, value: Rate) -> SimfinResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(SimfinError::InvalidInput {
            field: field.into(),
            reason: "Must be a fraction between 0 and 1".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn minimal_json() -> &'static str {
        r#"{"initial_credit": "100000", "term_months": 10}"#
    }

    #[test]
    fn test_defaults_from_json() {
        let input: ConsortiumInput = serde_json::from_str(minimal_json()).unwrap();
        assert_eq!(input.target_contemplation_month, 12);
        assert_eq!(input.correction.mode, CorrectionMode::AnnualConstant);
        assert_eq!(input.correction.index_name, "INCC");
        assert!(input.bid.is_none());
        assert!(input.reduced_installment.is_none());
    }

    #[test]
    fn test_clamped_contemplation_is_warned() {
        let input: ConsortiumInput = serde_json::from_str(minimal_json()).unwrap();
        let out = simulate_consortium(&input).unwrap();
        assert_eq!(out.result.contemplation_month, 10);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_short_series_is_warned() {
        let mut input: ConsortiumInput = serde_json::from_str(minimal_json()).unwrap();
        input.target_contemplation_month = 3;
        input.correction.mode = CorrectionMode::MonthlySeries;
        input.correction.monthly_series = vec![dec!(0.004), dec!(0.003)];
        let out = simulate_consortium(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("last rate held"));
    }

    #[test]
    fn test_rejects_percentage_instead_of_fraction() {
        let mut input: ConsortiumInput = serde_json::from_str(minimal_json()).unwrap();
        input.admin_fee_rate = dec!(16);
        let err = simulate_consortium(&input).unwrap_err();
        assert!(matches!(err, SimfinError::InvalidInput { ref field, .. } if field == "admin_fee_rate"));
    }

    #[test]
    fn test_rejects_zero_term() {
        let mut input: ConsortiumInput = serde_json::from_str(minimal_json()).unwrap();
        input.term_months = 0;
        assert!(simulate_consortium(&input).is_err());
    }

    #[test]
    fn test_rejects_term_above_maximum() {
        let input: ConsortiumInput =
            serde_json::from_str(r#"{"initial_credit": "1", "term_months": 4294967295}"#).unwrap();
        let err = simulate_consortium(&input).unwrap_err();
        assert!(matches!(err, SimfinError::InvalidInput { ref field, .. } if field == "term_months"));
        assert!(build_schedule(&input).is_err());
    }
}
