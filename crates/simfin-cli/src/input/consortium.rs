//! Consortium parameter files.
//!
//! Administrators quote fees and bids in percent (`admin_fee_pct: 16`), so the
//! file format keeps those units and this module converts them into the
//! fractions the simulation core expects.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use simfin_core::consortium::{
    Bid, BidKind, BidSource, ConsortiumInput, Correction, CorrectionMode, Hypotheses,
    ReducedInstallment,
};

fn default_index() -> String {
    "INCC".to_string()
}

fn default_admin_fee_pct() -> Decimal {
    dec!(16)
}

fn default_hundred() -> Decimal {
    dec!(100)
}

fn default_contemplation_month() -> u32 {
    12
}

#[derive(Debug, Default, Deserialize)]
pub struct BidFile {
    #[serde(default)]
    pub kind: BidKind,
    /// Percent of the corrected credit (25 = 25%).
    #[serde(default)]
    pub percent_of_credit: Decimal,
    #[serde(default)]
    pub source: BidSource,
}

#[derive(Debug, Default, Deserialize)]
pub struct HypothesesFile {
    #[serde(default)]
    pub monthly_rent_while_waiting: Decimal,
    /// Accepted as a fraction (0.10) or a percentage (10).
    #[serde(default)]
    pub annual_discount_rate: Decimal,
    #[serde(default)]
    pub annual_property_appreciation: Decimal,
}

/// On-disk consortium description, percentages in percent.
#[derive(Debug, Deserialize)]
pub struct ConsortiumFile {
    #[serde(default)]
    pub administrator: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub quota: String,
    pub initial_credit: Decimal,
    pub term_months: u32,
    #[serde(default = "default_index")]
    pub correction_index: String,
    #[serde(default)]
    pub correction_mode: CorrectionMode,
    /// Annual correction as a fraction (0.05).
    #[serde(default)]
    pub correction_annual: Decimal,
    /// Monthly correction rates as fractions (0.004, 0.003, ...).
    #[serde(default)]
    pub correction_monthly_series: Vec<Decimal>,
    #[serde(default = "default_admin_fee_pct")]
    pub admin_fee_pct: Decimal,
    #[serde(default)]
    pub reserve_fund_pct: Decimal,
    #[serde(default)]
    pub monthly_insurance: Decimal,
    #[serde(default)]
    pub joining_fee: Decimal,
    #[serde(default)]
    pub contemplation_fee: Decimal,
    #[serde(default)]
    pub reduced_installment: bool,
    #[serde(default = "default_hundred")]
    pub reduced_installment_pct: Decimal,
    #[serde(default)]
    pub reduced_installment_months: u32,
    #[serde(default)]
    pub bid: BidFile,
    #[serde(default = "default_contemplation_month")]
    pub target_contemplation_month: u32,
    #[serde(default)]
    pub hypotheses: HypothesesFile,
}

impl ConsortiumFile {
    /// Convert percent units to fractions.
    pub fn into_input(self) -> ConsortiumInput {
        let reduced_installment = if self.reduced_installment && self.reduced_installment_months > 0
        {
            Some(ReducedInstallment {
                ratio: percent(self.reduced_installment_pct),
                months: self.reduced_installment_months,
            })
        } else {
            None
        };

        let bid = if self.bid.percent_of_credit.is_zero() {
            None
        } else {
            Some(Bid {
                kind: self.bid.kind,
                percent_of_credit: percent(self.bid.percent_of_credit),
                source: self.bid.source,
            })
        };

        ConsortiumInput {
            administrator: self.administrator,
            group: self.group,
            quota: self.quota,
            initial_credit: self.initial_credit,
            term_months: self.term_months,
            correction: Correction {
                index_name: self.correction_index,
                mode: self.correction_mode,
                annual_rate: self.correction_annual,
                monthly_series: self.correction_monthly_series,
            },
            admin_fee_rate: percent(self.admin_fee_pct),
            reserve_fund_rate: percent(self.reserve_fund_pct),
            monthly_insurance: self.monthly_insurance,
            joining_fee: self.joining_fee,
            contemplation_fee: self.contemplation_fee,
            reduced_installment,
            bid,
            target_contemplation_month: self.target_contemplation_month,
            hypotheses: Hypotheses {
                monthly_rent_while_waiting: self.hypotheses.monthly_rent_while_waiting,
                annual_discount_rate: normalize_rate(self.hypotheses.annual_discount_rate),
                annual_property_appreciation: self.hypotheses.annual_property_appreciation,
            },
        }
    }
}

fn percent(value: Decimal) -> Decimal {
    value / dec!(100)
}

/// Read an annual rate given either as a fraction or as a percentage.
///
/// Values of 1 or more are taken as percent (10 -> 0.10).
pub fn normalize_rate(value: Decimal) -> Decimal {
    if value >= Decimal::ONE {
        value / dec!(100)
    } else {
        value
    }
}
