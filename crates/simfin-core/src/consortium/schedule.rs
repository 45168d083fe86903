use log::{debug, warn};
use rust_decimal::Decimal;

use crate::consortium::{
    validate_input, BidSource, ConsortiumInput, ConsortiumMonthlyLine, ConsortiumResult,
    Correction, CorrectionMode,
};
use crate::rates::{checked_product, monthly_equivalent};
use crate::types::{round_money, Rate};
use crate::SimfinResult;

/// Monthly correction rate source for the credit letter.
enum MonthlyRates<'a> {
    Constant(Rate),
    Series(&'a [Rate]),
}

impl<'a> MonthlyRates<'a> {
    fn new(correction: &'a Correction) -> Self {
        match correction.mode {
            CorrectionMode::MonthlySeries if !correction.monthly_series.is_empty() => {
                MonthlyRates::Series(&correction.monthly_series)
            }
            CorrectionMode::MonthlySeries => {
                warn!(
                    "empty {} correction series; falling back to annual rate {}",
                    correction.index_name, correction.annual_rate
                );
                MonthlyRates::Constant(monthly_equivalent(correction.annual_rate))
            }
            CorrectionMode::AnnualConstant => {
                MonthlyRates::Constant(monthly_equivalent(correction.annual_rate))
            }
        }
    }

    /// Rate for a 1-based month; past the end of a series the last entry holds.
    fn rate_for(&self, month: u32) -> Rate {
        match self {
            MonthlyRates::Constant(rate) => *rate,
            MonthlyRates::Series(series) => series
                .get(month as usize - 1)
                .or_else(|| series.last())
                .copied()
                .unwrap_or_default(),
        }
    }
}

/// Build the month-by-month consortium schedule.
///
/// Administrative fee and reserve fund are fixed at enrolment from the initial
/// credit and spread evenly over the term. The base contribution follows the
/// corrected credit letter and is capped by what is still owed toward the
/// initial face value, so the remaining balance never goes negative.
///
/// An own-funds bid is charged in full on the contemplation month, reduces the
/// remaining balance, and lowers every later base contribution by an equal
/// share of the bid.
pub fn build_schedule(input: &ConsortiumInput) -> SimfinResult<ConsortiumResult> {
    validate_input(input)?;

    let term = input.term_months;
    let term_dec = Decimal::from(term);
    let face_value = input.initial_credit;

    let admin_monthly = input.admin_fee_rate * face_value / term_dec;
    let reserve_total = input.reserve_fund_rate * face_value;
    let reserve_monthly = reserve_total / term_dec;
    let base_initial = face_value / term_dec;
    let rent_while_waiting = input.hypotheses.monthly_rent_while_waiting;

    let rates = MonthlyRates::new(&input.correction);
    let contemplation_month = input.target_contemplation_month.clamp(1, term);

    let mut credit = face_value;
    let mut cumulative_factor = Decimal::ONE;
    let mut remaining = face_value;
    let mut bid_reduction = Decimal::ZERO;

    let mut credit_at_contemplation = Decimal::ZERO;
    let mut embedded_bid_amount = Decimal::ZERO;
    let mut total_bid_paid = Decimal::ZERO;

    let mut lines = Vec::with_capacity(term as usize);

    for month in 1..=term {
        let factor = Decimal::ONE + rates.rate_for(month);
        credit = checked_product("correction", credit, factor)?;
        cumulative_factor = checked_product("correction", cumulative_factor, factor)?;

        let mut base = checked_product("correction", base_initial, cumulative_factor)?;
        if let Some(reduced) = &input.reduced_installment {
            if month <= reduced.months {
                base *= reduced.ratio;
            }
        }
        if bid_reduction > Decimal::ZERO && month > contemplation_month {
            base = (base - bid_reduction).max(Decimal::ZERO);
        }

        let mut one_time_fees = Decimal::ZERO;
        if month == 1 {
            one_time_fees += input.joining_fee;
        }
        if month == contemplation_month {
            one_time_fees += input.contemplation_fee;
        }

        let rent = if month < contemplation_month {
            rent_while_waiting
        } else {
            Decimal::ZERO
        };

        let mut bid_paid = Decimal::ZERO;
        if month == contemplation_month {
            credit_at_contemplation = credit;
            if let Some(bid) = &input.bid {
                let amount = bid.percent_of_credit * credit;
                match bid.source {
                    BidSource::OwnFunds => {
                        bid_paid = amount;
                        remaining = (remaining - amount).max(Decimal::ZERO);
                        let months_left = term.saturating_sub(month).max(1);
                        bid_reduction = amount / Decimal::from(months_left);
                        debug!(
                            "bid of {} at month {}: base reduced by {} over {} months",
                            amount, month, bid_reduction, months_left
                        );
                    }
                    BidSource::EmbeddedInCredit => {
                        embedded_bid_amount = amount;
                        debug!("embedded bid of {} at month {}", amount, month);
                    }
                }
            }
        }

        let contribution = base.min(remaining);
        remaining = (remaining - contribution).max(Decimal::ZERO);
        total_bid_paid += bid_paid;

        let installment = contribution
            + admin_monthly
            + reserve_monthly
            + input.monthly_insurance
            + one_time_fees
            + rent
            + bid_paid;

        lines.push(ConsortiumMonthlyLine {
            month,
            updated_credit: round_money(credit),
            base_contribution: round_money(contribution),
            admin_fee: round_money(admin_monthly),
            reserve_fund: round_money(reserve_monthly),
            insurance: round_money(input.monthly_insurance),
            one_time_fees: round_money(one_time_fees),
            rent: round_money(rent),
            bid: round_money(bid_paid),
            installment: round_money(installment),
            remaining_balance: round_money(remaining),
        });
    }

    let total_paid: Decimal = lines.iter().map(|l| l.installment).sum();

    Ok(ConsortiumResult {
        lines,
        total_paid: round_money(total_paid),
        total_paid_net: round_money(total_paid - reserve_total),
        total_reserve_fund: round_money(reserve_total),
        total_bid_paid: round_money(total_bid_paid),
        contemplation_month,
        credit_at_contemplation: round_money(credit_at_contemplation),
        embedded_bid_amount: round_money(embedded_bid_amount),
        credit_available: round_money(credit_at_contemplation - embedded_bid_amount),
    })
}
