//! Fixed-column CSV export of monthly schedules.
//!
//! Amounts are written with `Decimal`'s own formatting so the file holds the
//! exact recorded values, one row per month in month order.

use std::error::Error;

use simfin_core::consortium::ConsortiumMonthlyLine;
use simfin_core::financing::MonthlyInstallment;

pub const FINANCING_COLUMNS: [&str; 5] =
    ["month", "installment", "interest", "amortization", "balance"];

pub const CONSORTIUM_COLUMNS: [&str; 11] = [
    "month",
    "installment",
    "base_contribution",
    "admin_fee",
    "reserve_fund",
    "insurance",
    "one_time_fees",
    "rent",
    "bid",
    "remaining_balance",
    "updated_credit",
];

pub fn write_financing_csv(
    path: &str,
    installments: &[MonthlyInstallment],
) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| format!("Failed to create '{}': {}", path, e))?;
    write_financing_rows(&mut wtr, installments)?;
    wtr.flush()?;
    Ok(())
}

pub fn write_consortium_csv(
    path: &str,
    lines: &[ConsortiumMonthlyLine],
) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| format!("Failed to create '{}': {}", path, e))?;
    write_consortium_rows(&mut wtr, lines)?;
    wtr.flush()?;
    Ok(())
}

fn write_financing_rows<W: std::io::Write>(
    wtr: &mut csv::Writer<W>,
    installments: &[MonthlyInstallment],
) -> csv::Result<()> {
    wtr.write_record(FINANCING_COLUMNS)?;
    for i in installments {
        wtr.write_record([
            i.month.to_string(),
            i.installment.to_string(),
            i.interest.to_string(),
            i.amortization.to_string(),
            i.balance.to_string(),
        ])?;
    }
    Ok(())
}

fn write_consortium_rows<W: std::io::Write>(
    wtr: &mut csv::Writer<W>,
    lines: &[ConsortiumMonthlyLine],
) -> csv::Result<()> {
    wtr.write_record(CONSORTIUM_COLUMNS)?;
    for l in lines {
        wtr.write_record([
            l.month.to_string(),
            l.installment.to_string(),
            l.base_contribution.to_string(),
            l.admin_fee.to_string(),
            l.reserve_fund.to_string(),
            l.insurance.to_string(),
            l.one_time_fees.to_string(),
            l.rent.to_string(),
            l.bid.to_string(),
            l.remaining_balance.to_string(),
            l.updated_credit.to_string(),
        ])?;
    }
    Ok(())
}
