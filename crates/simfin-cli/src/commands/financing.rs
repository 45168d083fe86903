use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use simfin_core::financing::{
    self, ByBudgetRequest, ByTermRequest, FinancingRequest, LoanTerms, DEFAULT_OFFICIAL_TERM,
};

use crate::input;
use crate::input::number::parse_decimal;
use crate::output::schedule;

/// Arguments for a SAC financing simulation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct FinancingArgs {
    /// Property price
    #[arg(long, value_parser = parse_decimal)]
    pub property_price: Option<Decimal>,

    /// Down payment
    #[arg(long, value_parser = parse_decimal)]
    pub down_payment: Option<Decimal>,

    /// Annual contract interest rate (e.g. 0.0847 for 8.47%)
    #[arg(long, value_parser = parse_decimal)]
    pub interest_rate: Option<Decimal>,

    /// Read --interest-rate as a percentage (8.47 => 0.0847)
    #[arg(long)]
    pub interest_in_percent: bool,

    /// Annual TR correction (e.g. 0.02)
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub tr_rate: Decimal,

    /// Annual IPCA correction (e.g. 0.06)
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub ipca_rate: Decimal,

    /// Fixed monthly charges (insurance and fees)
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub monthly_charges: Decimal,

    /// Lender's maximum term in months
    #[arg(long, default_value_t = DEFAULT_OFFICIAL_TERM)]
    pub official_term: u32,

    /// Simulate this term in months
    #[arg(long, conflicts_with = "max_total")]
    pub term: Option<u32>,

    /// Find the longest term whose total paid stays within this amount
    #[arg(long, value_parser = parse_decimal)]
    pub max_total: Option<Decimal>,

    /// Path to JSON financing request (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Write the monthly schedule to this CSV file
    #[arg(long)]
    pub schedule_csv: Option<String>,
}

pub fn run_financing(args: FinancingArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = build_request(&args, true)?;
    let result = financing::simulate_financing(&request)?;

    if let Some(ref path) = args.schedule_csv {
        schedule::write_financing_csv(path, &result.result.schedule().installments)?;
        log::info!("financing schedule written to {}", path);
    }

    Ok(serde_json::to_value(result)?)
}

/// Build a request from `--input`, piped stdin (when allowed) or flags.
pub fn build_request(
    args: &FinancingArgs,
    allow_stdin: bool,
) -> Result<FinancingRequest, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_structured(path);
    }
    if allow_stdin {
        if let Some(request) = input::stdin::read_stdin()? {
            return Ok(request);
        }
    }

    let mut annual_interest_rate = args
        .interest_rate
        .ok_or("--interest-rate is required (or provide --input)")?;
    if args.interest_in_percent {
        annual_interest_rate /= dec!(100);
    }

    let terms = LoanTerms {
        property_price: args
            .property_price
            .ok_or("--property-price is required (or provide --input)")?,
        down_payment: args
            .down_payment
            .ok_or("--down-payment is required (or provide --input)")?,
        annual_interest_rate,
        annual_tr_rate: args.tr_rate,
        annual_ipca_rate: args.ipca_rate,
        monthly_charges: args.monthly_charges,
        official_max_term: args.official_term,
    };

    match (args.term, args.max_total) {
        (Some(term_months), _) => Ok(FinancingRequest::ByTerm(ByTermRequest {
            terms,
            term_months,
        })),
        (None, Some(max_total_paid)) => Ok(FinancingRequest::ByBudget(ByBudgetRequest {
            terms,
            max_total_paid,
        })),
        (None, None) => Err("either --term or --max-total is required".into()),
    }
}
