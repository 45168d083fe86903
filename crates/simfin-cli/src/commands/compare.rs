use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use simfin_core::comparison::{self, ComparisonInput};
use simfin_core::{consortium, financing};

use crate::commands::consortium::load_input;
use crate::commands::financing::{build_request, FinancingArgs};
use crate::input;
use crate::input::consortium::{normalize_rate, ConsortiumFile};
use crate::input::number::parse_decimal;
use crate::output::schedule;

/// Arguments for comparing financing against a consortium quota
#[derive(Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub financing: FinancingArgs,

    /// Path to JSON or YAML consortium parameters (percent units)
    #[arg(long)]
    pub consortium: String,

    /// Annual discount rate for present values (0.10 or 10)
    #[arg(long, value_parser = parse_decimal)]
    pub discount_rate: Option<Decimal>,

    /// Write the consortium schedule to this CSV file
    #[arg(long)]
    pub consortium_csv: Option<String>,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = build_request(&args.financing, false)?;
    let file: ConsortiumFile = input::file::read_structured(&args.consortium)?;
    let ci = load_input(file, None);

    let cmp_input = ComparisonInput {
        financing: request,
        consortium: ci,
        annual_discount_rate: args.discount_rate.map(normalize_rate),
    };
    // Each engine runs once; the comparison reuses the schedules written below.
    let fin = financing::simulate_financing(&cmp_input.financing)?;
    let con = consortium::build_schedule(&cmp_input.consortium)?;

    if let Some(ref path) = args.financing.schedule_csv {
        schedule::write_financing_csv(path, &fin.result.schedule().installments)?;
        log::info!("financing schedule written to {}", path);
    }
    if let Some(ref path) = args.consortium_csv {
        schedule::write_consortium_csv(path, &con.lines)?;
        log::info!("consortium schedule written to {}", path);
    }

    let result = comparison::compare_schedules(&cmp_input, &fin.result, &con)?;

    Ok(serde_json::to_value(result)?)
}
