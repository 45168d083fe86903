use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use simfin_core::consortium::{self, ConsortiumInput};

use crate::input;
use crate::input::number::parse_decimal;
use crate::input::consortium::{normalize_rate, ConsortiumFile};
use crate::output::schedule;

/// Arguments for a consortium simulation
#[derive(Args)]
pub struct ConsortiumArgs {
    /// Path to JSON or YAML consortium parameters (percent units)
    #[arg(long)]
    pub input: Option<String>,

    /// Annual discount rate, overriding the file (0.10 or 10)
    #[arg(long, value_parser = parse_decimal)]
    pub discount_rate: Option<Decimal>,

    /// Write the monthly schedule to this CSV file
    #[arg(long)]
    pub schedule_csv: Option<String>,
}

pub fn run_consortium(args: ConsortiumArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let file: ConsortiumFile = if let Some(ref path) = args.input {
        input::file::read_structured(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json|file.yaml> or stdin required for consortium".into());
    };
    let ci = load_input(file, args.discount_rate);

    let result = consortium::simulate_consortium(&ci)?;

    if let Some(ref path) = args.schedule_csv {
        schedule::write_consortium_csv(path, &result.result.lines)?;
        log::info!("consortium schedule written to {}", path);
    }

    Ok(serde_json::to_value(result)?)
}

/// Normalise a consortium file and apply a discount-rate override.
pub fn load_input(file: ConsortiumFile, discount_rate: Option<Decimal>) -> ConsortiumInput {
    let mut ci = file.into_input();
    if let Some(rate) = discount_rate {
        ci.hypotheses.annual_discount_rate = normalize_rate(rate);
    }
    ci
}
