mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::compare::CompareArgs;
use commands::consortium::ConsortiumArgs;
use commands::financing::FinancingArgs;

/// Real-estate financing and consortium simulator
#[derive(Parser)]
#[command(
    name = "simfin",
    version,
    about = "Real-estate financing and consortium simulator",
    long_about = "A CLI for simulating SAC mortgage schedules (by term or by total budget) \
                  and buyer's consortium quotas with decimal precision, and for comparing \
                  the two on nominal cost and present value."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a SAC mortgage by term or by maximum total paid
    Financing(FinancingArgs),
    /// Simulate a consortium quota from a JSON/YAML scenario file
    Consortium(ConsortiumArgs),
    /// Compare a financing scenario against a consortium scenario
    Compare(CompareArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Financing(args) => commands::financing::run_financing(args),
        Commands::Consortium(args) => commands::consortium::run_consortium(args),
        Commands::Compare(args) => commands::compare::run_compare(args),
        Commands::Version => {
            println!("simfin {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
