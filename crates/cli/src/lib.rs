pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::commands::check::CheckArgs;
use crate::commands::hash::HashArgs;
use crate::commands::price::PriceArgs;

#[derive(Debug, Parser)]
#[command(
    name = "fuv",
    about = "FUV quote engine operator CLI",
    long_about = "Run the deterministic quote engine over a stored quote record: re-price variants, check every gate, inspect the composition hash, or show the effective configuration.",
    after_help = "Examples:\n  fuv price quote.json --write\n  fuv check quote.json --today 2025-01-10\n  fuv hash quote.json\n  fuv config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply silent corrections and re-price all variants from the stored assignment")]
    Price {
        #[arg(help = "Path to the quote record (JSON)")]
        quote: PathBuf,
        #[arg(long, help = "Reference date for defaulting fresh contract dates (YYYY-MM-DD)")]
        today: Option<NaiveDate>,
        #[arg(long, help = "Write the corrected and re-priced quote back to the file")]
        write: bool,
    },
    #[command(about = "Report field errors, step completeness and checklist validity")]
    Check {
        #[arg(help = "Path to the quote record (JSON)")]
        quote: PathBuf,
        #[arg(long, help = "Reference date for defaulting fresh contract dates (YYYY-MM-DD)")]
        today: Option<NaiveDate>,
    },
    #[command(about = "Show the composition hash and whether a recalculation is needed")]
    Hash {
        #[arg(help = "Path to the quote record (JSON)")]
        quote: PathBuf,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Price { quote, today, write } => {
            commands::price::run(&PriceArgs { quote_path: quote, today, write })
        }
        Command::Check { quote, today } => {
            commands::check::run(&CheckArgs { quote_path: quote, today })
        }
        Command::Hash { quote } => commands::hash::run(&HashArgs { quote_path: quote }),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
