pub mod check;
pub mod config;
pub mod hash;
pub mod price;

use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use fuv_core::config::{AppConfig, LoadOptions};
use fuv_core::{
    CachedIncomeCeiling, Corrections, HashStatus, Notice, NoticeBoard, Quote, QuoteEngine,
    StaticIncomeCeiling,
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

pub const EXIT_CONFIG_FAILURE: u8 = 2;
pub const EXIT_INPUT_FAILURE: u8 = 3;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl CommandResult {
    pub fn success_with_details(
        command: &str,
        message: impl Into<String>,
        details: impl Serialize,
    ) -> Self {
        let details = match serde_json::to_value(details) {
            Ok(Value::Null) => None,
            Ok(value) => Some(value),
            Err(error) => {
                return Self::failure(command, "serialization", error.to_string(), 1);
            }
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            details,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            details: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            EXIT_CONFIG_FAILURE,
        )
    })
}

pub(crate) fn read_quote(path: &Path) -> anyhow::Result<Quote> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read quote file `{}`", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("quote file `{}` is not a valid quote record", path.display()))
}

pub(crate) fn write_quote(path: &Path, quote: &Quote) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(quote).context("could not serialize quote")?;
    fs::write(path, rendered)
        .with_context(|| format!("could not write quote file `{}`", path.display()))
}

pub(crate) fn input_failure(command: &str, error: anyhow::Error) -> CommandResult {
    CommandResult::failure(command, "invalid_input", format!("{error:#}"), EXIT_INPUT_FAILURE)
}

/// Serves the configured ceiling through the same cached collaborator the
/// engine uses online.
pub(crate) fn income_ceiling(command: &str, config: &AppConfig) -> Result<Option<Decimal>, CommandResult> {
    let Some(ceiling) = config.income.ceiling else {
        return Ok(None);
    };

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(
        |error| {
            CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                EXIT_INPUT_FAILURE,
            )
        },
    )?;

    let cache = CachedIncomeCeiling::new(StaticIncomeCeiling(ceiling));
    Ok(runtime.block_on(cache.ceiling_or_none()))
}

pub(crate) fn notice_messages(notices: &[Notice]) -> Vec<String> {
    notices.iter().map(Notice::message).collect()
}

/// A quote read from disk and run through the engine's opening sequence.
pub(crate) struct OpenedQuote {
    pub engine: QuoteEngine,
    pub quote: Quote,
    pub corrections: Corrections,
    pub hash_status: HashStatus,
    pub notices: NoticeBoard,
}

pub(crate) fn open_quote(
    command: &str,
    path: &Path,
    today: Option<NaiveDate>,
) -> Result<OpenedQuote, CommandResult> {
    let config = load_config(command)?;
    let mut quote = read_quote(path).map_err(|error| input_failure(command, error))?;
    let ceiling = income_ceiling(command, &config)?;

    let engine = QuoteEngine::new(config.engine_settings());
    let mut notices = NoticeBoard::new();
    let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
    let (corrections, hash_status) = engine.open(&mut quote, today, ceiling, &mut notices);

    Ok(OpenedQuote { engine, quote, corrections, hash_status, notices })
}
