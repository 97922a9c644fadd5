use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use fuv_core::config::{AppConfig, LoadOptions};
use toml::Value;

use crate::commands::{CommandResult, EXIT_CONFIG_FAILURE};

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG_FAILURE,
            )
        }
    };

    CommandResult { exit_code: 0, output: render(&config) }
}

pub fn render(config: &AppConfig) -> String {
    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["FUV_LOGGING_LEVEL", "FUV_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["FUV_LOGGING_FORMAT", "FUV_LOG_FORMAT"]),
    ));

    let ceiling = config.income.ceiling.map(|ceiling| ceiling.to_string());
    lines.push(render_line(
        "income.ceiling",
        ceiling.as_deref().unwrap_or("<unset>"),
        source("income.ceiling", &["FUV_INCOME_CEILING"]),
    ));

    let durations = config
        .contract
        .durations
        .iter()
        .map(|(code, years)| format!("{code}={years}"))
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(render_line("contract.durations", &durations, source("contract.durations", &[])));
    lines.push(render_line(
        "contract.default_duration_code",
        &config.contract.default_duration_code,
        source("contract.default_duration_code", &["FUV_CONTRACT_DEFAULT_DURATION_CODE"]),
    ));

    let terms = if config.terms.active.is_empty() {
        "<none>".to_string()
    } else {
        config
            .terms
            .active
            .iter()
            .map(|version| format!("{}@{}", version.code, version.sort_key))
            .collect::<Vec<_>>()
            .join(", ")
    };
    lines.push(render_line("terms.active", &terms, source("terms.active", &[])));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("fuv.toml"), PathBuf::from("config/fuv.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
