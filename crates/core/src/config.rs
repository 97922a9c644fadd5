use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::contract::TermsVersion;
use crate::engine::EngineSettings;
use crate::validation::duration::{DurationCatalog, ALLOWED_DURATION_YEARS};

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub income: IncomeConfig,
    pub contract: ContractConfig,
    pub terms: TermsConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Offline stand-in for the income ceiling service.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IncomeConfig {
    pub ceiling: Option<Decimal>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContractConfig {
    pub durations: BTreeMap<String, u32>,
    pub default_duration_code: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TermsConfig {
    pub active: Vec<TermsVersion>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub income_ceiling: Option<Decimal>,
    pub default_duration_code: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
            income: IncomeConfig::default(),
            contract: ContractConfig {
                durations: (1..=4).map(|years| (format!("{years}Y"), years)).collect(),
                default_duration_code: "3Y".to_string(),
            },
            terms: TermsConfig::default(),
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("fuv.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Lookup tables handed to the quote engine.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            duration_catalog: DurationCatalog::new(
                self.contract.durations.iter().map(|(code, years)| (code.clone(), *years)),
            ),
            default_duration_code: Some(self.contract.default_duration_code.clone()),
            active_terms: self.terms.active.clone(),
        }
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        if let Some(income) = patch.income {
            if let Some(ceiling) = income.ceiling {
                self.income.ceiling = Some(ceiling);
            }
        }

        if let Some(contract) = patch.contract {
            if let Some(durations) = contract.durations {
                self.contract.durations = durations;
            }
            if let Some(default_duration_code) = contract.default_duration_code {
                self.contract.default_duration_code = default_duration_code;
            }
        }

        if let Some(terms) = patch.terms {
            if let Some(active) = terms.active {
                self.terms.active = active;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let log_level = read_env("FUV_LOGGING_LEVEL").or_else(|| read_env("FUV_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = read_env("FUV_LOGGING_FORMAT").or_else(|| read_env("FUV_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        if let Some(value) = read_env("FUV_INCOME_CEILING") {
            self.income.ceiling = Some(parse_decimal("FUV_INCOME_CEILING", &value)?);
        }

        if let Some(value) = read_env("FUV_CONTRACT_DEFAULT_DURATION_CODE") {
            self.contract.default_duration_code = value;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(income_ceiling) = overrides.income_ceiling {
            self.income.ceiling = Some(income_ceiling);
        }
        if let Some(default_duration_code) = overrides.default_duration_code {
            self.contract.default_duration_code = default_duration_code;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_logging(&self.logging)?;
        validate_income(&self.income)?;
        validate_contract(&self.contract)?;
        validate_terms(&self.terms)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("fuv.toml"), PathBuf::from("config/fuv.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn validate_income(income: &IncomeConfig) -> Result<(), ConfigError> {
    if income.ceiling.is_some_and(|ceiling| ceiling <= Decimal::ZERO) {
        return Err(ConfigError::Validation(
            "income.ceiling must be greater than zero when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_contract(contract: &ContractConfig) -> Result<(), ConfigError> {
    if contract.durations.is_empty() {
        return Err(ConfigError::Validation(
            "contract.durations must map at least one duration code to a year count".to_string(),
        ));
    }

    for (code, years) in &contract.durations {
        let allowed = i32::try_from(*years).is_ok_and(|years| ALLOWED_DURATION_YEARS.contains(&years));
        if code.trim().is_empty() || !allowed {
            return Err(ConfigError::Validation(format!(
                "contract.durations entry `{code}` = {years} is invalid (years must be in 1..=4)"
            )));
        }
    }

    if !contract.durations.contains_key(contract.default_duration_code.trim()) {
        return Err(ConfigError::Validation(format!(
            "contract.default_duration_code `{}` is not listed in contract.durations",
            contract.default_duration_code
        )));
    }

    Ok(())
}

fn validate_terms(terms: &TermsConfig) -> Result<(), ConfigError> {
    let mut seen = BTreeSet::new();
    for version in &terms.active {
        let code = version.code.trim();
        if code.is_empty() {
            return Err(ConfigError::Validation(
                "terms.active entries need a non-empty code".to_string(),
            ));
        }
        if !seen.insert(code) {
            return Err(ConfigError::Validation(format!(
                "terms.active lists `{code}` more than once"
            )));
        }
    }

    Ok(())
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    value.trim().parse::<Decimal>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    logging: Option<LoggingPatch>,
    income: Option<IncomePatch>,
    contract: Option<ContractPatch>,
    terms: Option<TermsPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[derive(Debug, Default, Deserialize)]
struct IncomePatch {
    ceiling: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
struct ContractPatch {
    durations: Option<BTreeMap<String, u32>>,
    default_duration_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TermsPatch {
    active: Option<Vec<TermsVersion>>,
}
