//! Structured logging initialization
//!
//! Builds a `tracing-subscriber` registry with:
//! - an `EnvFilter` from the configured level (or `RUST_LOG`) plus extra target directives
//! - a JSON or pretty-print fmt layer
//! - an optional non-blocking writer from `tracing-appender`
//!
//! Configuration is layered: built-in defaults, then the `logging` section of
//! the config file, then `SOLI_LOG_*` environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const ENV_LOG_LEVEL: &str = "SOLI_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "SOLI_LOG_FORMAT";
pub const ENV_LOG_ASYNC: &str = "SOLI_LOG_ASYNC";
pub const ENV_LOG_TARGET_FILTER: &str = "SOLI_LOG_TARGET_FILTER";
pub const ENV_LOG_INCLUDE_LOCATION: &str = "SOLI_LOG_INCLUDE_LOCATION";

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// `logging` section of the config file; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: Option<String>,
    pub format: Option<LogFormat>,
    #[serde(rename = "async")]
    pub async_logging: Option<bool>,
    pub target_filter: Option<String>,
    pub include_location: Option<bool>,
}

/// Resolved logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    /// Write through a background thread
    pub async_logging: bool,
    /// Extra comma-separated filter directives (`soli::router=debug,...`)
    pub target_filter: Option<String>,
    /// Include file:line in every event
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Pretty,
            async_logging: false,
            target_filter: None,
            include_location: false,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl LogConfig {
    /// Defaults, then `file`, then whatever `lookup` returns for the env keys.
    #[must_use]
    pub fn from_sources<F>(file: &LoggingSection, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(level) = &file.level {
            config.log_level = level.clone();
        }
        if let Some(format) = file.format {
            config.format = format;
        }
        if let Some(async_logging) = file.async_logging {
            config.async_logging = async_logging;
        }
        if file.target_filter.is_some() {
            config.target_filter = file.target_filter.clone();
        }
        if let Some(include_location) = file.include_location {
            config.include_location = include_location;
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            config.format = LogFormat::parse(&format);
        }
        if let Some(flag) = lookup(ENV_LOG_ASYNC).as_deref().and_then(parse_bool) {
            config.async_logging = flag;
        }
        if let Some(filter) = lookup(ENV_LOG_TARGET_FILTER) {
            config.target_filter = Some(filter);
        }
        if let Some(flag) = lookup(ENV_LOG_INCLUDE_LOCATION)
            .as_deref()
            .and_then(parse_bool)
        {
            config.include_location = flag;
        }

        config
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        let mut env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));

        if let Some(target_filter) = &self.target_filter {
            for filter in target_filter.split(',').map(str::trim) {
                if filter.is_empty() {
                    continue;
                }
                match filter.parse() {
                    Ok(directive) => env_filter = env_filter.add_directive(directive),
                    Err(_) => eprintln!("Warning: Invalid log filter directive: {filter}"),
                }
            }
        }
        env_filter
    }
}

/// Keeps the background writer alive; drop it last to flush pending events.
#[derive(Debug, Default)]
pub struct LoggingGuard {
    _worker: Option<WorkerGuard>,
}

/// Install the global subscriber. Events go to stderr so stdout stays free for
/// command output.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging_with_config(config: &LogConfig) -> Result<LoggingGuard> {
    let (writer, guard) = if config.async_logging {
        let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(non_blocking), Some(guard))
    } else {
        (
            tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stderr),
            None,
        )
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_span_list(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(LoggingGuard { _worker: guard })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("invalid"), LogFormat::Pretty);
    }

    #[test]
    fn test_env_overrides_file_section() {
        let file = LoggingSection {
            level: Some("warn".to_string()),
            format: Some(LogFormat::Json),
            async_logging: Some(true),
            ..LoggingSection::default()
        };
        let config = LogConfig::from_sources(
            &file,
            lookup_from(&[(ENV_LOG_LEVEL, "trace"), (ENV_LOG_ASYNC, "off")]),
        );
        assert_eq!(config.log_level, "trace");
        assert_eq!(config.format, LogFormat::Json);
        assert!(!config.async_logging);
    }

    #[test]
    fn test_unparseable_env_flags_are_ignored() {
        let config = LogConfig::from_sources(
            &LoggingSection::default(),
            lookup_from(&[
                (ENV_LOG_INCLUDE_LOCATION, "maybe"),
                (ENV_LOG_TARGET_FILTER, "soli::router=debug"),
            ]),
        );
        assert!(!config.include_location);
        assert_eq!(config.target_filter.as_deref(), Some("soli::router=debug"));
    }

    #[test]
    fn test_level_mapping() {
        let mut config = LogConfig::default();
        assert_eq!(config.level(), Level::INFO);
        config.log_level = "ERROR".to_string();
        assert_eq!(config.level(), Level::ERROR);
        config.log_level = "chatty".to_string();
        assert_eq!(config.level(), Level::INFO);
    }

    #[test]
    fn test_logging_section_deserializes_partially() {
        let section: LoggingSection =
            serde_yaml::from_str("level: debug\nformat: json\nasync: true\n").unwrap();
        assert_eq!(section.level.as_deref(), Some("debug"));
        assert_eq!(section.format, Some(LogFormat::Json));
        assert_eq!(section.async_logging, Some(true));
        assert_eq!(section.include_location, None);
    }
}
