// log_sink.rs
// Purpose: Severity scale and the immutable log record consumed by the blue-screen handler

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{BlueScreenError, BlueScreenResult};

const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Whether `target` names this crate or one of its modules. Host crates
/// that merely share the name as a prefix are not ours.
pub fn is_own_target(target: &str) -> bool {
    target == OWN_TARGET || target.starts_with(concat!(env!("CARGO_CRATE_NAME"), "::"))
}

/// LogLevel classifies the severity of a log record.
///
/// Each level carries a stable integer code so configuration may name a
/// threshold either by name or by number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl LogLevel {
    pub const ALL: [LogLevel; 8] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Notice,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
        LogLevel::Alert,
        LogLevel::Emergency,
    ];

    /// Integer code on the severity scale.
    pub fn code(self) -> u16 {
        match self {
            LogLevel::Debug => 100,
            LogLevel::Info => 200,
            LogLevel::Notice => 250,
            LogLevel::Warning => 300,
            LogLevel::Error => 400,
            LogLevel::Critical => 500,
            LogLevel::Alert => 550,
            LogLevel::Emergency => 600,
        }
    }

    /// Resolve an integer code. Only exact codes on the scale are accepted.
    pub fn from_code(code: i64) -> BlueScreenResult<Self> {
        LogLevel::ALL
            .into_iter()
            .find(|level| i64::from(level.code()) == code)
            .ok_or_else(|| BlueScreenError::invalid_level(code.to_string()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Notice => "NOTICE",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
            LogLevel::Alert => "ALERT",
            LogLevel::Emergency => "EMERGENCY",
        }
    }
}

impl FromStr for LogLevel {
    type Err = BlueScreenError;

    fn from_str(input: &str) -> Result<LogLevel, Self::Err> {
        let trimmed = input.trim();
        match trimmed.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "notice" => Ok(LogLevel::Notice),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            "critical" => Ok(LogLevel::Critical),
            "alert" => Ok(LogLevel::Alert),
            "emergency" => Ok(LogLevel::Emergency),
            other => match other.parse::<i64>() {
                Ok(code) => LogLevel::from_code(code),
                Err(_) => Err(BlueScreenError::invalid_level(trimmed)),
            },
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A level as it appears in configuration: either an integer code or a
/// case-insensitive name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LevelSetting {
    Code(i64),
    Name(String),
}

impl LevelSetting {
    pub fn resolve(&self) -> BlueScreenResult<LogLevel> {
        match self {
            LevelSetting::Code(code) => LogLevel::from_code(*code),
            LevelSetting::Name(name) => name.parse(),
        }
    }
}

impl From<LogLevel> for LevelSetting {
    fn from(level: LogLevel) -> Self {
        LevelSetting::Code(i64::from(level.code()))
    }
}

/// LogRecord is an immutable record handed to the handler by the host
/// logging facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    pub channel: String,
    pub context: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl LogRecord {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            channel: "app".to_string(),
            context: Map::new(),
            timestamp: Utc::now(),
        }
    }

    /// Sets the originating channel (logger name)
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Adds one structured context value
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!("ERROR".parse::<LogLevel>().unwrap(), LogLevel::Error);
        assert_eq!("error".parse::<LogLevel>().unwrap(), LogLevel::Error);
        assert_eq!(" Critical ".parse::<LogLevel>().unwrap(), LogLevel::Critical);
        assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warning);
    }

    #[test]
    fn name_and_code_resolve_to_same_level() {
        let by_name = LevelSetting::Name("ERROR".into()).resolve().unwrap();
        let by_code = LevelSetting::Code(400).resolve().unwrap();
        assert_eq!(by_name, by_code);
        assert_eq!("400".parse::<LogLevel>().unwrap(), LogLevel::Error);
    }

    #[test]
    fn unknown_levels_are_rejected() {
        assert!("loud".parse::<LogLevel>().is_err());
        assert!(LogLevel::from_code(401).is_err());
        assert!(LevelSetting::Code(-1).resolve().is_err());
    }

    #[test]
    fn scale_is_ordered() {
        for pair in LogLevel::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].code() < pair[1].code());
        }
    }

    #[test]
    fn level_setting_deserializes_from_int_or_string() {
        let code: LevelSetting = serde_json::from_str("400").unwrap();
        let name: LevelSetting = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(code.resolve().unwrap(), name.resolve().unwrap());
    }

    #[test]
    fn own_target_matches_crate_and_modules_only() {
        assert!(is_own_target("mmf_bluescreen"));
        assert!(is_own_target("mmf_bluescreen::handler"));
        assert!(!is_own_target("mmf_bluescreen_plugins::db"));
        assert!(!is_own_target("mmf_bluescreenish"));
        assert!(!is_own_target("shop::mmf_bluescreen"));
    }

    #[test]
    fn record_builder_sets_fields() {
        let record = LogRecord::new(LogLevel::Error, "boom")
            .with_channel("http")
            .with_context("request_id", "abc-123")
            .with_context("attempt", 3);

        assert_eq!(record.channel, "http");
        assert_eq!(record.context["request_id"], "abc-123");
        assert_eq!(record.context["attempt"], 3);
    }
}
