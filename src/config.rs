// config.rs
// Purpose: Handler configuration and the raw settings it is resolved from

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{BlueScreenError, BlueScreenResult};
use crate::log_sink::{LevelSetting, LogLevel};
use crate::renderer::RenderFormat;

/// Subdirectory of the host's logs root used when `log_directory` is omitted.
pub const DEFAULT_LOG_SUBDIRECTORY: &str = "logs";
pub const DEFAULT_BUBBLE: bool = false;
pub const DEFAULT_LEVEL: LogLevel = LogLevel::Error;

/// Validated configuration of one handler. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerConfig {
    pub log_directory: PathBuf,
    pub bubble: bool,
    pub minimum_level: LogLevel,
    pub auto_create_directory: bool,
}

impl HandlerConfig {
    /// Config with the documented defaults: bubble off, level `error`,
    /// directory auto-created.
    pub fn new(log_directory: impl Into<PathBuf>) -> Self {
        Self {
            log_directory: log_directory.into(),
            bubble: DEFAULT_BUBBLE,
            minimum_level: DEFAULT_LEVEL,
            auto_create_directory: true,
        }
    }

    pub fn with_bubble(mut self, bubble: bool) -> Self {
        self.bubble = bubble;
        self
    }

    pub fn with_minimum_level(mut self, level: LogLevel) -> Self {
        self.minimum_level = level;
        self
    }

    pub fn with_auto_create(mut self, auto_create: bool) -> Self {
        self.auto_create_directory = auto_create;
        self
    }
}

/// `<logs_root>/logs`
pub fn default_log_directory(logs_root: &Path) -> PathBuf {
    logs_root.join(DEFAULT_LOG_SUBDIRECTORY)
}

/// Logs root used when the host does not provide one.
pub fn default_logs_root() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("mmf_bluescreen"))
        .unwrap_or_else(std::env::temp_dir)
}

/// Settings as read from configuration sources; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueScreenSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_directory: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bubble: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<LevelSetting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_create_directory: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<RenderFormat>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub info_items: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub panels: Vec<String>,
}

impl BlueScreenSettings {
    /// Apply defaults and validate. `logs_root` stands in for the host's
    /// logs directory.
    pub fn resolve(&self, logs_root: &Path) -> BlueScreenResult<HandlerConfig> {
        let log_directory = match &self.log_directory {
            Some(dir) if dir.as_os_str().is_empty() => {
                return Err(BlueScreenError::config("log_directory cannot be empty"));
            }
            Some(dir) => dir.clone(),
            None => default_log_directory(logs_root),
        };

        let minimum_level = match &self.level {
            Some(setting) => setting.resolve()?,
            None => DEFAULT_LEVEL,
        };

        Ok(HandlerConfig {
            log_directory,
            bubble: self.bubble.unwrap_or(DEFAULT_BUBBLE),
            minimum_level,
            auto_create_directory: self.auto_create_directory.unwrap_or(true),
        })
    }

    pub fn format(&self) -> RenderFormat {
        self.format.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_sections_use_defaults() {
        let config = BlueScreenSettings::default()
            .resolve(Path::new("/srv/app/var"))
            .unwrap();

        assert_eq!(config.log_directory, PathBuf::from("/srv/app/var/logs"));
        assert!(!config.bubble);
        assert_eq!(config.minimum_level, LogLevel::Error);
        assert!(config.auto_create_directory);
    }

    #[test]
    fn level_as_name_and_as_code_are_equivalent() {
        let root = Path::new("/tmp");
        let by_name = BlueScreenSettings {
            level: Some(LevelSetting::Name("ERROR".into())),
            ..Default::default()
        };
        let by_code = BlueScreenSettings {
            level: Some(LevelSetting::Code(400)),
            ..Default::default()
        };

        assert_eq!(
            by_name.resolve(root).unwrap().minimum_level,
            by_code.resolve(root).unwrap().minimum_level
        );
    }

    #[test]
    fn invalid_level_fails_fast() {
        let settings = BlueScreenSettings {
            level: Some(LevelSetting::Name("chatty".into())),
            ..Default::default()
        };

        let err = settings.resolve(Path::new("/tmp")).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn empty_log_directory_is_rejected() {
        let settings = BlueScreenSettings {
            log_directory: Some(PathBuf::new()),
            ..Default::default()
        };
        assert!(settings.resolve(Path::new("/tmp")).is_err());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let settings: BlueScreenSettings = toml::from_str(
            r#"
            log_directory = "/var/log/app"
            bubble = true
            level = "critical"
            format = "json"
            info_items = ["Foo"]
            panels = ["test_panel"]
            "#,
        )
        .unwrap();

        let config = settings.resolve(Path::new("/ignored")).unwrap();
        assert_eq!(config.log_directory, PathBuf::from("/var/log/app"));
        assert!(config.bubble);
        assert_eq!(config.minimum_level, LogLevel::Critical);
        assert_eq!(settings.format(), RenderFormat::Json);
        assert_eq!(settings.info_items, vec!["Foo".to_string()]);
        assert_eq!(settings.panels, vec!["test_panel".to_string()]);
    }

    #[test]
    fn builder_overrides() {
        let config = HandlerConfig::new("/tmp/x")
            .with_bubble(true)
            .with_minimum_level(LogLevel::Warning)
            .with_auto_create(false);
        assert!(config.bubble);
        assert_eq!(config.minimum_level, LogLevel::Warning);
        assert!(!config.auto_create_directory);
    }
}
