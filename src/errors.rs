//! Error handling for the blue-screen handler
//!
//! Runtime failures inside the handler (render, write) are contained and
//! reported through `HandleOutcome`; configuration failures are returned
//! from wiring code so a bad deployment fails at startup.

use thiserror::Error;

/// Main error type for the blue-screen handler
#[derive(Error, Debug)]
pub enum BlueScreenError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid log level: {value}")]
    InvalidLevel { value: String },

    #[error("Unknown panel: {name}")]
    UnknownPanel { name: String },

    #[error("Render failed: {message}")]
    Render { message: String },

    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O operation failed: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Settings could not be loaded")]
    Settings {
        #[source]
        source: Box<figment::Error>,
    },

    #[error("Log directory unusable: {path}")]
    LogDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result alias used across the crate
pub type BlueScreenResult<T> = Result<T, BlueScreenError>;

impl BlueScreenError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid level error
    pub fn invalid_level(value: impl Into<String>) -> Self {
        Self::InvalidLevel {
            value: value.into(),
        }
    }

    /// Create an unknown panel error
    pub fn unknown_panel(name: impl Into<String>) -> Self {
        Self::UnknownPanel { name: name.into() }
    }

    /// Create a render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create an unusable log directory error
    pub fn log_directory(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::LogDirectory {
            path: path.display().to_string(),
            source,
        }
    }

    /// Whether this error indicates a deployment mistake rather than a
    /// runtime incident.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::InvalidLevel { .. }
                | Self::UnknownPanel { .. }
                | Self::LogDirectory { .. }
                | Self::Settings { .. }
        )
    }
}

impl From<std::io::Error> for BlueScreenError {
    fn from(err: std::io::Error) -> Self {
        BlueScreenError::io("io_operation", err)
    }
}

impl From<serde_json::Error> for BlueScreenError {
    fn from(err: serde_json::Error) -> Self {
        BlueScreenError::serialization("json_operation", err)
    }
}

impl From<figment::Error> for BlueScreenError {
    fn from(err: figment::Error) -> Self {
        BlueScreenError::Settings {
            source: Box::new(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = BlueScreenError::config("log_directory is a file");
        assert!(config_err.to_string().contains("Configuration error"));
        assert!(config_err.is_configuration());

        let level_err = BlueScreenError::invalid_level("LOUD");
        assert_eq!(level_err.to_string(), "Invalid log level: LOUD");
        assert!(level_err.is_configuration());

        assert!(!BlueScreenError::render("template missing").is_configuration());
    }

    #[test]
    fn test_error_chaining() {
        use std::error::Error;

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = BlueScreenError::io("writing snapshot", io_err);

        assert!(err.source().is_some());
        assert!(err.to_string().contains("I/O operation failed"));
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_log_directory_error_is_configuration() {
        use std::error::Error;

        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "not a directory");
        let err = BlueScreenError::log_directory(std::path::Path::new("/srv/app/logs"), io_err);

        assert!(err.is_configuration());
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/srv/app/logs"));
    }
}
