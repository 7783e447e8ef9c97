//! The blue-screen log handler.
//!
//! Per record the handler either skips (below the threshold) or emits:
//! assemble the report, render it, write it. Every failure on the emit path
//! is contained and reported as [`HandleOutcome::Contained`]; the caller
//! always gets the configured bubble value back.
//!
//! Contained panics are still printed by the default panic hook. Call
//! [`install_quiet_panic_hook`](crate::containment::install_quiet_panic_hook)
//! at startup to keep them out of stderr.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::config::HandlerConfig;
use crate::containment::contain;
use crate::contributor::ContributorRegistry;
use crate::errors::{BlueScreenError, BlueScreenResult};
use crate::log_sink::{LogLevel, LogRecord};
use crate::renderer::{FallbackRenderer, Renderer};
use crate::report::{assemble, Report, ReportId};
use crate::severity_filter::SeverityGate;
use crate::snapshot_writer::SnapshotWriter;

/// Standard contract between a logging pipeline and one of its handlers.
pub trait LogHandler: Send + Sync {
    /// Whether a record at `level` would be acted on.
    fn is_handling(&self, level: LogLevel) -> bool;

    /// Process a record. Returns whether the pipeline should continue to
    /// the next handler.
    fn handle(&self, record: &LogRecord) -> bool;
}

/// Step of the emit path that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Assemble,
    Render,
    Write,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureStage::Assemble => "assemble",
            FailureStage::Render => "render",
            FailureStage::Write => "write",
        };
        f.write_str(s)
    }
}

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HandleOutcome {
    /// Below the minimum level; nothing was done.
    Skipped,
    /// Snapshot persisted.
    Written { report_id: ReportId, path: PathBuf },
    /// The emit path failed and the failure was contained. `fallback` is the
    /// minimal plain-text report, when one could be written.
    Contained {
        stage: FailureStage,
        error: String,
        fallback: Option<PathBuf>,
    },
}

impl HandleOutcome {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            HandleOutcome::Written { path, .. } => Some(path),
            HandleOutcome::Contained { fallback, .. } => fallback.as_ref(),
            HandleOutcome::Skipped => None,
        }
    }

    pub fn is_contained(&self) -> bool {
        matches!(self, HandleOutcome::Contained { .. })
    }
}

/// Writes a diagnostic snapshot for every record at or above the
/// configured minimum level.
pub struct BlueScreenHandler {
    config: HandlerConfig,
    registry: Arc<ContributorRegistry>,
    renderer: Arc<dyn Renderer>,
    writer: SnapshotWriter,
}

impl BlueScreenHandler {
    /// Build a handler. The log directory is checked (and created when
    /// allowed) here, so an unusable directory fails at wiring time.
    pub fn new(
        config: HandlerConfig,
        registry: ContributorRegistry,
        renderer: Arc<dyn Renderer>,
    ) -> BlueScreenResult<Self> {
        let writer = SnapshotWriter::new(&config.log_directory, config.auto_create_directory);
        writer.ensure_directory()?;

        debug!(
            directory = %config.log_directory.display(),
            level = %config.minimum_level,
            bubble = config.bubble,
            contributors = registry.len(),
            "blue screen handler ready"
        );

        Ok(Self {
            config,
            registry: Arc::new(registry),
            renderer,
            writer,
        })
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    pub fn registry(&self) -> &ContributorRegistry {
        &self.registry
    }

    pub fn writer(&self) -> &SnapshotWriter {
        &self.writer
    }

    /// Assemble the report for `record` without rendering or writing it.
    pub fn assemble(&self, record: &LogRecord) -> Report {
        assemble(record, &self.registry)
    }

    /// Run the full pipeline for one record and report what happened.
    pub fn process(&self, record: &LogRecord) -> HandleOutcome {
        if !self.config.minimum_level.accepts_record(record) {
            return HandleOutcome::Skipped;
        }

        match contain(|| self.emit(record)) {
            Ok(outcome) => outcome,
            Err(error) => HandleOutcome::Contained {
                stage: FailureStage::Assemble,
                error,
                fallback: self.write_fallback(&ReportId::generate(), record, "assembly panicked"),
            },
        }
    }

    fn emit(&self, record: &LogRecord) -> HandleOutcome {
        let report = self.assemble(record);

        let rendered = contain(|| self.renderer.render(&report)).unwrap_or_else(|message| {
            Err(BlueScreenError::render(format!("renderer panicked: {message}")))
        });

        let bytes = match rendered {
            Ok(bytes) => bytes,
            Err(err) => {
                let error = err.to_string();
                let fallback = self.write_fallback(&report.id, record, &error);
                debug!(report_id = %report.id, %error, "render failed, fallback written: {}", fallback.is_some());
                return HandleOutcome::Contained {
                    stage: FailureStage::Render,
                    error,
                    fallback,
                };
            }
        };

        match self.writer.write(&report.id, self.renderer.extension(), &bytes) {
            Ok(path) => {
                debug!(report_id = %report.id, path = %path.display(), "blue screen written");
                HandleOutcome::Written {
                    report_id: report.id,
                    path,
                }
            }
            Err(err) => {
                let error = err.to_string();
                debug!(report_id = %report.id, %error, "blue screen dropped");
                HandleOutcome::Contained {
                    stage: FailureStage::Write,
                    error,
                    fallback: None,
                }
            }
        }
    }

    fn write_fallback(&self, id: &ReportId, record: &LogRecord, reason: &str) -> Option<PathBuf> {
        let fallback = FallbackRenderer;
        let bytes = fallback.render_record(record, reason);
        self.writer.write(id, fallback.extension(), &bytes).ok()
    }
}

impl LogHandler for BlueScreenHandler {
    fn is_handling(&self, level: LogLevel) -> bool {
        self.config.minimum_level.accepts_level(level)
    }

    fn handle(&self, record: &LogRecord) -> bool {
        let _ = self.process(record);
        self.config.bubble
    }
}

impl fmt::Debug for BlueScreenHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlueScreenHandler")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("renderer", &self.renderer.extension())
            .finish()
    }
}
