//! Report model and assembly.
//!
//! [`assemble`] runs every registered contributor against a record. A
//! contributor that errors or panics becomes a degraded entry; it never
//! aborts the report. Panics still reach the process panic hook; see
//! [`crate::containment::install_quiet_panic_hook`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::containment::contain;
use crate::contributor::{ContributorRegistry, InfoItem, PanelContent};
use crate::log_sink::LogRecord;

/// Placeholder name for a contributor whose `name()` panicked.
pub const UNNAMED_CONTRIBUTOR: &str = "<unnamed>";

/// Unique identifier of one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(Uuid);

impl ReportId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Output of one info provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InfoEntry {
    Provided { provider: String, items: Vec<InfoItem> },
    Failed { provider: String, reason: String },
}

impl InfoEntry {
    pub fn provider(&self) -> &str {
        match self {
            InfoEntry::Provided { provider, .. } | InfoEntry::Failed { provider, .. } => provider,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, InfoEntry::Failed { .. })
    }
}

/// Output of one panel, paired with the panel's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PanelEntry {
    Rendered { panel: String, content: PanelContent },
    Skipped { panel: String },
    Failed { panel: String, reason: String },
}

impl PanelEntry {
    pub fn panel(&self) -> &str {
        match self {
            PanelEntry::Rendered { panel, .. }
            | PanelEntry::Skipped { panel }
            | PanelEntry::Failed { panel, .. } => panel,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, PanelEntry::Failed { .. })
    }

    /// One-line summary, e.g. `panel db failed: connection refused`.
    pub fn summary(&self) -> String {
        match self {
            PanelEntry::Rendered { panel, content } => format!("panel {panel}: {}", content.tab),
            PanelEntry::Skipped { panel } => format!("panel {panel} skipped"),
            PanelEntry::Failed { panel, reason } => format!("panel {panel} failed: {reason}"),
        }
    }
}

/// The assembled snapshot model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub generated_at: DateTime<Utc>,
    pub record: LogRecord,
    pub info: Vec<InfoEntry>,
    pub panels: Vec<PanelEntry>,
}

impl Report {
    pub fn failed_contributors(&self) -> usize {
        self.info.iter().filter(|e| e.is_failed()).count()
            + self.panels.iter().filter(|e| e.is_failed()).count()
    }
}

/// Build a report for `record` from every contributor in `registry`.
pub fn assemble(record: &LogRecord, registry: &ContributorRegistry) -> Report {
    let info = registry
        .info_providers()
        .map(|provider| {
            let name = match contain(|| provider.name().to_string()) {
                Ok(name) => name,
                Err(message) => {
                    return InfoEntry::Failed {
                        provider: UNNAMED_CONTRIBUTOR.to_string(),
                        reason: format!("name panicked: {message}"),
                    }
                }
            };
            match contained(|| provider.provide_info(record)) {
                Ok(items) => InfoEntry::Provided {
                    provider: name,
                    items,
                },
                Err(reason) => InfoEntry::Failed {
                    provider: name,
                    reason,
                },
            }
        })
        .collect();

    let panels = registry
        .panels()
        .map(|panel| {
            let name = match contain(|| panel.name().to_string()) {
                Ok(name) => name,
                Err(message) => {
                    return PanelEntry::Failed {
                        panel: UNNAMED_CONTRIBUTOR.to_string(),
                        reason: format!("name panicked: {message}"),
                    }
                }
            };
            match contained(|| panel.render_panel(record)) {
                Ok(Some(content)) => PanelEntry::Rendered {
                    panel: name,
                    content,
                },
                Ok(None) => PanelEntry::Skipped { panel: name },
                Err(reason) => PanelEntry::Failed {
                    panel: name,
                    reason,
                },
            }
        })
        .collect();

    Report {
        id: ReportId::generate(),
        generated_at: Utc::now(),
        record: record.clone(),
        info,
        panels,
    }
}

/// Run a contributor, turning both errors and panics into a reason string.
fn contained<T>(f: impl FnOnce() -> anyhow::Result<T>) -> Result<T, String> {
    match contain(f) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(format!("{err:#}")),
        Err(message) => Err(format!("panicked: {message}")),
    }
}
