// severity_filter.rs
// Purpose: Decide whether a record qualifies for snapshot generation

use crate::log_sink::{LogLevel, LogRecord};

/// Returns true when `level` is at or above `minimum_level`.
pub fn accepts(level: LogLevel, minimum_level: LogLevel) -> bool {
    level >= minimum_level
}

/// Trait for anything that gates records by severity.
pub trait SeverityGate {
    fn minimum_level(&self) -> LogLevel;

    fn accepts_level(&self, level: LogLevel) -> bool {
        accepts(level, self.minimum_level())
    }

    fn accepts_record(&self, record: &LogRecord) -> bool {
        self.accepts_level(record.level)
    }
}

impl SeverityGate for LogLevel {
    fn minimum_level(&self) -> LogLevel {
        *self
    }
}
