// log_adapter.rs
// Purpose: Plug a LogHandler into the `log` facade, honouring the bubble decision

use std::sync::Arc;

use log::{Level, Log, Metadata, Record};
use serde_json::Value;

use crate::handler::LogHandler;
use crate::log_sink::{is_own_target, LogLevel, LogRecord};

/// `log::Log` implementation. Records the handler accepts go to it first;
/// they reach `next` only when the handler says bubble.
pub struct BlueScreenLogger<H> {
    handler: Arc<H>,
    next: Option<Box<dyn Log>>,
}

pub fn level_from_log(level: Level) -> LogLevel {
    match level {
        Level::Error => LogLevel::Error,
        Level::Warn => LogLevel::Warning,
        Level::Info => LogLevel::Info,
        Level::Debug | Level::Trace => LogLevel::Debug,
    }
}

impl<H: LogHandler + 'static> BlueScreenLogger<H> {
    pub fn new(handler: Arc<H>) -> Self {
        Self {
            handler,
            next: None,
        }
    }

    /// Logger that receives records after this one.
    pub fn with_next(mut self, next: Box<dyn Log>) -> Self {
        self.next = Some(next);
        self
    }

    /// Install as the global `log` logger.
    pub fn install(self, max_level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }

    fn to_record(record: &Record<'_>) -> LogRecord {
        let mut converted = LogRecord::new(level_from_log(record.level()), record.args().to_string())
            .with_channel(record.target());
        if let Some(module) = record.module_path() {
            converted.context.insert("module".into(), Value::from(module));
        }
        if let Some(file) = record.file() {
            converted.context.insert("file".into(), Value::from(file));
        }
        if let Some(line) = record.line() {
            converted.context.insert("line".into(), Value::from(line));
        }
        converted
    }
}

impl<H: LogHandler + 'static> Log for BlueScreenLogger<H> {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.handler.is_handling(level_from_log(metadata.level()))
            || self.next.as_ref().is_some_and(|next| next.enabled(metadata))
    }

    fn log(&self, record: &Record<'_>) {
        let own = is_own_target(record.target());
        let level = level_from_log(record.level());

        let bubble = if !own && self.handler.is_handling(level) {
            self.handler.handle(&Self::to_record(record))
        } else {
            true
        };

        if bubble {
            if let Some(next) = &self.next {
                next.log(record);
            }
        }
    }

    fn flush(&self) {
        if let Some(next) = &self.next {
            next.flush();
        }
    }
}
