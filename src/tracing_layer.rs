//! `tracing` integration: a subscriber layer that feeds events into a
//! [`LogHandler`].
//!
//! Event fields become record context; the `message` field becomes the
//! record message and the event target becomes the channel. Events emitted
//! by this crate are ignored so the handler never reacts to its own
//! diagnostics. Layers cannot stop propagation, so the bubble value is not
//! used here.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::handler::LogHandler;
use crate::log_sink::{is_own_target, LogLevel, LogRecord};

pub struct BlueScreenLayer<H> {
    handler: Arc<H>,
}

impl<H: LogHandler> BlueScreenLayer<H> {
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }
}

pub fn level_from_tracing(level: &Level) -> LogLevel {
    match *level {
        Level::ERROR => LogLevel::Error,
        Level::WARN => LogLevel::Warning,
        Level::INFO => LogLevel::Info,
        _ => LogLevel::Debug,
    }
}

impl<S, H> Layer<S> for BlueScreenLayer<H>
where
    S: Subscriber,
    H: LogHandler + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if is_own_target(metadata.target()) {
            return;
        }

        let level = level_from_tracing(metadata.level());
        if !self.handler.is_handling(level) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut record = LogRecord::new(level, visitor.message.unwrap_or_default())
            .with_channel(metadata.target());
        record.context = visitor.fields;
        if let Some(file) = metadata.file() {
            record.context.insert("file".into(), Value::from(file));
        }
        if let Some(line) = metadata.line() {
            record.context.insert("line".into(), Value::from(line));
        }

        self.handler.handle(&record);
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::from(format!("{value:?}")));
    }
}
