//! Library root for the `mmf_bluescreen` crate
//! Writes a self-contained diagnostic snapshot for every error-level log record

// Core error handling
pub mod errors;

// Records & severity
pub mod log_sink;
pub mod severity_filter;

// Contributors & report assembly
pub mod contributor;
pub mod report;
pub mod renderer;
pub mod containment;

// Persistence
pub mod snapshot_writer;

// Handler & wiring
pub mod handler;
pub mod factory;

// Configuration
pub mod config;
pub mod config_loader;

// Logging facade integration
pub mod log_adapter;
pub mod tracing_layer;


pub use config::{BlueScreenSettings, HandlerConfig};
pub use errors::{BlueScreenError, BlueScreenResult};
pub use factory::BlueScreenFactory;
pub use handler::{BlueScreenHandler, HandleOutcome, LogHandler};
pub use log_sink::{LogLevel, LogRecord};
