//! Logging infrastructure
//!
//! Structured logging adapter built on tracing and tracing-subscriber:
//! - Console and JSON record encodings with fixed keys
//! - Development/production profiles
//! - Stderr or rolling file output
//! - Immutable handles with structured context

pub mod config;
pub mod format;
pub mod logger;
pub mod sink;

pub use config::{Encoding, LogConfig, Profile};
pub use format::{duration_value, RecordFormatter, VERSION_KEY};
pub use logger::{LoggerBuilder, TracingLogger, ERROR_KEY};
pub use sink::Sink;
