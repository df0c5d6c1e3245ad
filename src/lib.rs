//! Bootkit - startup bootstrapping for backend services
//!
//! Two independent pieces that run once at process start:
//!
//! - **Settings loading** (`infrastructure::config`): merges `.env` files, a
//!   YAML `config` file and process environment variables into [`Settings`].
//! - **Structured logging** (`infrastructure::logging`): a tracing-backed
//!   adapter for the [`Logger`] port, configured from [`Settings`].
//!
//! # Example
//!
//! ```no_run
//! use bootkit::{ConfigLoader, Logger, TracingLogger};
//!
//! fn main() -> anyhow::Result<()> {
//!     let settings = ConfigLoader::new().load()?;
//!     let logger = TracingLogger::builder(&settings)
//!         .semantic_version(env!("CARGO_PKG_VERSION"))
//!         .build()?;
//!     logger.info(&[&"service starting"]);
//!     logger.sync()?;
//!     Ok(())
//! }
//! ```

pub mod domain;
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::error::LoggerError;
pub use domain::models::{
    ApplicationSettings, ConnectionSettings, HttpSettings, LoggingSettings, PostgresqlInstance,
    PostgresqlSettings, RotationPolicy, Settings,
};
pub use domain::ports::{Fields, Logger, Severity};
pub use infrastructure::config::{load_settings, ConfigError, ConfigLoader, ReadError};
pub use infrastructure::logging::{duration_value, LoggerBuilder, TracingLogger};
