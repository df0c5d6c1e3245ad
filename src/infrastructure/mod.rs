//! Infrastructure layer module
//!
//! Adapters for the outside world:
//! - Configuration loading (figment, dotenvy)
//! - Logging (tracing, tracing-subscriber, tracing-appender)
//!
//! The logging adapter satisfies the `Logger` port defined in the domain layer.

pub mod config;
pub mod logging;
