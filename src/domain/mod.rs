//! Domain layer
//!
//! Settings model, the logging port, and their error types.

pub mod error;
pub mod models;
pub mod ports;

pub use error::LoggerError;
