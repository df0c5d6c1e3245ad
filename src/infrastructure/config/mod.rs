//! Configuration management infrastructure
//!
//! Layered settings loading using figment:
//! - Best-effort `.env` loading via dotenvy
//! - YAML file discovery across candidate directories
//! - Environment variable overrides keyed by the dotted setting path
//! - Type-safe decoding into [`Settings`](crate::domain::models::Settings)

pub mod loader;

pub use loader::{load_settings, ConfigError, ConfigLoader, ReadError};
