//! Port trait definitions (Hexagonal Architecture)
//!
//! - Logger: Structured logging operations
//!
//! Application code depends on these traits, never on a concrete backend.

pub mod logger;

pub use logger::{Fields, Logger, Severity};
