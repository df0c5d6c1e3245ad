use std::path::PathBuf;

use crate::domain::error::LoggerError;
use crate::domain::models::settings::{RotationPolicy, Settings};
use crate::domain::ports::Severity;

/// Output encoding for log records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Tab-separated, human-readable lines
    Console,
    /// One JSON object per line
    Json,
}

impl Encoding {
    /// Resolve an encoding name; an empty name selects [`Encoding::Console`]
    pub fn from_name(name: &str) -> Result<Self, LoggerError> {
        match name {
            "" | "console" => Ok(Self::Console),
            "json" => Ok(Self::Json),
            other => Err(LoggerError::Build(format!(
                "no encoder registered for name {other:?}"
            ))),
        }
    }
}

/// Base logger profile selected by the application debug flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Verbose: stack traces from `warn` upwards
    Development,
    /// Stricter: stack traces only from `error` upwards
    Production,
}

impl Profile {
    /// Profile for the given debug flag
    pub const fn for_debug(debug: bool) -> Self {
        if debug {
            Self::Development
        } else {
            Self::Production
        }
    }

    /// Lowest severity whose records carry a stack trace
    pub const fn stacktrace_level(self) -> Severity {
        match self {
            Self::Development => Severity::Warn,
            Self::Production => Severity::Error,
        }
    }
}

/// Logger configuration resolved from [`Settings`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Base profile
    pub profile: Profile,

    /// Output encoding
    pub encoding: Encoding,

    /// Minimum severity that gets written
    pub level: Severity,

    /// Directory for rolling log files (stderr when `None`)
    pub output_dir: Option<PathBuf>,

    /// Rotation policy for file output
    pub rotation: RotationPolicy,
}

impl LogConfig {
    /// Resolve profile, encoding and level from application settings
    ///
    /// Unknown level names fall back to `info`; an unknown encoding is an
    /// error.
    pub fn from_settings(settings: &Settings) -> Result<Self, LoggerError> {
        Ok(Self {
            profile: Profile::for_debug(settings.application.debug),
            encoding: Encoding::from_name(&settings.logging.format)?,
            level: Severity::parse_lossy(&settings.logging.level),
            output_dir: settings.logging.output_dir.clone(),
            rotation: settings.logging.rotation,
        })
    }
}
