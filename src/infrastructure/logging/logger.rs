use serde_json::{Map, Value};
use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;
use std::io::Write;
use std::panic::Location;
use std::sync::Arc;
use tracing::{Dispatch, Level};
use tracing_subscriber::layer::SubscriberExt;

use super::config::LogConfig;
use super::format::{short_caller, RecordFormatter};
use super::sink::Sink;
use crate::domain::error::LoggerError;
use crate::domain::models::settings::Settings;
use crate::domain::ports::{Fields, Logger, Severity};

/// Event target for every record emitted by the adapter
const TARGET: &str = "bootkit";

/// Context key used by [`Logger::with_error`]
pub const ERROR_KEY: &str = "error";

/// Backend state shared by a logger and every handle derived from it
struct Backend {
    dispatch: Dispatch,
    sink: Sink,
    min_severity: Severity,
    stacktrace_at: Severity,
    version: Option<String>,
}

/// Structured context of one handle, pre-encoded once at derivation time
struct Context {
    fields: Map<String, Value>,
    encoded: String,
}

impl Context {
    fn new(fields: Map<String, Value>) -> Self {
        let encoded = if fields.is_empty() {
            String::new()
        } else {
            serde_json::to_string(&fields).unwrap_or_default()
        };
        Self { fields, encoded }
    }
}

/// [`Logger`] adapter backed by `tracing`
///
/// Each logger owns a private [`Dispatch`] instead of installing a global
/// subscriber, so several loggers with different settings can coexist in one
/// process. Cloning is cheap; derived handles share the backend and output
/// stream but never each other's context.
#[derive(Clone)]
pub struct TracingLogger {
    backend: Arc<Backend>,
    context: Arc<Context>,
    name: Option<Arc<str>>,
}

impl TracingLogger {
    /// Build a logger writing to the output selected by `settings`
    pub fn new(settings: &Settings) -> Result<Self, LoggerError> {
        Self::builder(settings).build()
    }

    /// Start building a logger from `settings`
    pub fn builder(settings: &Settings) -> LoggerBuilder<'_> {
        LoggerBuilder {
            settings,
            semantic_version: None,
            writer: None,
            name: None,
        }
    }

    /// Minimum severity this logger writes
    pub fn level(&self) -> Severity {
        self.backend.min_severity
    }

    /// Copy of this handle under a different logger name
    pub fn named(&self, name: impl Into<String>) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            context: Arc::clone(&self.context),
            name: Some(Arc::from(name.into())),
        }
    }

    /// Copy of this handle with `fields` merged over its context
    fn derive(&self, fields: impl IntoIterator<Item = (String, Value)>) -> Self {
        let mut merged = self.context.fields.clone();
        merged.extend(fields);
        Self {
            backend: Arc::clone(&self.backend),
            context: Arc::new(Context::new(merged)),
            name: self.name.clone(),
        }
    }
}

/// Emit one record; tracing levels are fixed per call site, so fatal and
/// panic share the `ERROR` call site and keep their name in `severity`
macro_rules! emit {
    ($severity:expr, $($rest:tt)+) => {
        match $severity {
            Severity::Debug => tracing::event!(target: TARGET, Level::DEBUG, $($rest)+),
            Severity::Info => tracing::event!(target: TARGET, Level::INFO, $($rest)+),
            Severity::Warn => tracing::event!(target: TARGET, Level::WARN, $($rest)+),
            Severity::Error | Severity::Fatal | Severity::Panic => {
                tracing::event!(target: TARGET, Level::ERROR, $($rest)+)
            }
        }
    };
}

impl Logger for TracingLogger {
    fn log(&self, severity: Severity, message: &str) {
        if severity < self.backend.min_severity {
            return;
        }

        let location = Location::caller();
        let caller = short_caller(location.file(), location.line());
        let stacktrace = (severity >= self.backend.stacktrace_at)
            .then(|| Backtrace::force_capture().to_string());
        let logger = self.name.as_deref();
        let context = self.context.encoded.as_str();
        let version = self.backend.version.as_deref();

        tracing::dispatcher::with_default(&self.backend.dispatch, || {
            emit!(
                severity,
                severity = severity.as_str(),
                logger,
                caller = caller.as_str(),
                version,
                context,
                stacktrace = stacktrace.as_deref(),
                "{}",
                message
            );
        });
    }

    fn with_field(&self, key: &str, value: Value) -> Box<dyn Logger> {
        Box::new(self.derive([(key.to_string(), value)]))
    }

    fn with_fields(&self, fields: Fields) -> Box<dyn Logger> {
        Box::new(self.derive(fields))
    }

    fn with_error(&self, err: &dyn StdError) -> Box<dyn Logger> {
        Box::new(self.derive([(ERROR_KEY.to_string(), Value::String(err.to_string()))]))
    }

    fn sync(&self) -> Result<(), LoggerError> {
        self.backend.sink.flush().map_err(LoggerError::Flush)
    }
}

impl fmt::Debug for TracingLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracingLogger")
            .field("level", &self.backend.min_severity)
            .field("name", &self.name)
            .field("version", &self.backend.version)
            .field("context", &self.context.fields)
            .finish_non_exhaustive()
    }
}

/// Builder for [`TracingLogger`]
pub struct LoggerBuilder<'a> {
    settings: &'a Settings,
    semantic_version: Option<String>,
    writer: Option<Box<dyn Write + Send>>,
    name: Option<String>,
}

impl LoggerBuilder<'_> {
    /// Tag every record with `version`; an empty string adds nothing
    #[must_use]
    pub fn semantic_version(mut self, version: impl Into<String>) -> Self {
        self.semantic_version = Some(version.into());
        self
    }

    /// Write records to `writer` instead of stderr or the log directory
    #[must_use]
    pub fn writer(mut self, writer: Box<dyn Write + Send>) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Name the logger; named handles emit a `logger` key
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Build the logger
    ///
    /// # Errors
    /// Returns [`LoggerError::Build`] for an unknown encoding or an unusable
    /// log directory.
    pub fn build(self) -> Result<TracingLogger, LoggerError> {
        let config = LogConfig::from_settings(self.settings)?;

        let sink = match (self.writer, &config.output_dir) {
            (Some(writer), _) => Sink::new(writer),
            (None, Some(dir)) => Sink::rolling(dir, config.rotation)?,
            (None, None) => Sink::stderr(),
        };

        let layer = tracing_subscriber::fmt::layer()
            .event_format(RecordFormatter::new(config.encoding))
            .with_writer(sink.clone())
            .with_ansi(false);
        let dispatch = Dispatch::new(tracing_subscriber::registry().with(layer));

        tracing::debug!(
            level = %config.level,
            encoding = ?config.encoding,
            profile = ?config.profile,
            file_output = config.output_dir.is_some(),
            "logger initialized"
        );

        Ok(TracingLogger {
            backend: Arc::new(Backend {
                dispatch,
                sink,
                min_severity: config.level,
                stacktrace_at: config.profile.stacktrace_level(),
                version: self.semantic_version.filter(|v| !v.is_empty()),
            }),
            context: Arc::new(Context::new(Map::new())),
            name: self.name.map(Arc::from),
        })
    }
}
