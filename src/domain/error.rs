use std::io;
use thiserror::Error;

/// Errors raised by [`Logger`](super::ports::Logger) implementations
#[derive(Error, Debug)]
pub enum LoggerError {
    /// The backend could not be constructed from the given settings
    #[error("TracingLogger::build: failed to build logger: {0}")]
    Build(String),

    /// Buffered records could not be written out
    #[error("Logger::sync: failed to flush log output: {0}")]
    Flush(#[source] io::Error),
}

impl LoggerError {
    /// Whether this error came from a flush rather than construction
    pub const fn is_flush(&self) -> bool {
        matches!(self, Self::Flush(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_flush_error_keeps_source() {
        let err = LoggerError::Flush(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        assert!(err.is_flush());
        assert!(err.to_string().contains("failed to flush"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_build_error_message() {
        let err = LoggerError::Build("no encoder registered for name \"xml\"".to_string());
        assert!(!err.is_flush());
        assert!(err.to_string().starts_with("TracingLogger::build:"));
    }
}
