use serde_json::Value;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt::{self, Display, Write as _};

use crate::domain::error::LoggerError;

/// Structured context attached through [`Logger::with_fields`]
///
/// Iteration order of a `HashMap` is unspecified, so callers must not rely
/// on which value survives when two entries would collide.
pub type Fields = HashMap<String, Value>;

/// Log severity, ordered from most verbose to most severe
///
/// # Examples
///
/// ```
/// use bootkit::domain::ports::Severity;
///
/// assert!(Severity::Error > Severity::Info);
/// assert_eq!(Severity::parse_lossy("warn"), Severity::Warn);
/// assert_eq!(Severity::parse_lossy("verbose"), Severity::Info);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    /// Diagnostic detail for development
    Debug,
    /// Normal operational events
    #[default]
    Info,
    /// Something unexpected that did not stop the operation
    Warn,
    /// An operation failed
    Error,
    /// Logged, then the process exits
    Fatal,
    /// Logged, then the current thread panics
    Panic,
}

impl Severity {
    /// All severities in ascending order
    pub const ALL: [Self; 6] = [
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Fatal,
        Self::Panic,
    ];

    /// Lowercase name used in log records
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
            Self::Panic => "panic",
        }
    }

    /// Parse a level name, falling back to [`Severity::Info`] for empty or
    /// unrecognized input
    pub fn parse_lossy(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "debug" => Self::Debug,
            "warn" => Self::Warn,
            "error" => Self::Error,
            "fatal" => Self::Fatal,
            "panic" => Self::Panic,
            _ => Self::Info,
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concatenate values with no separator
pub fn concat(args: &[&dyn Display]) -> String {
    let mut out = String::new();
    for arg in args {
        let _ = write!(out, "{arg}");
    }
    out
}

/// Join values with single spaces and terminate with a newline
pub fn join_line(args: &[&dyn Display]) -> String {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{arg}");
    }
    out.push('\n');
    out
}

/// Port trait for structured logging
///
/// Application code depends on this trait rather than on a concrete backend,
/// so the backend can be swapped (or replaced by a capturing logger in tests)
/// without touching callers.
///
/// Handles are immutable. The `with_*` methods return a new handle carrying
/// the extra context and leave the receiver untouched, so they can be called
/// concurrently on a shared handle.
///
/// # Examples
///
/// ```no_run
/// use bootkit::domain::ports::Logger;
/// use serde_json::json;
///
/// fn handle_request(logger: &dyn Logger, request_id: &str) {
///     let logger = logger.with_field("request_id", json!(request_id));
///     logger.info(&[&"handling request"]);
///     logger.debugf(format_args!("payload size {} bytes", 512));
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Emit `message` at `severity` with this handle's context
    ///
    /// Records below the handle's minimum severity are dropped. This method
    /// never terminates the process; see [`Logger::fatal`] and
    /// [`Logger::panic`] for that.
    #[track_caller]
    fn log(&self, severity: Severity, message: &str);

    /// New handle with `key` set to `value`
    fn with_field(&self, key: &str, value: Value) -> Box<dyn Logger>;

    /// New handle with every entry of `fields` merged into its context
    fn with_fields(&self, fields: Fields) -> Box<dyn Logger>;

    /// New handle with `err` stored under the `error` key
    fn with_error(&self, err: &dyn StdError) -> Box<dyn Logger>;

    /// Block until buffered records are written
    fn sync(&self) -> Result<(), LoggerError>;

    /// Log the concatenated values at debug
    #[track_caller]
    fn debug(&self, args: &[&dyn Display]) {
        self.log(Severity::Debug, &concat(args));
    }

    /// Log the concatenated values at info
    #[track_caller]
    fn info(&self, args: &[&dyn Display]) {
        self.log(Severity::Info, &concat(args));
    }

    /// Log the concatenated values at warn
    #[track_caller]
    fn warn(&self, args: &[&dyn Display]) {
        self.log(Severity::Warn, &concat(args));
    }

    /// Log the concatenated values at error
    #[track_caller]
    fn error(&self, args: &[&dyn Display]) {
        self.log(Severity::Error, &concat(args));
    }

    /// Log at fatal, flush, then exit the process with status 1
    #[track_caller]
    fn fatal(&self, args: &[&dyn Display]) -> ! {
        self.log(Severity::Fatal, &concat(args));
        let _ = self.sync();
        std::process::exit(1)
    }

    /// Log at panic, then panic with the same message
    #[track_caller]
    fn panic(&self, args: &[&dyn Display]) -> ! {
        let message = concat(args);
        self.log(Severity::Panic, &message);
        panic!("{message}")
    }

    /// Log a formatted message at debug
    #[track_caller]
    fn debugf(&self, args: fmt::Arguments<'_>) {
        self.log(Severity::Debug, &args.to_string());
    }

    /// Log a formatted message at info
    #[track_caller]
    fn infof(&self, args: fmt::Arguments<'_>) {
        self.log(Severity::Info, &args.to_string());
    }

    /// Log a formatted message at warn
    #[track_caller]
    fn warnf(&self, args: fmt::Arguments<'_>) {
        self.log(Severity::Warn, &args.to_string());
    }

    /// Log a formatted message at error
    #[track_caller]
    fn errorf(&self, args: fmt::Arguments<'_>) {
        self.log(Severity::Error, &args.to_string());
    }

    /// Log a formatted message at fatal, flush, then exit with status 1
    #[track_caller]
    fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.log(Severity::Fatal, &args.to_string());
        let _ = self.sync();
        std::process::exit(1)
    }

    /// Log a formatted message at panic, then panic with it
    #[track_caller]
    fn panicf(&self, args: fmt::Arguments<'_>) -> ! {
        let message = args.to_string();
        self.log(Severity::Panic, &message);
        panic!("{message}")
    }

    /// Log a space-joined line at info
    #[track_caller]
    fn println(&self, args: &[&dyn Display]) {
        self.log(Severity::Info, &join_line(args));
    }

    /// Log a space-joined line at debug
    #[track_caller]
    fn debugln(&self, args: &[&dyn Display]) {
        self.log(Severity::Debug, &join_line(args));
    }

    /// Log a space-joined line at info
    #[track_caller]
    fn infoln(&self, args: &[&dyn Display]) {
        self.log(Severity::Info, &join_line(args));
    }

    /// Log a space-joined line at warn
    #[track_caller]
    fn warnln(&self, args: &[&dyn Display]) {
        self.log(Severity::Warn, &join_line(args));
    }

    /// Log a space-joined line at error
    #[track_caller]
    fn errorln(&self, args: &[&dyn Display]) {
        self.log(Severity::Error, &join_line(args));
    }

    /// Log a space-joined line at fatal, flush, then exit with status 1
    #[track_caller]
    fn fatalln(&self, args: &[&dyn Display]) -> ! {
        self.log(Severity::Fatal, &join_line(args));
        let _ = self.sync();
        std::process::exit(1)
    }

    /// Log a space-joined line at panic, then panic with it
    #[track_caller]
    fn panicln(&self, args: &[&dyn Display]) -> ! {
        let message = join_line(args);
        self.log(Severity::Panic, &message);
        panic!("{message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Mutex;

    /// Captures emitted records for assertions
    #[derive(Default)]
    struct CapturingLogger {
        records: Mutex<Vec<(Severity, String)>>,
    }

    impl Logger for CapturingLogger {
        fn log(&self, severity: Severity, message: &str) {
            self.records
                .lock()
                .unwrap()
                .push((severity, message.to_string()));
        }

        fn with_field(&self, _key: &str, _value: Value) -> Box<dyn Logger> {
            Box::new(Self::default())
        }

        fn with_fields(&self, _fields: Fields) -> Box<dyn Logger> {
            Box::new(Self::default())
        }

        fn with_error(&self, _err: &dyn StdError) -> Box<dyn Logger> {
            Box::new(Self::default())
        }

        fn sync(&self) -> Result<(), LoggerError> {
            Ok(())
        }
    }

    #[test]
    fn test_parse_known_levels() {
        for severity in Severity::ALL {
            assert_eq!(Severity::parse_lossy(severity.as_str()), severity);
        }
        assert_eq!(Severity::parse_lossy("DEBUG"), Severity::Debug);
        assert_eq!(Severity::parse_lossy(" error "), Severity::Error);
    }

    #[test]
    fn test_parse_unknown_levels_default_to_info() {
        assert_eq!(Severity::parse_lossy(""), Severity::Info);
        assert_eq!(Severity::parse_lossy("trace"), Severity::Info);
        assert_eq!(Severity::parse_lossy("warning"), Severity::Info);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Error < Severity::Fatal);
        assert!(Severity::Fatal < Severity::Panic);
    }

    #[test]
    fn test_leveled_methods_concatenate() {
        let logger = CapturingLogger::default();
        logger.info(&[&"retry ", &3, &" of ", &5]);
        logger.warnf(format_args!("queue depth {}", 42));
        logger.errorln(&[&"connection", &"refused", &61]);

        let records = logger.records.lock().unwrap();
        assert_eq!(records[0], (Severity::Info, "retry 3 of 5".to_string()));
        assert_eq!(records[1], (Severity::Warn, "queue depth 42".to_string()));
        assert_eq!(
            records[2],
            (Severity::Error, "connection refused 61\n".to_string())
        );
    }

    #[test]
    fn test_println_logs_at_info() {
        let logger = CapturingLogger::default();
        logger.println(&[&"a", &"b"]);
        logger.debugln(&[]);

        let records = logger.records.lock().unwrap();
        assert_eq!(records[0], (Severity::Info, "a b\n".to_string()));
        assert_eq!(records[1], (Severity::Debug, "\n".to_string()));
    }

    #[test]
    fn test_panic_logs_then_unwinds() {
        let logger = CapturingLogger::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            logger.panicf(format_args!("invariant broken: {}", "x"));
        }));

        assert!(result.is_err());
        let records = logger.records.lock().unwrap();
        assert_eq!(
            records[0],
            (Severity::Panic, "invariant broken: x".to_string())
        );
    }

    proptest! {
        #[test]
        fn proptest_unknown_names_parse_as_info(name in "[a-z]{0,12}") {
            let known = ["debug", "info", "warn", "error", "fatal", "panic"];
            prop_assume!(!known.contains(&name.as_str()));
            prop_assert_eq!(Severity::parse_lossy(&name), Severity::Info);
        }
    }
}
