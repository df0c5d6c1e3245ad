//! Record encoding for the tracing backend
//!
//! Every record uses the same fixed keys whichever encoding is selected:
//! `time` (ISO-8601), `level` (lowercase), `logger`, `caller` (`dir/file:line`),
//! `msg` and `stacktrace`, plus `version` when the logger carries one.
//! Context fields never replace a fixed key.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::{self, Write as _};
use std::time::Duration;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use super::config::Encoding;

/// Record timestamp
pub const TIME_KEY: &str = "time";
/// Record severity
pub const LEVEL_KEY: &str = "level";
/// Logger name, present only on named handles
pub const NAME_KEY: &str = "logger";
/// Call site
pub const CALLER_KEY: &str = "caller";
/// Log message
pub const MESSAGE_KEY: &str = "msg";
/// Captured backtrace
pub const STACKTRACE_KEY: &str = "stacktrace";

/// ISO-8601 with millisecond precision and numeric offset
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Encode a duration as fractional seconds
pub fn duration_value(duration: Duration) -> Value {
    Value::from(duration.as_secs_f64())
}

/// Render a call site as its last directory plus file name and line
pub fn short_caller(file: &str, line: u32) -> String {
    let mut parts = file.rsplit(['/', '\\']);
    let name = parts.next().unwrap_or(file);
    match parts.next() {
        Some(dir) if !dir.is_empty() => format!("{dir}/{name}:{line}"),
        _ => format!("{name}:{line}"),
    }
}

/// Semantic version attached by the logger backend
pub const VERSION_KEY: &str = "version";

/// Keys a context field can never replace
const RESERVED_KEYS: [&str; 7] = [
    TIME_KEY,
    LEVEL_KEY,
    NAME_KEY,
    CALLER_KEY,
    MESSAGE_KEY,
    STACKTRACE_KEY,
    VERSION_KEY,
];

/// Fields carried by a record event
///
/// The adapter passes the structured context as one pre-encoded JSON object
/// in the `context` field, since tracing field names are fixed per call site.
#[derive(Debug, Default)]
struct RecordFields {
    message: String,
    severity: Option<String>,
    logger: Option<String>,
    caller: Option<String>,
    version: Option<String>,
    context: Option<String>,
    stacktrace: Option<String>,
}

impl Visit for RecordFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        let value = value.to_string();
        match field.name() {
            "message" => self.message = value,
            "severity" => self.severity = Some(value),
            "logger" => self.logger = Some(value),
            "caller" => self.caller = Some(value),
            "version" => self.version = Some(value),
            "context" => self.context = Some(value),
            "stacktrace" => self.stacktrace = Some(value),
            _ => {}
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}

/// One JSON record; field order is output order
#[derive(Serialize)]
struct JsonRecord<'a> {
    level: &'a str,
    time: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    logger: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    caller: Option<&'a str>,
    msg: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    #[serde(flatten)]
    context: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stacktrace: Option<&'a str>,
}

impl RecordFields {
    /// Decoded context without any key that collides with a fixed key
    fn context(&self) -> Map<String, Value> {
        let mut context = self
            .context
            .as_deref()
            .filter(|c| !c.is_empty())
            .and_then(|c| serde_json::from_str::<Map<String, Value>>(c).ok())
            .unwrap_or_default();
        context.retain(|key, _| !RESERVED_KEYS.contains(&key.as_str()));
        context
    }

    fn write_console(&self, out: &mut String, time: &str, level: &str) -> fmt::Result {
        write!(out, "{time}\t{level}")?;
        if let Some(logger) = &self.logger {
            write!(out, "\t{logger}")?;
        }
        if let Some(caller) = &self.caller {
            write!(out, "\t{caller}")?;
        }
        write!(out, "\t{}", self.message)?;

        let mut context = self.context();
        if let Some(version) = &self.version {
            context.insert(VERSION_KEY.to_string(), Value::String(version.clone()));
        }
        if !context.is_empty() {
            write!(out, "\t{}", Value::Object(context))?;
        }
        out.push('\n');
        if let Some(stacktrace) = &self.stacktrace {
            writeln!(out, "{stacktrace}")?;
        }
        Ok(())
    }

    fn write_json(&self, out: &mut String, time: &str, level: &str) -> fmt::Result {
        let record = JsonRecord {
            level,
            time,
            logger: self.logger.as_deref(),
            caller: self.caller.as_deref(),
            msg: &self.message,
            version: self.version.as_deref(),
            context: self.context(),
            stacktrace: self.stacktrace.as_deref(),
        };
        let encoded = serde_json::to_string(&record).map_err(|_| fmt::Error)?;
        out.push_str(&encoded);
        out.push('\n');
        Ok(())
    }
}

/// `FormatEvent` implementation producing console or JSON records
#[derive(Debug, Clone, Copy)]
pub struct RecordFormatter {
    encoding: Encoding,
}

impl RecordFormatter {
    /// Formatter for the given encoding
    pub const fn new(encoding: Encoding) -> Self {
        Self { encoding }
    }
}

impl<S, N> FormatEvent<S, N> for RecordFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut fields = RecordFields::default();
        event.record(&mut fields);

        let time = chrono::Local::now().format(TIME_FORMAT).to_string();
        let level = fields
            .severity
            .clone()
            .unwrap_or_else(|| event.metadata().level().as_str().to_lowercase());

        let mut out = String::new();
        match self.encoding {
            Encoding::Console => fields.write_console(&mut out, &time, &level)?,
            Encoding::Json => fields.write_json(&mut out, &time, &level)?,
        }
        writer.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RecordFields {
        RecordFields {
            message: "order \"42\" shipped".to_string(),
            severity: Some("info".to_string()),
            logger: None,
            caller: Some("handlers/orders.rs:17".to_string()),
            version: None,
            context: Some(r#"{"attempt":2,"order_id":"42"}"#.to_string()),
            stacktrace: None,
        }
    }

    #[test]
    fn test_short_caller() {
        assert_eq!(short_caller("src/handlers/orders.rs", 17), "handlers/orders.rs:17");
        assert_eq!(short_caller("main.rs", 3), "main.rs:3");
        assert_eq!(short_caller("/abs/path/lib.rs", 9), "path/lib.rs:9");
        assert_eq!(short_caller(r"src\win\mod.rs", 1), "win/mod.rs:1");
    }

    #[test]
    fn test_duration_value_in_seconds() {
        assert_eq!(duration_value(Duration::from_millis(1500)), Value::from(1.5));
        assert_eq!(duration_value(Duration::ZERO), Value::from(0.0));
    }

    #[test]
    fn test_json_record_layout() {
        let mut out = String::new();
        sample()
            .write_json(&mut out, "2024-05-01T10:00:00.000+0000", "info")
            .unwrap();

        assert!(out.ends_with('\n'));
        let record: serde_json::Map<String, Value> = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(record["level"], "info");
        assert_eq!(record["time"], "2024-05-01T10:00:00.000+0000");
        assert_eq!(record["caller"], "handlers/orders.rs:17");
        assert_eq!(record["msg"], "order \"42\" shipped");
        assert_eq!(record["attempt"], 2);
        assert_eq!(record["order_id"], "42");
        assert!(!record.contains_key("logger"));
        assert!(!record.contains_key("stacktrace"));
    }

    #[test]
    fn test_json_key_order() {
        let mut fields = sample();
        fields.logger = Some("billing".to_string());
        fields.version = Some("1.2.3".to_string());
        fields.stacktrace = Some("0: main".to_string());

        let mut out = String::new();
        fields.write_json(&mut out, "t", "error").unwrap();

        let positions: Vec<usize> = [
            "\"level\"",
            "\"time\"",
            "\"logger\"",
            "\"caller\"",
            "\"msg\"",
            "\"version\"",
            "\"attempt\"",
            "\"stacktrace\"",
        ]
        .iter()
        .map(|key| out.find(key).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{out}");
    }

    #[test]
    fn test_json_fixed_keys_win_over_context() {
        let mut fields = sample();
        fields.version = Some("1.2.3".to_string());
        fields.context = Some(
            r#"{"msg":"shadow","time":"never","version":"0.0.0","stacktrace":"fake","attempt":2}"#
                .to_string(),
        );

        let mut out = String::new();
        fields.write_json(&mut out, "t", "info").unwrap();

        for key in ["\"msg\"", "\"time\"", "\"version\""] {
            assert_eq!(out.matches(key).count(), 1, "{out}");
        }
        assert!(!out.contains("stacktrace"));
        let record: serde_json::Map<String, Value> = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(record["msg"], "order \"42\" shipped");
        assert_eq!(record["time"], "t");
        assert_eq!(record["version"], "1.2.3");
        assert_eq!(record["attempt"], 2);
    }

    #[test]
    fn test_console_includes_version_with_context() {
        let mut fields = sample();
        fields.version = Some("1.2.3".to_string());

        let mut out = String::new();
        fields.write_console(&mut out, "t", "info").unwrap();

        assert!(out.ends_with("\t{\"attempt\":2,\"order_id\":\"42\",\"version\":\"1.2.3\"}\n"), "{out}");
    }

    #[test]
    fn test_console_record_layout() {
        let mut out = String::new();
        sample()
            .write_console(&mut out, "2024-05-01T10:00:00.000+0000", "info")
            .unwrap();

        assert_eq!(
            out,
            "2024-05-01T10:00:00.000+0000\tinfo\thandlers/orders.rs:17\torder \"42\" shipped\t{\"attempt\":2,\"order_id\":\"42\"}\n"
        );
    }

    #[test]
    fn test_console_omits_empty_context() {
        let mut fields = sample();
        fields.context = Some(String::new());
        fields.stacktrace = Some("0: main".to_string());

        let mut out = String::new();
        fields.write_console(&mut out, "t", "warn").unwrap();

        assert_eq!(out, "t\twarn\thandlers/orders.rs:17\torder \"42\" shipped\n0: main\n");
    }
}
