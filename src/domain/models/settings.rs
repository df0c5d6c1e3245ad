use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Fully resolved application settings
///
/// Built once by [`ConfigLoader`](crate::infrastructure::config::ConfigLoader)
/// at startup and treated as read-only afterwards. The serde names are the
/// configuration keys: `log.level` in YAML, `LOG_LEVEL` in the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Settings {
    /// Logging configuration
    #[serde(rename = "log")]
    pub logging: LoggingSettings,

    /// Application-wide flags
    #[serde(rename = "app_config")]
    pub application: ApplicationSettings,

    /// Outbound connection settings
    pub connection: ConnectionSettings,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct LoggingSettings {
    /// Minimum severity: debug, info, warn, error, fatal, panic
    pub level: String,

    /// Output encoding: console or json
    pub format: String,

    /// Directory for rolling log files (stderr when unset)
    pub output_dir: Option<PathBuf>,

    /// Rotation policy for file output
    pub rotation: RotationPolicy,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "console".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            output_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}

/// Log file rotation policy
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    /// Start a new file every day
    #[default]
    Daily,
    /// Start a new file every hour
    Hourly,
    /// Append to a single file
    Never,
}

/// Application-wide flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ApplicationSettings {
    /// Deployment environment name (e.g. `staging`)
    pub env: String,

    /// Selects the development logger profile
    pub debug: bool,

    /// Whether profiling endpoints should be exposed
    pub enable_profiling: bool,
}

/// Outbound connection settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ConnectionSettings {
    /// HTTP client settings
    pub http: HttpSettings,

    /// PostgreSQL primary/replica settings
    pub postgresql: PostgresqlSettings,
}

/// HTTP client settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct HttpSettings {
    /// Request timeout in whole seconds
    pub timeout: u64,
}

impl HttpSettings {
    /// Request timeout as a [`Duration`]
    pub const fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// PostgreSQL primary/replica settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct PostgresqlSettings {
    /// Read-write instance
    pub master: PostgresqlInstance,

    /// Read-only replica
    pub slave: PostgresqlInstance,
}

/// Connection parameters for a single PostgreSQL instance
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct PostgresqlInstance {
    /// Hostname or IP address
    pub host: String,
    /// TCP port
    pub port: u16,
    /// Login role
    pub username: String,
    /// Login password (redacted from `Debug` output)
    pub password: String,
    /// Database name
    pub database: String,
    /// Maximum open connections in the pool
    pub max_open: u32,
    /// Maximum idle connections kept in the pool
    pub max_idle: u32,
}

impl PostgresqlInstance {
    /// Render a `postgres://` connection URL
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }
}

impl fmt::Debug for PostgresqlInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresqlInstance")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("database", &self.database)
            .field("max_open", &self.max_open)
            .field("max_idle", &self.max_idle)
            .finish()
    }
}
