//! Domain models

pub mod settings;

pub use settings::{
    ApplicationSettings, ConnectionSettings, HttpSettings, LoggingSettings, PostgresqlInstance,
    PostgresqlSettings, RotationPolicy, Settings,
};
