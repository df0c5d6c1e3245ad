//! Bootkit entry point.
//!
//! Loads settings, builds the logger and reports the resolved configuration.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bootkit::{duration_value, ConfigLoader, Logger, TracingLogger};

/// Semantic version injected at build time
const SEMANTIC_VERSION: Option<&str> = option_env!("BOOTKIT_SEMANTIC_VERSION");

#[derive(Parser, Debug)]
#[command(name = "bootkit")]
#[command(about = "Load service settings and initialize structured logging", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory to search for `config.yaml` and `.env` (repeatable, in order)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    config_dirs: Vec<PathBuf>,

    /// Override the semantic version attached to every record
    #[arg(long, env = "BOOTKIT_VERSION_TAG")]
    version_tag: Option<String>,
}

fn main() -> anyhow::Result<()> {
    // Loader diagnostics go through the global subscriber; RUST_LOG=debug shows them
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let loader = if cli.config_dirs.is_empty() {
        ConfigLoader::new()
    } else {
        ConfigLoader::with_paths(cli.config_dirs)
    };
    let settings = loader.load().context("failed to load settings")?;

    let mut builder = TracingLogger::builder(&settings);
    if let Some(version) = cli.version_tag.as_deref().or(SEMANTIC_VERSION) {
        builder = builder.semantic_version(version);
    }
    let logger = builder.build().context("failed to build logger")?;

    logger
        .with_field("env", json!(settings.application.env))
        .with_field("debug", json!(settings.application.debug))
        .with_field("profiling", json!(settings.application.enable_profiling))
        .with_field(
            "http_timeout",
            duration_value(settings.connection.http.timeout_duration()),
        )
        .infof(format_args!(
            "settings loaded (postgres master {}:{}, replica {}:{})",
            settings.connection.postgresql.master.host,
            settings.connection.postgresql.master.port,
            settings.connection.postgresql.slave.host,
            settings.connection.postgresql.slave.port,
        ));

    if let Err(err) = logger.sync() {
        eprintln!("warning: {err}");
    }

    Ok(())
}
