use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::models::settings::Settings;

/// Directories searched when no explicit candidates are given
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = [".", "configs"];

/// File names tried, in order, inside each candidate directory
pub const CONFIG_FILE_NAMES: [&str; 3] = ["config.yaml", "config.yml", "config"];

/// Environment override file name
pub const ENV_FILE_NAME: &str = ".env";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("ConfigLoader::load: failed to read config file: {0}")]
    Read(#[from] ReadError),

    #[error("ConfigLoader::load: failed to decode config: {0}")]
    Decode(#[source] Box<figment::Error>),
}

impl ConfigError {
    /// The config file was missing or unreadable
    pub const fn is_read(&self) -> bool {
        matches!(self, Self::Read(_))
    }

    /// The merged configuration did not fit [`Settings`]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Decode(Box::new(err))
    }
}

/// Why the configuration file could not be read
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("no config file (config.yaml, config.yml or config) found in {}", display_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed YAML in {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{} must contain a mapping at the top level", .path.display())]
    NotAMapping { path: PathBuf },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("{:?}", p.display().to_string()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Layered settings loader
///
/// Precedence (lowest to highest):
/// 1. `Settings::default()`
/// 2. The first `config.yaml` / `config.yml` / `config` found in the
///    candidate directories
/// 3. Environment variables named after the dotted key, upper-cased with
///    dots replaced by underscores (`log.level` -> `LOG_LEVEL`)
///
/// `.env` files in the candidate directories and the working directory are
/// loaded into the process environment first. They never override variables
/// that are already set.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    paths: Vec<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader searching `.` then `configs`
    pub fn new() -> Self {
        Self::with_paths(DEFAULT_CONFIG_PATHS)
    }

    /// Loader searching `paths` in order
    pub fn with_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Candidate directories, in search order
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Load, merge and decode the settings
    ///
    /// Mutates the process environment as a side effect of loading `.env`
    /// files.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        for dir in &self.paths {
            let _ = load_env_file(&dir.join(ENV_FILE_NAME));
        }
        let _ = load_env_file(Path::new(ENV_FILE_NAME));

        let path = self.find_config_file()?;
        let contents = fs::read_to_string(&path).map_err(|source| ReadError::Io {
            path: path.clone(),
            source,
        })?;
        let document: serde_yaml::Value =
            serde_yaml::from_str(&contents).map_err(|source| ReadError::Malformed {
                path: path.clone(),
                source,
            })?;

        let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));
        match document {
            serde_yaml::Value::Mapping(mapping) => {
                let normalized = serde_yaml::to_string(&lowercase_keys(mapping)).map_err(
                    |source| ReadError::Malformed {
                        path: path.clone(),
                        source,
                    },
                )?;
                figment = figment.merge(Yaml::string(&normalized));
            }
            serde_yaml::Value::Null => {}
            _ => return Err(ReadError::NotAMapping { path }.into()),
        }

        let overrides = environment_overrides();
        let overridden: Vec<&str> = overrides.iter().map(|(key, _)| key.as_str()).collect();
        tracing::debug!(
            config_file = %path.display(),
            env_overrides = ?overridden,
            "loading settings"
        );

        let settings: Settings = figment
            .merge(Serialized::defaults(nest(&overrides)))
            .extract()?;

        Ok(settings)
    }

    fn find_config_file(&self) -> Result<PathBuf, ReadError> {
        self.paths
            .iter()
            .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| ReadError::NotFound {
                searched: self.paths.clone(),
            })
    }
}

/// Load settings from the default candidate directories
pub fn load_settings() -> Result<Settings, ConfigError> {
    ConfigLoader::new().load()
}

/// Best-effort load of one `.env` file
///
/// Returns the path when the file existed and parsed. Missing or malformed
/// files yield `None` and are otherwise ignored.
fn load_env_file(path: &Path) -> Option<PathBuf> {
    if !path.is_file() {
        return None;
    }
    match dotenvy::from_path(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "loaded environment file");
            Some(path.to_path_buf())
        }
        Err(_) => None,
    }
}

/// Lowercase every string key of a YAML mapping, recursively
fn lowercase_keys(mapping: serde_yaml::Mapping) -> serde_yaml::Mapping {
    mapping
        .into_iter()
        .map(|(key, value)| {
            let key = match key {
                serde_yaml::Value::String(name) => serde_yaml::Value::String(name.to_lowercase()),
                other => other,
            };
            let value = match value {
                serde_yaml::Value::Mapping(inner) => serde_yaml::Value::Mapping(lowercase_keys(inner)),
                other => other,
            };
            (key, value)
        })
        .collect()
}

/// Environment variable name for a dotted key, lowercased for matching
fn env_key(path: &str) -> String {
    path.replace('.', "_").to_ascii_lowercase()
}

/// Dotted paths of every leaf in `value`, with the leaf's default
fn leaf_paths<'a>(value: &'a Value, prefix: &str, out: &mut Vec<(String, &'a Value)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                leaf_paths(child, &path, out);
            }
        }
        leaf => out.push((prefix.to_string(), leaf)),
    }
}

/// Environment values for every known settings key, sorted by key
///
/// Variables that are set but empty count as unset.
fn environment_overrides() -> Vec<(String, Value)> {
    // Settings serializes to plain maps and scalars, so this cannot fail.
    let defaults = serde_json::to_value(Settings::default()).unwrap_or_default();
    let mut leaves = Vec::new();
    leaf_paths(&defaults, "", &mut leaves);

    let by_env_key: HashMap<String, (&str, &Value)> = leaves
        .iter()
        .map(|(path, default)| (env_key(path), (path.as_str(), *default)))
        .collect();

    let mut overrides: Vec<(String, Value)> = Env::raw()
        .iter()
        .filter(|(_, raw)| !raw.is_empty())
        .filter_map(|(key, raw)| {
            let (path, default) = by_env_key.get(&key.as_str().to_ascii_lowercase())?;
            Some(((*path).to_string(), coerce(raw, default)))
        })
        .collect();
    overrides.sort_by(|a, b| a.0.cmp(&b.0));
    overrides.dedup_by(|a, b| a.0 == b.0);
    overrides
}

/// Convert a raw environment string to the type of the default it replaces
///
/// Values that do not parse stay strings so the mismatch surfaces when the
/// merged configuration is decoded.
fn coerce(raw: String, default: &Value) -> Value {
    match default {
        Value::Bool(_) => parse_bool(&raw).map_or(Value::String(raw), Value::Bool),
        Value::Number(n) if n.is_f64() => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map_or(Value::String(raw), Value::Number),
        Value::Number(_) => {
            let trimmed = raw.trim();
            if let Ok(n) = trimmed.parse::<u64>() {
                Value::from(n)
            } else if let Ok(n) = trimmed.parse::<i64>() {
                Value::from(n)
            } else {
                Value::String(raw)
            }
        }
        _ => Value::String(raw),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Expand dotted keys into nested objects
fn nest(entries: &[(String, Value)]) -> Value {
    let mut root = Map::new();
    for (path, value) in entries {
        let segments: Vec<&str> = path.split('.').collect();
        insert_path(&mut root, &segments, value.clone());
    }
    Value::Object(root)
}

fn insert_path(map: &mut Map<String, Value>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            map.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let child = map
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(inner) = child {
                insert_path(inner, rest, value);
            }
        }
    }
}
