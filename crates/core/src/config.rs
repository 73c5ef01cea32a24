//! Configuration loader
//!
//! Builds a [`SessionConfig`] from, in increasing priority:
//! 1. built-in defaults
//! 2. a config file (JSON or TOML, by extension)
//! 3. `AUTHSYNC_*` environment variables, after loading `.env` if present
//!
//! ## Environment Variables
//! - `AUTHSYNC_CONFIG_PATH`: explicit config file path (skips probing)
//! - `AUTHSYNC_SERVICE_NAME`: keychain service name
//! - `AUTHSYNC_REFRESH_INTERVAL_SECS`: delay between successful refreshes
//! - `AUTHSYNC_BACKOFF_UNIT_MS`: unit multiplied by `2^attempt`
//! - `AUTHSYNC_JITTER_MS`: backoff jitter bound
//! - `AUTHSYNC_MAX_BACKOFF_MS`: ceiling for one backoff delay
//! - `AUTHSYNC_MAX_BACKOFF_WINDOW_SECS`: give-up window for consecutive failures
//! - `AUTHSYNC_UNRECOVERABLE_ERROR_TYPES`: comma-separated server error codes
//!
//! ## File Locations
//! Without `AUTHSYNC_CONFIG_PATH`, the loader probes `authsync.json` and
//! `authsync.toml` in the working directory, its two parents, and next to the
//! executable. No file at all is fine; defaults apply.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use authsync_domain::constants::ENV_PREFIX;
use authsync_domain::{ConfigError, SessionConfig};
use tracing::{debug, info};

const CONFIG_FILE_STEMS: &[&str] = &["authsync.json", "authsync.toml"];

/// Load configuration from `.env`, file and environment.
///
/// # Errors
/// Returns `ConfigError` if an explicit file is missing, a file does not
/// parse, an override is not a valid value, or the result fails validation.
pub fn load() -> Result<SessionConfig, ConfigError> {
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "Loaded .env file");
    }

    let file = match env_string("CONFIG_PATH") {
        Some(path) => Some(PathBuf::from(path)),
        None => probe_config_paths(),
    };

    let mut config = match file {
        Some(path) => load_from_file(&path)?,
        None => {
            debug!("No config file found; using defaults");
            SessionConfig::default()
        }
    };

    apply_env_overrides(&mut config)?;
    config.validate()?;

    info!(
        service = %config.storage.service_name,
        refresh_interval_secs = config.refresh.base_interval_secs,
        "Configuration loaded"
    );
    Ok(config)
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns `ConfigError::NotFound` if the file does not exist and
/// `ConfigError::Parse` if it is not valid JSON/TOML.
pub fn load_from_file(path: &Path) -> Result<SessionConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }

    info!(path = %path.display(), "Loading configuration from file");
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;

    parse_config(&contents, path)
}

fn parse_config(contents: &str, path: &Path) -> Result<SessionConfig, ConfigError> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| ConfigError::Parse {
            format: "TOML".into(),
            message: e.to_string(),
        }),
        "json" => serde_json::from_str(contents).map_err(|e| ConfigError::Parse {
            format: "JSON".into(),
            message: e.to_string(),
        }),
        other => Err(ConfigError::Parse {
            format: other.to_string(),
            message: "unsupported config format".into(),
        }),
    }
}

/// First existing config file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join(".."));
        dirs.push(cwd.join("../.."));
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_STEMS.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Apply `AUTHSYNC_*` overrides on top of `config`.
///
/// # Errors
/// Returns `ConfigError::InvalidValue` for values that do not parse.
pub fn apply_env_overrides(config: &mut SessionConfig) -> Result<(), ConfigError> {
    if let Some(service_name) = env_string("SERVICE_NAME") {
        config.storage.service_name = service_name;
    }

    let refresh = &mut config.refresh;
    if let Some(value) = env_parse("REFRESH_INTERVAL_SECS")? {
        refresh.base_interval_secs = value;
    }
    if let Some(value) = env_parse("BACKOFF_UNIT_MS")? {
        refresh.backoff_unit_ms = value;
    }
    if let Some(value) = env_parse("JITTER_MS")? {
        refresh.jitter_ms = value;
    }
    if let Some(value) = env_parse("MAX_BACKOFF_MS")? {
        refresh.max_backoff_ms = value;
    }
    if let Some(value) = env_parse("MAX_BACKOFF_WINDOW_SECS")? {
        refresh.max_backoff_window_secs = value;
    }

    if let Some(list) = env_string("UNRECOVERABLE_ERROR_TYPES") {
        config.unrecoverable_error_types = list
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string)
            .collect();
    }

    Ok(())
}

fn env_key(name: &str) -> String {
    format!("{ENV_PREFIX}{name}")
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(env_key(name)).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_string(name)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
                key: env_key(name),
                message: e.to_string(),
            })
        })
        .transpose()
}
