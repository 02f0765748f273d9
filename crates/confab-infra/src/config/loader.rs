//! Configuration loader
//!
//! Loads application configuration from a TOML file with environment
//! variable overrides for the most operationally relevant fields.
//!
//! ## Environment Variables
//! - `CONFAB_CONFIG`: Path to the config file (default `confab.toml`)
//! - `CONFAB_DB_PATH`: Database file path override
//! - `CONFAB_PROVIDER_BASE_URL`: Provider base URL override

use std::path::{Path, PathBuf};

use confab_domain::{AppConfig, ConfabError, Result};
use tracing::{debug, info};

const DEFAULT_CONFIG_FILE: &str = "confab.toml";

/// Load configuration from the default location (or `CONFAB_CONFIG`),
/// falling back to built-in defaults when no file exists.
pub fn load() -> Result<AppConfig> {
    let path = std::env::var("CONFAB_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

    let mut config = if path.exists() {
        load_from_file(&path)?
    } else {
        debug!(path = %path.display(), "no config file found; using defaults");
        AppConfig::default()
    };

    apply_env_overrides(&mut config);
    Ok(config)
}

/// Load configuration from a specific TOML file.
pub fn load_from_file(path: &Path) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        ConfabError::Config(format!("cannot read config file {}: {e}", path.display()))
    })?;

    let config: AppConfig = toml::from_str(&contents).map_err(|e| {
        ConfabError::Config(format!("invalid config file {}: {e}", path.display()))
    })?;

    info!(path = %path.display(), "configuration loaded");
    Ok(config)
}

fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(db_path) = std::env::var("CONFAB_DB_PATH") {
        config.database.path = db_path;
    }
    if let Ok(base_url) = std::env::var("CONFAB_PROVIDER_BASE_URL") {
        config.provider.base_url = base_url;
    }
}
