//! Application configuration structures
//!
//! Deserialized from a TOML file (or environment overrides) by the infra
//! config loader.

use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub provider: ProviderConfig,
    pub jobs: JobsConfig,
}

/// SQLite database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "confab.db".into(), pool_size: 4 }
    }
}

/// External meeting-provider settings shared by all resource accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self { base_url: "https://api.meetings.example.com".into(), timeout_secs: 30 }
    }
}

/// Reconciliation job settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    /// Fixed delay inserted between external calls in batch loops.
    pub call_delay_ms: u64,
    /// Cron expression for the scheduled start-link refresh.
    pub refresh_cron: String,
    /// Cron expression for the scheduled missing-meeting repair.
    pub repair_cron: String,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            call_delay_ms: 250,
            refresh_cron: "0 0 * * * *".into(),  // hourly
            repair_cron: "0 30 * * * *".into(),  // hourly, offset
        }
    }
}
