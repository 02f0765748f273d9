//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Confab
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ConfabError {
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Resource account busy: {0}")]
    ResourceBusy(String),

    #[error("Resource account required: {0}")]
    ResourceRequired(String),

    #[error("External provider error: {0}")]
    ExternalProvider(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConfabError {
    /// Domain failures are expected outcomes that the command boundary turns
    /// into a user-facing message; everything else is a fault.
    pub fn is_domain_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidState(_)
                | Self::ResourceBusy(_)
                | Self::ResourceRequired(_)
                | Self::NotFound(_)
                | Self::Validation(_)
        )
    }
}

/// Result type alias for Confab operations
pub type Result<T> = std::result::Result<T, ConfabError>;
