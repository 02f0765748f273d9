//! External provider resource accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a resource account may be allocated to new bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Inactive,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl std::str::FromStr for AccountStatus {
    type Err = crate::errors::ConfabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(crate::errors::ConfabError::Validation(format!(
                "unknown account status: {other}"
            ))),
        }
    }
}

/// Credentials and capacity for one external meeting-provider account.
///
/// The credential fields are opaque to the core; only the provider client
/// interprets them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceAccount {
    pub id: String,
    pub label: String,
    pub contact_email: String,
    /// Account reference on the provider side (token endpoint scope).
    pub external_account_ref: String,
    pub client_id: String,
    pub client_secret: String,
    pub max_concurrent_meetings: u32,
    pub status: AccountStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_verified_at: Option<DateTime<Utc>>,
}

impl ResourceAccount {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}
