//! External call audit records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry in the append-only external-call audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalCallRecord {
    pub id: String,
    pub resource_account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    /// Short verb describing the call, e.g. `create_meeting`.
    pub action: String,
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}
