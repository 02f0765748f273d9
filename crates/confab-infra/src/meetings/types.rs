//! Wire types for the meetings provider API

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Meeting type for a scheduled (non-instant) meeting.
pub const SCHEDULED_MEETING_TYPE: u8 = 2;

#[derive(Debug, Clone, Serialize)]
pub struct CreateMeetingBody {
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agenda: Option<String>,
    #[serde(rename = "type")]
    pub meeting_type: u8,
    pub start_time: String,
    pub duration: u32,
    pub timezone: String,
    pub settings: MeetingSettingsBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeetingSettingsBody {
    pub join_before_host: bool,
    pub waiting_room: bool,
}

#[derive(Debug, Deserialize)]
pub struct ApiMeeting {
    pub id: i64,
    pub uuid: String,
    pub topic: Option<String>,
    pub join_url: String,
    pub start_url: String,
    pub password: Option<String>,
    pub host_id: Option<String>,
    pub start_time: Option<String>,
    pub duration: Option<u32>,
    #[serde(default)]
    pub occurrences: Vec<ApiOccurrence>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiOccurrence {
    pub occurrence_id: String,
    pub start_time: String,
    pub duration: u32,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

/// Parse a provider timestamp. RFC 3339 values are normalized to UTC; bare
/// `YYYY-MM-DDTHH:MM:SS` values are taken as already UTC.
pub fn parse_provider_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S").ok()
}
