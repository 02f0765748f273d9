//! Booking lifecycle types

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ConfabError;

/// Lifecycle status of a booking.
///
/// Transitions are one-directional: `Pending` moves to `Approved` or
/// `Rejected` exactly once, `Approved` may move to `Cancelled`. `Rejected`
/// and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Terminal states cannot transition further.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled)
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = ConfabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ConfabError::Validation(format!("unknown booking status: {other}"))),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested or confirmed reservation of a shared meeting slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agenda: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub user_id: String,
    pub department_id: String,
    pub status: BookingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_account_id: Option<String>,

    // External identifiers, populated only after successful provisioning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_meeting_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_host_id: Option<String>,

    // Decision audit fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,

    // Recurrence markers set by the importer.
    #[serde(default)]
    pub is_imported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_occurrence_id: Option<String>,

    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Booking {
    /// Duration of the booked window in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// A booking is provisioned when it carries a real external meeting id.
    pub fn is_provisioned(&self) -> bool {
        self.external_meeting_id.is_some()
    }
}

/// Parameters for creating a new booking request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBookingRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agenda: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub user_id: String,
    pub department_id: String,
}

/// Identifiers returned by the external provider for one created meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionedMeeting {
    pub meeting_id: String,
    pub uuid: String,
    pub join_url: String,
    pub start_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_id: Option<String>,
}

/// Everything the approval transaction persists in one write.
///
/// Either `external` is set (real meeting) or `fallback_join_url` is
/// (provider outage path); never both.
#[derive(Debug, Clone)]
pub struct ApprovalRecord {
    pub booking_id: String,
    pub resource_account_id: String,
    /// Capacity of the selected account, re-checked inside the transaction.
    pub account_capacity: u32,
    pub external: Option<ProvisionedMeeting>,
    pub fallback_join_url: Option<String>,
    pub actor: String,
    pub approved_at: DateTime<Utc>,
}
