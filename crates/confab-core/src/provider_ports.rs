//! Meeting provider port interfaces
//!
//! The external video-conferencing API is consumed through these traits;
//! the infra crate supplies the HTTP implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use confab_domain::{MeetingOptions, ProvisionedMeeting, ResourceAccount, Result};
use serde::{Deserialize, Serialize};

/// Fields sent to the provider when creating a meeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMeetingSpec {
    /// Local booking id, recorded in the audit log for correlation.
    pub booking_id: Option<String>,
    pub topic: String,
    pub agenda: Option<String>,
    pub start: NaiveDateTime,
    pub duration_minutes: u32,
    pub options: MeetingOptions,
}

/// A meeting as the provider reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteMeeting {
    pub id: String,
    pub uuid: String,
    pub topic: Option<String>,
    pub join_url: String,
    pub start_url: String,
    pub access_code: Option<String>,
    pub host_id: Option<String>,
    /// Scheduled start, present for single meetings and recurring templates.
    pub start: Option<NaiveDateTime>,
    pub duration_minutes: Option<u32>,
}

impl RemoteMeeting {
    /// The identifier subset persisted on an approved booking.
    pub fn to_provisioned(&self) -> ProvisionedMeeting {
        ProvisionedMeeting {
            meeting_id: self.id.clone(),
            uuid: self.uuid.clone(),
            join_url: self.join_url.clone(),
            start_url: self.start_url.clone(),
            access_code: self.access_code.clone(),
            host_id: self.host_id.clone(),
        }
    }
}

/// One dated instance of a recurring meeting template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingOccurrence {
    pub occurrence_id: String,
    pub start: NaiveDateTime,
    pub duration_minutes: u32,
}

/// Trait for meeting operations against one provider account.
#[async_trait]
pub trait MeetingProvider: Send + Sync {
    async fn create_meeting(&self, spec: &CreateMeetingSpec) -> Result<RemoteMeeting>;

    async fn delete_meeting(&self, meeting_id: &str) -> Result<()>;

    async fn get_meeting(&self, meeting_id: &str) -> Result<RemoteMeeting>;

    /// Occurrences of a recurring template. An empty list means the provider
    /// reported none.
    async fn list_occurrences(&self, meeting_id: &str) -> Result<Vec<MeetingOccurrence>>;
}

/// Yields a provider client for one resource account.
#[async_trait]
pub trait ProviderRegistry: Send + Sync {
    async fn client_for(&self, account: &ResourceAccount) -> Result<Arc<dyn MeetingProvider>>;
}
