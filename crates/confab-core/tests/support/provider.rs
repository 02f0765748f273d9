//! Scripted meeting-provider mock

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use confab_core::provider_ports::{
    CreateMeetingSpec, MeetingOccurrence, MeetingProvider, ProviderRegistry, RemoteMeeting,
};
use confab_domain::{ConfabError, ResourceAccount, Result};

/// Provider mock with per-operation failure switches and call recording.
#[derive(Default)]
pub struct MockMeetingProvider {
    pub fail_create: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_occurrences: AtomicBool,
    counter: AtomicU64,
    created: Mutex<Vec<CreateMeetingSpec>>,
    deleted: Mutex<Vec<String>>,
    meetings: Mutex<HashMap<String, RemoteMeeting>>,
    occurrences: Mutex<HashMap<String, Vec<MeetingOccurrence>>>,
}

impl MockMeetingProvider {
    /// Specs received by `create_meeting`, in call order.
    pub fn created(&self) -> Vec<CreateMeetingSpec> {
        self.created.lock().unwrap().clone()
    }

    pub fn create_calls(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    /// Meeting ids passed to `delete_meeting`, in call order.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    /// Script the response `get_meeting` returns for an id.
    pub fn put_meeting(&self, meeting: RemoteMeeting) {
        self.meetings.lock().unwrap().insert(meeting.id.clone(), meeting);
    }

    /// Script the occurrence list for a recurring template id.
    pub fn put_occurrences(&self, meeting_id: &str, occurrences: Vec<MeetingOccurrence>) {
        self.occurrences.lock().unwrap().insert(meeting_id.to_string(), occurrences);
    }

    pub fn remote_meeting(id: &str, start_url: &str) -> RemoteMeeting {
        RemoteMeeting {
            id: id.to_string(),
            uuid: format!("uuid-{id}"),
            topic: Some(format!("Meeting {id}")),
            join_url: format!("https://meetings.example.com/j/{id}"),
            start_url: start_url.to_string(),
            access_code: Some("112233".to_string()),
            host_id: Some("host-1".to_string()),
            start: None,
            duration_minutes: Some(60),
        }
    }
}

#[async_trait]
impl MeetingProvider for MockMeetingProvider {
    async fn create_meeting(&self, spec: &CreateMeetingSpec) -> Result<RemoteMeeting> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(ConfabError::ExternalProvider("simulated provider outage".into()));
        }
        self.created.lock().unwrap().push(spec.clone());
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("90{n:04}");
        Ok(RemoteMeeting {
            id: id.clone(),
            uuid: format!("uuid-{id}"),
            topic: Some(spec.topic.clone()),
            join_url: format!("https://meetings.example.com/j/{id}"),
            start_url: format!("https://meetings.example.com/s/{id}"),
            access_code: Some("112233".to_string()),
            host_id: Some("host-1".to_string()),
            start: Some(spec.start),
            duration_minutes: Some(spec.duration_minutes),
        })
    }

    async fn delete_meeting(&self, meeting_id: &str) -> Result<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(ConfabError::ExternalProvider("simulated delete failure".into()));
        }
        self.deleted.lock().unwrap().push(meeting_id.to_string());
        Ok(())
    }

    async fn get_meeting(&self, meeting_id: &str) -> Result<RemoteMeeting> {
        self.meetings
            .lock()
            .unwrap()
            .get(meeting_id)
            .cloned()
            .ok_or_else(|| ConfabError::ExternalProvider(format!("meeting {meeting_id} not found")))
    }

    async fn list_occurrences(&self, meeting_id: &str) -> Result<Vec<MeetingOccurrence>> {
        if self.fail_occurrences.load(Ordering::SeqCst) {
            return Err(ConfabError::ExternalProvider("occurrence listing unavailable".into()));
        }
        Ok(self.occurrences.lock().unwrap().get(meeting_id).cloned().unwrap_or_default())
    }
}

/// Registry that hands every account the same mock client.
pub struct StaticRegistry {
    provider: Arc<MockMeetingProvider>,
}

impl StaticRegistry {
    pub fn new(provider: Arc<MockMeetingProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ProviderRegistry for StaticRegistry {
    async fn client_for(&self, _account: &ResourceAccount) -> Result<Arc<dyn MeetingProvider>> {
        Ok(self.provider.clone())
    }
}
