//! HTTP client for one provider account
//!
//! Every call is recorded in the external-call audit log with the raw
//! request/response bodies; audit failures are logged but never fail the
//! call itself.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use confab_core::ports::ExternalCallAudit;
use confab_core::provider_ports::{
    CreateMeetingSpec, MeetingOccurrence, MeetingProvider, RemoteMeeting,
};
use confab_domain::constants::PROVIDER_TIMEZONE;
use confab_domain::{ConfabError, ExternalCallRecord, ResourceAccount, Result};
use tokio::sync::Mutex;
use tracing::{instrument, warn};
use uuid::Uuid;

use super::auth::{fetch_access_token, TokenState};
use super::types::{
    parse_provider_timestamp, ApiMeeting, CreateMeetingBody, MeetingSettingsBody,
    SCHEDULED_MEETING_TYPE,
};
use crate::errors::InfraError;

/// Meetings API client bound to one resource account.
pub struct MeetingsApiClient {
    http: reqwest::Client,
    base_url: String,
    account: ResourceAccount,
    audit: Arc<dyn ExternalCallAudit>,
    token: Mutex<Option<TokenState>>,
}

impl MeetingsApiClient {
    pub fn new(
        http: reqwest::Client,
        base_url: String,
        account: ResourceAccount,
        audit: Arc<dyn ExternalCallAudit>,
    ) -> Self {
        Self { http, base_url, account, audit, token: Mutex::new(None) }
    }

    /// Return a cached access token, refreshing it when expired.
    async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(state) = guard.as_ref() {
            if state.is_valid() {
                return Ok(state.access_token.clone());
            }
        }
        let state = fetch_access_token(&self.http, &self.base_url, &self.account).await?;
        let token = state.access_token.clone();
        *guard = Some(state);
        Ok(token)
    }

    #[allow(clippy::too_many_arguments)]
    async fn record_call(
        &self,
        booking_id: Option<&str>,
        action: &str,
        endpoint: &str,
        request_body: Option<String>,
        response_body: Option<String>,
        http_status: Option<u16>,
        success: bool,
        error_message: Option<String>,
    ) {
        let entry = ExternalCallRecord {
            id: Uuid::now_v7().to_string(),
            resource_account_id: self.account.id.clone(),
            booking_id: booking_id.map(str::to_string),
            action: action.to_string(),
            endpoint: endpoint.to_string(),
            request_body,
            response_body,
            http_status,
            success,
            error_message,
            created_at: Utc::now(),
        };
        if let Err(err) = self.audit.record(entry).await {
            warn!(action, error = %err, "failed to record external call audit entry");
        }
    }

    /// Send a request, audit the outcome, and return the response body.
    async fn call(
        &self,
        action: &'static str,
        booking_id: Option<&str>,
        endpoint: &str,
        request: reqwest::RequestBuilder,
        request_body: Option<String>,
    ) -> Result<String> {
        match request.send().await {
            Err(err) => {
                let err: ConfabError = InfraError::from(err).into();
                self.record_call(
                    booking_id,
                    action,
                    endpoint,
                    request_body,
                    None,
                    None,
                    false,
                    Some(err.to_string()),
                )
                .await;
                Err(err)
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                if status.is_success() {
                    self.record_call(
                        booking_id,
                        action,
                        endpoint,
                        request_body,
                        Some(body.clone()),
                        Some(status.as_u16()),
                        true,
                        None,
                    )
                    .await;
                    Ok(body)
                } else {
                    let err = ConfabError::ExternalProvider(format!(
                        "{action} failed ({status}): {body}"
                    ));
                    self.record_call(
                        booking_id,
                        action,
                        endpoint,
                        request_body,
                        Some(body),
                        Some(status.as_u16()),
                        false,
                        Some(err.to_string()),
                    )
                    .await;
                    Err(err)
                }
            }
        }
    }

    fn parse_meeting(body: &str) -> Result<ApiMeeting> {
        serde_json::from_str(body).map_err(|e| {
            ConfabError::ExternalProvider(format!("unexpected provider response: {e}"))
        })
    }

    fn to_remote(api: ApiMeeting) -> RemoteMeeting {
        RemoteMeeting {
            id: api.id.to_string(),
            uuid: api.uuid,
            topic: api.topic,
            join_url: api.join_url,
            start_url: api.start_url,
            access_code: api.password,
            host_id: api.host_id,
            start: api.start_time.as_deref().and_then(parse_provider_timestamp),
            duration_minutes: api.duration,
        }
    }
}

#[async_trait]
impl MeetingProvider for MeetingsApiClient {
    #[instrument(skip(self, spec), fields(account = %self.account.id, topic = %spec.topic))]
    async fn create_meeting(&self, spec: &CreateMeetingSpec) -> Result<RemoteMeeting> {
        let token = self.access_token().await?;
        let endpoint = format!(
            "{}/v2/users/{}/meetings",
            self.base_url, self.account.external_account_ref
        );

        let body = CreateMeetingBody {
            topic: spec.topic.clone(),
            agenda: spec.agenda.clone(),
            meeting_type: SCHEDULED_MEETING_TYPE,
            start_time: spec.start.format("%Y-%m-%dT%H:%M:%S").to_string(),
            duration: spec.duration_minutes,
            timezone: PROVIDER_TIMEZONE.to_string(),
            settings: MeetingSettingsBody {
                join_before_host: spec.options.join_before_host,
                waiting_room: spec.options.waiting_room,
            },
        };
        let request_json = serde_json::to_string(&body).ok();

        let request = self.http.post(&endpoint).bearer_auth(&token).json(&body);
        let response_body = self
            .call("create_meeting", spec.booking_id.as_deref(), &endpoint, request, request_json)
            .await?;

        Ok(Self::to_remote(Self::parse_meeting(&response_body)?))
    }

    #[instrument(skip(self), fields(account = %self.account.id))]
    async fn delete_meeting(&self, meeting_id: &str) -> Result<()> {
        let token = self.access_token().await?;
        let endpoint = format!("{}/v2/meetings/{meeting_id}", self.base_url);

        let request = self.http.delete(&endpoint).bearer_auth(&token);
        self.call("delete_meeting", None, &endpoint, request, None).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(account = %self.account.id))]
    async fn get_meeting(&self, meeting_id: &str) -> Result<RemoteMeeting> {
        let token = self.access_token().await?;
        let endpoint = format!("{}/v2/meetings/{meeting_id}", self.base_url);

        let request = self.http.get(&endpoint).bearer_auth(&token);
        let response_body = self.call("get_meeting", None, &endpoint, request, None).await?;

        Ok(Self::to_remote(Self::parse_meeting(&response_body)?))
    }

    #[instrument(skip(self), fields(account = %self.account.id))]
    async fn list_occurrences(&self, meeting_id: &str) -> Result<Vec<MeetingOccurrence>> {
        let token = self.access_token().await?;
        let endpoint = format!("{}/v2/meetings/{meeting_id}", self.base_url);

        let request = self.http.get(&endpoint).bearer_auth(&token);
        let response_body = self.call("list_occurrences", None, &endpoint, request, None).await?;
        let api = Self::parse_meeting(&response_body)?;

        let mut occurrences = Vec::with_capacity(api.occurrences.len());
        for occ in api.occurrences {
            match parse_provider_timestamp(&occ.start_time) {
                Some(start) => occurrences.push(MeetingOccurrence {
                    occurrence_id: occ.occurrence_id,
                    start,
                    duration_minutes: occ.duration,
                }),
                None => {
                    warn!(
                        occurrence_id = %occ.occurrence_id,
                        start_time = %occ.start_time,
                        "skipping occurrence with unparseable start time"
                    );
                }
            }
        }
        Ok(occurrences)
    }
}
