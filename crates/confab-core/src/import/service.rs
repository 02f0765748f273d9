//! Recurring meeting importer
//!
//! Materializes each occurrence of an external recurring meeting as an
//! independent local booking. All occurrences of one series share the
//! parent template's join/start/access-code fields, which is how the
//! provider behaves for recurring meetings.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, NaiveTime};
use confab_domain::{Booking, BookingStatus, ConfabError, ImportSummary, ResourceAccount, Result};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::ports::{BookingRepository, Clock, DepartmentRepository, ResourceAccountRepository};
use crate::provider_ports::{MeetingOccurrence, ProviderRegistry, RemoteMeeting};

/// Actor recorded on bookings the importer approves.
const IMPORT_ACTOR: &str = "importer";

/// Imports recurring provider meetings into local bookings.
pub struct ImportService {
    bookings: Arc<dyn BookingRepository>,
    departments: Arc<dyn DepartmentRepository>,
    accounts: Arc<dyn ResourceAccountRepository>,
    registry: Arc<dyn ProviderRegistry>,
    clock: Arc<dyn Clock>,
    call_delay: Duration,
}

impl ImportService {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        departments: Arc<dyn DepartmentRepository>,
        accounts: Arc<dyn ResourceAccountRepository>,
        registry: Arc<dyn ProviderRegistry>,
        clock: Arc<dyn Clock>,
        call_delay: Duration,
    ) -> Self {
        Self { bookings, departments, accounts, registry, clock, call_delay }
    }

    /// Import every not-yet-imported occurrence of a recurring template as an
    /// approved booking attributed to the given user and department.
    ///
    /// When the provider cannot return occurrences, the template itself is
    /// imported as a single booking. A failing occurrence never aborts the
    /// remaining ones.
    #[instrument(skip(self), fields(external_meeting_id))]
    pub async fn import_recurring(
        &self,
        external_meeting_id: &str,
        target_user: &str,
        target_department: &str,
        resource_account_id: &str,
    ) -> Result<ImportSummary> {
        let account =
            self.accounts.find_by_id(resource_account_id).await?.ok_or_else(|| {
                ConfabError::NotFound(format!(
                    "resource account {resource_account_id} does not exist"
                ))
            })?;
        if !account.is_active() {
            return Err(ConfabError::Validation(format!(
                "resource account '{}' is inactive",
                account.label,
            )));
        }
        if self.departments.find_by_id(target_department).await?.is_none() {
            return Err(ConfabError::NotFound(format!(
                "department {target_department} does not exist"
            )));
        }

        let client = self.registry.client_for(&account).await?;
        let template = client.get_meeting(external_meeting_id).await?;

        tokio::time::sleep(self.call_delay).await;

        let occurrences = match client.list_occurrences(external_meeting_id).await {
            Ok(list) if !list.is_empty() => list,
            Ok(_) => {
                debug!("provider reported no occurrences; importing template as single booking");
                Self::template_occurrence(&template)?
            }
            Err(err) => {
                warn!(error = %err, "occurrence listing failed; importing template as single booking");
                Self::template_occurrence(&template)?
            }
        };

        let total_occurrences = occurrences.len();
        let mut imported_count = 0;
        let mut errors = Vec::new();

        for occurrence in &occurrences {
            match self
                .import_one(&template, occurrence, target_user, target_department, &account)
                .await
            {
                Ok(true) => imported_count += 1,
                Ok(false) => {
                    debug!(occurrence_id = %occurrence.occurrence_id, "occurrence already imported");
                }
                Err(err) => {
                    errors.push(format!("occurrence {}: {err}", occurrence.occurrence_id));
                }
            }
        }

        info!(
            imported_count,
            total_occurrences,
            errors = errors.len(),
            "recurring import finished"
        );

        Ok(ImportSummary { imported_count, total_occurrences, errors })
    }

    /// Pseudo-occurrence for templates whose occurrence list is unavailable.
    fn template_occurrence(template: &RemoteMeeting) -> Result<Vec<MeetingOccurrence>> {
        let start = template.start.ok_or_else(|| {
            ConfabError::ExternalProvider(
                "recurring template has neither occurrences nor a start time".into(),
            )
        })?;
        Ok(vec![MeetingOccurrence {
            occurrence_id: template.id.clone(),
            start,
            duration_minutes: template.duration_minutes.unwrap_or(60),
        }])
    }

    /// Returns Ok(true) when a booking was created, Ok(false) when the
    /// occurrence was already present locally.
    async fn import_one(
        &self,
        template: &RemoteMeeting,
        occurrence: &MeetingOccurrence,
        target_user: &str,
        target_department: &str,
        account: &ResourceAccount,
    ) -> Result<bool> {
        if self
            .bookings
            .find_by_occurrence(&template.id, &occurrence.occurrence_id)
            .await?
            .is_some()
        {
            return Ok(false);
        }

        let date = occurrence.start.date();
        let start_time = occurrence.start.time();
        let minutes = i64::from(occurrence.duration_minutes.max(1));
        let mut end_time = start_time + ChronoDuration::minutes(minutes);
        if end_time <= start_time {
            // Occurrence runs past midnight; clamp to the end of its day.
            end_time = NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(start_time);
        }

        let now = self.clock.now();
        let booking = Booking {
            id: Uuid::now_v7().to_string(),
            title: template.topic.clone().unwrap_or_else(|| "Imported meeting".to_string()),
            agenda: None,
            date,
            start_time,
            end_time,
            user_id: target_user.to_string(),
            department_id: target_department.to_string(),
            status: BookingStatus::Approved,
            resource_account_id: Some(account.id.clone()),
            external_meeting_id: Some(template.id.clone()),
            external_uuid: Some(template.uuid.clone()),
            join_url: Some(template.join_url.clone()),
            start_url: Some(template.start_url.clone()),
            access_code: template.access_code.clone(),
            external_host_id: template.host_id.clone(),
            decided_by: Some(IMPORT_ACTOR.to_string()),
            decision_reason: None,
            cancelled_by: None,
            cancel_reason: None,
            is_imported: true,
            parent_external_id: Some(template.id.clone()),
            external_occurrence_id: Some(occurrence.occurrence_id.clone()),
            created_at: now,
            approved_at: Some(now),
            rejected_at: None,
            cancelled_at: None,
        };

        self.bookings.insert(&booking).await?;
        Ok(true)
    }
}
