//! External resource provisioner
//!
//! Creates and deletes the provider-side meeting that backs an approved
//! booking. Provider outages degrade to a locally synthesized fallback link
//! so the approval workflow is never blocked; the missing-meeting repair job
//! replaces fallback links later.

use std::sync::Arc;

use confab_domain::constants::FALLBACK_LINK_BASE;
use confab_domain::{
    Booking, ConfabError, MeetingOptions, ProvisionedMeeting, ResourceAccount, Result,
};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::availability::AvailabilityService;
use crate::provider_ports::{CreateMeetingSpec, ProviderRegistry, RemoteMeeting};

/// Outcome of provisioning one booking.
#[derive(Debug, Clone)]
pub enum ProvisionOutcome {
    /// The provider created a real meeting.
    External(ProvisionedMeeting),
    /// The provider call failed; a placeholder link was issued instead.
    Fallback { join_url: String },
}

/// Provisions external meetings for approved bookings.
pub struct ProvisioningService {
    registry: Arc<dyn ProviderRegistry>,
    availability: Arc<AvailabilityService>,
}

impl ProvisioningService {
    pub fn new(registry: Arc<dyn ProviderRegistry>, availability: Arc<AvailabilityService>) -> Self {
        Self { registry, availability }
    }

    /// Re-check the account window, then create the external meeting.
    /// Provider and network failures are absorbed into the fallback path;
    /// every other error propagates.
    #[instrument(skip(self, booking, account, options), fields(booking_id = %booking.id, account_id = %account.id))]
    pub async fn provision(
        &self,
        booking: &Booking,
        account: &ResourceAccount,
        options: MeetingOptions,
    ) -> Result<ProvisionOutcome> {
        let free = self
            .availability
            .account_window_free(
                account,
                booking.date,
                booking.start_time,
                booking.end_time,
                Some(&booking.id),
            )
            .await?;
        if !free {
            return Err(ConfabError::ResourceBusy(format!(
                "resource account '{}' already hosts a meeting overlapping {} {} - {}",
                account.label,
                booking.date,
                booking.start_time.format("%H:%M"),
                booking.end_time.format("%H:%M"),
            )));
        }

        match self.create_remote(booking, account, options).await {
            Ok(remote) => Ok(ProvisionOutcome::External(remote.to_provisioned())),
            Err(err @ (ConfabError::ExternalProvider(_) | ConfabError::Network(_))) => {
                warn!(error = %err, "provider call failed; issuing fallback join link");
                Ok(ProvisionOutcome::Fallback { join_url: Self::fallback_join_url() })
            }
            Err(other) => Err(other),
        }
    }

    /// Creation contract shared with the missing-meeting repair job: no
    /// fallback, the caller decides what a failure means.
    pub async fn create_remote(
        &self,
        booking: &Booking,
        account: &ResourceAccount,
        options: MeetingOptions,
    ) -> Result<RemoteMeeting> {
        let client = self.registry.client_for(account).await?;
        let spec = CreateMeetingSpec {
            booking_id: Some(booking.id.clone()),
            topic: booking.title.clone(),
            agenda: booking.agenda.clone(),
            start: booking.date.and_time(booking.start_time),
            duration_minutes: booking.duration_minutes().max(1) as u32,
            options: options.resolved(),
        };
        client.create_meeting(&spec).await
    }

    /// Best-effort deletion of the external meeting backing a booking.
    /// Failures are logged and never block the caller.
    #[instrument(skip(self, booking, account), fields(booking_id = %booking.id))]
    pub async fn deprovision(&self, booking: &Booking, account: &ResourceAccount) {
        let Some(meeting_id) = booking.external_meeting_id.as_deref() else {
            debug!("no external meeting to deprovision");
            return;
        };
        self.delete_remote(account, meeting_id, &booking.id).await;
    }

    /// Best-effort deletion of a known external meeting id.
    pub async fn delete_remote(&self, account: &ResourceAccount, meeting_id: &str, booking_id: &str) {
        match self.registry.client_for(account).await {
            Ok(client) => {
                if let Err(err) = client.delete_meeting(meeting_id).await {
                    warn!(
                        booking_id,
                        meeting_id,
                        error = %err,
                        "external meeting deletion failed; continuing"
                    );
                }
            }
            Err(err) => {
                warn!(booking_id, error = %err, "no provider client for account; skipping deletion");
            }
        }
    }

    fn fallback_join_url() -> String {
        format!("{}/{}", FALLBACK_LINK_BASE, Uuid::new_v4().simple())
    }
}
