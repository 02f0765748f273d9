//! Approval workflow - the booking state machine
//!
//! Owns the `pending -> approved | rejected` and `approved -> cancelled`
//! transitions and the provisioning side effects they trigger. The terminal
//! states never transition further.

use std::sync::Arc;

use confab_domain::{
    ApprovalRecord, BookingStatus, BulkApproveSummary, BulkItemOutcome, ConfabError,
    MeetingOptions, Result,
};
use tracing::{info, instrument, warn};

use crate::availability::AvailabilityService;
use crate::ports::{BookingRepository, Clock, ResourceAccountRepository};
use crate::provision::{ProvisionOutcome, ProvisioningService};

/// What an approval produced, beyond the status change.
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    pub booking_id: String,
    /// True when the provider call failed and a placeholder link was stored.
    pub fallback: bool,
}

/// Drives booking lifecycle transitions.
pub struct ApprovalService {
    bookings: Arc<dyn BookingRepository>,
    accounts: Arc<dyn ResourceAccountRepository>,
    availability: Arc<AvailabilityService>,
    provisioner: Arc<ProvisioningService>,
    clock: Arc<dyn Clock>,
}

impl ApprovalService {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        accounts: Arc<dyn ResourceAccountRepository>,
        availability: Arc<AvailabilityService>,
        provisioner: Arc<ProvisioningService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { bookings, accounts, availability, provisioner, clock }
    }

    /// Approve a pending booking on the given resource account.
    ///
    /// The status write and the external-identifier write happen in one
    /// repository transaction; the provider call happens before it, so a
    /// failed transaction leaves a deletable orphan meeting rather than an
    /// inconsistent row.
    #[instrument(skip(self, options), fields(actor))]
    pub async fn approve(
        &self,
        booking_id: &str,
        resource_account_id: Option<&str>,
        options: MeetingOptions,
        actor: &str,
    ) -> Result<ApprovalOutcome> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| ConfabError::NotFound(format!("booking {booking_id} does not exist")))?;

        if booking.status != BookingStatus::Pending {
            return Err(ConfabError::InvalidState(format!(
                "booking {} is {}; only pending bookings can be approved",
                booking.id, booking.status,
            )));
        }

        let account_id = resource_account_id.ok_or_else(|| {
            ConfabError::ResourceRequired(
                "a resource account must be selected for approval".into(),
            )
        })?;
        let account = self.accounts.find_by_id(account_id).await?.ok_or_else(|| {
            ConfabError::NotFound(format!("resource account {account_id} does not exist"))
        })?;
        if !account.is_active() {
            return Err(ConfabError::Validation(format!(
                "resource account '{}' is inactive",
                account.label,
            )));
        }

        let free = self
            .availability
            .account_window_free(
                &account,
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

        let options = options.resolved();
        let outcome = self.provisioner.provision(&booking, &account, options).await?;
        let (external, fallback_join_url) = match outcome {
            ProvisionOutcome::External(meeting) => (Some(meeting), None),
            ProvisionOutcome::Fallback { join_url } => (None, Some(join_url)),
        };
        let fallback = external.is_none();

        let record = ApprovalRecord {
            booking_id: booking.id.clone(),
            resource_account_id: account.id.clone(),
            account_capacity: account.max_concurrent_meetings.max(1),
            external: external.clone(),
            fallback_join_url,
            actor: actor.to_string(),
            approved_at: self.clock.now(),
        };

        if let Err(err) = self.bookings.approve_provisioned(&record).await {
            // The transaction lost a race or the booking moved on. Remove the
            // meeting we just created so the provider does not accumulate
            // orphans, then surface the original error.
            if let Some(meeting) = &external {
                warn!(
                    booking_id = %booking.id,
                    error = %err,
                    "approval write failed after provisioning; deleting orphaned meeting"
                );
                self.provisioner.delete_remote(&account, &meeting.meeting_id, &booking.id).await;
            }
            return Err(err);
        }

        info!(booking_id = %booking.id, account_id = %account.id, fallback, "booking approved");

        Ok(ApprovalOutcome { booking_id: booking.id, fallback })
    }

    /// Reject a pending booking, recording the reason and actor.
    #[instrument(skip(self), fields(actor))]
    pub async fn reject(&self, booking_id: &str, reason: &str, actor: &str) -> Result<()> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| ConfabError::NotFound(format!("booking {booking_id} does not exist")))?;

        if booking.status != BookingStatus::Pending {
            return Err(ConfabError::InvalidState(format!(
                "booking {} is {}; only pending bookings can be rejected",
                booking.id, booking.status,
            )));
        }

        self.bookings.mark_rejected(booking_id, reason, actor, self.clock.now()).await?;
        info!(booking_id, "booking rejected");
        Ok(())
    }

    /// Cancel an approved booking. The external meeting is deleted on a
    /// best-effort basis; a failed delete never blocks the cancellation.
    #[instrument(skip(self), fields(actor))]
    pub async fn cancel(&self, booking_id: &str, reason: &str, actor: &str) -> Result<()> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| ConfabError::NotFound(format!("booking {booking_id} does not exist")))?;

        if booking.status != BookingStatus::Approved {
            return Err(ConfabError::InvalidState(format!(
                "booking {} is {}; only approved bookings can be cancelled",
                booking.id, booking.status,
            )));
        }

        self.bookings.mark_cancelled(booking_id, reason, actor, self.clock.now()).await?;

        // The external delete runs after the local transition commits, so
        // nothing on the provider side can block or roll back the
        // cancellation.
        if let Some(account_id) = booking.resource_account_id.as_deref() {
            match self.accounts.find_by_id(account_id).await {
                Ok(Some(account)) => self.provisioner.deprovision(&booking, &account).await,
                Ok(None) => warn!(
                    booking_id,
                    account_id, "resource account no longer exists; skipping external deletion"
                ),
                Err(err) => warn!(
                    booking_id,
                    error = %err,
                    "resource account lookup failed; skipping external deletion"
                ),
            }
        }

        info!(booking_id, "booking cancelled");
        Ok(())
    }

    /// Approve each id independently; one failure never aborts the rest.
    #[instrument(skip(self, booking_ids, options), fields(count = booking_ids.len(), actor))]
    pub async fn bulk_approve(
        &self,
        booking_ids: &[String],
        resource_account_id: Option<&str>,
        options: MeetingOptions,
        actor: &str,
    ) -> BulkApproveSummary {
        let mut results = Vec::with_capacity(booking_ids.len());
        for id in booking_ids {
            match self.approve(id, resource_account_id, options, actor).await {
                Ok(outcome) => {
                    let message = if outcome.fallback {
                        "approved with placeholder join link; repair job will provision the meeting"
                            .to_string()
                    } else {
                        "approved".to_string()
                    };
                    results.push(BulkItemOutcome { booking_id: id.clone(), success: true, message });
                }
                Err(err) => {
                    results.push(BulkItemOutcome {
                        booking_id: id.clone(),
                        success: false,
                        message: err.to_string(),
                    });
                }
            }
        }
        BulkApproveSummary::from_items(results)
    }
}
