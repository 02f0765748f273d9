//! Reconciliation jobs
//!
//! Two idempotent batch scans over approved bookings: one refreshes stale
//! provider-issued start links, one re-creates meetings that were approved
//! but never successfully provisioned. Both are safe to re-run and safe
//! under concurrent live approvals: every update is guarded by the same
//! selection criteria that produced the candidate, so a booking that
//! changed in between degrades to a no-op.

use std::sync::Arc;
use std::time::Duration;

use confab_domain::{
    Booking, MeetingOptions, ReconcileItem, ReconcileSummary, ResourceAccount, Result,
};
use tracing::{info, instrument, warn};

use crate::ports::{BookingRepository, ResourceAccountRepository};
use crate::provider_ports::ProviderRegistry;
use crate::provision::ProvisioningService;

/// Batch reconciliation of local bookings against provider state.
pub struct ReconciliationService {
    bookings: Arc<dyn BookingRepository>,
    accounts: Arc<dyn ResourceAccountRepository>,
    registry: Arc<dyn ProviderRegistry>,
    provisioner: Arc<ProvisioningService>,
    /// Fixed delay between external calls, respecting provider rate limits.
    call_delay: Duration,
}

impl ReconciliationService {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        accounts: Arc<dyn ResourceAccountRepository>,
        registry: Arc<dyn ProviderRegistry>,
        provisioner: Arc<ProvisioningService>,
        call_delay: Duration,
    ) -> Self {
        Self { bookings, accounts, registry, provisioner, call_delay }
    }

    /// Refresh the stored start link of every approved, provisioned booking,
    /// overwriting only when the provider reports a different one.
    #[instrument(skip(self))]
    pub async fn refresh_start_links(&self) -> Result<ReconcileSummary> {
        let candidates = self.bookings.find_approved_with_external().await?;
        info!(count = candidates.len(), "starting start-link refresh");

        let mut results = Vec::with_capacity(candidates.len());
        for (index, booking) in candidates.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.call_delay).await;
            }
            results.push(self.refresh_one(booking).await);
        }

        let summary = ReconcileSummary::from_items(results);
        info!(
            total = summary.total_processed,
            updated = summary.updated_count(),
            errors = summary.error_count,
            "start-link refresh finished"
        );
        Ok(summary)
    }

    async fn refresh_one(&self, booking: &Booking) -> ReconcileItem {
        let Some(meeting_id) = booking.external_meeting_id.as_deref() else {
            return ReconcileItem::error(&booking.id, "booking has no external meeting id");
        };

        let account = match self.account_for(booking).await {
            Ok(account) => account,
            Err(item) => return *item,
        };

        let client = match self.registry.client_for(&account).await {
            Ok(client) => client,
            Err(err) => return ReconcileItem::error(&booking.id, err.to_string()),
        };

        let remote = match client.get_meeting(meeting_id).await {
            Ok(remote) => remote,
            Err(err) => {
                warn!(booking_id = %booking.id, error = %err, "start-link fetch failed");
                return ReconcileItem::error(&booking.id, err.to_string());
            }
        };

        if booking.start_url.as_deref() == Some(remote.start_url.as_str()) {
            return ReconcileItem::unchanged(&booking.id);
        }

        match self.bookings.update_start_url(&booking.id, &remote.start_url).await {
            Ok(true) => ReconcileItem::updated(&booking.id),
            // The booking left the approved set between selection and update.
            Ok(false) => ReconcileItem::unchanged(&booking.id)
                .with_detail("booking changed status during refresh"),
            Err(err) => ReconcileItem::error(&booking.id, err.to_string()),
        }
    }

    /// Create the missing external meeting for every approved booking that
    /// has a resource account but no external meeting id.
    #[instrument(skip(self))]
    pub async fn repair_missing_meetings(&self) -> Result<ReconcileSummary> {
        let candidates = self.bookings.find_approved_unprovisioned().await?;
        info!(count = candidates.len(), "starting missing-meeting repair");

        let mut results = Vec::with_capacity(candidates.len());
        for (index, booking) in candidates.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.call_delay).await;
            }
            results.push(self.repair_one(booking).await);
        }

        let summary = ReconcileSummary::from_items(results);
        info!(
            total = summary.total_processed,
            repaired = summary.updated_count(),
            errors = summary.error_count,
            "missing-meeting repair finished"
        );
        Ok(summary)
    }

    async fn repair_one(&self, booking: &Booking) -> ReconcileItem {
        let account = match self.account_for(booking).await {
            Ok(account) => account,
            Err(item) => return *item,
        };
        if !account.is_active() {
            return ReconcileItem::error(
                &booking.id,
                format!("resource account '{}' is inactive", account.label),
            );
        }

        let remote = match self
            .provisioner
            .create_remote(booking, &account, MeetingOptions::default())
            .await
        {
            Ok(remote) => remote,
            Err(err) => {
                warn!(booking_id = %booking.id, error = %err, "meeting re-creation failed");
                return ReconcileItem::error(&booking.id, err.to_string());
            }
        };

        match self.bookings.fill_provisioned_fields(&booking.id, &remote.to_provisioned()).await {
            Ok(true) => ReconcileItem::updated(&booking.id),
            Ok(false) => {
                // Someone cancelled or re-provisioned the booking mid-run;
                // drop the meeting we just created.
                warn!(booking_id = %booking.id, "booking changed during repair; removing new meeting");
                self.provisioner.delete_remote(&account, &remote.id, &booking.id).await;
                ReconcileItem::unchanged(&booking.id)
                    .with_detail("booking changed during repair; created meeting removed")
            }
            Err(err) => ReconcileItem::error(&booking.id, err.to_string()),
        }
    }

    async fn account_for(&self, booking: &Booking) -> std::result::Result<ResourceAccount, Box<ReconcileItem>> {
        let Some(account_id) = booking.resource_account_id.as_deref() else {
            return Err(Box::new(ReconcileItem::error(
                &booking.id,
                "booking has no resource account",
            )));
        };
        match self.accounts.find_by_id(account_id).await {
            Ok(Some(account)) => Ok(account),
            Ok(None) => Err(Box::new(ReconcileItem::error(
                &booking.id,
                format!("resource account {account_id} no longer exists"),
            ))),
            Err(err) => Err(Box::new(ReconcileItem::error(&booking.id, err.to_string()))),
        }
    }
}
