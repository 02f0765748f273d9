//! Port interfaces for booking storage
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use confab_domain::{
    ApprovalRecord, BlackoutPeriod, Booking, Department, ExternalCallRecord, ProvisionedMeeting,
    ResourceAccount, Result,
};

/// Trait for persisting and querying bookings.
///
/// The guarded mutation methods (`approve_provisioned`, `mark_*`,
/// `update_start_url`, `fill_provisioned_fields`) carry their own status
/// predicates so concurrent transitions degrade to no-ops or typed errors
/// instead of corrupting state.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert a fully-populated booking row.
    async fn insert(&self, booking: &Booking) -> Result<()>;

    /// Fetch one booking by id.
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>>;

    /// Pending/approved bookings of one user on one date, optionally
    /// excluding a booking id (edit-in-place checks).
    async fn find_user_day_bookings(
        &self,
        user_id: &str,
        date: NaiveDate,
        exclude: Option<&str>,
    ) -> Result<Vec<Booking>>;

    /// Count of a department's pending/approved bookings dated inside the
    /// given inclusive range.
    async fn count_department_week(
        &self,
        department_id: &str,
        week_start: NaiveDate,
        week_end: NaiveDate,
    ) -> Result<u32>;

    /// Approved bookings held by a resource account on one date.
    async fn find_account_day_bookings(
        &self,
        account_id: &str,
        date: NaiveDate,
        exclude: Option<&str>,
    ) -> Result<Vec<Booking>>;

    /// Atomically mark a booking approved together with its provisioning
    /// result. The implementation must re-check the account window against
    /// committed approved bookings inside the same transaction and fail with
    /// `ResourceBusy` when a concurrent approval won the race, or
    /// `InvalidState` when the booking is no longer pending.
    async fn approve_provisioned(&self, record: &ApprovalRecord) -> Result<()>;

    /// Transition a pending booking to rejected.
    async fn mark_rejected(
        &self,
        id: &str,
        reason: &str,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Result<()>;

    /// Transition an approved booking to cancelled.
    async fn mark_cancelled(
        &self,
        id: &str,
        reason: &str,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Result<()>;

    /// Approved bookings that carry an external meeting id and account
    /// (start-link refresh candidates).
    async fn find_approved_with_external(&self) -> Result<Vec<Booking>>;

    /// Approved bookings with a resource account but no external meeting id
    /// (missing-meeting repair candidates).
    async fn find_approved_unprovisioned(&self) -> Result<Vec<Booking>>;

    /// Overwrite the stored start link. Returns false when the booking no
    /// longer matches the approved selection criteria.
    async fn update_start_url(&self, id: &str, start_url: &str) -> Result<bool>;

    /// Fill the previously-null external identifier fields. Returns false
    /// when the booking is no longer approved-and-unprovisioned.
    async fn fill_provisioned_fields(
        &self,
        id: &str,
        meeting: &ProvisionedMeeting,
    ) -> Result<bool>;

    /// Look up an imported occurrence by its dedup key.
    async fn find_by_occurrence(
        &self,
        parent_external_id: &str,
        occurrence_id: &str,
    ) -> Result<Option<Booking>>;
}

/// Trait for reading departments.
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Department>>;
}

/// Trait for reading resource accounts. The registry of accounts is shared,
/// read-mostly state; the core never mutates it.
#[async_trait]
pub trait ResourceAccountRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<ResourceAccount>>;

    async fn list_active(&self) -> Result<Vec<ResourceAccount>>;
}

/// Trait for reading blackout periods.
#[async_trait]
pub trait BlackoutRepository: Send + Sync {
    /// Active periods whose date range contains the given date.
    async fn active_periods_containing(&self, date: NaiveDate) -> Result<Vec<BlackoutPeriod>>;
}

/// Trait for appending to the external-call audit log.
#[async_trait]
pub trait ExternalCallAudit: Send + Sync {
    async fn record(&self, entry: ExternalCallRecord) -> Result<()>;
}

/// Source of the current date and time.
///
/// Keeps "today" and the week window out of SQL and out of `Utc::now()`
/// call sites, so tests can pin the calendar.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock implementation of [`Clock`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
