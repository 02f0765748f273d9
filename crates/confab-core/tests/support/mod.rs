//! Shared test support: in-memory ports, a scripted provider and fixtures.
#![allow(dead_code)]

pub mod provider;
pub mod repositories;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use confab_core::ports::Clock;
use confab_core::{
    ApprovalService, AvailabilityService, BookingService, ImportService, ProvisioningService,
    ReconciliationService,
};
use confab_domain::{
    AccountStatus, BlackoutPeriod, Booking, BookingStatus, Department, ResourceAccount,
};

pub use provider::{MockMeetingProvider, StaticRegistry};
pub use repositories::{
    InMemoryAccountRepository, InMemoryBlackoutRepository, InMemoryBookingRepository,
    InMemoryDepartmentRepository,
};

/// Deterministic clock pinned to a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    /// Noon UTC on the given date.
    pub fn on(date: NaiveDate) -> Self {
        Self { now: Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap()) }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn department(id: &str, weekly_limit: u32) -> Department {
    Department {
        id: id.to_string(),
        name: format!("Department {id}"),
        weekly_limit,
        created_at: Utc::now(),
    }
}

pub fn account(id: &str, capacity: u32) -> ResourceAccount {
    ResourceAccount {
        id: id.to_string(),
        label: format!("Account {id}"),
        contact_email: format!("{id}@example.com"),
        external_account_ref: format!("ext-{id}"),
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        max_concurrent_meetings: capacity,
        status: AccountStatus::Active,
        last_verified_at: None,
    }
}

pub fn blackout(id: &str, from: NaiveDate, to: NaiveDate) -> BlackoutPeriod {
    BlackoutPeriod {
        id: id.to_string(),
        label: format!("Blackout {id}"),
        starts_on: from,
        ends_on: to,
        active: true,
    }
}

pub fn pending_booking(
    id: &str,
    user_id: &str,
    department_id: &str,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> Booking {
    Booking {
        id: id.to_string(),
        title: format!("Booking {id}"),
        agenda: None,
        date,
        start_time: start,
        end_time: end,
        user_id: user_id.to_string(),
        department_id: department_id.to_string(),
        status: BookingStatus::Pending,
        resource_account_id: None,
        external_meeting_id: None,
        external_uuid: None,
        join_url: None,
        start_url: None,
        access_code: None,
        external_host_id: None,
        decided_by: None,
        decision_reason: None,
        cancelled_by: None,
        cancel_reason: None,
        is_imported: false,
        parent_external_id: None,
        external_occurrence_id: None,
        created_at: Utc::now(),
        approved_at: None,
        rejected_at: None,
        cancelled_at: None,
    }
}

/// Fully wired service stack over the in-memory ports.
pub struct TestHarness {
    pub bookings: Arc<InMemoryBookingRepository>,
    pub departments: Arc<InMemoryDepartmentRepository>,
    pub accounts: Arc<InMemoryAccountRepository>,
    pub blackouts: Arc<InMemoryBlackoutRepository>,
    pub provider: Arc<MockMeetingProvider>,
    pub availability: Arc<AvailabilityService>,
    pub booking_service: BookingService,
    pub approval: ApprovalService,
    pub reconcile: ReconciliationService,
    pub import: ImportService,
}

impl TestHarness {
    /// Build the stack with the clock pinned to noon on `today`.
    pub fn on(today: NaiveDate) -> Self {
        let bookings = Arc::new(InMemoryBookingRepository::default());
        let departments = Arc::new(InMemoryDepartmentRepository::default());
        let accounts = Arc::new(InMemoryAccountRepository::default());
        let blackouts = Arc::new(InMemoryBlackoutRepository::default());
        let provider = Arc::new(MockMeetingProvider::default());
        let registry = Arc::new(StaticRegistry::new(provider.clone()));
        let clock = Arc::new(FixedClock::on(today));

        let availability = Arc::new(AvailabilityService::new(
            bookings.clone(),
            departments.clone(),
            blackouts.clone(),
            clock.clone(),
        ));
        let provisioner =
            Arc::new(ProvisioningService::new(registry.clone(), availability.clone()));
        let booking_service =
            BookingService::new(bookings.clone(), availability.clone(), clock.clone());
        let approval = ApprovalService::new(
            bookings.clone(),
            accounts.clone(),
            availability.clone(),
            provisioner.clone(),
            clock.clone(),
        );
        let reconcile = ReconciliationService::new(
            bookings.clone(),
            accounts.clone(),
            registry.clone(),
            provisioner.clone(),
            Duration::ZERO,
        );
        let import = ImportService::new(
            bookings.clone(),
            departments.clone(),
            accounts.clone(),
            registry,
            clock,
            Duration::ZERO,
        );

        Self {
            bookings,
            departments,
            accounts,
            blackouts,
            provider,
            availability,
            booking_service,
            approval,
            reconcile,
            import,
        }
    }
}
