//! # Confab Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for storage and the meeting provider
//! - The availability conflict detector
//! - The booking state machine and approval workflow
//! - External-resource provisioning with fallback handling
//! - Reconciliation jobs and the recurring-meeting importer
//!
//! ## Architecture Principles
//! - Only depends on `confab-domain`
//! - No database or HTTP code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod approval;
pub mod availability;
pub mod booking;
pub mod import;
pub mod ports;
pub mod provider_ports;
pub mod provision;
pub mod reconcile;

// Re-export specific items to avoid ambiguity
pub use approval::{ApprovalOutcome, ApprovalService};
pub use availability::{overlaps, week_bounds, AvailabilityService};
pub use booking::{BookingService, CreateOutcome};
pub use import::ImportService;
pub use ports::{
    BlackoutRepository, BookingRepository, Clock, DepartmentRepository, ExternalCallAudit,
    ResourceAccountRepository, SystemClock,
};
pub use provider_ports::{
    CreateMeetingSpec, MeetingOccurrence, MeetingProvider, ProviderRegistry, RemoteMeeting,
};
pub use provision::{ProvisionOutcome, ProvisioningService};
pub use reconcile::ReconciliationService;
