//! Domain types and models

pub mod account;
pub mod audit;
pub mod booking;
pub mod department;
pub mod options;
pub mod reports;

pub use account::{AccountStatus, ResourceAccount};
pub use audit::ExternalCallRecord;
pub use booking::{ApprovalRecord, Booking, BookingStatus, NewBookingRequest, ProvisionedMeeting};
pub use department::{BlackoutPeriod, Department};
pub use options::MeetingOptions;
pub use reports::{
    Availability, BulkApproveSummary, BulkItemOutcome, BulkOutcome, Conflict, ImportSummary,
    ReconcileItem, ReconcileOutcome, ReconcileSummary, SuggestedWindow,
};
