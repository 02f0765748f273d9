//! Booking approval state machine

mod service;

pub use service::{ApprovalOutcome, ApprovalService};
