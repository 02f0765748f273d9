//! Command modules exposed to the shell

pub mod bookings;
pub mod jobs;

use confab_domain::ConfabError;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

pub use bookings::{
    approve_booking, bulk_approve, cancel_booking, check_availability, reject_booking,
    request_booking, AvailabilityQuery, BulkApproveResponse,
};
pub use jobs::{import_recurring_meeting, run_missing_meeting_repair, run_start_link_refresh};

/// Uniform result of a mutating command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    pub message: String,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}

/// Turn an error into a user-facing failure response. Domain failures are
/// expected outcomes and logged at debug; faults are logged as errors.
pub(crate) fn failure(command: &'static str, err: ConfabError) -> CommandResponse {
    if err.is_domain_failure() {
        debug!(command, error = %err, "command refused");
    } else {
        error!(command, error = %err, "command failed");
    }
    CommandResponse::fail(err.to_string())
}
