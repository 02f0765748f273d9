//! Booking lifecycle commands

use chrono::{NaiveDate, NaiveTime};
use confab_core::CreateOutcome;
use confab_domain::{
    Availability, BulkItemOutcome, BulkOutcome, MeetingOptions, NewBookingRequest, Result,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{failure, CommandResponse};
use crate::context::AppContext;

/// Parameters of an availability check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub user_id: String,
    pub department_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_booking_id: Option<String>,
}

/// Check whether a window can be booked, with conflicts and suggestions.
#[instrument(skip(ctx, query))]
pub async fn check_availability(ctx: &AppContext, query: AvailabilityQuery) -> Result<Availability> {
    ctx.availability
        .check_availability(
            query.date,
            query.start_time,
            query.end_time,
            &query.user_id,
            &query.department_id,
            query.exclude_booking_id.as_deref(),
        )
        .await
}

/// Submit a new booking request.
#[instrument(skip(ctx, request))]
pub async fn request_booking(ctx: &AppContext, request: NewBookingRequest) -> CommandResponse {
    match ctx.booking_service.create(request).await {
        Ok(CreateOutcome::Created(booking)) => {
            info!(booking_id = %booking.id, "booking request accepted");
            CommandResponse::ok(format!("booking {} submitted for approval", booking.id))
        }
        Ok(CreateOutcome::Conflicted(availability)) => {
            let reasons: Vec<String> =
                availability.conflicts.iter().map(ToString::to_string).collect();
            CommandResponse::fail(format!("booking not possible: {}", reasons.join("; ")))
        }
        Err(err) => failure("request_booking", err),
    }
}

/// Approve a pending booking on a resource account.
#[instrument(skip(ctx, options), fields(actor))]
pub async fn approve_booking(
    ctx: &AppContext,
    booking_id: &str,
    resource_account_id: Option<&str>,
    options: MeetingOptions,
    actor: &str,
) -> CommandResponse {
    match ctx.approval.approve(booking_id, resource_account_id, options, actor).await {
        Ok(outcome) if outcome.fallback => CommandResponse::ok(format!(
            "booking {booking_id} approved with a placeholder join link; \
             the repair job will provision the meeting",
        )),
        Ok(_) => CommandResponse::ok(format!("booking {booking_id} approved")),
        Err(err) => failure("approve_booking", err),
    }
}

/// Reject a pending booking.
#[instrument(skip(ctx), fields(actor))]
pub async fn reject_booking(
    ctx: &AppContext,
    booking_id: &str,
    reason: &str,
    actor: &str,
) -> CommandResponse {
    match ctx.approval.reject(booking_id, reason, actor).await {
        Ok(()) => CommandResponse::ok(format!("booking {booking_id} rejected")),
        Err(err) => failure("reject_booking", err),
    }
}

/// Cancel an approved booking.
#[instrument(skip(ctx), fields(actor))]
pub async fn cancel_booking(
    ctx: &AppContext,
    booking_id: &str,
    reason: &str,
    actor: &str,
) -> CommandResponse {
    match ctx.approval.cancel(booking_id, reason, actor).await {
        Ok(()) => CommandResponse::ok(format!("booking {booking_id} cancelled")),
        Err(err) => failure("cancel_booking", err),
    }
}

/// Result of a bulk approval: the aggregate response plus per-id outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkApproveResponse {
    pub success: bool,
    pub message: String,
    pub results: Vec<BulkItemOutcome>,
}

/// Approve a batch of bookings; one failure never aborts the rest.
#[instrument(skip(ctx, booking_ids, options), fields(count = booking_ids.len(), actor))]
pub async fn bulk_approve(
    ctx: &AppContext,
    booking_ids: &[String],
    resource_account_id: Option<&str>,
    options: MeetingOptions,
    actor: &str,
) -> BulkApproveResponse {
    let summary = ctx.approval.bulk_approve(booking_ids, resource_account_id, options, actor).await;

    let approved = summary.results.iter().filter(|r| r.success).count();
    let (success, message) = match summary.outcome {
        BulkOutcome::Success => (true, format!("approved all {approved} bookings")),
        BulkOutcome::Partial => (
            true,
            format!("approved {approved} of {} bookings", summary.results.len()),
        ),
        BulkOutcome::Failed => (false, "no bookings could be approved".to_string()),
    };

    BulkApproveResponse { success, message, results: summary.results }
}
