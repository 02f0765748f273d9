//! Booking request service - intake path for new reservations

use std::sync::Arc;

use confab_domain::{
    Availability, Booking, BookingStatus, ConfabError, NewBookingRequest, Result,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::availability::AvailabilityService;
use crate::ports::{BookingRepository, Clock};

/// Result of a booking request: either a stored pending booking, or the
/// availability report explaining why the request was refused. Conflicts are
/// an expected outcome, not an error.
#[derive(Debug)]
pub enum CreateOutcome {
    Created(Booking),
    Conflicted(Availability),
}

/// Accepts booking requests after running the availability rules.
pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    availability: Arc<AvailabilityService>,
    clock: Arc<dyn Clock>,
}

impl BookingService {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        availability: Arc<AvailabilityService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { bookings, availability, clock }
    }

    /// Validate and store a new booking request in `pending` state.
    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub async fn create(&self, request: NewBookingRequest) -> Result<CreateOutcome> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(ConfabError::Validation("booking title must not be empty".into()));
        }

        let availability = self
            .availability
            .check_availability(
                request.date,
                request.start_time,
                request.end_time,
                &request.user_id,
                &request.department_id,
                None,
            )
            .await?;

        if !availability.available {
            return Ok(CreateOutcome::Conflicted(availability));
        }

        let booking = Booking {
            id: Uuid::now_v7().to_string(),
            title: title.to_string(),
            agenda: request.agenda,
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            user_id: request.user_id,
            department_id: request.department_id,
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
            created_at: self.clock.now(),
            approved_at: None,
            rejected_at: None,
            cancelled_at: None,
        };

        self.bookings.insert(&booking).await?;

        info!(booking_id = %booking.id, date = %booking.date, "booking request accepted");

        Ok(CreateOutcome::Created(booking))
    }
}
