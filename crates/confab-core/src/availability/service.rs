//! Availability checks - core conflict detection logic

use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use confab_domain::constants::{SUGGESTION_LIMIT, SUGGESTION_STEP_MINUTES};
use confab_domain::{
    Availability, Booking, ConfabError, Conflict, ResourceAccount, Result, SuggestedWindow,
};
use tracing::{debug, instrument};

use crate::ports::{BlackoutRepository, BookingRepository, Clock, DepartmentRepository};

/// Half-open interval overlap: `[s1, e1)` and `[s2, e2)` overlap iff
/// `s1 < e2 && s2 < e1`. A booking ending exactly when another starts does
/// not conflict.
pub fn overlaps(start_a: NaiveTime, end_a: NaiveTime, start_b: NaiveTime, end_b: NaiveTime) -> bool {
    start_a < end_b && start_b < end_a
}

/// Monday-Sunday bounds of the week containing `date`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    (monday, monday + Duration::days(6))
}

/// Conflict detector over bookings, department quotas and blackout periods.
pub struct AvailabilityService {
    bookings: Arc<dyn BookingRepository>,
    departments: Arc<dyn DepartmentRepository>,
    blackouts: Arc<dyn BlackoutRepository>,
    clock: Arc<dyn Clock>,
}

impl AvailabilityService {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        departments: Arc<dyn DepartmentRepository>,
        blackouts: Arc<dyn BlackoutRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { bookings, departments, blackouts, clock }
    }

    /// Evaluate all booking-acceptance rules for the proposed window and
    /// report every one that fails. When the window is unavailable, up to
    /// five alternative windows of the same duration are suggested.
    #[instrument(skip(self), fields(user_id, department_id))]
    pub async fn check_availability(
        &self,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        user_id: &str,
        department_id: &str,
        exclude_booking_id: Option<&str>,
    ) -> Result<Availability> {
        if start >= end {
            return Err(ConfabError::Validation(
                "start time must be before end time".into(),
            ));
        }

        let mut conflicts = Vec::new();

        let user_day =
            self.bookings.find_user_day_bookings(user_id, date, exclude_booking_id).await?;
        for booking in user_day.iter().filter(|b| overlaps(start, end, b.start_time, b.end_time)) {
            conflicts.push(Conflict::UserOverlap(format!(
                "overlaps existing booking '{}' ({} - {})",
                booking.title,
                booking.start_time.format("%H:%M"),
                booking.end_time.format("%H:%M"),
            )));
        }

        let department = self.departments.find_by_id(department_id).await?.ok_or_else(|| {
            ConfabError::NotFound(format!("department {department_id} does not exist"))
        })?;
        let (week_start, week_end) = week_bounds(self.clock.today());
        let booked =
            self.bookings.count_department_week(department_id, week_start, week_end).await?;
        if booked >= department.weekly_limit {
            conflicts.push(Conflict::QuotaExceeded(format!(
                "department '{}' already holds {booked} of {} bookings this week",
                department.name, department.weekly_limit,
            )));
        }

        for period in self.blackouts.active_periods_containing(date).await? {
            conflicts.push(Conflict::Blackout(format!(
                "date falls inside blackout period '{}' ({} to {})",
                period.label, period.starts_on, period.ends_on,
            )));
        }

        if conflicts.is_empty() {
            return Ok(Availability::free());
        }

        let duration_minutes = (end - start).num_minutes();
        let suggestions = Self::suggest_windows(&user_day, duration_minutes);

        debug!(
            date = %date,
            conflict_count = conflicts.len(),
            suggestion_count = suggestions.len(),
            "window unavailable"
        );

        Ok(Availability { available: false, conflicts, suggestions })
    }

    /// Rule used during approval and provisioning: the resource account must
    /// have capacity left in the proposed window, counting only `approved`
    /// bookings.
    pub async fn account_window_free(
        &self,
        account: &ResourceAccount,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        exclude_booking_id: Option<&str>,
    ) -> Result<bool> {
        let existing =
            self.bookings.find_account_day_bookings(&account.id, date, exclude_booking_id).await?;
        let overlapping = existing
            .iter()
            .filter(|b| overlaps(start, end, b.start_time, b.end_time))
            .count() as u32;
        Ok(overlapping < account.max_concurrent_meetings.max(1))
    }

    /// Scan the day in 30-minute steps for windows of the same duration that
    /// are free of the requesting user's own conflicts. Quota and blackout
    /// rules are not re-checked here, so a suggestion is a hint rather than
    /// a guarantee.
    fn suggest_windows(user_bookings: &[Booking], duration_minutes: i64) -> Vec<SuggestedWindow> {
        let mut suggestions = Vec::new();
        if duration_minutes <= 0 {
            return suggestions;
        }

        let step = i64::from(SUGGESTION_STEP_MINUTES);
        let mut offset = 0i64;
        while offset + duration_minutes < 24 * 60 && suggestions.len() < SUGGESTION_LIMIT {
            let candidate_start = NaiveTime::MIN + Duration::minutes(offset);
            let candidate_end = NaiveTime::MIN + Duration::minutes(offset + duration_minutes);
            let clash = user_bookings
                .iter()
                .any(|b| overlaps(candidate_start, candidate_end, b.start_time, b.end_time));
            if !clash {
                suggestions
                    .push(SuggestedWindow { start_time: candidate_start, end_time: candidate_end });
            }
            offset += step;
        }

        suggestions
    }
}
