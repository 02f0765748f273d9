//! In-memory mock implementations of the core storage ports
//!
//! The mocks reproduce the guard semantics the SQL adapters carry, so the
//! services can be tested without a database.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use confab_core::overlaps;
use confab_core::ports::{
    BlackoutRepository, BookingRepository, DepartmentRepository, ResourceAccountRepository,
};
use confab_domain::{
    ApprovalRecord, BlackoutPeriod, Booking, BookingStatus, ConfabError, Department,
    ProvisionedMeeting, ResourceAccount, Result,
};

/// In-memory mock for `BookingRepository`.
#[derive(Default, Clone)]
pub struct InMemoryBookingRepository {
    inner: Arc<Mutex<Vec<Booking>>>,
}

impl InMemoryBookingRepository {
    pub fn seed(&self, booking: Booking) {
        self.inner.lock().unwrap().push(booking);
    }

    pub fn get(&self, id: &str) -> Option<Booking> {
        self.inner.lock().unwrap().iter().find(|b| b.id == id).cloned()
    }

    pub fn all(&self) -> Vec<Booking> {
        self.inner.lock().unwrap().clone()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<()> {
        self.inner.lock().unwrap().push(booking.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>> {
        Ok(self.get(id))
    }

    async fn find_user_day_bookings(
        &self,
        user_id: &str,
        date: NaiveDate,
        exclude: Option<&str>,
    ) -> Result<Vec<Booking>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|b| {
                b.user_id == user_id
                    && b.date == date
                    && matches!(b.status, BookingStatus::Pending | BookingStatus::Approved)
                    && exclude != Some(b.id.as_str())
            })
            .cloned()
            .collect())
    }

    async fn count_department_week(
        &self,
        department_id: &str,
        week_start: NaiveDate,
        week_end: NaiveDate,
    ) -> Result<u32> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|b| {
                b.department_id == department_id
                    && b.date >= week_start
                    && b.date <= week_end
                    && matches!(b.status, BookingStatus::Pending | BookingStatus::Approved)
            })
            .count() as u32)
    }

    async fn find_account_day_bookings(
        &self,
        account_id: &str,
        date: NaiveDate,
        exclude: Option<&str>,
    ) -> Result<Vec<Booking>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|b| {
                b.resource_account_id.as_deref() == Some(account_id)
                    && b.date == date
                    && b.status == BookingStatus::Approved
                    && exclude != Some(b.id.as_str())
            })
            .cloned()
            .collect())
    }

    async fn approve_provisioned(&self, record: &ApprovalRecord) -> Result<()> {
        let mut rows = self.inner.lock().unwrap();

        let (date, start, end) = {
            let booking = rows
                .iter()
                .find(|b| b.id == record.booking_id)
                .ok_or_else(|| ConfabError::NotFound(format!("booking {}", record.booking_id)))?;
            if booking.status != BookingStatus::Pending {
                return Err(ConfabError::InvalidState(format!(
                    "booking {} is {}",
                    booking.id, booking.status,
                )));
            }
            (booking.date, booking.start_time, booking.end_time)
        };

        // Same re-check the SQL transaction performs against committed rows.
        let committed = rows
            .iter()
            .filter(|b| {
                b.id != record.booking_id
                    && b.resource_account_id.as_deref() == Some(record.resource_account_id.as_str())
                    && b.date == date
                    && b.status == BookingStatus::Approved
                    && overlaps(start, end, b.start_time, b.end_time)
            })
            .count() as u32;
        if committed >= record.account_capacity {
            return Err(ConfabError::ResourceBusy(format!(
                "resource account {} is already committed in that window",
                record.resource_account_id,
            )));
        }

        let booking = rows
            .iter_mut()
            .find(|b| b.id == record.booking_id)
            .ok_or_else(|| ConfabError::NotFound(format!("booking {}", record.booking_id)))?;
        booking.status = BookingStatus::Approved;
        booking.resource_account_id = Some(record.resource_account_id.clone());
        booking.decided_by = Some(record.actor.clone());
        booking.approved_at = Some(record.approved_at);
        match (&record.external, &record.fallback_join_url) {
            (Some(meeting), _) => {
                booking.external_meeting_id = Some(meeting.meeting_id.clone());
                booking.external_uuid = Some(meeting.uuid.clone());
                booking.join_url = Some(meeting.join_url.clone());
                booking.start_url = Some(meeting.start_url.clone());
                booking.access_code = meeting.access_code.clone();
                booking.external_host_id = meeting.host_id.clone();
            }
            (None, Some(join_url)) => {
                booking.join_url = Some(join_url.clone());
            }
            (None, None) => {}
        }
        Ok(())
    }

    async fn mark_rejected(
        &self,
        id: &str,
        reason: &str,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let mut rows = self.inner.lock().unwrap();
        let booking = rows
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| ConfabError::NotFound(format!("booking {id}")))?;
        if booking.status != BookingStatus::Pending {
            return Err(ConfabError::InvalidState(format!("booking {id} is {}", booking.status)));
        }
        booking.status = BookingStatus::Rejected;
        booking.decided_by = Some(actor.to_string());
        booking.decision_reason = Some(reason.to_string());
        booking.rejected_at = Some(at);
        Ok(())
    }

    async fn mark_cancelled(
        &self,
        id: &str,
        reason: &str,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let mut rows = self.inner.lock().unwrap();
        let booking = rows
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| ConfabError::NotFound(format!("booking {id}")))?;
        if booking.status != BookingStatus::Approved {
            return Err(ConfabError::InvalidState(format!("booking {id} is {}", booking.status)));
        }
        booking.status = BookingStatus::Cancelled;
        booking.cancelled_by = Some(actor.to_string());
        booking.cancel_reason = Some(reason.to_string());
        booking.cancelled_at = Some(at);
        Ok(())
    }

    async fn find_approved_with_external(&self) -> Result<Vec<Booking>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|b| {
                b.status == BookingStatus::Approved
                    && b.external_meeting_id.is_some()
                    && b.resource_account_id.is_some()
            })
            .cloned()
            .collect())
    }

    async fn find_approved_unprovisioned(&self) -> Result<Vec<Booking>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|b| {
                b.status == BookingStatus::Approved
                    && b.external_meeting_id.is_none()
                    && b.resource_account_id.is_some()
            })
            .cloned()
            .collect())
    }

    async fn update_start_url(&self, id: &str, start_url: &str) -> Result<bool> {
        let mut rows = self.inner.lock().unwrap();
        match rows
            .iter_mut()
            .find(|b| b.id == id && b.status == BookingStatus::Approved)
        {
            Some(booking) => {
                booking.start_url = Some(start_url.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn fill_provisioned_fields(
        &self,
        id: &str,
        meeting: &ProvisionedMeeting,
    ) -> Result<bool> {
        let mut rows = self.inner.lock().unwrap();
        match rows.iter_mut().find(|b| {
            b.id == id && b.status == BookingStatus::Approved && b.external_meeting_id.is_none()
        }) {
            Some(booking) => {
                booking.external_meeting_id = Some(meeting.meeting_id.clone());
                booking.external_uuid = Some(meeting.uuid.clone());
                booking.join_url = Some(meeting.join_url.clone());
                booking.start_url = Some(meeting.start_url.clone());
                booking.access_code = meeting.access_code.clone();
                booking.external_host_id = meeting.host_id.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_by_occurrence(
        &self,
        parent_external_id: &str,
        occurrence_id: &str,
    ) -> Result<Option<Booking>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .find(|b| {
                b.parent_external_id.as_deref() == Some(parent_external_id)
                    && b.external_occurrence_id.as_deref() == Some(occurrence_id)
            })
            .cloned())
    }
}

/// In-memory mock for `DepartmentRepository`.
#[derive(Default, Clone)]
pub struct InMemoryDepartmentRepository {
    inner: Arc<Mutex<Vec<Department>>>,
}

impl InMemoryDepartmentRepository {
    pub fn seed(&self, department: Department) {
        self.inner.lock().unwrap().push(department);
    }
}

#[async_trait]
impl DepartmentRepository for InMemoryDepartmentRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Department>> {
        Ok(self.inner.lock().unwrap().iter().find(|d| d.id == id).cloned())
    }
}

/// In-memory mock for `ResourceAccountRepository`.
#[derive(Default, Clone)]
pub struct InMemoryAccountRepository {
    inner: Arc<Mutex<Vec<ResourceAccount>>>,
}

impl InMemoryAccountRepository {
    pub fn seed(&self, account: ResourceAccount) {
        self.inner.lock().unwrap().push(account);
    }
}

#[async_trait]
impl ResourceAccountRepository for InMemoryAccountRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<ResourceAccount>> {
        Ok(self.inner.lock().unwrap().iter().find(|a| a.id == id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<ResourceAccount>> {
        Ok(self.inner.lock().unwrap().iter().filter(|a| a.is_active()).cloned().collect())
    }
}

/// In-memory mock for `BlackoutRepository`.
#[derive(Default, Clone)]
pub struct InMemoryBlackoutRepository {
    inner: Arc<Mutex<Vec<BlackoutPeriod>>>,
}

impl InMemoryBlackoutRepository {
    pub fn seed(&self, period: BlackoutPeriod) {
        self.inner.lock().unwrap().push(period);
    }
}

#[async_trait]
impl BlackoutRepository for InMemoryBlackoutRepository {
    async fn active_periods_containing(&self, date: NaiveDate) -> Result<Vec<BlackoutPeriod>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.contains(date))
            .cloned()
            .collect())
    }
}
