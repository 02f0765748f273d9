//! SQLite-backed implementation of the BookingRepository port.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use confab_core::ports::BookingRepository;
use confab_domain::{
    ApprovalRecord, Booking, BookingStatus, ConfabError, ProvisionedMeeting, Result,
};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row, TransactionBehavior};
use tracing::{debug, instrument};

use super::manager::DbManager;
use crate::errors::InfraError;

const BOOKING_COLUMNS: &str = "id, title, agenda, date, start_time, end_time, user_id, \
     department_id, status, resource_account_id, external_meeting_id, external_uuid, join_url, \
     start_url, access_code, external_host_id, decided_by, decision_reason, cancelled_by, \
     cancel_reason, is_imported, parent_external_id, external_occurrence_id, created_at, \
     approved_at, rejected_at, cancelled_at";

/// SQLite implementation of BookingRepository
pub struct SqliteBookingRepository {
    db: Arc<DbManager>,
}

impl SqliteBookingRepository {
    /// Create a new booking repository
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

fn conversion_err(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn get_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let value: String = row.get(idx)?;
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|e| conversion_err(idx, e))
}

fn get_time(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveTime> {
    let value: String = row.get(idx)?;
    NaiveTime::parse_from_str(&value, "%H:%M:%S").map_err(|e| conversion_err(idx, e))
}

fn epoch_to_utc(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

fn get_opt_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    Ok(row.get::<_, Option<i64>>(idx)?.map(epoch_to_utc))
}

fn booking_from_row(row: &Row<'_>) -> rusqlite::Result<Booking> {
    let status: String = row.get(8)?;
    let status = BookingStatus::from_str(&status).map_err(|e| conversion_err(8, e))?;

    Ok(Booking {
        id: row.get(0)?,
        title: row.get(1)?,
        agenda: row.get(2)?,
        date: get_date(row, 3)?,
        start_time: get_time(row, 4)?,
        end_time: get_time(row, 5)?,
        user_id: row.get(6)?,
        department_id: row.get(7)?,
        status,
        resource_account_id: row.get(9)?,
        external_meeting_id: row.get(10)?,
        external_uuid: row.get(11)?,
        join_url: row.get(12)?,
        start_url: row.get(13)?,
        access_code: row.get(14)?,
        external_host_id: row.get(15)?,
        decided_by: row.get(16)?,
        decision_reason: row.get(17)?,
        cancelled_by: row.get(18)?,
        cancel_reason: row.get(19)?,
        is_imported: row.get(20)?,
        parent_external_id: row.get(21)?,
        external_occurrence_id: row.get(22)?,
        created_at: epoch_to_utc(row.get(23)?),
        approved_at: get_opt_ts(row, 24)?,
        rejected_at: get_opt_ts(row, 25)?,
        cancelled_at: get_opt_ts(row, 26)?,
    })
}

fn date_str(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn time_str(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

#[async_trait]
impl BookingRepository for SqliteBookingRepository {
    #[instrument(skip(self, booking), fields(booking_id = %booking.id))]
    async fn insert(&self, booking: &Booking) -> Result<()> {
        let conn = self.db.get_connection()?;

        conn.execute(
            "INSERT INTO bookings (
                id, title, agenda, date, start_time, end_time, user_id, department_id, status,
                resource_account_id, external_meeting_id, external_uuid, join_url, start_url,
                access_code, external_host_id, decided_by, decision_reason, cancelled_by,
                cancel_reason, is_imported, parent_external_id, external_occurrence_id,
                created_at, approved_at, rejected_at, cancelled_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
                      ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27)",
            params![
                booking.id,
                booking.title,
                booking.agenda,
                date_str(booking.date),
                time_str(booking.start_time),
                time_str(booking.end_time),
                booking.user_id,
                booking.department_id,
                booking.status.as_str(),
                booking.resource_account_id,
                booking.external_meeting_id,
                booking.external_uuid,
                booking.join_url,
                booking.start_url,
                booking.access_code,
                booking.external_host_id,
                booking.decided_by,
                booking.decision_reason,
                booking.cancelled_by,
                booking.cancel_reason,
                booking.is_imported,
                booking.parent_external_id,
                booking.external_occurrence_id,
                booking.created_at.timestamp(),
                booking.approved_at.map(|t| t.timestamp()),
                booking.rejected_at.map(|t| t.timestamp()),
                booking.cancelled_at.map(|t| t.timestamp()),
            ],
        )
        .map_err(InfraError::from)?;

        debug!(booking_id = %booking.id, "inserted booking");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>> {
        let conn = self.db.get_connection()?;
        conn.query_row(
            &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
            params![id],
            booking_from_row,
        )
        .optional()
        .map_err(|e| InfraError::from(e).into())
    }

    #[instrument(skip(self))]
    async fn find_user_day_bookings(
        &self,
        user_id: &str,
        date: NaiveDate,
        exclude: Option<&str>,
    ) -> Result<Vec<Booking>> {
        let conn = self.db.get_connection()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings
                 WHERE user_id = ?1 AND date = ?2 AND status IN ('pending', 'approved')
                   AND (?3 IS NULL OR id != ?3)
                 ORDER BY start_time ASC"
            ))
            .map_err(InfraError::from)?;

        let rows = stmt
            .query_map(params![user_id, date_str(date), exclude], booking_from_row)
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(InfraError::from)?;

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn count_department_week(
        &self,
        department_id: &str,
        week_start: NaiveDate,
        week_end: NaiveDate,
    ) -> Result<u32> {
        let conn = self.db.get_connection()?;
        conn.query_row(
            "SELECT COUNT(*) FROM bookings
             WHERE department_id = ?1 AND date >= ?2 AND date <= ?3
               AND status IN ('pending', 'approved')",
            params![department_id, date_str(week_start), date_str(week_end)],
            |row| row.get(0),
        )
        .map_err(|e| InfraError::from(e).into())
    }

    #[instrument(skip(self))]
    async fn find_account_day_bookings(
        &self,
        account_id: &str,
        date: NaiveDate,
        exclude: Option<&str>,
    ) -> Result<Vec<Booking>> {
        let conn = self.db.get_connection()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings
                 WHERE resource_account_id = ?1 AND date = ?2 AND status = 'approved'
                   AND (?3 IS NULL OR id != ?3)
                 ORDER BY start_time ASC"
            ))
            .map_err(InfraError::from)?;

        let rows = stmt
            .query_map(params![account_id, date_str(date), exclude], booking_from_row)
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(InfraError::from)?;

        Ok(rows)
    }

    #[instrument(skip(self, record), fields(booking_id = %record.booking_id))]
    async fn approve_provisioned(&self, record: &ApprovalRecord) -> Result<()> {
        let mut conn = self.db.get_connection()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(InfraError::from)?;

        let current = tx
            .query_row(
                "SELECT status, date, start_time, end_time FROM bookings WHERE id = ?1",
                params![record.booking_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()
            .map_err(InfraError::from)?;

        let (status, date, start_time, end_time) = current.ok_or_else(|| {
            ConfabError::NotFound(format!("booking {} does not exist", record.booking_id))
        })?;
        if status != BookingStatus::Pending.as_str() {
            return Err(ConfabError::InvalidState(format!(
                "booking {} is {status}; only pending bookings can be approved",
                record.booking_id,
            )));
        }

        // Re-read the account's committed bookings inside the transaction so
        // two racing approvals cannot double-book the same window.
        let committed: u32 = tx
            .query_row(
                "SELECT COUNT(*) FROM bookings
                 WHERE resource_account_id = ?1 AND date = ?2 AND status = 'approved'
                   AND id != ?3 AND start_time < ?4 AND end_time > ?5",
                params![record.resource_account_id, date, record.booking_id, end_time, start_time],
                |row| row.get(0),
            )
            .map_err(InfraError::from)?;
        if committed >= record.account_capacity.max(1) {
            return Err(ConfabError::ResourceBusy(format!(
                "resource account {} is already committed in that window",
                record.resource_account_id,
            )));
        }

        let (external_meeting_id, external_uuid, join_url, start_url, access_code, host_id) =
            match (&record.external, &record.fallback_join_url) {
                (Some(meeting), _) => (
                    Some(meeting.meeting_id.clone()),
                    Some(meeting.uuid.clone()),
                    Some(meeting.join_url.clone()),
                    Some(meeting.start_url.clone()),
                    meeting.access_code.clone(),
                    meeting.host_id.clone(),
                ),
                (None, fallback) => (None, None, fallback.clone(), None, None, None),
            };

        let updated = tx
            .execute(
                "UPDATE bookings SET
                    status = 'approved',
                    resource_account_id = ?2,
                    external_meeting_id = ?3,
                    external_uuid = ?4,
                    join_url = ?5,
                    start_url = ?6,
                    access_code = ?7,
                    external_host_id = ?8,
                    decided_by = ?9,
                    approved_at = ?10
                 WHERE id = ?1 AND status = 'pending'",
                params![
                    record.booking_id,
                    record.resource_account_id,
                    external_meeting_id,
                    external_uuid,
                    join_url,
                    start_url,
                    access_code,
                    host_id,
                    record.actor,
                    record.approved_at.timestamp(),
                ],
            )
            .map_err(InfraError::from)?;
        if updated == 0 {
            return Err(ConfabError::InvalidState(format!(
                "booking {} changed state during approval",
                record.booking_id,
            )));
        }

        tx.commit().map_err(InfraError::from)?;

        debug!(booking_id = %record.booking_id, "booking approved and provisioned");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn mark_rejected(
        &self,
        id: &str,
        reason: &str,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.db.get_connection()?;
        let updated = conn
            .execute(
                "UPDATE bookings SET
                    status = 'rejected', decided_by = ?2, decision_reason = ?3, rejected_at = ?4
                 WHERE id = ?1 AND status = 'pending'",
                params![id, actor, reason, at.timestamp()],
            )
            .map_err(InfraError::from)?;

        if updated == 0 {
            return Err(transition_failure(&conn, id, "rejected"));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn mark_cancelled(
        &self,
        id: &str,
        reason: &str,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.db.get_connection()?;
        let updated = conn
            .execute(
                "UPDATE bookings SET
                    status = 'cancelled', cancelled_by = ?2, cancel_reason = ?3, cancelled_at = ?4
                 WHERE id = ?1 AND status = 'approved'",
                params![id, actor, reason, at.timestamp()],
            )
            .map_err(InfraError::from)?;

        if updated == 0 {
            return Err(transition_failure(&conn, id, "cancelled"));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_approved_with_external(&self) -> Result<Vec<Booking>> {
        let conn = self.db.get_connection()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings
                 WHERE status = 'approved' AND external_meeting_id IS NOT NULL
                   AND resource_account_id IS NOT NULL
                 ORDER BY date ASC, start_time ASC"
            ))
            .map_err(InfraError::from)?;

        let rows = stmt
            .query_map([], booking_from_row)
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(InfraError::from)?;
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn find_approved_unprovisioned(&self) -> Result<Vec<Booking>> {
        let conn = self.db.get_connection()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings
                 WHERE status = 'approved' AND external_meeting_id IS NULL
                   AND resource_account_id IS NOT NULL
                 ORDER BY date ASC, start_time ASC"
            ))
            .map_err(InfraError::from)?;

        let rows = stmt
            .query_map([], booking_from_row)
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(InfraError::from)?;
        Ok(rows)
    }

    #[instrument(skip(self, start_url))]
    async fn update_start_url(&self, id: &str, start_url: &str) -> Result<bool> {
        let conn = self.db.get_connection()?;
        let updated = conn
            .execute(
                "UPDATE bookings SET start_url = ?2
                 WHERE id = ?1 AND status = 'approved' AND external_meeting_id IS NOT NULL",
                params![id, start_url],
            )
            .map_err(InfraError::from)?;
        Ok(updated > 0)
    }

    #[instrument(skip(self, meeting))]
    async fn fill_provisioned_fields(
        &self,
        id: &str,
        meeting: &ProvisionedMeeting,
    ) -> Result<bool> {
        let conn = self.db.get_connection()?;
        let updated = conn
            .execute(
                "UPDATE bookings SET
                    external_meeting_id = ?2, external_uuid = ?3, join_url = ?4,
                    start_url = ?5, access_code = ?6, external_host_id = ?7
                 WHERE id = ?1 AND status = 'approved' AND external_meeting_id IS NULL",
                params![
                    id,
                    meeting.meeting_id,
                    meeting.uuid,
                    meeting.join_url,
                    meeting.start_url,
                    meeting.access_code,
                    meeting.host_id,
                ],
            )
            .map_err(InfraError::from)?;
        Ok(updated > 0)
    }

    #[instrument(skip(self))]
    async fn find_by_occurrence(
        &self,
        parent_external_id: &str,
        occurrence_id: &str,
    ) -> Result<Option<Booking>> {
        let conn = self.db.get_connection()?;
        conn.query_row(
            &format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings
                 WHERE parent_external_id = ?1 AND external_occurrence_id = ?2"
            ),
            params![parent_external_id, occurrence_id],
            booking_from_row,
        )
        .optional()
        .map_err(|e| InfraError::from(e).into())
    }
}

/// Explain why a guarded status transition matched no rows.
fn transition_failure(
    conn: &rusqlite::Connection,
    id: &str,
    target: &str,
) -> ConfabError {
    let current: rusqlite::Result<String> =
        conn.query_row("SELECT status FROM bookings WHERE id = ?1", params![id], |row| row.get(0));
    match current {
        Ok(status) => ConfabError::InvalidState(format!(
            "booking {id} is {status}; cannot be {target}"
        )),
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            ConfabError::NotFound(format!("booking {id} does not exist"))
        }
        Err(other) => InfraError::from(other).into(),
    }
}
