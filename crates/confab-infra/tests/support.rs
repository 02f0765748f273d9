//! Shared infra test support
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use confab_domain::{Booking, BookingStatus};
use confab_infra::DbManager;
use tempfile::TempDir;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new temporary database with the full schema applied.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("test.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("migrations should run");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    /// Execute a batch of SQL statements against the database.
    pub fn execute_batch(&self, sql: &str) {
        let conn = self
            .manager
            .get_connection()
            .expect("connection should be available for execute_batch");
        conn.execute_batch(sql).expect("SQL batch execution should succeed");
    }

    pub fn seed_department(&self, id: &str, weekly_limit: u32) {
        self.execute_batch(&format!(
            "INSERT INTO departments (id, name, weekly_limit, created_at)
             VALUES ('{id}', 'Department {id}', {weekly_limit}, 1700000000);"
        ));
    }

    pub fn seed_account(&self, id: &str, capacity: u32, status: &str) {
        self.execute_batch(&format!(
            "INSERT INTO resource_accounts (
                id, label, contact_email, external_account_ref, client_id, client_secret,
                max_concurrent_meetings, status
             ) VALUES ('{id}', 'Account {id}', '{id}@example.com', 'ext-{id}',
                       'client-id', 'client-secret', {capacity}, '{status}');"
        ));
    }

    pub fn seed_blackout(&self, id: &str, starts_on: &str, ends_on: &str, active: bool) {
        self.execute_batch(&format!(
            "INSERT INTO blackout_periods (id, label, starts_on, ends_on, active)
             VALUES ('{id}', 'Blackout {id}', '{starts_on}', '{ends_on}', {});",
            if active { 1 } else { 0 }
        ));
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
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
