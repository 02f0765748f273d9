//! Departments and booking blackout periods

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Organizational unit with a weekly booking quota.
///
/// `weekly_limit` bounds the number of pending plus approved bookings dated
/// within the current Monday-Sunday week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
    pub weekly_limit: u32,
    pub created_at: DateTime<Utc>,
}

/// Admin-defined date range (inclusive) in which no new booking may be
/// created. Consumed read-only by the booking core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlackoutPeriod {
    pub id: String,
    pub label: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub active: bool,
}

impl BlackoutPeriod {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.active && self.starts_on <= date && date <= self.ends_on
    }
}
