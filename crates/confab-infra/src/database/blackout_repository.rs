//! SQLite-backed implementation of the BlackoutRepository port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use confab_core::ports::BlackoutRepository;
use confab_domain::{BlackoutPeriod, Result};
use rusqlite::types::Type;
use rusqlite::{params, Row};
use tracing::instrument;

use super::manager::DbManager;
use crate::errors::InfraError;

/// SQLite implementation of BlackoutRepository
pub struct SqliteBlackoutRepository {
    db: Arc<DbManager>,
}

impl SqliteBlackoutRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

fn parse_date(idx: usize, value: String) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn period_from_row(row: &Row<'_>) -> rusqlite::Result<BlackoutPeriod> {
    Ok(BlackoutPeriod {
        id: row.get(0)?,
        label: row.get(1)?,
        starts_on: parse_date(2, row.get(2)?)?,
        ends_on: parse_date(3, row.get(3)?)?,
        active: row.get(4)?,
    })
}

#[async_trait]
impl BlackoutRepository for SqliteBlackoutRepository {
    #[instrument(skip(self))]
    async fn active_periods_containing(&self, date: NaiveDate) -> Result<Vec<BlackoutPeriod>> {
        let conn = self.db.get_connection()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, label, starts_on, ends_on, active FROM blackout_periods
                 WHERE active = 1 AND starts_on <= ?1 AND ends_on >= ?1
                 ORDER BY starts_on ASC",
            )
            .map_err(InfraError::from)?;

        let rows = stmt
            .query_map(params![date.format("%Y-%m-%d").to_string()], period_from_row)
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(InfraError::from)?;
        Ok(rows)
    }
}
