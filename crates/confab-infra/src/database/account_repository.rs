//! SQLite-backed implementation of the ResourceAccountRepository port.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use confab_core::ports::ResourceAccountRepository;
use confab_domain::{AccountStatus, ResourceAccount, Result};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use tracing::instrument;

use super::manager::DbManager;
use crate::errors::InfraError;

const ACCOUNT_COLUMNS: &str = "id, label, contact_email, external_account_ref, client_id, \
     client_secret, max_concurrent_meetings, status, last_verified_at";

/// SQLite implementation of ResourceAccountRepository
pub struct SqliteResourceAccountRepository {
    db: Arc<DbManager>,
}

impl SqliteResourceAccountRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<ResourceAccount> {
    let status: String = row.get(7)?;
    let status = AccountStatus::from_str(&status)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;

    Ok(ResourceAccount {
        id: row.get(0)?,
        label: row.get(1)?,
        contact_email: row.get(2)?,
        external_account_ref: row.get(3)?,
        client_id: row.get(4)?,
        client_secret: row.get(5)?,
        max_concurrent_meetings: row.get(6)?,
        status,
        last_verified_at: row
            .get::<_, Option<i64>>(8)?
            .map(|secs| chrono::DateTime::from_timestamp(secs, 0).unwrap_or_default()),
    })
}

#[async_trait]
impl ResourceAccountRepository for SqliteResourceAccountRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> Result<Option<ResourceAccount>> {
        let conn = self.db.get_connection()?;
        conn.query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM resource_accounts WHERE id = ?1"),
            params![id],
            account_from_row,
        )
        .optional()
        .map_err(|e| InfraError::from(e).into())
    }

    #[instrument(skip(self))]
    async fn list_active(&self) -> Result<Vec<ResourceAccount>> {
        let conn = self.db.get_connection()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {ACCOUNT_COLUMNS} FROM resource_accounts
                 WHERE status = 'active' ORDER BY label ASC"
            ))
            .map_err(InfraError::from)?;

        let rows = stmt
            .query_map([], account_from_row)
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(InfraError::from)?;
        Ok(rows)
    }
}
