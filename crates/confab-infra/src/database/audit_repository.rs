//! SQLite-backed implementation of the ExternalCallAudit port.

use std::sync::Arc;

use async_trait::async_trait;
use confab_core::ports::ExternalCallAudit;
use confab_domain::{ExternalCallRecord, Result};
use rusqlite::params;
use tracing::{debug, instrument};

use super::manager::DbManager;
use crate::errors::InfraError;

/// Append-only audit log of every call made to the external provider.
pub struct SqliteAuditLog {
    db: Arc<DbManager>,
}

impl SqliteAuditLog {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ExternalCallAudit for SqliteAuditLog {
    #[instrument(skip(self, entry), fields(action = %entry.action, success = entry.success))]
    async fn record(&self, entry: ExternalCallRecord) -> Result<()> {
        let conn = self.db.get_connection()?;
        conn.execute(
            "INSERT INTO external_call_log (
                id, resource_account_id, booking_id, action, endpoint, request_body,
                response_body, http_status, success, error_message, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                entry.id,
                entry.resource_account_id,
                entry.booking_id,
                entry.action,
                entry.endpoint,
                entry.request_body,
                entry.response_body,
                entry.http_status,
                entry.success,
                entry.error_message,
                entry.created_at.timestamp(),
            ],
        )
        .map_err(InfraError::from)?;

        debug!(entry_id = %entry.id, "recorded external call");
        Ok(())
    }
}
