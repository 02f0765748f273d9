//! SQLite-backed implementation of the DepartmentRepository port.

use std::sync::Arc;

use async_trait::async_trait;
use confab_core::ports::DepartmentRepository;
use confab_domain::{Department, Result};
use rusqlite::{params, OptionalExtension, Row};
use tracing::instrument;

use super::manager::DbManager;
use crate::errors::InfraError;

/// SQLite implementation of DepartmentRepository
pub struct SqliteDepartmentRepository {
    db: Arc<DbManager>,
}

impl SqliteDepartmentRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

fn department_from_row(row: &Row<'_>) -> rusqlite::Result<Department> {
    Ok(Department {
        id: row.get(0)?,
        name: row.get(1)?,
        weekly_limit: row.get(2)?,
        created_at: chrono::DateTime::from_timestamp(row.get(3)?, 0).unwrap_or_default(),
    })
}

#[async_trait]
impl DepartmentRepository for SqliteDepartmentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> Result<Option<Department>> {
        let conn = self.db.get_connection()?;
        conn.query_row(
            "SELECT id, name, weekly_limit, created_at FROM departments WHERE id = ?1",
            params![id],
            department_from_row,
        )
        .optional()
        .map_err(|e| InfraError::from(e).into())
    }
}
