//! Conversions from external infrastructure errors into domain errors.

use confab_domain::ConfabError;
use r2d2::Error as PoolError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ConfabError);

impl From<InfraError> for ConfabError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ConfabError> for InfraError {
    fn from(value: ConfabError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoConfabError {
    fn into_confab(self) -> ConfabError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → ConfabError */
/* -------------------------------------------------------------------------- */

impl IntoConfabError for SqlError {
    fn into_confab(self) -> ConfabError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        ConfabError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        ConfabError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        ConfabError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        ConfabError::Database("foreign key constraint violation".into())
                    }
                    _ => ConfabError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => ConfabError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                ConfabError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                ConfabError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => ConfabError::Database("invalid UTF-8 returned from sqlite".into()),
            RE::InvalidParameterName(parameter_name) => {
                ConfabError::Database(format!("invalid parameter name: {parameter_name}"))
            }
            RE::InvalidPath(path) => {
                ConfabError::Database(format!("invalid database path: {}", path.to_string_lossy()))
            }
            RE::InvalidQuery => ConfabError::Database("invalid SQL query".into()),
            other => ConfabError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_confab())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → ConfabError */
/* -------------------------------------------------------------------------- */

impl IntoConfabError for PoolError {
    fn into_confab(self) -> ConfabError {
        ConfabError::Database(format!("connection pool error: {self}"))
    }
}

impl From<PoolError> for InfraError {
    fn from(value: PoolError) -> Self {
        InfraError(value.into_confab())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ConfabError */
/* -------------------------------------------------------------------------- */

impl IntoConfabError for HttpError {
    fn into_confab(self) -> ConfabError {
        if self.is_timeout() {
            return ConfabError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return ConfabError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                404 => ConfabError::NotFound(message),
                400..=499 => ConfabError::ExternalProvider(message),
                500..=599 => ConfabError::Network(message),
                _ => ConfabError::Network(message),
            };
        }

        ConfabError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_confab())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
