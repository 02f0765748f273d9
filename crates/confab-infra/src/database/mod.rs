//! SQLite storage adapters for the core ports

mod account_repository;
mod audit_repository;
mod blackout_repository;
mod booking_repository;
mod department_repository;
mod manager;

pub use account_repository::SqliteResourceAccountRepository;
pub use audit_repository::SqliteAuditLog;
pub use blackout_repository::SqliteBlackoutRepository;
pub use booking_repository::SqliteBookingRepository;
pub use department_repository::SqliteDepartmentRepository;
pub use manager::{DbConnection, DbManager};
