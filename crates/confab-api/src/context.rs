//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use confab_core::ports::{
    BlackoutRepository, BookingRepository, Clock, DepartmentRepository, ExternalCallAudit,
    ResourceAccountRepository, SystemClock,
};
use confab_core::provider_ports::ProviderRegistry;
use confab_core::{
    ApprovalService, AvailabilityService, BookingService, ImportService, ProvisioningService,
    ReconciliationService,
};
use confab_domain::{AppConfig, Result};
use confab_infra::{
    DbManager, HttpProviderRegistry, ReconcileScheduler, ReconcileSchedulerConfig,
    SqliteAuditLog, SqliteBlackoutRepository, SqliteBookingRepository,
    SqliteDepartmentRepository, SqliteResourceAccountRepository,
};
use tracing::info;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: AppConfig,
    pub db: Arc<DbManager>,
    pub bookings: Arc<dyn BookingRepository>,
    pub departments: Arc<dyn DepartmentRepository>,
    pub accounts: Arc<dyn ResourceAccountRepository>,
    pub blackouts: Arc<dyn BlackoutRepository>,
    pub audit: Arc<dyn ExternalCallAudit>,
    pub availability: Arc<AvailabilityService>,
    pub booking_service: BookingService,
    pub approval: ApprovalService,
    pub reconcile: Arc<ReconciliationService>,
    pub import: ImportService,
}

impl AppContext {
    /// Build the full service stack from configuration: database pool,
    /// migrations, repositories, provider registry and services.
    pub fn initialize(config: AppConfig) -> Result<Arc<Self>> {
        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;

        let bookings: Arc<dyn BookingRepository> =
            Arc::new(SqliteBookingRepository::new(db.clone()));
        let departments: Arc<dyn DepartmentRepository> =
            Arc::new(SqliteDepartmentRepository::new(db.clone()));
        let accounts: Arc<dyn ResourceAccountRepository> =
            Arc::new(SqliteResourceAccountRepository::new(db.clone()));
        let blackouts: Arc<dyn BlackoutRepository> =
            Arc::new(SqliteBlackoutRepository::new(db.clone()));
        let audit: Arc<dyn ExternalCallAudit> = Arc::new(SqliteAuditLog::new(db.clone()));

        let registry: Arc<dyn ProviderRegistry> =
            Arc::new(HttpProviderRegistry::new(&config.provider, audit.clone())?);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let availability = Arc::new(AvailabilityService::new(
            bookings.clone(),
            departments.clone(),
            blackouts.clone(),
            clock.clone(),
        ));
        let provisioner =
            Arc::new(ProvisioningService::new(registry.clone(), availability.clone()));
        let call_delay = Duration::from_millis(config.jobs.call_delay_ms);

        let booking_service =
            BookingService::new(bookings.clone(), availability.clone(), clock.clone());
        let approval = ApprovalService::new(
            bookings.clone(),
            accounts.clone(),
            availability.clone(),
            provisioner.clone(),
            clock.clone(),
        );
        let reconcile = Arc::new(ReconciliationService::new(
            bookings.clone(),
            accounts.clone(),
            registry.clone(),
            provisioner.clone(),
            call_delay,
        ));
        let import = ImportService::new(
            bookings.clone(),
            departments.clone(),
            accounts.clone(),
            registry,
            clock,
            call_delay,
        );

        info!(db_path = %config.database.path, "application context initialised");

        Ok(Arc::new(Self {
            config,
            db,
            bookings,
            departments,
            accounts,
            blackouts,
            audit,
            availability,
            booking_service,
            approval,
            reconcile,
            import,
        }))
    }

    /// Build the cron scheduler for headless reconciliation runs.
    pub fn reconcile_scheduler(&self) -> ReconcileScheduler {
        let scheduler_config = ReconcileSchedulerConfig {
            refresh_cron: self.config.jobs.refresh_cron.clone(),
            repair_cron: self.config.jobs.repair_cron.clone(),
            ..Default::default()
        };
        ReconcileScheduler::with_config(scheduler_config, self.reconcile.clone())
    }
}
