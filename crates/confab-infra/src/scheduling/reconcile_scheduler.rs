//! Reconciliation scheduler for headless batch runs.
//!
//! Registers the two reconciliation jobs (start-link refresh and
//! missing-meeting repair) on independent cron schedules. Join handles are
//! tracked, cancellation is explicit, and every job execution is wrapped in
//! a timeout.

use std::sync::Arc;
use std::time::Duration;

use confab_core::ReconciliationService;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Configuration for the reconciliation scheduler.
#[derive(Debug, Clone)]
pub struct ReconcileSchedulerConfig {
    /// Cron expression for the start-link refresh job.
    pub refresh_cron: String,
    /// Cron expression for the missing-meeting repair job.
    pub repair_cron: String,
    /// Timeout applied to a single job execution.
    pub job_timeout: Duration,
    /// Timeout for starting the underlying scheduler.
    pub start_timeout: Duration,
    /// Timeout for stopping the scheduler.
    pub stop_timeout: Duration,
    /// Timeout for awaiting the monitor task join handle.
    pub join_timeout: Duration,
}

impl Default for ReconcileSchedulerConfig {
    fn default() -> Self {
        Self {
            refresh_cron: "0 0 * * * *".into(),  // hourly
            repair_cron: "0 30 * * * *".into(),  // hourly, offset from refresh
            job_timeout: Duration::from_secs(600),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Which reconciliation pass a registered job runs.
#[derive(Debug, Clone, Copy)]
enum JobKind {
    RefreshStartLinks,
    RepairMissingMeetings,
}

impl JobKind {
    fn name(self) -> &'static str {
        match self {
            Self::RefreshStartLinks => "start_link_refresh",
            Self::RepairMissingMeetings => "missing_meeting_repair",
        }
    }
}

/// Reconciliation scheduler with explicit lifecycle management.
pub struct ReconcileScheduler {
    scheduler: Option<JobScheduler>,
    config: ReconcileSchedulerConfig,
    monitor_handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
    service: Arc<ReconciliationService>,
}

impl ReconcileScheduler {
    /// Create a scheduler with a custom configuration.
    pub fn with_config(
        config: ReconcileSchedulerConfig,
        service: Arc<ReconciliationService>,
    ) -> Self {
        Self {
            scheduler: None,
            config,
            monitor_handle: None,
            cancellation: CancellationToken::new(),
            service,
        }
    }

    /// Start the scheduler, spawning the monitoring task.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let scheduler_instance = self.build_scheduler().await?;
        let start_timeout = self.config.start_timeout;

        let start_result = tokio::time::timeout(start_timeout, scheduler_instance.start())
            .await
            .map_err(|_| SchedulerError::Timeout { seconds: start_timeout.as_secs() })?;
        start_result.map_err(|source| SchedulerError::StartFailed(source.to_string()))?;

        self.scheduler = Some(scheduler_instance);

        let cancel = self.cancellation.clone();
        let handle = tokio::spawn(async move {
            cancel.cancelled().await;
            debug!("reconciliation scheduler monitor cancelled");
        });
        self.monitor_handle = Some(handle);

        info!("Reconciliation scheduler started");
        Ok(())
    }

    /// Stop the scheduler and wait for the monitor task to finish.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation.cancel();

        let mut scheduler = match self.scheduler.take() {
            Some(scheduler) => scheduler,
            None => return Err(SchedulerError::NotRunning),
        };

        let stop_timeout = self.config.stop_timeout;
        let stop_result =
            tokio::time::timeout(stop_timeout, async move { scheduler.shutdown().await })
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: stop_timeout.as_secs() })?;
        stop_result.map_err(|source| SchedulerError::StopFailed(source.to_string()))?;

        if let Some(handle) = self.monitor_handle.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: join_timeout.as_secs() })?
                .map_err(|e| SchedulerError::TaskJoinFailed(e.to_string()))?;
        }

        info!("Reconciliation scheduler stopped");
        self.cancellation = CancellationToken::new();
        Ok(())
    }

    /// Returns true when a scheduler instance is active.
    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    async fn build_scheduler(&self) -> SchedulerResult<JobScheduler> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|source| SchedulerError::CreationFailed(source.to_string()))?;

        self.register_job(&scheduler, self.config.refresh_cron.as_str(), JobKind::RefreshStartLinks)
            .await?;
        self.register_job(&scheduler, self.config.repair_cron.as_str(), JobKind::RepairMissingMeetings)
            .await?;

        Ok(scheduler)
    }

    async fn register_job(
        &self,
        scheduler: &JobScheduler,
        cron_expr: &str,
        kind: JobKind,
    ) -> SchedulerResult<()> {
        let service = self.service.clone();
        let job_timeout = self.config.job_timeout;

        let job_definition = Job::new_async(cron_expr, move |_id, _lock| {
            let service = service.clone();
            Box::pin(async move {
                Self::run_job(service, kind, job_timeout).await;
            })
        })
        .map_err(|source| SchedulerError::JobRegistrationFailed(source.to_string()))?;

        let job_id = job_definition.guid();
        scheduler
            .add(job_definition)
            .await
            .map_err(|source| SchedulerError::JobRegistrationFailed(source.to_string()))?;

        debug!(cron = cron_expr, job = kind.name(), job_id = %job_id, "registered reconciliation job");
        Ok(())
    }

    async fn run_job(service: Arc<ReconciliationService>, kind: JobKind, timeout: Duration) {
        let run = async {
            match kind {
                JobKind::RefreshStartLinks => service.refresh_start_links().await,
                JobKind::RepairMissingMeetings => service.repair_missing_meetings().await,
            }
        };

        match tokio::time::timeout(timeout, run).await {
            Ok(Ok(summary)) => {
                info!(
                    job = kind.name(),
                    total = summary.total_processed,
                    errors = summary.error_count,
                    "scheduled reconciliation run finished"
                );
            }
            Ok(Err(err)) => {
                error!(job = kind.name(), error = %err, "scheduled reconciliation run failed");
            }
            Err(_) => {
                warn!(
                    job = kind.name(),
                    timeout_secs = timeout.as_secs(),
                    "scheduled reconciliation run timed out"
                );
            }
        }
    }
}

impl Drop for ReconcileScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("ReconcileScheduler dropped while running; cancelling tasks");
            self.cancellation.cancel();
        }
    }
}
