//! Reconciliation and import commands

use std::time::Instant;

use confab_domain::{ImportSummary, ReconcileSummary, Result};
use tracing::{info, instrument};

use crate::context::AppContext;

/// Refresh stale provider-issued start links on approved bookings.
#[instrument(skip(ctx))]
pub async fn run_start_link_refresh(ctx: &AppContext) -> Result<ReconcileSummary> {
    let started = Instant::now();
    let summary = ctx.reconcile.refresh_start_links().await?;
    info!(
        total = summary.total_processed,
        errors = summary.error_count,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "start-link refresh command finished"
    );
    Ok(summary)
}

/// Re-create external meetings for approved bookings that were never
/// successfully provisioned.
#[instrument(skip(ctx))]
pub async fn run_missing_meeting_repair(ctx: &AppContext) -> Result<ReconcileSummary> {
    let started = Instant::now();
    let summary = ctx.reconcile.repair_missing_meetings().await?;
    info!(
        total = summary.total_processed,
        errors = summary.error_count,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "missing-meeting repair command finished"
    );
    Ok(summary)
}

/// Import every occurrence of an external recurring meeting as local
/// bookings for the given user and department.
#[instrument(skip(ctx))]
pub async fn import_recurring_meeting(
    ctx: &AppContext,
    external_meeting_id: &str,
    target_user: &str,
    target_department: &str,
    resource_account_id: &str,
) -> Result<ImportSummary> {
    let started = Instant::now();
    let summary = ctx
        .import
        .import_recurring(external_meeting_id, target_user, target_department, resource_account_id)
        .await?;
    info!(
        imported = summary.imported_count,
        total = summary.total_occurrences,
        errors = summary.errors.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "recurring import command finished"
    );
    Ok(summary)
}
