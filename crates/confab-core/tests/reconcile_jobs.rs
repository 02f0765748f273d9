//! Reconciliation job behavior: classification, guards and idempotence

mod support;

use std::sync::atomic::Ordering;

use confab_domain::{Booking, BookingStatus, ReconcileOutcome};
use support::*;

fn provisioned_booking(id: &str, meeting_id: &str, start_url: &str) -> Booking {
    let mut booking =
        pending_booking(id, "user-1", "dept-1", d(2026, 8, 6), t(9, 0), t(10, 0));
    booking.status = BookingStatus::Approved;
    booking.resource_account_id = Some("acct-1".to_string());
    booking.external_meeting_id = Some(meeting_id.to_string());
    booking.external_uuid = Some(format!("uuid-{meeting_id}"));
    booking.join_url = Some(format!("https://meetings.example.com/j/{meeting_id}"));
    booking.start_url = Some(start_url.to_string());
    booking
}

fn fallback_booking(id: &str) -> Booking {
    let mut booking =
        pending_booking(id, "user-1", "dept-1", d(2026, 8, 6), t(11, 0), t(12, 0));
    booking.status = BookingStatus::Approved;
    booking.resource_account_id = Some("acct-1".to_string());
    booking.join_url = Some("https://meet-fallback.confab.internal/r/abc".to_string());
    booking
}

#[tokio::test]
async fn refresh_classifies_updated_unchanged_and_error() {
    let h = TestHarness::on(d(2026, 8, 6));
    h.accounts.seed(account("acct-1", 1));

    h.bookings.seed(provisioned_booking("bk-stale", "m1", "https://meetings.example.com/s/old"));
    h.bookings.seed(provisioned_booking("bk-fresh", "m2", "https://meetings.example.com/s/m2"));
    h.bookings.seed(provisioned_booking("bk-gone", "m3", "https://meetings.example.com/s/m3"));

    h.provider
        .put_meeting(MockMeetingProvider::remote_meeting("m1", "https://meetings.example.com/s/new"));
    h.provider
        .put_meeting(MockMeetingProvider::remote_meeting("m2", "https://meetings.example.com/s/m2"));
    // m3 deliberately missing on the provider side

    let summary = h.reconcile.refresh_start_links().await.unwrap();

    assert_eq!(summary.total_processed, 3);
    assert_eq!(summary.success_count, 2);
    assert_eq!(summary.error_count, 1);
    assert_eq!(summary.updated_count(), 1);

    let by_id = |id: &str| summary.results.iter().find(|r| r.booking_id == id).unwrap();
    assert_eq!(by_id("bk-stale").outcome, ReconcileOutcome::Updated);
    assert_eq!(by_id("bk-fresh").outcome, ReconcileOutcome::Unchanged);
    assert_eq!(by_id("bk-gone").outcome, ReconcileOutcome::Error);
    assert!(by_id("bk-gone").detail.is_some());

    assert_eq!(
        h.bookings.get("bk-stale").unwrap().start_url.as_deref(),
        Some("https://meetings.example.com/s/new")
    );
    // errors never roll anything back
    assert_eq!(
        h.bookings.get("bk-gone").unwrap().start_url.as_deref(),
        Some("https://meetings.example.com/s/m3")
    );
}

#[tokio::test]
async fn refresh_skips_bookings_without_provisioning() {
    let h = TestHarness::on(d(2026, 8, 6));
    h.accounts.seed(account("acct-1", 1));
    h.bookings.seed(fallback_booking("bk-fallback"));
    h.bookings.seed(pending_booking("bk-pending", "user-2", "dept-1", d(2026, 8, 6), t(9, 0), t(10, 0)));

    let summary = h.reconcile.refresh_start_links().await.unwrap();
    assert_eq!(summary.total_processed, 0);
}

#[tokio::test]
async fn repair_fills_missing_external_fields() {
    let h = TestHarness::on(d(2026, 8, 6));
    h.accounts.seed(account("acct-1", 1));
    h.bookings.seed(fallback_booking("bk-fallback"));

    let summary = h.reconcile.repair_missing_meetings().await.unwrap();
    assert_eq!(summary.total_processed, 1);
    assert_eq!(summary.updated_count(), 1);
    assert_eq!(summary.error_count, 0);

    let booking = h.bookings.get("bk-fallback").unwrap();
    assert!(booking.external_meeting_id.is_some());
    assert!(booking.external_uuid.is_some());
    assert!(booking.start_url.is_some());
    assert!(booking.join_url.as_deref().unwrap().starts_with("https://meetings.example.com/j/"));
    assert_eq!(h.provider.create_calls(), 1);
}

#[tokio::test]
async fn repair_is_idempotent_across_runs() {
    let h = TestHarness::on(d(2026, 8, 6));
    h.accounts.seed(account("acct-1", 1));
    h.bookings.seed(fallback_booking("bk-fallback"));

    let first = h.reconcile.repair_missing_meetings().await.unwrap();
    assert_eq!(first.updated_count(), 1);

    let second = h.reconcile.repair_missing_meetings().await.unwrap();
    assert_eq!(second.total_processed, 0);
    assert_eq!(second.updated_count(), 0);
    assert_eq!(h.provider.create_calls(), 1);
}

#[tokio::test]
async fn repair_records_provider_errors_and_leaves_the_booking_alone() {
    let h = TestHarness::on(d(2026, 8, 6));
    h.accounts.seed(account("acct-1", 1));
    h.bookings.seed(fallback_booking("bk-fallback"));
    h.provider.fail_create.store(true, Ordering::SeqCst);

    let summary = h.reconcile.repair_missing_meetings().await.unwrap();
    assert_eq!(summary.total_processed, 1);
    assert_eq!(summary.error_count, 1);
    assert!(h.bookings.get("bk-fallback").unwrap().external_meeting_id.is_none());

    // next run picks the booking up again once the provider recovers
    h.provider.fail_create.store(false, Ordering::SeqCst);
    let retry = h.reconcile.repair_missing_meetings().await.unwrap();
    assert_eq!(retry.updated_count(), 1);
}

#[tokio::test]
async fn repair_reports_missing_accounts_as_errors() {
    let h = TestHarness::on(d(2026, 8, 6));
    // account deliberately not seeded
    h.bookings.seed(fallback_booking("bk-orphan"));

    let summary = h.reconcile.repair_missing_meetings().await.unwrap();
    assert_eq!(summary.error_count, 1);
    assert_eq!(summary.results[0].outcome, ReconcileOutcome::Error);
}
