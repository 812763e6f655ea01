//! Conformance test suite for `ReportStorage` implementations.
//!
//! This module provides a backend-agnostic test suite that any
//! `ReportStorage` implementation can run to verify correctness. The suite
//! covers:
//!
//! - **Insert**: new reports land at version 0, duplicate ids are refused
//! - **Version validation / OCC**: stale writes are refused and store nothing
//! - **Listing**: every report, ordered by creation time then id
//! - **Error handling**: correct error variants and fields
//! - **Concurrency**: racing writers, exactly one wins per version
//!
//! # Usage
//!
//! Backend crates call [`run_conformance_suite`] with a factory function that
//! creates a fresh, empty storage instance for each test:
//!
//! ```ignore
//! use dockcheck_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn sqlite_conformance() {
//!     let report = run_conformance_suite(|| async {
//!         create_test_sqlite_storage().await
//!     }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod concurrent;
mod error;
mod init;
mod list;
mod version;

use std::fmt;
use std::future::Future;

use dockcheck_core::{
    ActionHistory, ActionType, HistoryEntry, PartySection, Report, ReportId, ReportStatus,
    ShipmentInfo,
};
use time::macros::datetime;
use time::Duration;

use crate::ReportStorage;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "init", "version", "list").
    pub category: String,
    /// Test name (e.g. "insert_starts_at_version_0").
    pub name: String,
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn pass(category: &str, name: &str) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: true,
            message: None,
        }
    }

    fn fail(category: &str, name: &str, msg: String) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: false,
            message: Some(msg),
        }
    }

    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::pass(category, name),
            Err(msg) => Self::fail(category, name, msg),
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a storage backend.
///
/// The `factory` function is called once per test to create a fresh, empty
/// storage instance, ensuring test isolation.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(init::run_init_tests(&factory).await);
    results.extend(error::run_error_tests(&factory).await);
    results.extend(version::run_version_tests(&factory).await);
    results.extend(list::run_list_tests(&factory).await);
    results.extend(concurrent::run_concurrent_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// A freshly submitted report, created `minute` minutes after a fixed epoch.
pub(crate) fn make_report(id: &str, minute: i64) -> Report {
    let at = datetime!(2025-10-01 09:00 UTC) + Duration::minutes(minute);
    let mut history = ActionHistory::new();
    history.append(HistoryEntry::signed(
        ActionType::Submit,
        "홍길동",
        at,
        "좌측 패널 파손",
        "홍길동",
    ));
    Report {
        id: ReportId::new(id),
        shipment: ShipmentInfo {
            report_date: "2025-10-01".to_string(),
            container_no: "TCLU8239466".to_string(),
            bl_no: "CHL20251001".to_string(),
            vehicle_no: "부산12가3456".to_string(),
            driver_name: "홍길동".to_string(),
            driver_phone: "010-1234-5678".to_string(),
        },
        driver: Some(PartySection {
            damage: "좌측 패널 파손".to_string(),
            signature: "홍길동".to_string(),
            submitted_at: at,
            staff_name: None,
            staff_phone: None,
        }),
        field: None,
        office: None,
        damage_photos: Vec::new(),
        status: ReportStatus::DriverSubmitted,
        rejection_reason: None,
        rejected_at: None,
        action_history: history,
        created_at: at,
    }
}

/// `report` with one more photo, so a replace is observable.
fn with_photo(report: &Report, photo: &str) -> Report {
    let mut next = report.clone();
    next.damage_photos.push(photo.to_string());
    next
}

/// Insert `report` and fail the test with context if that does not work.
async fn insert<S: ReportStorage>(storage: &S, report: Report) -> Result<u64, String> {
    let id = report.id.clone();
    storage
        .put(report, None)
        .await
        .map_err(|e| format!("insert {id}: {e}"))
}
