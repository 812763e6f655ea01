use async_trait::async_trait;
use dockcheck_core::{Report, ReportId};

use crate::error::StorageError;
use crate::record::StoredReport;

/// The storage trait for dockcheck report backends.
///
/// A report is stored whole, ledger included, and replaced whole. Every
/// write is a single atomic step, so a report and its action history can
/// never be persisted out of step with each other.
///
/// ## OCC Conflict Detection
///
/// `put` with `Some(expected_version)` replaces the report only if the
/// stored version still equals `expected_version`; otherwise it returns
/// `Err(StorageError::ConcurrentConflict { .. })` and stores nothing.
/// Callers re-read and re-apply the transition.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` to be used in axum
/// application state and across async task boundaries.
#[async_trait]
pub trait ReportStorage: Send + Sync + 'static {
    /// Read a report and its current version.
    ///
    /// Returns `Err(StorageError::NotFound)` if the id is unknown.
    async fn get(&self, id: &ReportId) -> Result<StoredReport, StorageError>;

    /// Insert or replace a report, returning the new version.
    ///
    /// - `None`: insert at version 0. `Err(StorageError::AlreadyExists)` if
    ///   the id is taken.
    /// - `Some(v)`: replace if the stored version is `v`, returning `v + 1`.
    ///   `Err(StorageError::NotFound)` if absent,
    ///   `Err(StorageError::ConcurrentConflict)` on a version mismatch.
    async fn put(&self, report: Report, expected_version: Option<u64>)
        -> Result<u64, StorageError>;

    /// Every stored report, ordered by creation time, then id.
    async fn list_all(&self) -> Result<Vec<StoredReport>, StorageError>;
}
