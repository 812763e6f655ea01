use std::collections::BTreeMap;

use async_trait::async_trait;
use dockcheck_core::{Report, ReportId};
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::record::StoredReport;
use crate::traits::ReportStorage;

/// Process-local backend. Reports are lost when the process exits.
///
/// The version check and the write happen under one write lock, which gives
/// the single-writer-per-report guarantee the workflow relies on.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    reports: RwLock<BTreeMap<ReportId, StoredReport>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored reports.
    pub async fn len(&self) -> usize {
        self.reports.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.reports.read().await.is_empty()
    }
}

#[async_trait]
impl ReportStorage for InMemoryStorage {
    async fn get(&self, id: &ReportId) -> Result<StoredReport, StorageError> {
        self.reports
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                id: id.to_string(),
            })
    }

    async fn put(
        &self,
        report: Report,
        expected_version: Option<u64>,
    ) -> Result<u64, StorageError> {
        let mut reports = self.reports.write().await;
        let id = report.id.clone();

        let version = match (expected_version, reports.get(&id)) {
            (None, Some(_)) => {
                return Err(StorageError::AlreadyExists { id: id.to_string() });
            }
            (None, None) => 0,
            (Some(_), None) => {
                return Err(StorageError::NotFound { id: id.to_string() });
            }
            (Some(expected), Some(stored)) if stored.version != expected => {
                tracing::debug!(
                    report_id = %id,
                    expected,
                    actual = stored.version,
                    "stale write rejected"
                );
                return Err(StorageError::ConcurrentConflict {
                    id: id.to_string(),
                    expected_version: expected,
                    actual_version: stored.version,
                });
            }
            (Some(expected), Some(_)) => expected + 1,
        };

        reports.insert(
            id,
            StoredReport {
                report,
                version,
                updated_at: OffsetDateTime::now_utc(),
            },
        );
        Ok(version)
    }

    async fn list_all(&self) -> Result<Vec<StoredReport>, StorageError> {
        let mut all: Vec<StoredReport> = self.reports.read().await.values().cloned().collect();
        all.sort_by(|a, b| {
            a.report
                .created_at
                .cmp(&b.report.created_at)
                .then_with(|| a.report.id.cmp(&b.report.id))
        });
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformance::make_report;

    #[tokio::test]
    async fn rejected_writes_do_not_grow_the_store() {
        let storage = InMemoryStorage::new();
        assert!(storage.is_empty().await);

        let report = make_report("r-1", 0);
        storage.put(report.clone(), None).await.unwrap();
        assert!(storage.put(report.clone(), None).await.is_err());
        assert!(storage.put(report, Some(4)).await.is_err());
        assert_eq!(storage.len().await, 1);
    }
}
