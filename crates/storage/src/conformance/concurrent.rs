use std::future::Future;
use std::sync::Arc;

use super::{insert, make_report, with_photo, TestResult};
use crate::{ReportStorage, StorageError};

/// Number of concurrent tasks to spawn in each test.
const N: usize = 10;

pub(super) async fn run_concurrent_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "concurrent",
        "concurrent_replaces_exactly_one_wins",
        concurrent_replaces_exactly_one_wins(factory).await,
    ));
    results.push(TestResult::from_result(
        "concurrent",
        "concurrent_inserts_exactly_one_wins",
        concurrent_inserts_exactly_one_wins(factory).await,
    ));
    results.push(TestResult::from_result(
        "concurrent",
        "concurrent_replaces_different_reports_all_succeed",
        concurrent_replaces_different_reports_all_succeed(factory).await,
    ));

    results
}

// ── Concurrent replace: exactly one wins ────────────────────────────────────

/// N tasks all read version 0 and try to replace the same report. Exactly
/// one write lands; the rest must get ConcurrentConflict, and the stored
/// report is the winner's.
async fn concurrent_replaces_exactly_one_wins<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = Arc::new(factory().await);
    let report = make_report("r-1", 0);
    insert(storage.as_ref(), report.clone()).await?;

    let mut handles = Vec::new();
    for i in 0..N {
        let s = storage.clone();
        let next = with_photo(&report, &format!("{i}.jpg"));
        handles.push(tokio::spawn(async move {
            match s.put(next, Some(0)).await {
                Ok(_) => Ok(Some(i)),
                Err(StorageError::ConcurrentConflict { .. }) => Ok(None),
                Err(e) => Err(e),
            }
        }));
    }

    let mut winners = Vec::new();
    for handle in handles {
        let won = handle
            .await
            .map_err(|e| format!("task panic: {e}"))?
            .map_err(|e: StorageError| format!("storage error: {e}"))?;
        winners.extend(won);
    }

    let [winner] = winners.as_slice() else {
        return Err(format!("expected exactly 1 winner, got {}", winners.len()));
    };
    let stored = storage
        .get(&report.id)
        .await
        .map_err(|e| format!("get: {e}"))?;
    if stored.version != 1 {
        return Err(format!("expected version 1, got {}", stored.version));
    }
    if stored.report.damage_photos != [format!("{winner}.jpg")] {
        return Err(format!(
            "stored report is not the winner's: {:?}",
            stored.report.damage_photos
        ));
    }
    Ok(())
}

// ── Concurrent insert: exactly one wins ─────────────────────────────────────

async fn concurrent_inserts_exactly_one_wins<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = Arc::new(factory().await);

    let mut handles = Vec::new();
    for i in 0..N {
        let s = storage.clone();
        handles.push(tokio::spawn(async move {
            match s.put(make_report("r-1", i as i64), None).await {
                Ok(_) => Ok(true),
                Err(StorageError::AlreadyExists { .. }) => Ok(false),
                Err(e) => Err(e),
            }
        }));
    }

    let mut winners = 0usize;
    for handle in handles {
        let won = handle
            .await
            .map_err(|e| format!("task panic: {e}"))?
            .map_err(|e: StorageError| format!("storage error: {e}"))?;
        if won {
            winners += 1;
        }
    }

    if winners != 1 {
        return Err(format!("expected exactly 1 winner, got {winners}"));
    }
    Ok(())
}

// ── Different reports: no false conflicts ───────────────────────────────────

async fn concurrent_replaces_different_reports_all_succeed<S, F, Fut>(
    factory: &F,
) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = Arc::new(factory().await);
    for i in 0..N {
        insert(storage.as_ref(), make_report(&format!("r-{i}"), i as i64)).await?;
    }

    let mut handles = Vec::new();
    for i in 0..N {
        let s = storage.clone();
        handles.push(tokio::spawn(async move {
            let next = with_photo(&make_report(&format!("r-{i}"), i as i64), "a.jpg");
            s.put(next, Some(0)).await
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let version = handle
            .await
            .map_err(|e| format!("task {i} panic: {e}"))?
            .map_err(|e| format!("task {i} failed: {e}"))?;
        if version != 1 {
            return Err(format!("r-{i}: expected version 1, got {version}"));
        }
    }
    Ok(())
}
