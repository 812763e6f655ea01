use std::future::Future;

use super::{insert, make_report, with_photo, TestResult};
use crate::{ReportStorage, StorageError};

pub(super) async fn run_version_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    // Correct version succeeds
    results.push(TestResult::from_result(
        "version",
        "replace_with_correct_version_increments",
        replace_with_correct_version_increments(factory).await,
    ));
    results.push(TestResult::from_result(
        "version",
        "versions_increment_sequentially",
        versions_increment_sequentially(factory).await,
    ));
    results.push(TestResult::from_result(
        "version",
        "replace_is_visible_to_get",
        replace_is_visible_to_get(factory).await,
    ));

    // Wrong version fails
    results.push(TestResult::from_result(
        "version",
        "stale_version_returns_conflict",
        stale_version_returns_conflict(factory).await,
    ));
    results.push(TestResult::from_result(
        "version",
        "future_version_returns_conflict",
        future_version_returns_conflict(factory).await,
    ));
    results.push(TestResult::from_result(
        "version",
        "conflict_stores_nothing",
        conflict_stores_nothing(factory).await,
    ));
    results.push(TestResult::from_result(
        "version",
        "conflict_has_correct_fields",
        conflict_has_correct_fields(factory).await,
    ));

    results
}

async fn replace_with_correct_version_increments<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let report = make_report("r-1", 0);
    insert(&s, report.clone()).await?;
    let version = s
        .put(with_photo(&report, "a.jpg"), Some(0))
        .await
        .map_err(|e| format!("replace: {e}"))?;
    if version != 1 {
        return Err(format!("expected version 1, got {version}"));
    }
    Ok(())
}

async fn versions_increment_sequentially<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut report = make_report("r-1", 0);
    insert(&s, report.clone()).await?;
    for expected in 0..5u64 {
        report = with_photo(&report, &format!("{expected}.jpg"));
        let version = s
            .put(report.clone(), Some(expected))
            .await
            .map_err(|e| format!("replace at {expected}: {e}"))?;
        if version != expected + 1 {
            return Err(format!("expected version {}, got {version}", expected + 1));
        }
    }
    Ok(())
}

async fn replace_is_visible_to_get<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let report = make_report("r-1", 0);
    insert(&s, report.clone()).await?;
    let next = with_photo(&report, "a.jpg");
    s.put(next.clone(), Some(0))
        .await
        .map_err(|e| format!("replace: {e}"))?;
    let stored = s.get(&report.id).await.map_err(|e| format!("get: {e}"))?;
    if stored.report != next || stored.version != 1 {
        return Err(format!(
            "expected replaced report at version 1, got version {} with photos {:?}",
            stored.version, stored.report.damage_photos
        ));
    }
    Ok(())
}

async fn stale_version_returns_conflict<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let report = make_report("r-1", 0);
    insert(&s, report.clone()).await?;
    s.put(with_photo(&report, "a.jpg"), Some(0))
        .await
        .map_err(|e| format!("first replace: {e}"))?;
    // Second writer read version 0 before the first one committed.
    match s.put(with_photo(&report, "b.jpg"), Some(0)).await {
        Err(StorageError::ConcurrentConflict { .. }) => Ok(()),
        other => Err(format!("expected ConcurrentConflict, got {:?}", other)),
    }
}

async fn future_version_returns_conflict<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let report = make_report("r-1", 0);
    insert(&s, report.clone()).await?;
    match s.put(with_photo(&report, "a.jpg"), Some(1)).await {
        Err(StorageError::ConcurrentConflict { .. }) => Ok(()),
        other => Err(format!("expected ConcurrentConflict, got {:?}", other)),
    }
}

async fn conflict_stores_nothing<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let report = make_report("r-1", 0);
    insert(&s, report.clone()).await?;
    let _ = s.put(with_photo(&report, "a.jpg"), Some(7)).await;
    let stored = s.get(&report.id).await.map_err(|e| format!("get: {e}"))?;
    if stored.version != 0 || !stored.report.damage_photos.is_empty() {
        return Err("rejected write changed the stored report".to_string());
    }
    Ok(())
}

async fn conflict_has_correct_fields<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let report = make_report("r-1", 0);
    insert(&s, report.clone()).await?;
    s.put(with_photo(&report, "a.jpg"), Some(0))
        .await
        .map_err(|e| format!("replace: {e}"))?;
    match s.put(with_photo(&report, "b.jpg"), Some(0)).await {
        Err(StorageError::ConcurrentConflict {
            id,
            expected_version,
            actual_version,
        }) => {
            if id != "r-1" {
                return Err(format!("expected id 'r-1', got '{id}'"));
            }
            if expected_version != 0 {
                return Err(format!("expected expected_version 0, got {expected_version}"));
            }
            if actual_version != 1 {
                return Err(format!("expected actual_version 1, got {actual_version}"));
            }
            Ok(())
        }
        other => Err(format!("expected ConcurrentConflict, got {:?}", other)),
    }
}
