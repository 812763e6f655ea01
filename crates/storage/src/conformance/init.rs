use std::future::Future;

use super::{insert, make_report, TestResult};
use crate::{ReportStorage, StorageError};

pub(super) async fn run_init_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "init",
            "insert_starts_at_version_0",
            insert_starts_at_version_0(factory).await,
        ),
        TestResult::from_result(
            "init",
            "insert_then_get_returns_same_report",
            insert_then_get_returns_same_report(factory).await,
        ),
        TestResult::from_result(
            "init",
            "duplicate_insert_is_refused",
            duplicate_insert_is_refused(factory).await,
        ),
        TestResult::from_result(
            "init",
            "duplicate_insert_keeps_original",
            duplicate_insert_keeps_original(factory).await,
        ),
        TestResult::from_result(
            "init",
            "ledger_survives_storage",
            ledger_survives_storage(factory).await,
        ),
    ]
}

async fn insert_starts_at_version_0<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let version = insert(&s, make_report("r-1", 0)).await?;
    if version != 0 {
        return Err(format!("expected version 0 on insert, got {version}"));
    }
    let stored = s.get(&"r-1".into()).await.map_err(|e| format!("get: {e}"))?;
    if stored.version != 0 {
        return Err(format!("stored version: expected 0, got {}", stored.version));
    }
    Ok(())
}

async fn insert_then_get_returns_same_report<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let report = make_report("r-1", 0);
    insert(&s, report.clone()).await?;
    let stored = s.get(&report.id).await.map_err(|e| format!("get: {e}"))?;
    if stored.report != report {
        return Err(format!(
            "stored report differs from inserted one: {:?}",
            stored.report
        ));
    }
    Ok(())
}

async fn duplicate_insert_is_refused<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    insert(&s, make_report("r-1", 0)).await?;
    match s.put(make_report("r-1", 5), None).await {
        Err(StorageError::AlreadyExists { id }) if id == "r-1" => Ok(()),
        other => Err(format!("expected AlreadyExists(r-1), got {:?}", other)),
    }
}

async fn duplicate_insert_keeps_original<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let original = make_report("r-1", 0);
    insert(&s, original.clone()).await?;
    let _ = s.put(make_report("r-1", 5), None).await;
    let stored = s.get(&original.id).await.map_err(|e| format!("get: {e}"))?;
    if stored.report.created_at != original.created_at {
        return Err("duplicate insert overwrote the stored report".to_string());
    }
    Ok(())
}

async fn ledger_survives_storage<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let report = make_report("r-1", 0);
    insert(&s, report.clone()).await?;
    let stored = s.get(&report.id).await.map_err(|e| format!("get: {e}"))?;
    if stored.report.action_history != report.action_history {
        return Err("action history changed in storage".to_string());
    }
    Ok(())
}
