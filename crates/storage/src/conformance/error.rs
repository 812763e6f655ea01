use std::future::Future;

use dockcheck_core::ReportId;

use super::{make_report, TestResult};
use crate::{ReportStorage, StorageError};

pub(super) async fn run_error_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "error",
            "get_nonexistent_returns_not_found",
            get_nonexistent_returns_not_found(factory).await,
        ),
        TestResult::from_result(
            "error",
            "replace_nonexistent_returns_not_found",
            replace_nonexistent_returns_not_found(factory).await,
        ),
        TestResult::from_result(
            "error",
            "replace_nonexistent_stores_nothing",
            replace_nonexistent_stores_nothing(factory).await,
        ),
        TestResult::from_result(
            "error",
            "list_empty_store",
            list_empty_store(factory).await,
        ),
    ]
}

async fn get_nonexistent_returns_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.get(&ReportId::new("r-999")).await {
        Err(StorageError::NotFound { id }) if id == "r-999" => Ok(()),
        other => Err(format!("expected NotFound(r-999), got {:?}", other)),
    }
}

async fn replace_nonexistent_returns_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.put(make_report("r-1", 0), Some(0)).await {
        Err(StorageError::NotFound { id }) if id == "r-1" => Ok(()),
        other => Err(format!("expected NotFound(r-1), got {:?}", other)),
    }
}

async fn replace_nonexistent_stores_nothing<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let _ = s.put(make_report("r-1", 0), Some(3)).await;
    let all = s.list_all().await.map_err(|e| format!("list: {e}"))?;
    if !all.is_empty() {
        return Err(format!("expected empty store, found {} reports", all.len()));
    }
    Ok(())
}

async fn list_empty_store<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let all = s.list_all().await.map_err(|e| format!("list: {e}"))?;
    if !all.is_empty() {
        return Err(format!("expected no reports, got {}", all.len()));
    }
    Ok(())
}
