use std::future::Future;

use super::{insert, make_report, with_photo, TestResult};
use crate::ReportStorage;

pub(super) async fn run_list_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "list",
            "list_returns_every_report",
            list_returns_every_report(factory).await,
        ),
        TestResult::from_result(
            "list",
            "list_orders_by_creation_time",
            list_orders_by_creation_time(factory).await,
        ),
        TestResult::from_result(
            "list",
            "list_breaks_ties_by_id",
            list_breaks_ties_by_id(factory).await,
        ),
        TestResult::from_result(
            "list",
            "list_shows_latest_versions",
            list_shows_latest_versions(factory).await,
        ),
    ]
}

async fn list_returns_every_report<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for i in 0..5 {
        insert(&s, make_report(&format!("r-{i}"), i)).await?;
    }
    let all = s.list_all().await.map_err(|e| format!("list: {e}"))?;
    if all.len() != 5 {
        return Err(format!("expected 5 reports, got {}", all.len()));
    }
    Ok(())
}

async fn list_orders_by_creation_time<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    // Ids sort opposite to creation time.
    insert(&s, make_report("a", 30)).await?;
    insert(&s, make_report("b", 20)).await?;
    insert(&s, make_report("c", 10)).await?;
    let all = s.list_all().await.map_err(|e| format!("list: {e}"))?;
    let ids: Vec<&str> = all.iter().map(|r| r.report.id.as_str()).collect();
    if ids != ["c", "b", "a"] {
        return Err(format!("expected [c, b, a], got {:?}", ids));
    }
    Ok(())
}

async fn list_breaks_ties_by_id<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    insert(&s, make_report("r-2", 0)).await?;
    insert(&s, make_report("r-1", 0)).await?;
    insert(&s, make_report("r-3", 0)).await?;
    let all = s.list_all().await.map_err(|e| format!("list: {e}"))?;
    let ids: Vec<&str> = all.iter().map(|r| r.report.id.as_str()).collect();
    if ids != ["r-1", "r-2", "r-3"] {
        return Err(format!("expected [r-1, r-2, r-3], got {:?}", ids));
    }
    Ok(())
}

async fn list_shows_latest_versions<S, F, Fut>(factory: &F) -> Result<(), String>
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
    let all = s.list_all().await.map_err(|e| format!("list: {e}"))?;
    match all.as_slice() {
        [only] if only.version == 1 && only.report.damage_photos == ["a.jpg"] => Ok(()),
        other => Err(format!("expected one report at version 1, got {:?}", other)),
    }
}
