//! Report workflow service: lifecycle operations against a storage backend.
//!
//! Each mutating call reads the stored report, applies one engine operation,
//! and writes the result back conditional on the version it read. A write
//! conflict re-runs the whole read-apply-write cycle, up to
//! `max_write_retries` extra attempts.

use std::sync::Arc;

use dockcheck_core::{Report, ReportId, Role, Timestamp};
use dockcheck_engine::{
    ActionContext, Actor, Certificate, CreateReport, EngineError, FieldReview, OfficeApproval,
    OfficeRejection, ResubmitReport, Transition,
};
use dockcheck_storage::{ReportStorage, StorageError};
use time::OffsetDateTime;

#[derive(Debug, thiserror::Error)]
pub(crate) enum WorkflowError {
    #[error("report not found: {0}")]
    NotFound(ReportId),

    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Every attempt lost the version race.
    #[error("report {id} was modified concurrently ({attempts} attempts); re-read and retry")]
    ConflictOnWrite { id: ReportId, attempts: u32 },

    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for WorkflowError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { id } => WorkflowError::NotFound(ReportId::new(id)),
            StorageError::ConcurrentConflict { id, .. } => WorkflowError::ConflictOnWrite {
                id: ReportId::new(id),
                attempts: 1,
            },
            other => WorkflowError::Storage(other),
        }
    }
}

#[derive(Clone)]
pub(crate) struct ReportService {
    storage: Arc<dyn ReportStorage>,
    max_write_retries: u32,
}

impl ReportService {
    pub(crate) fn new(storage: Arc<dyn ReportStorage>, max_write_retries: u32) -> Self {
        Self {
            storage,
            max_write_retries,
        }
    }

    pub(crate) async fn get(&self, id: &ReportId) -> Result<Report, WorkflowError> {
        Ok(self.storage.get(id).await?.report)
    }

    /// All reports, or only those waiting on `role`.
    pub(crate) async fn list(&self, role: Option<Role>) -> Result<Vec<Report>, WorkflowError> {
        let reports: Vec<Report> = self
            .storage
            .list_all()
            .await?
            .into_iter()
            .map(|stored| stored.report)
            .collect();
        Ok(match role {
            Some(role) => dockcheck_engine::queue_for_role(role, &reports)
                .into_iter()
                .cloned()
                .collect(),
            None => reports,
        })
    }

    /// What `role` may do to the report right now.
    pub(crate) async fn transitions(
        &self,
        id: &ReportId,
        role: Role,
    ) -> Result<Vec<Transition>, WorkflowError> {
        let report = self.get(id).await?;
        Ok(dockcheck_engine::available_transitions(Some(&report), role))
    }

    pub(crate) async fn create(
        &self,
        actor: Actor,
        payload: &CreateReport,
    ) -> Result<Report, WorkflowError> {
        let id = ReportId::new(uuid::Uuid::new_v4().to_string());
        let ctx = ActionContext::new(actor, OffsetDateTime::now_utc());
        let report = dockcheck_engine::create_report(None, id, &ctx, payload)
            .inspect_err(|e| log_refusal(Transition::Submit, None, e))?;
        self.storage.put(report.clone(), None).await?;
        tracing::info!(
            report_id = %report.id,
            container_no = %report.shipment.container_no,
            "report created"
        );
        Ok(report)
    }

    pub(crate) async fn resubmit(
        &self,
        id: &ReportId,
        actor: Actor,
        payload: &ResubmitReport,
    ) -> Result<Report, WorkflowError> {
        self.apply(id, actor, Transition::Resubmit, |report, ctx| {
            dockcheck_engine::resubmit_report(report, ctx, payload)
        })
        .await
    }

    pub(crate) async fn field_review(
        &self,
        id: &ReportId,
        actor: Actor,
        payload: &FieldReview,
    ) -> Result<Report, WorkflowError> {
        let transition = match payload.action {
            dockcheck_engine::FieldDecision::Approve => Transition::FieldApprove,
            dockcheck_engine::FieldDecision::Reject => Transition::FieldReject,
        };
        self.apply(id, actor, transition, |report, ctx| {
            dockcheck_engine::field_review(report, ctx, payload)
        })
        .await
    }

    pub(crate) async fn office_approve(
        &self,
        id: &ReportId,
        actor: Actor,
        payload: &OfficeApproval,
    ) -> Result<Report, WorkflowError> {
        self.apply(id, actor, Transition::OfficeApprove, |report, ctx| {
            dockcheck_engine::office_approve(report, ctx, payload)
        })
        .await
    }

    pub(crate) async fn office_reject(
        &self,
        id: &ReportId,
        actor: Actor,
        payload: &OfficeRejection,
    ) -> Result<Report, WorkflowError> {
        self.apply(id, actor, Transition::OfficeReject, |report, ctx| {
            dockcheck_engine::office_reject(report, ctx, payload)
        })
        .await
    }

    pub(crate) async fn certificate(&self, id: &ReportId) -> Result<Certificate, WorkflowError> {
        Ok(dockcheck_engine::certificate(&self.get(id).await?))
    }

    pub(crate) async fn last_signature(
        &self,
        id: &ReportId,
        role: Role,
    ) -> Result<Option<String>, WorkflowError> {
        let report = self.get(id).await?;
        Ok(dockcheck_engine::last_signature_by_role(&report, role).map(str::to_string))
    }

    /// Read, apply `op`, write back at the read version; retry on conflict.
    async fn apply<F>(
        &self,
        id: &ReportId,
        actor: Actor,
        transition: Transition,
        op: F,
    ) -> Result<Report, WorkflowError>
    where
        F: Fn(&Report, &ActionContext) -> Result<Report, EngineError>,
    {
        let attempts = self.max_write_retries.saturating_add(1);
        for attempt in 1..=attempts {
            let stored = self.storage.get(id).await?;
            let ctx = ActionContext::new(actor.clone(), action_time(&stored.report));
            let next = op(&stored.report, &ctx)
                .inspect_err(|e| log_refusal(transition, Some(id), e))?;

            match self.storage.put(next.clone(), Some(stored.version)).await {
                Ok(version) => {
                    tracing::info!(
                        report_id = %id,
                        transition = %transition,
                        status = %next.status,
                        version,
                        "transition stored"
                    );
                    return Ok(next);
                }
                Err(StorageError::ConcurrentConflict { .. }) => {
                    tracing::warn!(
                        report_id = %id,
                        transition = %transition,
                        attempt,
                        "write conflict, re-reading report"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(WorkflowError::ConflictOnWrite {
            id: id.clone(),
            attempts,
        })
    }
}

/// Now, but never earlier than the report's newest ledger entry.
fn action_time(report: &Report) -> Timestamp {
    let now = OffsetDateTime::now_utc();
    match report.action_history.last() {
        Some(last) if last.timestamp > now => last.timestamp,
        _ => now,
    }
}

fn log_refusal(transition: Transition, id: Option<&ReportId>, error: &EngineError) {
    tracing::warn!(
        report_id = id.map(|id| id.as_str()),
        transition = %transition,
        error = %error,
        "transition refused"
    );
}
