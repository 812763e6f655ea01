//! Container damage report lifecycle engine.
//!
//! Takes the current report and a role-stamped action, returns the next
//! report or a typed error. Pure: no storage, no clock, no I/O. The caller
//! supplies the action timestamp and persists the result.
//!
//! Operations (see [`lifecycle`]):
//! - [`create_report`] -- driver submit, creates the report
//! - [`resubmit_report`] -- driver resubmit after a field rejection
//! - [`field_review`] -- field approve or reject
//! - [`office_approve`] / [`office_reject`] -- final office decision
//!
//! Queries: [`last_signature_by_role`], [`certificate`], [`queue_for_role`],
//! [`available_transitions`].

pub mod certificate;
pub mod error;
pub mod lifecycle;
pub mod payload;
pub mod queue;
pub mod transition;
mod validate;

pub use certificate::{certificate, last_signature_by_role, Certificate, CertificateParty};
pub use error::{EngineError, FieldError};
pub use lifecycle::{create_report, field_review, office_approve, office_reject, resubmit_report};
pub use payload::{
    ActionContext, Actor, CreateReport, FieldDecision, FieldReview, OfficeApproval,
    OfficeRejection, ResubmitReport,
};
pub use queue::{available_transitions, queue_for_role};
pub use transition::Transition;
