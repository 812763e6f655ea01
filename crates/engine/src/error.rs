use std::fmt;

use dockcheck_core::{ReportStatus, Role, Timestamp};
use serde::Serialize;

use crate::transition::Transition;

/// A single missing or empty payload field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn required(field: &str) -> Self {
        FieldError {
            field: field.to_string(),
            message: format!("{field} is required"),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Why a lifecycle operation was refused. The input report is never
/// modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// One or more required payload fields are missing or blank.
    #[error("validation failed: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// The report is not in the status the transition requires.
    #[error("cannot {transition} a report in status '{}'", current_label(.current))]
    IllegalTransition {
        transition: Transition,
        /// Actual status; `None` when the report does not exist.
        current: Option<ReportStatus>,
    },

    /// The acting role is not the one the transition belongs to.
    #[error("role '{role}' may not {transition} (requires '{required}')")]
    RoleNotPermitted {
        transition: Transition,
        role: Role,
        required: Role,
    },

    /// The action is dated before the report's newest ledger entry.
    #[error("cannot {transition} at {at}: the last history entry is at {last}")]
    Backdated {
        transition: Transition,
        at: Timestamp,
        last: Timestamp,
    },
}

impl EngineError {
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            EngineError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn current_label(current: &Option<ReportStatus>) -> &'static str {
    current.map_or("none", |s| s.as_str())
}
