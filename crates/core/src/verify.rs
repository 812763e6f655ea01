//! Ledger replay and report consistency checks.
//!
//! [`verify_report`] replays the action history from an empty report and
//! checks each entry against the transition table, then checks the stored
//! fields against what the replay implies. Violations are collected rather
//! than failing fast so a single pass reports everything wrong with a
//! persisted report.

use std::fmt;

use crate::types::{ActionType, Report, ReportStatus, Role};

/// A single broken invariant found in a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyViolation {
    /// The report has no ledger entries at all.
    EmptyHistory,
    /// An entry's action is not legal from the status the ledger was in.
    IllegalSequence {
        index: usize,
        action: ActionType,
        from: Option<ReportStatus>,
    },
    /// The entry's role does not match the role its action requires.
    RoleMismatch {
        index: usize,
        action: ActionType,
        role: Role,
    },
    /// A content-bearing entry is missing its content or signature.
    MissingContent { index: usize, action: ActionType },
    /// A rejection entry has no reason.
    MissingReason { index: usize, action: ActionType },
    /// A non-rejection entry carries a reason.
    UnexpectedReason { index: usize, action: ActionType },
    /// An entry is timestamped before its predecessor.
    TimestampRegression { index: usize },
    /// The stored status disagrees with the last ledger entry.
    StatusMismatch {
        stored: ReportStatus,
        implied: ReportStatus,
    },
    /// Exactly one of `rejectionReason` / `rejectedAt` is set.
    RejectionFieldsUnpaired,
    /// The report is `rejected` but carries no rejection reason.
    RejectedWithoutReason,
    /// A party section required by the current status is absent.
    MissingSection { role: Role },
    /// A party section is filled while an earlier party's section is absent.
    SectionOutOfOrder { role: Role },
}

impl fmt::Display for ConsistencyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyViolation::EmptyHistory => write!(f, "action history is empty"),
            ConsistencyViolation::IllegalSequence {
                index,
                action,
                from,
            } => match from {
                Some(status) => write!(
                    f,
                    "entry {}: '{}' is not allowed from status '{}'",
                    index, action, status
                ),
                None => write!(
                    f,
                    "entry {}: '{}' is not allowed before the report is submitted",
                    index, action
                ),
            },
            ConsistencyViolation::RoleMismatch {
                index,
                action,
                role,
            } => write!(
                f,
                "entry {}: '{}' recorded for role '{}', expected '{}'",
                index,
                action,
                role,
                action.actor_role()
            ),
            ConsistencyViolation::MissingContent { index, action } => write!(
                f,
                "entry {}: '{}' is missing its content or signature",
                index, action
            ),
            ConsistencyViolation::MissingReason { index, action } => {
                write!(f, "entry {}: '{}' is missing its reason", index, action)
            }
            ConsistencyViolation::UnexpectedReason { index, action } => {
                write!(f, "entry {}: '{}' must not carry a reason", index, action)
            }
            ConsistencyViolation::TimestampRegression { index } => {
                write!(f, "entry {}: timestamp is earlier than entry {}", index, index - 1)
            }
            ConsistencyViolation::StatusMismatch { stored, implied } => write!(
                f,
                "status is '{}' but the last history entry implies '{}'",
                stored, implied
            ),
            ConsistencyViolation::RejectionFieldsUnpaired => write!(
                f,
                "rejectionReason and rejectedAt must be set or cleared together"
            ),
            ConsistencyViolation::RejectedWithoutReason => {
                write!(f, "report is rejected but has no rejection reason")
            }
            ConsistencyViolation::MissingSection { role } => {
                write!(f, "{} section is required by the current status", role)
            }
            ConsistencyViolation::SectionOutOfOrder { role } => write!(
                f,
                "{} section is filled before the preceding party's section",
                role
            ),
        }
    }
}

/// Replay `report`'s ledger and return every invariant it violates.
pub fn verify_report(report: &Report) -> Vec<ConsistencyViolation> {
    let mut violations = Vec::new();
    let history = &report.action_history;

    if history.is_empty() {
        violations.push(ConsistencyViolation::EmptyHistory);
    }

    let mut replayed: Option<ReportStatus> = None;
    for (index, entry) in history.iter().enumerate() {
        let action = entry.action_type;

        if action.source_status() != replayed {
            violations.push(ConsistencyViolation::IllegalSequence {
                index,
                action,
                from: replayed,
            });
        }
        if entry.actor_role != action.actor_role() {
            violations.push(ConsistencyViolation::RoleMismatch {
                index,
                action,
                role: entry.actor_role,
            });
        }
        if action.carries_content() {
            let has_content = entry.content.as_deref().is_some_and(|c| !c.is_empty());
            let has_signature = entry.signature.as_deref().is_some_and(|s| !s.is_empty());
            if !has_content || !has_signature {
                violations.push(ConsistencyViolation::MissingContent { index, action });
            }
            if entry.reason.is_some() {
                violations.push(ConsistencyViolation::UnexpectedReason { index, action });
            }
        } else if entry.reason.as_deref().map_or(true, str::is_empty) {
            violations.push(ConsistencyViolation::MissingReason { index, action });
        }
        if index > 0 {
            if let Some(prev) = history.get(index - 1) {
                if entry.timestamp < prev.timestamp {
                    violations.push(ConsistencyViolation::TimestampRegression { index });
                }
            }
        }

        // Keep replaying from the recorded action so one bad entry does not
        // cascade into a violation for every entry after it.
        replayed = Some(action.implied_status());
    }

    if let Some(implied) = history.implied_status() {
        if implied != report.status {
            violations.push(ConsistencyViolation::StatusMismatch {
                stored: report.status,
                implied,
            });
        }
    }

    if report.rejection_reason.is_some() != report.rejected_at.is_some() {
        violations.push(ConsistencyViolation::RejectionFieldsUnpaired);
    }
    if report.status == ReportStatus::Rejected
        && report.rejection_reason.as_deref().map_or(true, str::is_empty)
    {
        violations.push(ConsistencyViolation::RejectedWithoutReason);
    }

    check_sections(report, &mut violations);

    violations
}

fn check_sections(report: &Report, violations: &mut Vec<ConsistencyViolation>) {
    let required: &[Role] = match report.status {
        ReportStatus::Draft => &[],
        ReportStatus::DriverSubmitted | ReportStatus::Rejected => &[Role::Driver],
        ReportStatus::FieldSubmitted => &[Role::Driver, Role::Field],
        ReportStatus::Completed => &[Role::Driver, Role::Field, Role::Office],
    };
    for role in required {
        if report.section(*role).is_none() {
            violations.push(ConsistencyViolation::MissingSection { role: *role });
        }
    }

    if report.field.is_some() && report.driver.is_none() {
        violations.push(ConsistencyViolation::SectionOutOfOrder { role: Role::Field });
    }
    if report.office.is_some() && report.field.is_none() {
        violations.push(ConsistencyViolation::SectionOutOfOrder { role: Role::Office });
    }
}
