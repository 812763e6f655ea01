//! The transition table.
//!
//! Each engine operation is one [`Transition`]. The table maps it to the
//! role allowed to perform it, the status it requires, the status it
//! produces and the ledger entry kind it appends.

use std::fmt;

use dockcheck_core::{ActionType, ReportStatus, Role};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Submit,
    Resubmit,
    FieldApprove,
    FieldReject,
    OfficeApprove,
    OfficeReject,
}

impl Transition {
    pub const ALL: [Transition; 6] = [
        Transition::Submit,
        Transition::Resubmit,
        Transition::FieldApprove,
        Transition::FieldReject,
        Transition::OfficeApprove,
        Transition::OfficeReject,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Submit => "submit",
            Transition::Resubmit => "resubmit",
            Transition::FieldApprove => "field_approve",
            Transition::FieldReject => "field_reject",
            Transition::OfficeApprove => "office_approve",
            Transition::OfficeReject => "office_reject",
        }
    }

    /// Ledger entry kind appended by this transition.
    pub fn action_type(&self) -> ActionType {
        match self {
            Transition::Submit => ActionType::Submit,
            Transition::Resubmit => ActionType::Resubmit,
            Transition::FieldApprove => ActionType::Approve,
            Transition::FieldReject => ActionType::Reject,
            Transition::OfficeApprove => ActionType::OfficeApprove,
            Transition::OfficeReject => ActionType::OfficeReject,
        }
    }

    pub fn required_role(&self) -> Role {
        match self {
            Transition::Submit | Transition::Resubmit => Role::Driver,
            Transition::FieldApprove | Transition::FieldReject => Role::Field,
            Transition::OfficeApprove | Transition::OfficeReject => Role::Office,
        }
    }

    /// Required current status. `None` means the report must not exist.
    pub fn source_status(&self) -> Option<ReportStatus> {
        match self {
            Transition::Submit => None,
            Transition::Resubmit => Some(ReportStatus::Rejected),
            Transition::FieldApprove | Transition::FieldReject => {
                Some(ReportStatus::DriverSubmitted)
            }
            Transition::OfficeApprove | Transition::OfficeReject => {
                Some(ReportStatus::FieldSubmitted)
            }
        }
    }

    /// Status after the transition.
    ///
    /// `OfficeReject` deliberately lands in `DriverSubmitted` rather than
    /// `Rejected`: the report goes straight back to the field review queue
    /// and the driver never sees it as rejected. Whether that asymmetry is
    /// intended is an open product question; keep it until it is answered.
    pub fn target_status(&self) -> ReportStatus {
        match self {
            Transition::Submit | Transition::Resubmit => ReportStatus::DriverSubmitted,
            Transition::FieldApprove => ReportStatus::FieldSubmitted,
            Transition::FieldReject => ReportStatus::Rejected,
            Transition::OfficeApprove => ReportStatus::Completed,
            Transition::OfficeReject => ReportStatus::DriverSubmitted,
        }
    }

    /// Whether this transition may be applied to a report in `current`
    /// (`None` = no report yet).
    pub fn applies_to(&self, current: Option<ReportStatus>) -> bool {
        self.source_status() == current
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
