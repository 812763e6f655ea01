//! Report, party-section and workflow enum types.
//!
//! These are the values the lifecycle engine consumes and produces and the
//! storage layer persists. JSON field names are camelCase and enum values
//! snake_case, matching what the API layer exchanges with clients.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ledger::ActionHistory;

/// Wall-clock instant used for every workflow timestamp.
pub type Timestamp = OffsetDateTime;

// ──────────────────────────────────────────────
// Identity
// ──────────────────────────────────────────────

/// Opaque report identifier. Immutable once a report is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(String);

impl ReportId {
    pub fn new(id: impl Into<String>) -> Self {
        ReportId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReportId {
    fn from(id: &str) -> Self {
        ReportId::new(id)
    }
}

// ──────────────────────────────────────────────
// Roles
// ──────────────────────────────────────────────

/// The three parties that act on a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Driver,
    Field,
    Office,
}

impl Role {
    /// All roles in workflow order.
    pub const ALL: [Role; 3] = [Role::Driver, Role::Field, Role::Office];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Driver => "driver",
            Role::Field => "field",
            Role::Office => "office",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "driver" => Ok(Role::Driver),
            "field" => Ok(Role::Field),
            "office" => Ok(Role::Office),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

// ──────────────────────────────────────────────
// Status
// ──────────────────────────────────────────────

/// Report lifecycle status. The single source of truth for whose turn it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Reserved. Reports are created directly in `DriverSubmitted`.
    Draft,
    DriverSubmitted,
    FieldSubmitted,
    Rejected,
    Completed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Draft => "draft",
            ReportStatus::DriverSubmitted => "driver_submitted",
            ReportStatus::FieldSubmitted => "field_submitted",
            ReportStatus::Rejected => "rejected",
            ReportStatus::Completed => "completed",
        }
    }

    /// `Completed` is absorbing.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReportStatus::Completed)
    }

    /// The role whose action the report is waiting on, if any.
    ///
    /// `Draft` is never persisted, so nobody is waiting on it.
    pub fn awaiting_role(&self) -> Option<Role> {
        match self {
            ReportStatus::Rejected => Some(Role::Driver),
            ReportStatus::DriverSubmitted => Some(Role::Field),
            ReportStatus::FieldSubmitted => Some(Role::Office),
            ReportStatus::Draft | ReportStatus::Completed => None,
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ReportStatus::Draft),
            "driver_submitted" => Ok(ReportStatus::DriverSubmitted),
            "field_submitted" => Ok(ReportStatus::FieldSubmitted),
            "rejected" => Ok(ReportStatus::Rejected),
            "completed" => Ok(ReportStatus::Completed),
            _ => Err(format!("invalid report status: {s}")),
        }
    }
}

// ──────────────────────────────────────────────
// Action types
// ──────────────────────────────────────────────

/// The kind of workflow action recorded by a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Submit,
    Resubmit,
    Approve,
    Reject,
    OfficeApprove,
    OfficeReject,
}

impl ActionType {
    pub const ALL: [ActionType; 6] = [
        ActionType::Submit,
        ActionType::Resubmit,
        ActionType::Approve,
        ActionType::Reject,
        ActionType::OfficeApprove,
        ActionType::OfficeReject,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Submit => "submit",
            ActionType::Resubmit => "resubmit",
            ActionType::Approve => "approve",
            ActionType::Reject => "reject",
            ActionType::OfficeApprove => "office_approve",
            ActionType::OfficeReject => "office_reject",
        }
    }

    /// Status a report is left in when this is its latest action.
    ///
    /// An office rejection returns the report to `DriverSubmitted`, not
    /// `Rejected`: it goes straight back into the field review queue.
    pub fn implied_status(&self) -> ReportStatus {
        match self {
            ActionType::Submit | ActionType::Resubmit => ReportStatus::DriverSubmitted,
            ActionType::Approve => ReportStatus::FieldSubmitted,
            ActionType::Reject => ReportStatus::Rejected,
            ActionType::OfficeApprove => ReportStatus::Completed,
            ActionType::OfficeReject => ReportStatus::DriverSubmitted,
        }
    }

    /// Status the report must be in before this action. `None` means the
    /// report must not exist yet.
    pub fn source_status(&self) -> Option<ReportStatus> {
        match self {
            ActionType::Submit => None,
            ActionType::Resubmit => Some(ReportStatus::Rejected),
            ActionType::Approve | ActionType::Reject => Some(ReportStatus::DriverSubmitted),
            ActionType::OfficeApprove | ActionType::OfficeReject => {
                Some(ReportStatus::FieldSubmitted)
            }
        }
    }

    /// The only role allowed to perform this action.
    pub fn actor_role(&self) -> Role {
        match self {
            ActionType::Submit | ActionType::Resubmit => Role::Driver,
            ActionType::Approve | ActionType::Reject => Role::Field,
            ActionType::OfficeApprove | ActionType::OfficeReject => Role::Office,
        }
    }

    /// Whether entries of this kind carry damage text and a signature.
    pub fn carries_content(&self) -> bool {
        !self.is_rejection()
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, ActionType::Reject | ActionType::OfficeReject)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ──────────────────────────────────────────────
// Report
// ──────────────────────────────────────────────

/// Shipment fields fixed at creation and never touched by the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentInfo {
    pub report_date: String,
    pub container_no: String,
    pub bl_no: String,
    pub vehicle_no: String,
    pub driver_name: String,
    pub driver_phone: String,
}

/// What one party contributed to the current review cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartySection {
    pub damage: String,
    /// Opaque signature artifact: a typed name or an encoded image.
    pub signature: String,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: Timestamp,
    /// Staff member who filled the section (field and office only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_phone: Option<String>,
}

/// A container damage inspection report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    #[serde(flatten)]
    pub shipment: ShipmentInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<PartySection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<PartySection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub office: Option<PartySection>,
    #[serde(default)]
    pub damage_photos: Vec<String>,
    pub status: ReportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub rejected_at: Option<Timestamp>,
    pub action_history: ActionHistory,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: Timestamp,
}

impl Report {
    /// The party section filled by `role` in the current cycle.
    pub fn section(&self, role: Role) -> Option<&PartySection> {
        match role {
            Role::Driver => self.driver.as_ref(),
            Role::Field => self.field.as_ref(),
            Role::Office => self.office.as_ref(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ReportStatus::Completed
    }

    /// Most recent signature left by `role`, searched newest to oldest.
    pub fn last_signature_by_role(&self, role: Role) -> Option<&str> {
        self.action_history.last_signature_by_role(role)
    }
}
