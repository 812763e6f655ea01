//! Action payloads accepted by the lifecycle operations.
//!
//! Field names follow the JSON the API layer receives (camelCase).
//! Optional fields default to `None` / empty so partially filled forms
//! deserialize and are then rejected by validation with a field-level
//! message instead of a parse error.

use dockcheck_core::{Role, Timestamp};
use serde::{Deserialize, Serialize};

/// Who is acting. Identity is established by the caller; the engine only
/// checks the role against the transition table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Actor {
            name: name.into(),
            role,
        }
    }

    pub fn driver(name: impl Into<String>) -> Self {
        Actor::new(name, Role::Driver)
    }

    pub fn field(name: impl Into<String>) -> Self {
        Actor::new(name, Role::Field)
    }

    pub fn office(name: impl Into<String>) -> Self {
        Actor::new(name, Role::Office)
    }
}

/// The acting party plus the instant the action takes effect.
///
/// The engine never reads a clock; the caller stamps every action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionContext {
    pub actor: Actor,
    pub at: Timestamp,
}

impl ActionContext {
    pub fn new(actor: Actor, at: Timestamp) -> Self {
        ActionContext { actor, at }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateReport {
    pub report_date: String,
    pub container_no: String,
    pub bl_no: String,
    pub vehicle_no: String,
    pub driver_name: String,
    pub driver_phone: String,
    pub driver_damage: String,
    pub driver_signature: String,
    pub damage_photos: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResubmitReport {
    pub driver_damage: String,
    pub driver_signature: String,
    /// Replaces the stored photo list when present.
    pub damage_photos: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldDecision {
    Approve,
    Reject,
}

/// Field inspector's review. Which fields are required depends on `action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReview {
    pub action: FieldDecision,
    #[serde(default)]
    pub field_staff: Option<String>,
    #[serde(default)]
    pub field_phone: Option<String>,
    #[serde(default)]
    pub field_damage: Option<String>,
    #[serde(default)]
    pub field_signature: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

impl FieldReview {
    pub fn approve(
        staff: impl Into<String>,
        damage: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        FieldReview {
            action: FieldDecision::Approve,
            field_staff: Some(staff.into()),
            field_phone: None,
            field_damage: Some(damage.into()),
            field_signature: Some(signature.into()),
            rejection_reason: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        FieldReview {
            action: FieldDecision::Reject,
            field_staff: None,
            field_phone: None,
            field_damage: None,
            field_signature: None,
            rejection_reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OfficeApproval {
    pub office_staff: String,
    pub office_phone: String,
    pub office_damage: String,
    pub office_signature: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OfficeRejection {
    pub rejection_reason: String,
    pub office_staff: String,
}
