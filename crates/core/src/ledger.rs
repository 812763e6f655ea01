//! Append-only action history embedded in every report.
//!
//! The ledger is the authoritative record of every workflow action. Entries
//! are only ever appended; nothing in this module can remove, reorder or
//! edit an entry once it is in the ledger.

use serde::{Deserialize, Serialize};

use crate::types::{ActionType, ReportStatus, Role, Timestamp};

/// One ledger record per workflow action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub action_type: ActionType,
    /// Display name of the person who acted.
    pub actor: String,
    pub actor_role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: Timestamp,
    /// Damage description at the time of the action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Rejection reason. Only rejections carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl HistoryEntry {
    /// Entry for a content-bearing action (submit, resubmit, approve, office approve).
    pub fn signed(
        action_type: ActionType,
        actor: impl Into<String>,
        timestamp: Timestamp,
        content: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        HistoryEntry {
            action_type,
            actor: actor.into(),
            actor_role: action_type.actor_role(),
            timestamp,
            content: Some(content.into()),
            signature: Some(signature.into()),
            reason: None,
        }
    }

    /// Entry for a rejection (reject, office reject).
    pub fn rejection(
        action_type: ActionType,
        actor: impl Into<String>,
        timestamp: Timestamp,
        reason: impl Into<String>,
    ) -> Self {
        HistoryEntry {
            action_type,
            actor: actor.into(),
            actor_role: action_type.actor_role(),
            timestamp,
            content: None,
            signature: None,
            reason: Some(reason.into()),
        }
    }
}

/// Ordered, append-only sequence of [`HistoryEntry`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionHistory(Vec<HistoryEntry>);

impl ActionHistory {
    pub fn new() -> Self {
        ActionHistory(Vec::new())
    }

    /// Append an entry. Existing entries are never touched.
    pub fn append(&mut self, entry: HistoryEntry) {
        self.0.push(entry);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.0.last()
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.0.get(index)
    }

    /// Entries oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[HistoryEntry] {
        &self.0
    }

    /// Entries left by `role`, oldest first.
    pub fn entries_by_role(&self, role: Role) -> impl Iterator<Item = &HistoryEntry> + '_ {
        self.0.iter().filter(move |e| e.actor_role == role)
    }

    /// Status implied by the most recent entry. `None` for an empty ledger.
    pub fn implied_status(&self) -> Option<ReportStatus> {
        self.last().map(|e| e.action_type.implied_status())
    }

    /// Latest entry by `role` that carries a signature.
    ///
    /// A report can cycle through rejection and resubmission several times;
    /// only the newest signature per role belongs on the final certificate.
    pub fn last_signed_by_role(&self, role: Role) -> Option<&HistoryEntry> {
        self.0
            .iter()
            .rev()
            .find(|e| e.actor_role == role && e.signature.is_some())
    }

    pub fn last_signature_by_role(&self, role: Role) -> Option<&str> {
        self.last_signed_by_role(role)
            .and_then(|e| e.signature.as_deref())
    }
}

impl<'a> IntoIterator for &'a ActionHistory {
    type Item = &'a HistoryEntry;
    type IntoIter = std::slice::Iter<'a, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
