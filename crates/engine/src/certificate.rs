//! Certificate data for the document renderer.
//!
//! A certificate shows exactly one signature per role: the newest one in the
//! ledger. Descriptive text comes from the current party sections.

use dockcheck_core::{Report, ReportId, ReportStatus, Role, ShipmentInfo, Timestamp};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateParty {
    pub role: Role,
    /// Driver name from the shipment, or the staff name on the section,
    /// falling back to the ledger actor who signed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub signed_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub report_id: ReportId,
    #[serde(flatten)]
    pub shipment: ShipmentInfo,
    pub status: ReportStatus,
    pub completed: bool,
    pub damage_photos: Vec<String>,
    /// Driver, field, office, in that order.
    pub parties: Vec<CertificateParty>,
}

impl Certificate {
    pub fn party(&self, role: Role) -> Option<&CertificateParty> {
        self.parties.iter().find(|p| p.role == role)
    }
}

/// Most recent signature left by `role`, or `None` if that role never signed.
pub fn last_signature_by_role(report: &Report, role: Role) -> Option<&str> {
    report.action_history.last_signature_by_role(role)
}

/// Assemble certificate data for any report. Callers that only print final
/// certificates check [`Certificate::completed`].
pub fn certificate(report: &Report) -> Certificate {
    let parties = Role::ALL
        .into_iter()
        .map(|role| {
            let section = report.section(role);
            let signed = report.action_history.last_signed_by_role(role);
            let name = match role {
                Role::Driver => Some(report.shipment.driver_name.clone()),
                Role::Field | Role::Office => section
                    .and_then(|s| s.staff_name.clone())
                    .or_else(|| signed.map(|e| e.actor.clone())),
            };
            CertificateParty {
                role,
                name,
                damage: section.map(|s| s.damage.clone()),
                signature: signed.and_then(|e| e.signature.clone()),
                signed_at: signed.map(|e| e.timestamp),
            }
        })
        .collect();

    Certificate {
        report_id: report.id.clone(),
        shipment: report.shipment.clone(),
        status: report.status,
        completed: report.is_completed(),
        damage_photos: report.damage_photos.clone(),
        parties,
    }
}
