//! Role dashboards: which reports wait on a role, and what a role may do.

use dockcheck_core::{Report, Role};

use crate::transition::Transition;

/// Reports currently waiting on `role`, in input order.
///
/// Driver: `rejected`. Field: `driver_submitted` (including reports the
/// office sent back). Office: `field_submitted`.
pub fn queue_for_role<'a, I>(role: Role, reports: I) -> Vec<&'a Report>
where
    I: IntoIterator<Item = &'a Report>,
{
    reports
        .into_iter()
        .filter(|r| r.status.awaiting_role() == Some(role))
        .collect()
}

/// Transitions `role` may apply to `report` right now (`None` = no report yet).
pub fn available_transitions(report: Option<&Report>, role: Role) -> Vec<Transition> {
    let current = report.map(|r| r.status);
    Transition::ALL
        .into_iter()
        .filter(|t| t.required_role() == role && t.applies_to(current))
        .collect()
}
