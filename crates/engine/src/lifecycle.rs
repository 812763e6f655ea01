//! Report lifecycle operations.
//!
//! Every operation follows the same sequence:
//! 1. Role check (the actor's role must own the transition)
//! 2. Precondition (the report must be in the transition's source status,
//!    and the action may not be dated before the newest ledger entry)
//! 3. Payload validation (all required fields present, all reported at once)
//! 4. Effect (party section and rejection fields on a copy of the report)
//! 5. Commit (exactly one ledger append and one status update)
//!
//! Steps 1-3 never touch the report, and the effect is computed on a clone,
//! so an error leaves the caller's report exactly as it was.

use dockcheck_core::{
    ActionHistory, HistoryEntry, PartySection, Report, ReportId, ReportStatus, ShipmentInfo,
};

use crate::error::EngineError;
use crate::payload::{
    ActionContext, CreateReport, FieldDecision, FieldReview, OfficeApproval, OfficeRejection,
    ResubmitReport,
};
use crate::transition::Transition;
use crate::validate::Validator;

/// Create a report from the driver's submission.
///
/// `existing` is whatever the caller found under `id`; submitting over an
/// existing report is an illegal transition.
pub fn create_report(
    existing: Option<&Report>,
    id: ReportId,
    ctx: &ActionContext,
    payload: &CreateReport,
) -> Result<Report, EngineError> {
    let transition = Transition::Submit;
    check_role(transition, ctx)?;
    check_source(transition, existing.map(|r| r.status))?;

    Validator::new()
        .required("actor", &ctx.actor.name)
        .required("reportDate", &payload.report_date)
        .required("containerNo", &payload.container_no)
        .required("blNo", &payload.bl_no)
        .required("vehicleNo", &payload.vehicle_no)
        .required("driverName", &payload.driver_name)
        .required("driverPhone", &payload.driver_phone)
        .required("driverDamage", &payload.driver_damage)
        .required("driverSignature", &payload.driver_signature)
        .finish()?;

    let report = Report {
        id,
        shipment: ShipmentInfo {
            report_date: payload.report_date.clone(),
            container_no: payload.container_no.clone(),
            bl_no: payload.bl_no.clone(),
            vehicle_no: payload.vehicle_no.clone(),
            driver_name: payload.driver_name.clone(),
            driver_phone: payload.driver_phone.clone(),
        },
        driver: Some(PartySection {
            damage: payload.driver_damage.clone(),
            signature: payload.driver_signature.clone(),
            submitted_at: ctx.at,
            staff_name: None,
            staff_phone: None,
        }),
        field: None,
        office: None,
        damage_photos: payload.damage_photos.clone().unwrap_or_default(),
        status: ReportStatus::Draft,
        rejection_reason: None,
        rejected_at: None,
        action_history: ActionHistory::new(),
        created_at: ctx.at,
    };

    let entry = HistoryEntry::signed(
        transition.action_type(),
        ctx.actor.name.clone(),
        ctx.at,
        payload.driver_damage.clone(),
        payload.driver_signature.clone(),
    );
    Ok(commit(report, transition, entry))
}

/// Driver resubmits a rejected report. Clears the rejection fields.
pub fn resubmit_report(
    report: &Report,
    ctx: &ActionContext,
    payload: &ResubmitReport,
) -> Result<Report, EngineError> {
    let transition = Transition::Resubmit;
    check_role(transition, ctx)?;
    check_source(transition, Some(report.status))?;
    check_clock(transition, report, ctx)?;

    Validator::new()
        .required("actor", &ctx.actor.name)
        .required("driverDamage", &payload.driver_damage)
        .required("driverSignature", &payload.driver_signature)
        .finish()?;

    let mut next = report.clone();
    next.driver = Some(PartySection {
        damage: payload.driver_damage.clone(),
        signature: payload.driver_signature.clone(),
        submitted_at: ctx.at,
        staff_name: None,
        staff_phone: None,
    });
    if let Some(photos) = &payload.damage_photos {
        next.damage_photos = photos.clone();
    }
    next.rejection_reason = None;
    next.rejected_at = None;

    let entry = HistoryEntry::signed(
        transition.action_type(),
        ctx.actor.name.clone(),
        ctx.at,
        payload.driver_damage.clone(),
        payload.driver_signature.clone(),
    );
    Ok(commit(next, transition, entry))
}

/// Field inspector approves or rejects a driver submission.
pub fn field_review(
    report: &Report,
    ctx: &ActionContext,
    payload: &FieldReview,
) -> Result<Report, EngineError> {
    let transition = match payload.action {
        FieldDecision::Approve => Transition::FieldApprove,
        FieldDecision::Reject => Transition::FieldReject,
    };
    check_role(transition, ctx)?;
    check_source(transition, Some(report.status))?;
    check_clock(transition, report, ctx)?;

    let mut next = report.clone();
    let entry = match payload.action {
        FieldDecision::Approve => {
            Validator::new()
                .required("actor", &ctx.actor.name)
                .required_opt("fieldStaff", payload.field_staff.as_deref())
                .required_opt("fieldDamage", payload.field_damage.as_deref())
                .required_opt("fieldSignature", payload.field_signature.as_deref())
                .finish()?;

            let damage = payload.field_damage.clone().unwrap_or_default();
            let signature = payload.field_signature.clone().unwrap_or_default();
            next.field = Some(PartySection {
                damage: damage.clone(),
                signature: signature.clone(),
                submitted_at: ctx.at,
                staff_name: payload.field_staff.clone(),
                staff_phone: non_blank(payload.field_phone.as_deref()),
            });
            HistoryEntry::signed(
                transition.action_type(),
                ctx.actor.name.clone(),
                ctx.at,
                damage,
                signature,
            )
        }
        FieldDecision::Reject => {
            Validator::new()
                .required("actor", &ctx.actor.name)
                .required_opt("rejectionReason", payload.rejection_reason.as_deref())
                .finish()?;

            let reason = payload.rejection_reason.clone().unwrap_or_default();
            next.rejection_reason = Some(reason.clone());
            next.rejected_at = Some(ctx.at);
            HistoryEntry::rejection(
                transition.action_type(),
                ctx.actor.name.clone(),
                ctx.at,
                reason,
            )
        }
    };

    Ok(commit(next, transition, entry))
}

/// Office gives final approval. The report becomes `completed`.
pub fn office_approve(
    report: &Report,
    ctx: &ActionContext,
    payload: &OfficeApproval,
) -> Result<Report, EngineError> {
    let transition = Transition::OfficeApprove;
    check_role(transition, ctx)?;
    check_source(transition, Some(report.status))?;
    check_clock(transition, report, ctx)?;

    Validator::new()
        .required("actor", &ctx.actor.name)
        .required("officeStaff", &payload.office_staff)
        .required("officePhone", &payload.office_phone)
        .required("officeDamage", &payload.office_damage)
        .required("officeSignature", &payload.office_signature)
        .finish()?;

    let mut next = report.clone();
    next.office = Some(PartySection {
        damage: payload.office_damage.clone(),
        signature: payload.office_signature.clone(),
        submitted_at: ctx.at,
        staff_name: Some(payload.office_staff.clone()),
        staff_phone: Some(payload.office_phone.clone()),
    });

    let entry = HistoryEntry::signed(
        transition.action_type(),
        ctx.actor.name.clone(),
        ctx.at,
        payload.office_damage.clone(),
        payload.office_signature.clone(),
    );
    Ok(commit(next, transition, entry))
}

/// Office sends the report back.
///
/// Lands in `driver_submitted`, not `rejected`; see
/// [`Transition::target_status`]. The rejection fields are still recorded so
/// the field inspector sees why the report came back.
pub fn office_reject(
    report: &Report,
    ctx: &ActionContext,
    payload: &OfficeRejection,
) -> Result<Report, EngineError> {
    let transition = Transition::OfficeReject;
    check_role(transition, ctx)?;
    check_source(transition, Some(report.status))?;
    check_clock(transition, report, ctx)?;

    Validator::new()
        .required("actor", &ctx.actor.name)
        .required("rejectionReason", &payload.rejection_reason)
        .required("officeStaff", &payload.office_staff)
        .finish()?;

    let mut next = report.clone();
    next.rejection_reason = Some(payload.rejection_reason.clone());
    next.rejected_at = Some(ctx.at);

    let entry = HistoryEntry::rejection(
        transition.action_type(),
        ctx.actor.name.clone(),
        ctx.at,
        payload.rejection_reason.clone(),
    );
    Ok(commit(next, transition, entry))
}

// ──────────────────────────────────────────────
// Shared steps
// ──────────────────────────────────────────────

fn check_role(transition: Transition, ctx: &ActionContext) -> Result<(), EngineError> {
    let required = transition.required_role();
    if ctx.actor.role != required {
        tracing::debug!(
            transition = %transition,
            role = %ctx.actor.role,
            "role not permitted"
        );
        return Err(EngineError::RoleNotPermitted {
            transition,
            role: ctx.actor.role,
            required,
        });
    }
    Ok(())
}

fn check_source(transition: Transition, current: Option<ReportStatus>) -> Result<(), EngineError> {
    if !transition.applies_to(current) {
        return Err(EngineError::IllegalTransition {
            transition,
            current,
        });
    }
    Ok(())
}

/// Ledger timestamps never go backwards.
fn check_clock(
    transition: Transition,
    report: &Report,
    ctx: &ActionContext,
) -> Result<(), EngineError> {
    match report.action_history.last() {
        Some(last) if ctx.at < last.timestamp => Err(EngineError::Backdated {
            transition,
            at: ctx.at,
            last: last.timestamp,
        }),
        _ => Ok(()),
    }
}

/// The one place a ledger entry is appended and the status set.
fn commit(mut report: Report, transition: Transition, entry: HistoryEntry) -> Report {
    let from = report.status;
    report.action_history.append(entry);
    report.status = transition.target_status();
    tracing::debug!(
        report_id = %report.id,
        transition = %transition,
        from = %from,
        to = %report.status,
        history_len = report.action_history.len(),
        "transition applied"
    );
    report
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Actor;
    use dockcheck_core::{ActionType, Role};
    use time::macros::datetime;

    fn ctx(actor: Actor) -> ActionContext {
        ActionContext::new(actor, datetime!(2025-10-01 09:00 UTC))
    }

    fn create_payload() -> CreateReport {
        CreateReport {
            report_date: "2025-10-01".to_string(),
            container_no: "TCLU8239466".to_string(),
            bl_no: "CHL20251001".to_string(),
            vehicle_no: "부산12가3456".to_string(),
            driver_name: "홍길동".to_string(),
            driver_phone: "010-1234-5678".to_string(),
            driver_damage: "좌측 패널 파손".to_string(),
            driver_signature: "홍길동".to_string(),
            damage_photos: Some(vec!["p1.jpg".to_string()]),
        }
    }

    fn submitted() -> Report {
        create_report(
            None,
            ReportId::new("r-1"),
            &ctx(Actor::driver("홍길동")),
            &create_payload(),
        )
        .unwrap()
    }

    #[test]
    fn create_populates_driver_section_and_photos() {
        let report = submitted();
        assert_eq!(report.status, ReportStatus::DriverSubmitted);
        assert_eq!(report.damage_photos, vec!["p1.jpg".to_string()]);
        let driver = report.driver.as_ref().unwrap();
        assert_eq!(driver.damage, "좌측 패널 파손");
        assert!(report.field.is_none());
        assert_eq!(report.created_at, datetime!(2025-10-01 09:00 UTC));
        assert_eq!(report.action_history.len(), 1);
        assert_eq!(
            report.action_history.last().unwrap().action_type,
            ActionType::Submit
        );
    }

    #[test]
    fn create_over_existing_report_is_illegal() {
        let existing = submitted();
        let err = create_report(
            Some(&existing),
            ReportId::new("r-1"),
            &ctx(Actor::driver("홍길동")),
            &create_payload(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::IllegalTransition {
                transition: Transition::Submit,
                current: Some(ReportStatus::DriverSubmitted),
            }
        );
    }

    #[test]
    fn role_is_checked_before_precondition() {
        let report = submitted();
        let err = office_approve(
            &report,
            &ctx(Actor::field("김도훈")),
            &OfficeApproval::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::RoleNotPermitted {
                transition: Transition::OfficeApprove,
                role: Role::Field,
                required: Role::Office,
            }
        );
    }

    #[test]
    fn field_approve_records_staff_and_skips_blank_phone() {
        let mut review = FieldReview::approve("김도훈", "확인함", "김도훈");
        review.field_phone = Some("  ".to_string());
        let next = field_review(&submitted(), &ctx(Actor::field("김도훈")), &review).unwrap();
        let field = next.field.as_ref().unwrap();
        assert_eq!(field.staff_name.as_deref(), Some("김도훈"));
        assert_eq!(field.staff_phone, None);
        assert_eq!(next.status, ReportStatus::FieldSubmitted);
    }

    #[test]
    fn field_reject_requires_reason() {
        let mut review = FieldReview::reject("");
        review.rejection_reason = None;
        let err = field_review(&submitted(), &ctx(Actor::field("김도훈")), &review).unwrap_err();
        assert_eq!(err.field_errors().len(), 1);
        assert_eq!(err.field_errors()[0].field, "rejectionReason");
    }

    #[test]
    fn blank_actor_name_is_a_validation_error() {
        let err = create_report(
            None,
            ReportId::new("r-1"),
            &ctx(Actor::driver(" ")),
            &create_payload(),
        )
        .unwrap_err();
        assert_eq!(err.field_errors()[0].field, "actor");
    }

    #[test]
    fn resubmit_keeps_photos_when_not_replaced() {
        let rejected = field_review(
            &submitted(),
            &ctx(Actor::field("김도훈")),
            &FieldReview::reject("사진 필요"),
        )
        .unwrap();
        let next = resubmit_report(
            &rejected,
            &ctx(Actor::driver("홍길동")),
            &ResubmitReport {
                driver_damage: "사진 추가함".to_string(),
                driver_signature: "홍길동".to_string(),
                damage_photos: None,
            },
        )
        .unwrap();
        assert_eq!(next.damage_photos, vec!["p1.jpg".to_string()]);
        assert_eq!(next.driver.as_ref().unwrap().damage, "사진 추가함");
    }

    #[test]
    fn error_messages() {
        let err = EngineError::IllegalTransition {
            transition: Transition::OfficeApprove,
            current: Some(ReportStatus::DriverSubmitted),
        };
        assert_eq!(
            err.to_string(),
            "cannot office_approve a report in status 'driver_submitted'"
        );
        let err = EngineError::Validation(vec![
            crate::error::FieldError::required("driverDamage"),
            crate::error::FieldError::required("driverSignature"),
        ]);
        assert_eq!(
            err.to_string(),
            "validation failed: driverDamage is required, driverSignature is required"
        );
    }
}
