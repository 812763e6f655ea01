//! Property tests: arbitrary operation sequences keep the report consistent.

use dockcheck_core::{verify_report, Report, ReportId, ReportStatus, Role};
use dockcheck_engine::{
    create_report, field_review, office_approve, office_reject, resubmit_report, ActionContext,
    Actor, CreateReport, EngineError, FieldReview, OfficeApproval, OfficeRejection,
    ResubmitReport,
};
use proptest::prelude::*;
use time::macros::datetime;
use time::Duration;

#[derive(Debug, Clone, Copy)]
enum Op {
    Resubmit,
    FieldApprove,
    FieldReject,
    OfficeApprove,
    OfficeReject,
}

#[derive(Debug, Clone)]
struct Step {
    op: Op,
    role: Role,
    blank: bool,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Resubmit),
        Just(Op::FieldApprove),
        Just(Op::FieldReject),
        Just(Op::OfficeApprove),
        Just(Op::OfficeReject),
    ]
}

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Driver), Just(Role::Field), Just(Role::Office)]
}

fn step_strategy() -> impl Strategy<Value = Step> {
    // Mostly well-formed payloads, with the occasional blank field.
    (op_strategy(), role_strategy(), prop::bool::weighted(0.1))
        .prop_map(|(op, role, blank)| Step { op, role, blank })
}

fn text(blank: bool, value: &str) -> String {
    if blank {
        String::new()
    } else {
        value.to_string()
    }
}

fn apply(report: &Report, step: &Step, ctx: &ActionContext) -> Result<Report, EngineError> {
    let b = step.blank;
    match step.op {
        Op::Resubmit => resubmit_report(
            report,
            ctx,
            &ResubmitReport {
                driver_damage: text(b, "사진 추가함"),
                driver_signature: "홍길동".to_string(),
                damage_photos: None,
            },
        ),
        Op::FieldApprove => field_review(
            report,
            ctx,
            &FieldReview::approve("김도훈", text(b, "확인함"), "김도훈"),
        ),
        Op::FieldReject => field_review(report, ctx, &FieldReview::reject(text(b, "사진 필요"))),
        Op::OfficeApprove => office_approve(
            report,
            ctx,
            &OfficeApproval {
                office_staff: "이수진".to_string(),
                office_phone: "051-000-0000".to_string(),
                office_damage: text(b, "최종확인"),
                office_signature: "이수진".to_string(),
            },
        ),
        Op::OfficeReject => office_reject(
            report,
            ctx,
            &OfficeRejection {
                rejection_reason: text(b, "서명 불명확"),
                office_staff: "이수진".to_string(),
            },
        ),
    }
}

fn submitted() -> Report {
    let payload = CreateReport {
        report_date: "2025-10-01".to_string(),
        container_no: "TCLU8239466".to_string(),
        bl_no: "CHL20251001".to_string(),
        vehicle_no: "부산12가3456".to_string(),
        driver_name: "홍길동".to_string(),
        driver_phone: "010-1234-5678".to_string(),
        driver_damage: "좌측 패널 파손".to_string(),
        driver_signature: "홍길동".to_string(),
        damage_photos: None,
    };
    let ctx = ActionContext::new(Actor::driver("홍길동"), datetime!(2025-10-01 09:00 UTC));
    create_report(None, ReportId::new("r-prop"), &ctx, &payload).unwrap()
}

proptest! {
    /// Status always matches the last ledger entry, the ledger only grows by
    /// one on success, and failures change nothing.
    #[test]
    fn random_sequences_stay_consistent(steps in prop::collection::vec(step_strategy(), 0..40)) {
        let mut report = submitted();

        for (i, step) in steps.iter().enumerate() {
            let at = datetime!(2025-10-01 09:00 UTC) + Duration::minutes(i as i64 + 1);
            let ctx = ActionContext::new(Actor::new("someone", step.role), at);
            let before = report.clone();

            match apply(&report, step, &ctx) {
                Ok(next) => {
                    prop_assert_eq!(next.action_history.len(), before.action_history.len() + 1);
                    prop_assert_eq!(
                        &next.action_history.as_slice()[..before.action_history.len()],
                        before.action_history.as_slice()
                    );
                    prop_assert_eq!(Some(next.status), next.action_history.implied_status());
                    report = next;
                }
                Err(_) => {
                    prop_assert_eq!(&report, &before);
                }
            }

            let violations = verify_report(&report);
            prop_assert!(violations.is_empty(), "violations after {:?}: {:?}", step, violations);
        }
    }

    /// Once completed, a report never changes again.
    #[test]
    fn completed_is_absorbing(steps in prop::collection::vec(step_strategy(), 1..20)) {
        let mut report = submitted();
        let at = datetime!(2025-10-01 10:00 UTC);
        report = field_review(
            &report,
            &ActionContext::new(Actor::field("김도훈"), at),
            &FieldReview::approve("김도훈", "확인함", "김도훈"),
        )
        .unwrap();
        report = office_approve(
            &report,
            &ActionContext::new(Actor::office("이수진"), at),
            &OfficeApproval {
                office_staff: "이수진".to_string(),
                office_phone: "051-000-0000".to_string(),
                office_damage: "최종확인".to_string(),
                office_signature: "이수진".to_string(),
            },
        )
        .unwrap();
        prop_assert_eq!(report.status, ReportStatus::Completed);

        for step in &steps {
            let ctx = ActionContext::new(Actor::new("someone", step.role), at);
            prop_assert!(apply(&report, step, &ctx).is_err());
        }
    }
}
