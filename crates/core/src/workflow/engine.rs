use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::domain::actor::Actor;
use crate::domain::hur::{HurRequest, HurStatus, MoreInfoRequest};
use crate::workflow::states::{
    next_status, HurAction, HurActionKind, TransitionOutcome, REJECTION_COMMENT,
};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HurTransitionError {
    #[error("cannot {action} a request in status `{status}`")]
    InvalidTransition { status: HurStatus, action: HurActionKind },
}

/// Moves HUR requests through their approval pipeline. Every operation
/// returns an updated copy and leaves the input untouched; preconditions are
/// checked here rather than trusted to the caller.
#[derive(Clone, Debug, Default)]
pub struct HurWorkflow;

impl HurWorkflow {
    pub fn new() -> Self {
        Self
    }

    pub fn initial_status(&self) -> HurStatus {
        HurStatus::Review
    }

    pub fn next_status(&self, current: HurStatus) -> Option<HurStatus> {
        next_status(current)
    }

    pub fn advance(
        &self,
        request: &HurRequest,
        actor: &Actor,
        at: DateTime<Utc>,
    ) -> Result<HurRequest, HurTransitionError> {
        let next = next_status(request.status).ok_or(HurTransitionError::InvalidTransition {
            status: request.status,
            action: HurActionKind::Advance,
        })?;

        let mut updated = request.clone();
        updated.status = next;
        updated.approver = Some(actor.name.clone());
        updated.approved_at = Some(at);
        Ok(updated)
    }

    pub fn reject(
        &self,
        request: &HurRequest,
        actor: &Actor,
        at: DateTime<Utc>,
    ) -> Result<HurRequest, HurTransitionError> {
        if request.status != HurStatus::Review {
            return Err(HurTransitionError::InvalidTransition {
                status: request.status,
                action: HurActionKind::Reject,
            });
        }

        let mut updated = request.clone();
        updated.status = HurStatus::NotApproved;
        updated.approver = Some(actor.name.clone());
        updated.approved_at = Some(at);
        updated.comments = Some(REJECTION_COMMENT.to_owned());
        Ok(updated)
    }

    /// Annotates the request without moving it.
    pub fn request_more_info(
        &self,
        request: &HurRequest,
        actor: &Actor,
        comments: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<HurRequest, HurTransitionError> {
        if request.status.is_terminal() {
            return Err(HurTransitionError::InvalidTransition {
                status: request.status,
                action: HurActionKind::RequestMoreInfo,
            });
        }

        let mut updated = request.clone();
        updated.comments = Some(comments.into());
        updated.more_info = Some(MoreInfoRequest { requested_by: actor.clone(), requested_at: at });
        Ok(updated)
    }

    pub fn apply(
        &self,
        request: &HurRequest,
        action: &HurAction,
        actor: &Actor,
        at: DateTime<Utc>,
    ) -> Result<TransitionOutcome, HurTransitionError> {
        let updated = match action {
            HurAction::Advance => self.advance(request, actor, at)?,
            HurAction::Reject => self.reject(request, actor, at)?,
            HurAction::RequestMoreInfo { comments } => {
                self.request_more_info(request, actor, comments.clone(), at)?
            }
        };

        Ok(TransitionOutcome {
            from: request.status,
            to: updated.status,
            action: action.kind(),
            request: updated,
        })
    }

    pub fn apply_with_audit<S>(
        &self,
        request: &HurRequest,
        action: &HurAction,
        actor: &Actor,
        at: DateTime<Utc>,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<TransitionOutcome, HurTransitionError>
    where
        S: AuditSink,
    {
        let result = self.apply(request, action, actor, at);
        match &result {
            Ok(outcome) => {
                sink.emit(
                    AuditEvent::new(
                        Some(request.id.clone()),
                        audit.correlation_id.clone(),
                        "hur.transition_applied",
                        AuditCategory::Workflow,
                        audit.actor.clone(),
                        AuditOutcome::Success,
                    )
                    .with_metadata("from", outcome.from.label())
                    .with_metadata("to", outcome.to.label())
                    .with_metadata("action", outcome.action.to_string()),
                );
            }
            Err(error) => {
                sink.emit(
                    AuditEvent::new(
                        Some(request.id.clone()),
                        audit.correlation_id.clone(),
                        "hur.transition_rejected",
                        AuditCategory::Workflow,
                        audit.actor.clone(),
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("action", action.kind().to_string())
                    .with_metadata("error", error.to_string()),
                );
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::audit::{AuditContext, AuditOutcome, InMemoryAuditSink};
    use crate::domain::actor::Actor;
    use crate::domain::campaign::CampaignId;
    use crate::domain::hur::{AmountChange, CampaignRef, HurId, HurRequest, HurStatus};
    use crate::workflow::engine::{HurTransitionError, HurWorkflow};
    use crate::workflow::states::{
        next_status, HurAction, HurActionKind, FORWARD_SEQUENCE, REJECTION_COMMENT,
    };

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 2, 14, 30, 0).single().expect("valid timestamp")
    }

    fn approver() -> Actor {
        Actor::new("Dana Ortiz", "Finance Manager", "dana.ortiz@adops.example")
    }

    fn request(status: HurStatus) -> HurRequest {
        HurRequest {
            id: HurId("HUR-2025-001".to_owned()),
            status,
            campaign: CampaignRef {
                id: CampaignId("CMP-1001".to_owned()),
                name: "Fandom - Mercado Libre".to_owned(),
            },
            requester: "Luis Romero".to_owned(),
            requested_at: Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).single().expect("timestamp"),
            approver: None,
            approved_at: None,
            justification: "Publisher under-delivered on the April flight".to_owned(),
            category: "Amount Adjustment".to_owned(),
            line_numbers: BTreeSet::from(["L-1".to_owned(), "L-2".to_owned()]),
            publisher_io_numbers: BTreeSet::from(["IO-88231".to_owned()]),
            amount_change: Some(AmountChange {
                current: Decimal::new(37_500, 0),
                new: Decimal::new(32_000, 0),
            }),
            comments: None,
            more_info: None,
        }
    }

    #[test]
    fn advancing_from_review_visits_the_forward_sequence_once() {
        let workflow = HurWorkflow::new();
        let mut current = request(workflow.initial_status());
        let mut visited = vec![current.status];

        while workflow.next_status(current.status).is_some() {
            current = workflow.advance(&current, &approver(), at()).expect("advance");
            visited.push(current.status);
        }

        assert_eq!(visited, FORWARD_SEQUENCE.to_vec());
        assert_eq!(current.status, HurStatus::Completed);
        let unique: BTreeSet<_> = visited.iter().map(|status| status.label()).collect();
        assert_eq!(unique.len(), visited.len());
    }

    #[test]
    fn advance_stamps_approver_and_date() {
        let original = request(HurStatus::Review);
        let advanced = HurWorkflow::new().advance(&original, &approver(), at()).expect("advance");

        assert_eq!(advanced.status, HurStatus::Approved);
        assert_eq!(advanced.approver.as_deref(), Some("Dana Ortiz"));
        assert_eq!(advanced.approved_at, Some(at()));
        assert_eq!(original.status, HurStatus::Review);
        assert_eq!(original.approver, None);
    }

    #[test]
    fn more_info_requests_resume_at_approved() {
        assert_eq!(next_status(HurStatus::MoreInfo), Some(HurStatus::Approved));
        let resumed = HurWorkflow::new()
            .advance(&request(HurStatus::MoreInfo), &approver(), at())
            .expect("more info -> approved");
        assert_eq!(resumed.status, HurStatus::Approved);
    }

    #[test]
    fn terminal_requests_cannot_advance() {
        for status in [HurStatus::Completed, HurStatus::NotApproved] {
            assert_eq!(next_status(status), None);
            let terminal = request(status);
            let error = HurWorkflow::new()
                .advance(&terminal, &approver(), at())
                .expect_err("terminal request must not advance");
            assert_eq!(
                error,
                HurTransitionError::InvalidTransition { status, action: HurActionKind::Advance }
            );
        }
    }

    #[test]
    fn reject_only_applies_during_review() {
        let workflow = HurWorkflow::new();
        let rejected =
            workflow.reject(&request(HurStatus::Review), &approver(), at()).expect("reject");
        assert_eq!(rejected.status, HurStatus::NotApproved);
        assert_eq!(rejected.comments.as_deref(), Some(REJECTION_COMMENT));
        assert_eq!(rejected.approver.as_deref(), Some("Dana Ortiz"));

        for status in HurStatus::ALL.into_iter().filter(|status| *status != HurStatus::Review) {
            let error = workflow
                .reject(&request(status), &approver(), at())
                .expect_err("reject outside review must fail");
            assert!(matches!(
                error,
                HurTransitionError::InvalidTransition { action: HurActionKind::Reject, .. }
            ));
        }
    }

    #[test]
    fn more_info_is_a_side_channel_annotation() {
        let workflow = HurWorkflow::new();
        for status in [HurStatus::Review, HurStatus::Editing, HurStatus::CloseCampaign] {
            let annotated = workflow
                .request_more_info(&request(status), &approver(), "need docs", at())
                .expect("more info");

            assert_eq!(annotated.status, status);
            assert_eq!(annotated.comments.as_deref(), Some("need docs"));
            let more_info = annotated.more_info.expect("more info metadata");
            assert_eq!(more_info.requested_by.email, "dana.ortiz@adops.example");
            assert_eq!(more_info.requested_by.role, "Finance Manager");
            assert_eq!(more_info.requested_at, at());
        }
    }

    #[test]
    fn more_info_on_terminal_request_is_rejected() {
        let error = HurWorkflow::new()
            .request_more_info(&request(HurStatus::Completed), &approver(), "late question", at())
            .expect_err("terminal requests are immutable");
        assert!(matches!(error, HurTransitionError::InvalidTransition { .. }));
    }

    #[test]
    fn apply_reports_from_and_to() {
        let outcome = HurWorkflow::new()
            .apply(&request(HurStatus::Editing), &HurAction::Advance, &approver(), at())
            .expect("apply advance");

        assert_eq!(outcome.from, HurStatus::Editing);
        assert_eq!(outcome.to, HurStatus::CloseCampaign);
        assert_eq!(outcome.action, HurActionKind::Advance);
        assert_eq!(outcome.request.status, HurStatus::CloseCampaign);
    }

    #[test]
    fn apply_with_audit_records_applied_and_rejected_transitions() {
        let workflow = HurWorkflow::new();
        let sink = InMemoryAuditSink::default();
        let audit = AuditContext::new(Some(HurId("HUR-2025-001".to_owned())), "req-42", "cli");

        workflow
            .apply_with_audit(
                &request(HurStatus::Review),
                &HurAction::Reject,
                &approver(),
                at(),
                &sink,
                &audit,
            )
            .expect("reject from review");
        let _ = workflow.apply_with_audit(
            &request(HurStatus::NotApproved),
            &HurAction::Advance,
            &approver(),
            at(),
            &sink,
            &audit,
        );

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "hur.transition_applied");
        assert_eq!(events[0].metadata.get("to").map(String::as_str), Some("Not Approved"));
        assert_eq!(events[1].event_type, "hur.transition_rejected");
        assert_eq!(events[1].outcome, AuditOutcome::Rejected);
        assert_eq!(events[1].correlation_id, "req-42");
    }
}
