use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::intake::domain::{
    AcademicLevel, Goal, LeadRecord, LeadSubmission, Modality, NeedTag, NewLead, RequesterRole,
    WeeklyHours,
};
use crate::intake::form::{SubmissionTransport, TransportError};
use crate::intake::response::ContactResponse;
use crate::intake::store::{InMemoryLeadRepository, LeadRepository, RepositoryError};
use crate::intake::{intake_router, LeadIntakeService};

pub(super) fn submission() -> LeadSubmission {
    LeadSubmission {
        requester_role: Some("self".to_string()),
        level: Some("terminale".to_string()),
        needs: Some(vec!["exam-prep".to_string()]),
        modality: Some("online".to_string()),
        weekly_hours: Some("2h".to_string()),
        goal: Some("short-term".to_string()),
        availability: Some("Mon 18h-20h".to_string()),
        message: None,
    }
}

pub(super) fn parent_submission() -> LeadSubmission {
    LeadSubmission {
        requester_role: Some("for-child".to_string()),
        level: Some("4e".to_string()),
        needs: Some(vec!["support".to_string(), "remediation".to_string()]),
        modality: Some("in-person".to_string()),
        weekly_hours: Some("1.5h".to_string()),
        goal: Some("long-term".to_string()),
        availability: Some("Mercredi 14h-17h, samedi matin".to_string()),
        message: Some("Difficultés en géométrie depuis la rentrée.".to_string()),
    }
}

pub(super) fn empty_needs_submission() -> LeadSubmission {
    let mut submission = submission();
    submission.needs = Some(Vec::new());
    submission
}

pub(super) fn new_lead() -> NewLead {
    NewLead {
        requester_role: RequesterRole::Student,
        level: AcademicLevel::Terminale,
        needs: BTreeSet::from([NeedTag::ExamPrep]),
        modality: Modality::Online,
        weekly_hours: WeeklyHours::Two,
        goal: Goal::ShortTerm,
        availability: "Mon 18h-20h".to_string(),
        message: None,
    }
}

pub(super) fn build_service() -> (
    LeadIntakeService<InMemoryLeadRepository>,
    Arc<InMemoryLeadRepository>,
) {
    let repository = Arc::new(InMemoryLeadRepository::default());
    let service = LeadIntakeService::new(repository.clone());
    (service, repository)
}

pub(super) fn router_with_service(
    service: LeadIntakeService<InMemoryLeadRepository>,
) -> axum::Router {
    intake_router(Arc::new(service))
}

pub(super) struct UnavailableRepository;

impl LeadRepository for UnavailableRepository {
    fn insert(&self, _lead: NewLead) -> Result<LeadRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn select_all(&self) -> Result<Vec<LeadRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Transport that counts deliveries and never reaches a server.
#[derive(Default)]
pub(super) struct OfflineTransport {
    pub(super) attempts: AtomicUsize,
}

impl SubmissionTransport for OfflineTransport {
    fn send(&self, _payload: LeadSubmission) -> Result<ContactResponse, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(TransportError("connection refused".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
