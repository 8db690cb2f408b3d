//! UI-agnostic model of the contact form.
//!
//! The form validates with the same [`IntakeGuard`] as the server, produces at most one payload
//! per user action, and refuses to start a second submission while one is pending.

use std::collections::BTreeSet;

use tracing::warn;

use super::domain::{
    AcademicLevel, Goal, LeadId, LeadSubmission, Modality, NeedTag, RequesterRole, WeeklyHours,
    WireTag,
};
use super::guard::{FieldIssue, IntakeGuard, ValidationErrors};
use super::response::{ContactResponse, SUBMIT_FAILURE_MESSAGE};
use super::service::LeadIntakeService;
use super::store::LeadRepository;

/// Anything able to deliver a payload to the intake endpoint.
pub trait SubmissionTransport {
    fn send(&self, payload: LeadSubmission) -> Result<ContactResponse, TransportError>;
}

/// The payload never got an answer (network down, timeout, unreadable reply).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

impl<R> SubmissionTransport for LeadIntakeService<R>
where
    R: LeadRepository + 'static,
{
    fn send(&self, payload: LeadSubmission) -> Result<ContactResponse, TransportError> {
        Ok(ContactResponse::from_service(self.submit(payload)))
    }
}

/// Why the form refused to produce a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("a submission is already in flight")]
    InFlight,
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
}

/// What the visitor is shown once a submission settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormNotice {
    Confirmation { message: String, id: LeadId },
    ValidationFailed { message: String },
    Failure { message: String },
}

#[derive(Debug, Clone, Default)]
pub struct IntakeForm {
    requester_role: Option<RequesterRole>,
    level: Option<AcademicLevel>,
    needs: BTreeSet<NeedTag>,
    modality: Option<Modality>,
    weekly_hours: Option<WeeklyHours>,
    goal: Option<Goal>,
    availability: String,
    message: String,
    errors: Vec<FieldIssue>,
    in_flight: bool,
    guard: IntakeGuard,
}

impl IntakeForm {
    pub fn with_guard(guard: IntakeGuard) -> Self {
        Self {
            guard,
            ..Self::default()
        }
    }

    pub fn set_requester_role(&mut self, role: RequesterRole) {
        self.requester_role = Some(role);
    }

    pub fn set_level(&mut self, level: AcademicLevel) {
        self.level = Some(level);
    }

    /// Multi-select: selecting a checked need unchecks it.
    pub fn toggle_need(&mut self, need: NeedTag) {
        if !self.needs.remove(&need) {
            self.needs.insert(need);
        }
    }

    pub fn set_modality(&mut self, modality: Modality) {
        self.modality = Some(modality);
    }

    pub fn set_weekly_hours(&mut self, weekly_hours: WeeklyHours) {
        self.weekly_hours = Some(weekly_hours);
    }

    pub fn set_goal(&mut self, goal: Goal) {
        self.goal = Some(goal);
    }

    pub fn set_availability(&mut self, availability: impl Into<String>) {
        self.availability = availability.into();
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn needs(&self) -> &BTreeSet<NeedTag> {
        &self.needs
    }

    pub fn availability(&self) -> &str {
        &self.availability
    }

    pub fn errors(&self) -> &[FieldIssue] {
        &self.errors
    }

    /// Issues currently attached to one field, for rendering under its control.
    pub fn errors_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldIssue> + 'a {
        self.errors.iter().filter(move |issue| issue.field == field)
    }

    /// Whether the submit control should be disabled.
    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    pub fn is_blank(&self) -> bool {
        self.payload() == Self::default().payload()
    }

    /// Current field values in wire form.
    pub fn payload(&self) -> LeadSubmission {
        LeadSubmission {
            requester_role: self.requester_role.map(|value| value.tag().to_string()),
            level: self.level.map(|value| value.tag().to_string()),
            needs: Some(self.needs.iter().map(|need| need.tag().to_string()).collect()),
            modality: self.modality.map(|value| value.tag().to_string()),
            weekly_hours: self.weekly_hours.map(|value| value.tag().to_string()),
            goal: self.goal.map(|value| value.tag().to_string()),
            availability: Some(self.availability.clone()).filter(|text| !text.is_empty()),
            message: Some(self.message.clone()).filter(|text| !text.is_empty()),
        }
    }

    /// Run the intake schema locally and keep the resulting field errors.
    pub fn validate(&mut self) -> Result<(), ValidationErrors> {
        match self.guard.lead_from_submission(&self.payload()) {
            Ok(_) => {
                self.errors.clear();
                Ok(())
            }
            Err(errors) => {
                self.errors = errors.issues().to_vec();
                Err(errors)
            }
        }
    }

    /// Produce the single payload for this submit action and lock the form.
    pub fn begin_submit(&mut self) -> Result<LeadSubmission, FormError> {
        if self.in_flight {
            return Err(FormError::InFlight);
        }
        self.validate()?;
        self.in_flight = true;
        Ok(self.payload())
    }

    /// Settle the pending submission with the server's answer.
    pub fn finish(&mut self, response: ContactResponse) -> FormNotice {
        self.in_flight = false;
        match response {
            ContactResponse::Accepted { message, id } => {
                self.reset();
                FormNotice::Confirmation { message, id }
            }
            ContactResponse::Rejected { message, errors } => {
                self.errors = errors;
                FormNotice::ValidationFailed { message }
            }
            ContactResponse::Failed { message } => FormNotice::Failure { message },
        }
    }

    /// Validate, send through `transport`, and settle in one step.
    pub fn submit_with<T>(&mut self, transport: &T) -> Result<FormNotice, FormError>
    where
        T: SubmissionTransport + ?Sized,
    {
        let payload = self.begin_submit()?;
        let response = transport.send(payload).unwrap_or_else(|err| {
            warn!(error = %err, "contact submission did not reach the server");
            ContactResponse::Failed {
                message: SUBMIT_FAILURE_MESSAGE.to_string(),
            }
        });
        Ok(self.finish(response))
    }

    /// Clear every field back to its empty default.
    pub fn reset(&mut self) {
        let guard = std::mem::take(&mut self.guard);
        *self = Self::with_guard(guard);
    }
}
