//! Lead-request intake: schema, store, service, HTTP surface, and the contact form model.

pub mod domain;
pub mod form;
pub mod guard;
pub mod response;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    AcademicLevel, Goal, LeadId, LeadRecord, LeadSubmission, Modality, NeedTag, NewLead,
    RequesterRole, WeeklyHours, WireTag,
};
pub use form::{FormError, FormNotice, IntakeForm, SubmissionTransport, TransportError};
pub use guard::{FieldIssue, IntakeGuard, IntakePolicy, IssueCode, ValidationErrors};
pub use response::{ContactResponse, FailureBody, SubmitAck};
pub use router::intake_router;
pub use service::{IntakeServiceError, LeadIntakeService};
pub use store::{InMemoryLeadRepository, JsonlLeadRepository, LeadRepository, RepositoryError};
