use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, warn};

use super::domain::{LeadRecord, LeadSubmission, NewLead, WireTag};
use super::guard::{IntakeGuard, ValidationErrors};
use super::store::{LeadRepository, RepositoryError};

/// Service composing the intake guard with the lead store.
pub struct LeadIntakeService<R> {
    guard: Arc<IntakeGuard>,
    repository: Arc<R>,
}

impl<R> LeadIntakeService<R>
where
    R: LeadRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_guard(IntakeGuard::default(), repository)
    }

    pub fn with_guard(guard: IntakeGuard, repository: Arc<R>) -> Self {
        Self {
            guard: Arc::new(guard),
            repository,
        }
    }

    pub fn guard(&self) -> &IntakeGuard {
        &self.guard
    }

    /// Validate a submission and append it to the store.
    ///
    /// Nothing is written unless every field passes; the store either appends the whole record
    /// or nothing.
    pub fn submit(&self, submission: LeadSubmission) -> Result<LeadRecord, IntakeServiceError> {
        self.persist(self.guard.lead_from_submission(&submission))
    }

    /// Same as [`submit`](Self::submit) for a body whose field types are not yet known.
    pub fn submit_json(&self, body: &Value) -> Result<LeadRecord, IntakeServiceError> {
        self.persist(self.guard.lead_from_json(body))
    }

    fn persist(
        &self,
        validated: Result<NewLead, ValidationErrors>,
    ) -> Result<LeadRecord, IntakeServiceError> {
        let lead = validated.inspect_err(|errors| {
            warn!(issues = errors.issues().len(), "lead submission rejected");
        })?;

        let record = self.repository.insert(lead).inspect_err(|err| {
            error!(error = %err, "failed to persist lead");
        })?;

        info!(
            lead_id = %record.id(),
            level = record.lead().level.tag(),
            needs = record.lead().needs.len(),
            "lead persisted"
        );
        Ok(record)
    }

    /// Every persisted lead, in insertion order.
    pub fn list_all(&self) -> Result<Vec<LeadRecord>, IntakeServiceError> {
        let records = self.repository.select_all().inspect_err(|err| {
            error!(error = %err, "failed to list leads");
        })?;
        Ok(records)
    }
}

/// Error raised by the intake service.
#[derive(Debug, thiserror::Error)]
pub enum IntakeServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
