use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::domain::{LeadId, LeadRecord};
use super::guard::FieldIssue;
use super::service::IntakeServiceError;

pub const SUBMIT_SUCCESS_MESSAGE: &str =
    "Votre demande a été envoyée avec succès ! Je vous répondrai dans les plus brefs délais.";
pub const VALIDATION_FAILURE_MESSAGE: &str =
    "Veuillez remplir tous les champs obligatoires correctement.";
pub const SUBMIT_FAILURE_MESSAGE: &str =
    "Une erreur est survenue lors de l'envoi de votre demande.";
pub const LIST_FAILURE_MESSAGE: &str = "Erreur lors de la récupération des demandes.";

/// Body of a successful `POST /api/contact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitAck {
    pub success: bool,
    pub message: String,
    pub id: LeadId,
}

/// Body of every failed intake call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureBody {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldIssue>>,
}

impl FailureBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: None,
        }
    }
}

/// The three terminal outcomes of a contact submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactResponse {
    Accepted { message: String, id: LeadId },
    Rejected { message: String, errors: Vec<FieldIssue> },
    Failed { message: String },
}

impl ContactResponse {
    pub fn from_service(result: Result<LeadRecord, IntakeServiceError>) -> Self {
        match result {
            Ok(record) => Self::Accepted {
                message: SUBMIT_SUCCESS_MESSAGE.to_string(),
                id: record.id(),
            },
            Err(IntakeServiceError::Validation(errors)) => Self::rejected(errors.into_issues()),
            Err(IntakeServiceError::Repository(_)) => Self::Failed {
                message: SUBMIT_FAILURE_MESSAGE.to_string(),
            },
        }
    }

    pub fn rejected(errors: Vec<FieldIssue>) -> Self {
        Self::Rejected {
            message: VALIDATION_FAILURE_MESSAGE.to_string(),
            errors,
        }
    }

    /// Decode a raw HTTP answer from the intake endpoint.
    ///
    /// Anything that is neither a readable acknowledgment nor a 400 counts as a failure.
    pub fn from_http(status: StatusCode, body: &[u8]) -> Self {
        if status == StatusCode::OK {
            if let Ok(ack) = serde_json::from_slice::<SubmitAck>(body) {
                if ack.success {
                    return Self::Accepted {
                        message: ack.message,
                        id: ack.id,
                    };
                }
            }
        }

        let failure = serde_json::from_slice::<FailureBody>(body).ok();
        if status == StatusCode::BAD_REQUEST {
            return match failure {
                Some(body) => Self::Rejected {
                    message: body.message,
                    errors: body.errors.unwrap_or_default(),
                },
                None => Self::rejected(Vec::new()),
            };
        }

        Self::Failed {
            message: failure
                .map(|body| body.message)
                .unwrap_or_else(|| SUBMIT_FAILURE_MESSAGE.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Accepted { .. } => StatusCode::OK,
            Self::Rejected { .. } => StatusCode::BAD_REQUEST,
            Self::Failed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ContactResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Accepted { message, id } => (
                status,
                Json(SubmitAck {
                    success: true,
                    message,
                    id,
                }),
            )
                .into_response(),
            Self::Rejected { message, errors } => (
                status,
                Json(FailureBody {
                    success: false,
                    message,
                    errors: Some(errors),
                }),
            )
                .into_response(),
            Self::Failed { message } => (status, Json(FailureBody::new(message))).into_response(),
        }
    }
}
