use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tracing::{error, warn};

use super::guard::{FieldIssue, IssueCode};
use super::response::{
    ContactResponse, FailureBody, LIST_FAILURE_MESSAGE, SUBMIT_FAILURE_MESSAGE,
};
use super::service::LeadIntakeService;
use super::store::LeadRepository;

/// Router exposing the contact intake endpoints.
pub fn intake_router<R>(service: Arc<LeadIntakeService<R>>) -> Router
where
    R: LeadRepository + 'static,
{
    Router::new()
        .route("/api/contact", post(submit_handler::<R>))
        .route("/api/contact-requests", get(list_handler::<R>))
        .with_state(service)
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<LeadIntakeService<R>>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response
where
    R: LeadRepository + 'static,
{
    let response = match payload {
        Ok(Json(body)) => {
            match tokio::task::spawn_blocking(move || service.submit_json(&body)).await {
                Ok(outcome) => ContactResponse::from_service(outcome),
                Err(err) => {
                    error!(error = %err, "contact submission task failed");
                    ContactResponse::Failed {
                        message: SUBMIT_FAILURE_MESSAGE.to_string(),
                    }
                }
            }
        }
        Err(rejection) => {
            warn!(%rejection, "unreadable contact payload");
            ContactResponse::rejected(vec![FieldIssue::new(
                "body",
                IssueCode::InvalidBody,
                rejection.body_text(),
            )])
        }
    };

    response.into_response()
}

pub(crate) async fn list_handler<R>(State(service): State<Arc<LeadIntakeService<R>>>) -> Response
where
    R: LeadRepository + 'static,
{
    let listed = tokio::task::spawn_blocking(move || service.list_all())
        .await
        .inspect_err(|err| error!(error = %err, "lead listing task failed"));

    match listed {
        Ok(Ok(records)) => (StatusCode::OK, Json(records)).into_response(),
        Ok(Err(_)) | Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(FailureBody::new(LIST_FAILURE_MESSAGE)),
        )
            .into_response(),
    }
}
