use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{info, warn};

use nexusnet_common::{CaseStudySubmission, ProjectSubmission, SubmissionError};

use crate::AppState;

/// Map the submission error taxonomy onto HTTP statuses.
pub fn status_for(err: &SubmissionError) -> StatusCode {
    match err {
        SubmissionError::DuplicateEntity { .. } => StatusCode::CONFLICT,
        SubmissionError::ReferenceNotFound { .. } => StatusCode::NOT_FOUND,
        SubmissionError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        SubmissionError::IncompleteSubmission { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        SubmissionError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn error_response(err: SubmissionError) -> axum::response::Response {
    let status = status_for(&err);
    let kind = match &err {
        SubmissionError::DuplicateEntity { .. } => "duplicate_entity",
        SubmissionError::ReferenceNotFound { .. } => "reference_not_found",
        SubmissionError::StoreUnavailable(_) => "store_unavailable",
        SubmissionError::IncompleteSubmission { .. } => "incomplete_submission",
        SubmissionError::Validation(_) => "validation",
    };
    warn!(%err, kind, "Submission rejected");
    (
        status,
        Json(serde_json::json!({ "error": kind, "message": err.to_string() })),
    )
        .into_response()
}

pub async fn api_submit_project(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ProjectSubmission>,
) -> impl IntoResponse {
    match state.intake.submit_project(body).await {
        Ok(handle) => {
            info!(project = %handle.name, "Project registered");
            (StatusCode::CREATED, Json(serde_json::json!(handle))).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub async fn api_submit_case_study(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CaseStudySubmission>,
) -> impl IntoResponse {
    match state.intake.submit_case_study(body).await {
        Ok(handle) => {
            info!(case_study = %handle.name, "Case study registered");
            (StatusCode::CREATED, Json(serde_json::json!(handle))).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub async fn api_list_projects(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.intake.list_project_names().await {
        Ok(names) => (StatusCode::OK, Json(serde_json::json!({ "projects": names }))).into_response(),
        Err(err) => error_response(err),
    }
}

/// Destructive: detach-deletes every node. Explicit admin action only.
pub async fn api_admin_reset(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.client.delete_all().await {
        Ok(()) => {
            warn!("All survey data deleted by admin reset");
            (StatusCode::OK, Json(serde_json::json!({ "deleted": true }))).into_response()
        }
        Err(err) => error_response(err),
    }
}
