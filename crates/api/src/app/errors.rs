use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use wardcast_ai::TriageError;

use crate::app::services::ServiceError;

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, axum::Json(json!({ "error": message.into() }))).into_response()
}

pub fn triage_error_to_response(err: TriageError) -> axum::response::Response {
    match err {
        TriageError::EmptyInput => json_error(StatusCode::BAD_REQUEST, err.to_string()),
    }
}

/// Store failures are logged in full; the client only sees a generic message.
pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    tracing::error!(error = %err, "case store request failed");
    match err {
        ServiceError::Store(_) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "case store unavailable"),
        ServiceError::Join(_) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error"),
    }
}
