use std::sync::Arc;

use axum::{body::Bytes, extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::dto::{TriageRequest, TriageResponse};
use crate::app::errors;
use crate::app::services::AppServices;

/// Consult the model and persist the case, whether or not the remote call
/// succeeded. Only empty input and store failures are errors.
pub async fn triage(Extension(services): Extension<Arc<AppServices>>, body: Bytes) -> axum::response::Response {
    // A missing or malformed body is treated as an empty description.
    let request: TriageRequest = serde_json::from_slice(&body).unwrap_or_default();

    let case = match services.triage().triage(request.patient_text()).await {
        Ok(case) => case,
        Err(e) => return errors::triage_error_to_response(e),
    };

    if let Err(e) = services.append_case(case.clone()).await {
        return errors::service_error_to_response(e);
    }

    (StatusCode::OK, Json(TriageResponse::from(case))).into_response()
}
