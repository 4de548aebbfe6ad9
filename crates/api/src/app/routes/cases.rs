use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::errors;
use crate::app::services::AppServices;

pub async fn list_cases(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.read_cases().await {
        Ok(cases) => (StatusCode::OK, Json(cases)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
