use std::sync::Arc;

use axum::{body::Bytes, extract::Extension, http::StatusCode, response::IntoResponse, Json};
use chrono::Local;

use crate::app::dto::ForecastRequest;
use crate::app::errors;
use crate::app::services::AppServices;

pub async fn forecast(Extension(services): Extension<Arc<AppServices>>, body: Bytes) -> axum::response::Response {
    let params = serde_json::from_slice::<ForecastRequest>(&body)
        .ok()
        .and_then(ForecastRequest::into_params);
    let Some(params) = params else {
        return errors::json_error(StatusCode::BAD_REQUEST, "No department provided");
    };

    let result = wardcast_ai::forecast(services.pipeline(), &params, Local::now().naive_local());
    tracing::info!(department = %result.department, today = ?result.today, "forecast built");

    (StatusCode::OK, Json(result)).into_response()
}
