use std::sync::Arc;

use axum::{body::Bytes, extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde_json::{Map, Value as JsonValue};

use crate::app::errors;
use crate::app::services::AppServices;

/// Errors answer `200 {"error": ..}`, which existing clients depend on.
///
/// The body is parsed by hand so malformed JSON takes the same path as a
/// prediction failure instead of an extractor rejection.
pub async fn predict(Extension(services): Extension<Arc<AppServices>>, body: Bytes) -> axum::response::Response {
    let raw = match parse_object(&body) {
        Ok(raw) => raw,
        Err(msg) => {
            tracing::info!(error = %msg, "predict request rejected");
            return errors::json_error(StatusCode::OK, msg);
        }
    };

    match services.pipeline().predict(&raw) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            tracing::info!(error = %e, "prediction failed");
            errors::json_error(StatusCode::OK, e.to_string())
        }
    }
}

fn parse_object(body: &[u8]) -> Result<Map<String, JsonValue>, String> {
    match serde_json::from_slice::<JsonValue>(body) {
        Ok(JsonValue::Object(map)) => Ok(map),
        Ok(_) => Err("request body must be a JSON object".to_string()),
        Err(e) => Err(format!("invalid JSON body: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_objects_are_accepted() {
        assert_eq!(parse_object(br#"{"age": 45}"#).unwrap().len(), 1);
        assert!(parse_object(b"[1, 2]").is_err());
        assert!(parse_object(b"").unwrap_err().starts_with("invalid JSON body"));
    }
}
