use axum::{
    routing::{get, post},
    Router,
};

pub mod cases;
pub mod forecast;
pub mod predict;
pub mod system;
pub mod triage;

pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/predict", post(predict::predict))
        .route("/triage", post(triage::triage))
        .route("/cases", get(cases::list_cases))
        .route("/forecast", post(forecast::forecast))
}
