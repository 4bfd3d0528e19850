use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use birth_center_cell::router::birth_center_routes;
use patient_cell::router::patient_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Birth center API is running!" }))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/birth-centers", birth_center_routes(state.clone()))
        .nest("/patients", patient_routes(state))
}
