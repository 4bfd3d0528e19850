use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn patient_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/me", get(handlers::get_own_profile).put(handlers::update_own_profile))
        .route("/me/preferred-centers", get(handlers::list_preferred_centers).post(handlers::add_preferred_center))
        .route("/", get(handlers::list_center_patients))
        .route("/{patient_id}", get(handlers::get_patient))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
