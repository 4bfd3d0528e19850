use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn birth_center_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        // Staff: own center and its services
        .route("/me", get(handlers::get_own_center).put(handlers::update_own_center))
        .route("/me/status", get(handlers::get_registration_status))
        .route("/me/services", get(handlers::list_own_services).put(handlers::replace_own_services))
        .route("/me/services/{service_id}", put(handlers::update_own_service))

        // Lookup
        .route("/catalog", get(handlers::get_catalog))
        .route("/nearby", get(handlers::find_nearby))
        .route("/{birth_center_id}", get(handlers::get_birth_center))
        .route("/{birth_center_id}/services", get(handlers::list_birth_center_services))

        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
