use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        // Staff: listing, calendar and day availability
        .route("/", get(handlers::list_appointments).post(handlers::book_appointment))
        .route("/calendar", get(handlers::get_calendar))
        .route("/timeslots/{date}", get(handlers::open_day).put(handlers::save_day))
        .route("/timeslots/{date}/all", put(handlers::set_day))
        .route("/timeslots/{date}/saved", get(handlers::get_saved_day))
        .route("/timeslots/{date}/slots/{index}/toggle", post(handlers::toggle_slot))
        .route("/{appointment_id}/status", patch(handlers::update_appointment_status))
        .route("/patients/{patient_id}/history", get(handlers::get_patient_history))

        // Patients
        .route("/mine", get(handlers::my_appointments))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route("/birth-centers/{birth_center_id}/open-slots", get(handlers::open_slots))

        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
