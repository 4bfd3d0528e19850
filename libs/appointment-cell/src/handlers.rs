use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc};
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use birth_center_cell::models::BirthCenterError;
use birth_center_cell::services::BirthCenterService;
use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::pagination::{paginate, PageRequest};

use crate::models::{
    AppointmentError, BookAppointmentRequest, SaveAvailabilityRequest, SetDayRequest,
    TimeslotConfig, UpdateStatusRequest,
};
use crate::services::{AppointmentService, AvailabilityService, CalendarMonth};

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub start_hour: Option<u32>,
    pub end_hour: Option<u32>,
    pub interval_minutes: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct OpenSlotsQuery {
    pub date: NaiveDate,
}

// ==============================================================================
// CALLER RESOLUTION
// ==============================================================================

/// Id of the birth center run by the calling staff account.
async fn own_birth_center_id(state: &AppConfig, user: &User, token: &str) -> Result<Uuid, AppError> {
    if !user.is_birth_center() {
        return Err(AppointmentError::Unauthorized("Birth center account required".to_string()).into());
    }

    match BirthCenterService::new(state).get_by_user(&user.id, token).await {
        Ok(center) => Ok(center.id),
        Err(BirthCenterError::NotFound) => Err(AppointmentError::BirthCenterNotFound.into()),
        Err(e) => Err(e.into()),
    }
}

/// Patient rows share the id of the account that owns them.
fn own_patient_id(user: &User) -> Result<Uuid, AppError> {
    if !user.is_patient() {
        return Err(AppointmentError::Unauthorized("Patient account required".to_string()).into());
    }

    Uuid::parse_str(&user.id).map_err(|_| AppError::Auth("Invalid user id in token".to_string()))
}

fn slot_config(
    state: &AppConfig,
    start_hour: Option<u32>,
    end_hour: Option<u32>,
    interval_minutes: Option<u32>,
) -> Result<TimeslotConfig, AppError> {
    Ok(TimeslotConfig::with_overrides(state.slot_defaults, start_hour, end_hour, interval_minutes)?)
}

// ==============================================================================
// STAFF HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
    Query(page): Query<PageRequest>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let birth_center_id = own_birth_center_id(&state, &user, auth.token()).await?;

    let appointments = AppointmentService::new(&state)
        .list_for_birth_center(birth_center_id, auth.token())
        .await?;

    Ok(Json(json!(paginate(appointments, page))))
}

#[axum::debug_handler]
pub async fn get_calendar(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<CalendarQuery>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let birth_center_id = own_birth_center_id(&state, &user, auth.token()).await?;

    let today = Utc::now().date_naive();
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());

    // Build once empty to learn the grid span, then fetch just that range.
    let (first, last) = CalendarMonth::build(year, month, &[], today)?.span();
    let from = first.and_time(NaiveTime::MIN).and_utc() - Duration::seconds(1);
    let to = (last + Duration::days(1)).and_time(NaiveTime::MIN).and_utc();

    let appointments = AppointmentService::new(&state)
        .list_between(birth_center_id, from, to, auth.token())
        .await?;
    let calendar = CalendarMonth::build(year, month, &appointments, today)?;

    let (next_year, next_month) = calendar.next();
    let (prev_year, prev_month) = calendar.previous();

    Ok(Json(json!({
        "calendar": calendar,
        "next": { "year": next_year, "month": next_month },
        "previous": { "year": prev_year, "month": prev_month }
    })))
}

#[axum::debug_handler]
pub async fn open_day(
    State(state): State<Arc<AppConfig>>,
    Path(date): Path<NaiveDate>,
    Query(query): Query<DayQuery>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let birth_center_id = own_birth_center_id(&state, &user, auth.token()).await?;
    let config = slot_config(&state, query.start_hour, query.end_hour, query.interval_minutes)?;

    let view = AvailabilityService::new(&state)
        .open_day(birth_center_id, date, config, auth.token())
        .await?;

    Ok(Json(json!(view)))
}

#[axum::debug_handler]
pub async fn save_day(
    State(state): State<Arc<AppConfig>>,
    Path(date): Path<NaiveDate>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<SaveAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let birth_center_id = own_birth_center_id(&state, &user, auth.token()).await?;
    let config = slot_config(&state, request.start_hour, request.end_hour, request.interval_minutes)?;

    let saved = AvailabilityService::new(&state)
        .save_day(birth_center_id, date, config, &request.available_starts, auth.token())
        .await?;

    Ok(Json(json!(saved)))
}

#[axum::debug_handler]
pub async fn set_day(
    State(state): State<Arc<AppConfig>>,
    Path(date): Path<NaiveDate>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<SetDayRequest>,
) -> Result<Json<Value>, AppError> {
    let birth_center_id = own_birth_center_id(&state, &user, auth.token()).await?;
    let config = slot_config(&state, request.start_hour, request.end_hour, request.interval_minutes)?;

    let saved = AvailabilityService::new(&state)
        .set_day(birth_center_id, date, config, request.available, auth.token())
        .await?;

    Ok(Json(json!(saved)))
}

#[axum::debug_handler]
pub async fn toggle_slot(
    State(state): State<Arc<AppConfig>>,
    Path((date, index)): Path<(NaiveDate, usize)>,
    Query(query): Query<DayQuery>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let birth_center_id = own_birth_center_id(&state, &user, auth.token()).await?;
    let config = slot_config(&state, query.start_hour, query.end_hour, query.interval_minutes)?;

    let saved = AvailabilityService::new(&state)
        .toggle_day_slot(birth_center_id, date, config, index, auth.token())
        .await?;

    Ok(Json(json!(saved)))
}

#[axum::debug_handler]
pub async fn get_saved_day(
    State(state): State<Arc<AppConfig>>,
    Path(date): Path<NaiveDate>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let birth_center_id = own_birth_center_id(&state, &user, auth.token()).await?;

    let saved = AvailabilityService::new(&state)
        .saved_day(birth_center_id, date, auth.token())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No availability saved for {}", date)))?;

    Ok(Json(json!(saved)))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let status = request.status.trim();
    if status.is_empty() {
        return Err(AppError::ValidationError("Status is required".to_string()));
    }

    let birth_center_id = own_birth_center_id(&state, &user, auth.token()).await?;
    debug!("Staff {} setting appointment {} to {}", user.id, appointment_id, status);

    let outcome = AppointmentService::new(&state)
        .update_status(appointment_id, status, Some(birth_center_id), auth.token())
        .await?;

    Ok(Json(json!(outcome)))
}

#[axum::debug_handler]
pub async fn get_patient_history(
    State(state): State<Arc<AppConfig>>,
    Path(patient_id): Path<Uuid>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let birth_center_id = own_birth_center_id(&state, &user, auth.token()).await?;

    let history = AppointmentService::new(&state)
        .patient_history(patient_id, birth_center_id, auth.token())
        .await?;

    Ok(Json(json!({
        "patient_id": patient_id,
        "appointments": history,
        "total": history.len()
    })))
}

// ==============================================================================
// PATIENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn my_appointments(
    State(state): State<Arc<AppConfig>>,
    Query(page): Query<PageRequest>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let patient_id = own_patient_id(&user)?;

    let appointments = AppointmentService::new(&state)
        .list_for_patient(patient_id, auth.token())
        .await?;

    Ok(Json(json!(paginate(appointments, page))))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let patient_id = own_patient_id(&user)?;

    if request.appointment_date <= Utc::now() {
        return Err(AppError::ValidationError("Appointment must be in the future".to_string()));
    }

    let appointment = AppointmentService::new(&state)
        .book(patient_id, request, auth.token())
        .await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let patient_id = own_patient_id(&user)?;

    let appointment = AppointmentService::new(&state)
        .cancel_for_patient(appointment_id, patient_id, auth.token())
        .await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn open_slots(
    State(state): State<Arc<AppConfig>>,
    Path(birth_center_id): Path<Uuid>,
    Query(query): Query<OpenSlotsQuery>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let slots = AvailabilityService::new(&state)
        .open_slots_for_patient(birth_center_id, query.date, auth.token())
        .await?;

    Ok(Json(json!({
        "birth_center_id": birth_center_id,
        "date": query.date,
        "slots": slots
    })))
}
