use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use birth_center_cell::handlers::resolve_own_center;
use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::pagination::{paginate, PageRequest};

use crate::models::{AddPreferredCenterRequest, PatientError, UpdatePatientRequest};
use crate::services::{PatientService, PreferredCenterService};

fn own_patient_id(user: &User) -> Result<Uuid, AppError> {
    if !user.is_patient() {
        return Err(PatientError::Unauthorized("Patient account required".to_string()).into());
    }

    Uuid::parse_str(&user.id).map_err(|_| AppError::Auth("Invalid user id in token".to_string()))
}

// ==============================================================================
// PATIENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_own_profile(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    own_patient_id(&user)?;

    let patient = PatientService::new(&state).get_by_user(&user.id, auth.token()).await?;
    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn update_own_profile(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let patient_id = own_patient_id(&user)?;

    let patient = PatientService::new(&state)
        .update_profile(patient_id, request, auth.token())
        .await?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn list_preferred_centers(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let patient_id = own_patient_id(&user)?;

    let centers = PreferredCenterService::new(&state)
        .list_preferred_centers(patient_id, auth.token())
        .await?;

    Ok(Json(json!(centers)))
}

#[axum::debug_handler]
pub async fn add_preferred_center(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<AddPreferredCenterRequest>,
) -> Result<Json<Value>, AppError> {
    let patient_id = own_patient_id(&user)?;

    let preferred = PreferredCenterService::new(&state)
        .add_preferred_center(patient_id, request.birth_center_id, request.note, auth.token())
        .await?;

    Ok(Json(json!(preferred)))
}

// ==============================================================================
// STAFF HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_center_patients(
    State(state): State<Arc<AppConfig>>,
    Query(page): Query<PageRequest>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let center = resolve_own_center(&state, &user, auth.token()).await?;

    let patients = PatientService::new(&state)
        .list_birth_center_patients(center.id, auth.token())
        .await?;

    Ok(Json(json!(paginate(patients, page))))
}

/// Patients may read their own profile; staff and admins may read any.
#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<Arc<AppConfig>>,
    Path(patient_id): Path<Uuid>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let allowed = user.is_admin() || user.is_birth_center() || user.id == patient_id.to_string();
    if !allowed {
        return Err(PatientError::Unauthorized("Cannot view another patient's profile".to_string()).into());
    }

    let patient = PatientService::new(&state).get_patient(patient_id, auth.token()).await?;
    Ok(Json(json!(patient)))
}
