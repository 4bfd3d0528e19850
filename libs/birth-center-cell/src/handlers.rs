use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    BirthCenter, NearbyQuery, ReplaceServicesRequest, UpdateBirthCenterRequest, UpdateServiceRequest,
};
use crate::services::{BirthCenterService, ServiceCatalogService};

/// Birth center owned by the calling staff account.
pub async fn resolve_own_center(
    state: &AppConfig,
    user: &User,
    token: &str,
) -> Result<BirthCenter, AppError> {
    if !user.is_birth_center() {
        return Err(AppError::Forbidden("Birth center account required".to_string()));
    }

    Ok(BirthCenterService::new(state).get_by_user(&user.id, token).await?)
}

// ==============================================================================
// STAFF HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_own_center(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let center = resolve_own_center(&state, &user, auth.token()).await?;
    Ok(Json(json!(center)))
}

#[axum::debug_handler]
pub async fn get_registration_status(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    if !user.is_birth_center() {
        return Err(AppError::Forbidden("Birth center account required".to_string()));
    }

    let status = BirthCenterService::new(&state)
        .registration_status(&user.id, auth.token())
        .await?;

    Ok(Json(json!({
        "birth_center_id": status.birth_center_id,
        "status": status.status,
        "is_operational": status.status.is_operational()
    })))
}

#[axum::debug_handler]
pub async fn update_own_center(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<UpdateBirthCenterRequest>,
) -> Result<Json<Value>, AppError> {
    if !user.is_birth_center() {
        return Err(AppError::Forbidden("Birth center account required".to_string()));
    }

    let center = BirthCenterService::new(&state)
        .update_settings(&user.id, request, auth.token())
        .await?;

    Ok(Json(json!(center)))
}

#[axum::debug_handler]
pub async fn list_own_services(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let center = resolve_own_center(&state, &user, auth.token()).await?;
    let services = ServiceCatalogService::new(&state)
        .list_active_services(center.id, auth.token())
        .await?;

    Ok(Json(json!(services)))
}

#[axum::debug_handler]
pub async fn replace_own_services(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<ReplaceServicesRequest>,
) -> Result<Json<Value>, AppError> {
    let center = resolve_own_center(&state, &user, auth.token()).await?;
    let services = ServiceCatalogService::new(&state)
        .replace_services(center.id, &request.service_ids, auth.token())
        .await?;

    Ok(Json(json!(services)))
}

#[axum::debug_handler]
pub async fn update_own_service(
    State(state): State<Arc<AppConfig>>,
    Path(service_id): Path<Uuid>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<UpdateServiceRequest>,
) -> Result<Json<Value>, AppError> {
    let center = resolve_own_center(&state, &user, auth.token()).await?;
    let service = ServiceCatalogService::new(&state)
        .update_service(center.id, service_id, request, auth.token())
        .await?;

    Ok(Json(json!(service)))
}

// ==============================================================================
// SHARED HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_catalog(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let catalog = ServiceCatalogService::new(&state).catalog(auth.token()).await?;
    Ok(Json(json!(catalog)))
}

#[axum::debug_handler]
pub async fn find_nearby(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<NearbyQuery>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let centers = BirthCenterService::new(&state).nearby(&query, auth.token()).await?;

    Ok(Json(json!({
        "birth_centers": centers,
        "total": centers.len()
    })))
}

#[axum::debug_handler]
pub async fn get_birth_center(
    State(state): State<Arc<AppConfig>>,
    Path(birth_center_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let center = BirthCenterService::new(&state)
        .get_by_id(birth_center_id, auth.token())
        .await?;

    Ok(Json(json!(center)))
}

#[axum::debug_handler]
pub async fn list_birth_center_services(
    State(state): State<Arc<AppConfig>>,
    Path(birth_center_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let services = ServiceCatalogService::new(&state)
        .list_active_services(birth_center_id, auth.token())
        .await?;

    Ok(Json(json!(services)))
}
