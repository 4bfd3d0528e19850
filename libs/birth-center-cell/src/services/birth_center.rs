// libs/birth-center-cell/src/services/birth_center.rs
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    BirthCenter, BirthCenterError, BirthCenterStatus, NearbyBirthCenter, NearbyQuery, RegistrationStatus,
    UpdateBirthCenterRequest,
};
use crate::services::geo::{haversine_km, DEFAULT_SEARCH_RADIUS_KM};

pub struct BirthCenterService {
    supabase: SupabaseClient,
}

impl BirthCenterService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// The birth center owned by an account.
    pub async fn get_by_user(&self, user_id: &str, auth_token: &str) -> Result<BirthCenter, BirthCenterError> {
        debug!("Resolving birth center for user {}", user_id);

        let path = format!("/rest/v1/birth_centers?user_id=eq.{}", user_id);
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, Some(auth_token), None).await?;

        let row = result.into_iter().next().ok_or(BirthCenterError::NotFound)?;
        Ok(serde_json::from_value(row)?)
    }

    pub async fn get_by_id(&self, birth_center_id: Uuid, auth_token: &str) -> Result<BirthCenter, BirthCenterError> {
        let path = format!("/rest/v1/birth_centers?id=eq.{}", birth_center_id);
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, Some(auth_token), None).await?;

        let row = result.into_iter().next().ok_or(BirthCenterError::NotFound)?;
        Ok(serde_json::from_value(row)?)
    }

    pub async fn registration_status(&self, user_id: &str, auth_token: &str) -> Result<RegistrationStatus, BirthCenterError> {
        let path = format!("/rest/v1/birth_centers?user_id=eq.{}&select=id,status", user_id);
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, Some(auth_token), None).await?;

        let row = result.into_iter().next().ok_or(BirthCenterError::NotFound)?;
        let birth_center_id = row["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or_else(|| BirthCenterError::DatabaseError("Birth center row without id".to_string()))?;

        // A center that has not been reviewed yet may carry no status at all.
        let status = match &row["status"] {
            Value::Null => BirthCenterStatus::default(),
            raw => serde_json::from_value(raw.clone())?,
        };

        Ok(RegistrationStatus { birth_center_id, status })
    }

    pub async fn update_settings(
        &self,
        user_id: &str,
        request: UpdateBirthCenterRequest,
        auth_token: &str,
    ) -> Result<BirthCenter, BirthCenterError> {
        let mut update_data = serde_json::Map::new();
        if let Some(name) = request.name {
            if name.trim().is_empty() {
                return Err(BirthCenterError::ValidationError("Name cannot be empty".to_string()));
            }
            update_data.insert("name".to_string(), json!(name));
        }
        if let Some(address) = request.address {
            update_data.insert("address".to_string(), json!(address));
        }
        if let Some(contact_number) = request.contact_number {
            update_data.insert("contact_number".to_string(), json!(contact_number));
        }
        if let Some(description) = request.description {
            update_data.insert("description".to_string(), json!(description));
        }
        if let (Some(total), Some(available)) = (request.total_rooms, request.available_rooms) {
            if available > total {
                return Err(BirthCenterError::ValidationError(
                    "Available rooms cannot exceed total rooms".to_string(),
                ));
            }
        }
        if let Some(total_rooms) = request.total_rooms {
            update_data.insert("total_rooms".to_string(), json!(total_rooms));
        }
        if let Some(available_rooms) = request.available_rooms {
            update_data.insert("available_rooms".to_string(), json!(available_rooms));
        }
        if let Some(opening_time) = request.opening_time {
            update_data.insert("opening_time".to_string(), json!(opening_time));
        }
        if let Some(closing_time) = request.closing_time {
            update_data.insert("closing_time".to_string(), json!(closing_time));
        }
        if let Some(available_days) = request.available_days {
            update_data.insert("available_days".to_string(), json!(available_days));
        }

        if update_data.is_empty() {
            return self.get_by_user(user_id, auth_token).await;
        }

        let path = format!("/rest/v1/birth_centers?user_id=eq.{}", user_id);
        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(Value::Object(update_data)),
            Some(SupabaseClient::return_representation()),
        ).await?;

        let row = result.into_iter().next().ok_or(BirthCenterError::NotFound)?;
        let center: BirthCenter = serde_json::from_value(row)?;
        info!("Updated settings for birth center {}", center.id);

        Ok(center)
    }

    /// Approved centers within the radius, nearest first.
    pub async fn nearby(&self, query: &NearbyQuery, auth_token: &str) -> Result<Vec<NearbyBirthCenter>, BirthCenterError> {
        let radius = query.radius_km.unwrap_or(DEFAULT_SEARCH_RADIUS_KM);
        if radius <= 0.0 {
            return Err(BirthCenterError::ValidationError("Radius must be positive".to_string()));
        }

        let result: Vec<Value> = self.supabase.request(
            Method::POST,
            "/rest/v1/rpc/nearby_birth_centers",
            Some(auth_token),
            Some(json!({
                "lat": query.latitude,
                "long": query.longitude,
                "radius_km": radius
            })),
        ).await?;

        let mut centers = Vec::with_capacity(result.len());
        for row in result {
            let center: BirthCenter = match serde_json::from_value(row) {
                Ok(center) => center,
                Err(e) => {
                    warn!("Skipping malformed birth center row: {}", e);
                    continue;
                }
            };
            let Some((lat, lng)) = center.coordinates() else {
                continue;
            };
            let distance_km = haversine_km(query.latitude, query.longitude, lat, lng);
            if center.status.is_operational() && distance_km <= radius {
                centers.push(NearbyBirthCenter { birth_center: center, distance_km });
            }
        }

        centers.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        Ok(centers)
    }
}
