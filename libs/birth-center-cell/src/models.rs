use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::coordinates::lenient_coordinate;
use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BirthCenter {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub status: BirthCenterStatus,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub longitude: Option<f64>,
    pub total_rooms: Option<i32>,
    pub available_rooms: Option<i32>,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
    pub available_days: Option<Vec<String>>,
    pub picture_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl BirthCenter {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// Registration state set by administrators.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BirthCenterStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Banned,
}

impl BirthCenterStatus {
    /// Whether administrators approved the center to operate.
    pub fn is_operational(&self) -> bool {
        matches!(self, BirthCenterStatus::Approved)
    }
}

impl fmt::Display for BirthCenterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BirthCenterStatus::Pending => "pending",
            BirthCenterStatus::Approved => "approved",
            BirthCenterStatus::Rejected => "rejected",
            BirthCenterStatus::Banned => "banned",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationStatus {
    pub birth_center_id: Uuid,
    pub status: BirthCenterStatus,
}

/// Entry of the catalog shared by all birth centers (`services_list`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceCatalogEntry {
    pub id: i64,
    pub name: String,
}

/// A catalog service as offered by one birth center, with its own pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub birth_center_id: Uuid,
    pub service_id: i64,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub duration: Option<String>,
    pub picture_url: Option<String>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub services_list: Option<ServiceCatalogEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBirthCenterRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    pub description: Option<String>,
    pub total_rooms: Option<i32>,
    pub available_rooms: Option<i32>,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
    pub available_days: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceServicesRequest {
    pub service_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateServiceRequest {
    pub description: Option<String>,
    pub price: Option<f64>,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyBirthCenter {
    #[serde(flatten)]
    pub birth_center: BirthCenter,
    pub distance_km: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum BirthCenterError {
    #[error("Birth center not found")]
    NotFound,

    #[error("Service not found")]
    ServiceNotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for BirthCenterError {
    fn from(e: anyhow::Error) -> Self {
        BirthCenterError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for BirthCenterError {
    fn from(e: serde_json::Error) -> Self {
        BirthCenterError::DatabaseError(format!("Unexpected row shape: {}", e))
    }
}

impl From<BirthCenterError> for AppError {
    fn from(e: BirthCenterError) -> Self {
        match e {
            BirthCenterError::NotFound | BirthCenterError::ServiceNotFound => AppError::NotFound(e.to_string()),
            BirthCenterError::ValidationError(msg) => AppError::ValidationError(msg),
            BirthCenterError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coordinates_accept_strings_and_numbers() {
        let row = json!({
            "id": Uuid::new_v4(),
            "user_id": null,
            "name": "Harbor",
            "status": "approved",
            "latitude": "10.3157",
            "longitude": 123.8854
        });
        let center: BirthCenter = serde_json::from_value(row).unwrap();
        assert_eq!(center.coordinates(), Some((10.3157, 123.8854)));
        assert!(center.status.is_operational());
    }

    #[test]
    fn test_missing_status_defaults_to_pending() {
        let row = json!({ "id": Uuid::new_v4(), "name": "New Center" });
        let center: BirthCenter = serde_json::from_value(row).unwrap();
        assert_eq!(center.status, BirthCenterStatus::Pending);
        assert_eq!(center.coordinates(), None);
    }
}
