// libs/birth-center-cell/src/services/catalog.rs
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{BirthCenterError, Service, ServiceCatalogEntry, UpdateServiceRequest};

const SERVICE_SELECT: &str = "select=*,services_list(id,name)";

pub struct ServiceCatalogService {
    supabase: SupabaseClient,
}

impl ServiceCatalogService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn catalog(&self, auth_token: &str) -> Result<Vec<ServiceCatalogEntry>, BirthCenterError> {
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            "/rest/v1/services_list?select=id,name&order=name.asc",
            Some(auth_token),
            None,
        ).await?;

        Ok(result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()?)
    }

    pub async fn list_active_services(&self, birth_center_id: Uuid, auth_token: &str) -> Result<Vec<Service>, BirthCenterError> {
        debug!("Fetching services for birth center {}", birth_center_id);

        let path = format!(
            "/rest/v1/services?{}&birth_center_id=eq.{}&is_active=eq.true",
            SERVICE_SELECT, birth_center_id
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, Some(auth_token), None).await?;

        Ok(result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()?)
    }

    /// Replace the offered services with the given catalog ids. Existing rows
    /// are deleted first, so per-center pricing of retained services resets.
    pub async fn replace_services(
        &self,
        birth_center_id: Uuid,
        service_ids: &[i64],
        auth_token: &str,
    ) -> Result<Vec<Service>, BirthCenterError> {
        let mut ids = service_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let path = format!("/rest/v1/services?birth_center_id=eq.{}", birth_center_id);
        self.supabase.execute(Method::DELETE, &path, Some(auth_token), None).await?;

        if ids.is_empty() {
            info!("Cleared all services for birth center {}", birth_center_id);
            return Ok(Vec::new());
        }

        let rows: Vec<Value> = ids
            .iter()
            .map(|service_id| json!({
                "birth_center_id": birth_center_id,
                "service_id": service_id,
                "is_active": true,
                "description": "",
                "price": 0,
                "duration": "",
                "picture_url": ""
            }))
            .collect();

        let insert_path = format!("/rest/v1/services?{}", SERVICE_SELECT);
        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            &insert_path,
            Some(auth_token),
            Some(Value::Array(rows)),
            Some(SupabaseClient::return_representation()),
        ).await?;

        info!("Birth center {} now offers {} services", birth_center_id, result.len());

        Ok(result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()?)
    }

    pub async fn update_service(
        &self,
        birth_center_id: Uuid,
        service_id: Uuid,
        request: UpdateServiceRequest,
        auth_token: &str,
    ) -> Result<Service, BirthCenterError> {
        if request.price.is_some_and(|p| p < 0.0) {
            return Err(BirthCenterError::ValidationError("Price cannot be negative".to_string()));
        }

        let mut update_data = serde_json::Map::new();
        if let Some(description) = request.description {
            update_data.insert("description".to_string(), json!(description));
        }
        if let Some(price) = request.price {
            update_data.insert("price".to_string(), json!(price));
        }
        if let Some(duration) = request.duration {
            update_data.insert("duration".to_string(), json!(duration));
        }
        if update_data.is_empty() {
            return Err(BirthCenterError::ValidationError("Nothing to update".to_string()));
        }

        let path = format!(
            "/rest/v1/services?id=eq.{}&birth_center_id=eq.{}&{}",
            service_id, birth_center_id, SERVICE_SELECT
        );
        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(Value::Object(update_data)),
            Some(SupabaseClient::return_representation()),
        ).await?;

        let row = result.into_iter().next().ok_or(BirthCenterError::ServiceNotFound)?;
        Ok(serde_json::from_value(row)?)
    }
}
