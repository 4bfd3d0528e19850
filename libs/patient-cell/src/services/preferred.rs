// libs/patient-cell/src/services/preferred.rs
use reqwest::Method;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{PatientError, PreferredCenter};

const PREFERRED_SELECT: &str = "select=id,note,birth_center:birth_centers!inner(id,name,address,contact_number,status,description,opening_time,closing_time,available_days)";

pub struct PreferredCenterService {
    supabase: SupabaseClient,
}

impl PreferredCenterService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn add_preferred_center(
        &self,
        patient_id: Uuid,
        birth_center_id: Uuid,
        note: Option<String>,
        auth_token: &str,
    ) -> Result<PreferredCenter, PatientError> {
        let path = format!("/rest/v1/preferred_centers?{}", PREFERRED_SELECT);
        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            &path,
            Some(auth_token),
            Some(json!({
                "patient_id": patient_id,
                "birth_center_id": birth_center_id,
                "note": note
            })),
            Some(SupabaseClient::return_representation()),
        ).await?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| PatientError::DatabaseError("Preferred center insert returned no row".to_string()))?;
        info!("Patient {} saved birth center {} as preferred", patient_id, birth_center_id);

        Ok(serde_json::from_value(row)?)
    }

    pub async fn list_preferred_centers(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<PreferredCenter>, PatientError> {
        let path = format!("/rest/v1/preferred_centers?{}&patient_id=eq.{}", PREFERRED_SELECT, patient_id);
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, Some(auth_token), None).await?;

        Ok(result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()?)
    }
}
