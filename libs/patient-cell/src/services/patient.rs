// libs/patient-cell/src/services/patient.rs
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{BirthCenterPatient, Patient, PatientError, UpdatePatientRequest};

/// One appointment row joined with its patient.
#[derive(Debug, Deserialize)]
struct VisitRow {
    patient_id: Uuid,
    appointment_date: DateTime<Utc>,
    status: String,
    patients: Option<Patient>,
}

/// Distinct patients in order of first appearance. Rows must be sorted newest
/// appointment first, so the first row seen for a patient is their latest visit.
fn collect_patients(rows: Vec<VisitRow>) -> Vec<BirthCenterPatient> {
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    let mut patients: Vec<BirthCenterPatient> = Vec::new();

    for row in rows {
        if let Some(&i) = index.get(&row.patient_id) {
            patients[i].total_appointments += 1;
            continue;
        }

        let Some(patient) = row.patients else {
            warn!("Appointment for patient {} has no readable patient row", row.patient_id);
            continue;
        };

        index.insert(row.patient_id, patients.len());
        patients.push(BirthCenterPatient {
            patient,
            last_appointment_date: row.appointment_date,
            last_appointment_status: row.status,
            total_appointments: 1,
        });
    }

    patients
}

pub struct PatientService {
    supabase: SupabaseClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get_patient(&self, patient_id: Uuid, auth_token: &str) -> Result<Patient, PatientError> {
        debug!("Fetching patient {}", patient_id);

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, Some(auth_token), None).await?;

        let row = result.into_iter().next().ok_or(PatientError::NotFound)?;
        Ok(serde_json::from_value(row)?)
    }

    /// Profile of the signed-in account.
    pub async fn get_by_user(&self, user_id: &str, auth_token: &str) -> Result<Patient, PatientError> {
        let patient_id = Uuid::parse_str(user_id)
            .map_err(|_| PatientError::ValidationError(format!("Invalid user id: {}", user_id)))?;

        self.get_patient(patient_id, auth_token).await
    }

    pub async fn update_profile(
        &self,
        patient_id: Uuid,
        request: UpdatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        let mut update_data = serde_json::Map::new();

        for (field, value) in [("first_name", &request.first_name), ("last_name", &request.last_name)] {
            if let Some(name) = value {
                if name.trim().is_empty() {
                    return Err(PatientError::ValidationError(format!("{} cannot be empty", field)));
                }
                update_data.insert(field.to_string(), json!(name.trim()));
            }
        }
        if let Some(middle_name) = request.middle_name {
            update_data.insert("middle_name".to_string(), json!(middle_name));
        }
        if let Some(contact_number) = request.contact_number {
            update_data.insert("contact_number".to_string(), json!(contact_number));
        }
        if let Some(address) = request.address {
            update_data.insert("address".to_string(), json!(address));
        }
        if let Some(url) = request.profile_picture_url {
            update_data.insert("profile_picture_url".to_string(), json!(url));
        }

        if update_data.is_empty() {
            return self.get_patient(patient_id, auth_token).await;
        }

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(Value::Object(update_data)),
            Some(SupabaseClient::return_representation()),
        ).await?;

        let row = result.into_iter().next().ok_or(PatientError::NotFound)?;
        let patient: Patient = serde_json::from_value(row)?;
        info!("Updated profile for patient {}", patient.id);

        Ok(patient)
    }

    /// Everyone with an appointment at the birth center, most recently seen first.
    pub async fn list_birth_center_patients(
        &self,
        birth_center_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<BirthCenterPatient>, PatientError> {
        debug!("Listing patients of birth center {}", birth_center_id);

        let path = format!(
            "/rest/v1/appointments?select=patient_id,appointment_date,status,patients(*)&birth_center_id=eq.{}&order=appointment_date.desc",
            birth_center_id
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, Some(auth_token), None).await?;

        let rows = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<VisitRow>, _>>()?;

        Ok(collect_patients(rows))
    }
}
