use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::coordinates::lenient_coordinate;
use shared_models::error::AppError;

/// Patient profile. Its `id` is the id of the account that owns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub contact_number: Option<String>,
    pub age: Option<i32>,
    pub birthday: Option<NaiveDate>,
    pub sex: Option<String>,
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub longitude: Option<f64>,
    pub emergency_contact: Option<String>,
    pub emergency_contact_number: Option<String>,
    pub blood_type: Option<String>,
    pub allergies: Option<String>,
    pub profile_picture_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        match self.middle_name.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            Some(middle) => format!("{} {} {}", self.first_name, middle, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePatientRequest {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub profile_picture_url: Option<String>,
}

/// A patient as seen by one birth center, with their most recent visit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BirthCenterPatient {
    #[serde(flatten)]
    pub patient: Patient,
    pub last_appointment_date: DateTime<Utc>,
    pub last_appointment_status: String,
    pub total_appointments: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddPreferredCenterRequest {
    pub birth_center_id: Uuid,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferredBirthCenter {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
    pub available_days: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferredCenter {
    pub id: Uuid,
    pub note: Option<String>,
    pub birth_center: Option<PreferredBirthCenter>,
}

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for PatientError {
    fn from(e: anyhow::Error) -> Self {
        PatientError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for PatientError {
    fn from(e: serde_json::Error) -> Self {
        PatientError::DatabaseError(format!("Unexpected row shape: {}", e))
    }
}

impl From<PatientError> for AppError {
    fn from(e: PatientError) -> Self {
        match e {
            PatientError::NotFound => AppError::NotFound(e.to_string()),
            PatientError::ValidationError(msg) => AppError::ValidationError(msg),
            PatientError::Unauthorized(msg) => AppError::Forbidden(msg),
            PatientError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
