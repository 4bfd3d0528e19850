// libs/appointment-cell/src/models.rs
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_config::SlotDefaults;
use shared_models::error::AppError;

/// Every appointment blocks one hour from its start, whatever the service.
pub const APPOINTMENT_WINDOW_MINUTES: i64 = 60;

/// Latest hour a day grid may run to.
pub const MAX_SLOT_HOUR: u32 = 24;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub birth_center_id: Uuid,
    pub service_id: Option<Uuid>,
    pub appointment_date: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Appointment {
    pub fn window(&self) -> BookingWindow {
        BookingWindow::starting_at(self.appointment_date)
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == AppointmentStatus::Cancelled
    }
}

/// Stored appointment status. Staff may write statuses outside the known
/// set; those are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppointmentStatus {
    Pending,
    Approved,
    Cancelled,
    Completed,
    Rejected,
    Other(String),
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Approved => "approved",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Rejected => "rejected",
            AppointmentStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for AppointmentStatus {
    fn from(raw: String) -> Self {
        raw.parse().unwrap_or(AppointmentStatus::Other(raw))
    }
}

impl From<AppointmentStatus> for String {
    fn from(status: AppointmentStatus) -> Self {
        match status {
            AppointmentStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = AppointmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppointmentStatus::Pending),
            "approved" => Ok(AppointmentStatus::Approved),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "completed" => Ok(AppointmentStatus::Completed),
            "rejected" => Ok(AppointmentStatus::Rejected),
            other => Err(AppointmentError::UnknownStatus(other.to_string())),
        }
    }
}

/// Half-open `[start, end)` interval an appointment occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BookingWindow {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            start,
            end: start + Duration::minutes(APPOINTMENT_WINDOW_MINUTES),
        }
    }

    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && end > self.start
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BirthCenterSummary {
    pub name: String,
    pub address: Option<String>,
}

/// Patient-side listing row, joined with the birth center it is booked at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientAppointment {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub birth_centers: Option<BirthCenterSummary>,
}

// ==============================================================================
// TIMESLOT MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeslotConfig {
    pub start_hour: u32,
    pub end_hour: u32,
    pub interval_minutes: u32,
}

impl TimeslotConfig {
    /// Hourly 09:00-17:00 grid offered to patients when staff saved nothing for the day.
    pub const PATIENT_DEFAULT: TimeslotConfig = TimeslotConfig {
        start_hour: 9,
        end_hour: 17,
        interval_minutes: 60,
    };

    pub fn with_overrides(
        defaults: SlotDefaults,
        start_hour: Option<u32>,
        end_hour: Option<u32>,
        interval_minutes: Option<u32>,
    ) -> Result<Self, AppointmentError> {
        let config = Self {
            start_hour: start_hour.unwrap_or(defaults.start_hour),
            end_hour: end_hour.unwrap_or(defaults.end_hour),
            interval_minutes: interval_minutes.unwrap_or(defaults.interval_minutes),
        };

        if config.start_hour > MAX_SLOT_HOUR || config.end_hour > MAX_SLOT_HOUR {
            return Err(AppointmentError::InvalidSlotConfig(format!(
                "Hours must be between 0 and {}",
                MAX_SLOT_HOUR
            )));
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeslot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub available: bool,
    pub booked: bool,
}

impl Timeslot {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            available: false,
            booked: false,
        }
    }
}

/// Persisted form of an available slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayView {
    pub birth_center_id: Uuid,
    pub date: NaiveDate,
    pub config: TimeslotConfig,
    pub slots: Vec<Timeslot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayAvailability {
    pub birth_center_id: Uuid,
    pub date: NaiveDate,
    pub slots: Vec<StoredSlot>,
}

// ==============================================================================
// NOTIFICATION MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTemplate {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Option<Uuid>,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub body: String,
    pub patient_id: Uuid,
    pub birth_center_id: Uuid,
    pub appointment_id: Uuid,
    pub receiver_id: Uuid,
    pub is_read: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Columns the status PATCH echoes back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub birth_center_id: Uuid,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeOutcome {
    pub appointment_id: Uuid,
    pub status: String,
    pub notification_sent: bool,
    pub notification: Option<Notification>,
    pub notification_error: Option<String>,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub birth_center_id: Uuid,
    pub service_id: Option<Uuid>,
    pub appointment_date: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveAvailabilityRequest {
    pub start_hour: Option<u32>,
    pub end_hour: Option<u32>,
    pub interval_minutes: Option<u32>,
    /// Start times of the slots staff marked available.
    pub available_starts: Vec<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetDayRequest {
    pub start_hour: Option<u32>,
    pub end_hour: Option<u32>,
    pub interval_minutes: Option<u32>,
    pub available: bool,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("No birth center is registered for this account")]
    BirthCenterNotFound,

    #[error("The requested time overlaps an existing appointment")]
    SlotConflict,

    #[error("Timeslot {0} is booked and cannot be changed")]
    SlotBooked(usize),

    #[error("Timeslot {0} does not exist")]
    SlotOutOfRange(usize),

    #[error("Unknown appointment status: {0}")]
    UnknownStatus(String),

    #[error("Invalid timeslot settings: {0}")]
    InvalidSlotConfig(String),

    #[error("Invalid calendar month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for AppointmentError {
    fn from(e: anyhow::Error) -> Self {
        AppointmentError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for AppointmentError {
    fn from(e: serde_json::Error) -> Self {
        AppointmentError::DatabaseError(format!("Unexpected row shape: {}", e))
    }
}

impl From<AppointmentError> for AppError {
    fn from(e: AppointmentError) -> Self {
        match e {
            AppointmentError::NotFound | AppointmentError::BirthCenterNotFound => {
                AppError::NotFound(e.to_string())
            }
            AppointmentError::SlotConflict => AppError::Conflict(e.to_string()),
            AppointmentError::SlotBooked(_)
            | AppointmentError::SlotOutOfRange(_)
            | AppointmentError::UnknownStatus(_)
            | AppointmentError::InvalidSlotConfig(_)
            | AppointmentError::InvalidMonth { .. } => AppError::ValidationError(e.to_string()),
            AppointmentError::Unauthorized(msg) => AppError::Forbidden(msg),
            AppointmentError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
