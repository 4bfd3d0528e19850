// libs/appointment-cell/src/services/appointment.rs
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest, BookingWindow,
    PatientAppointment, StatusChange, StatusChangeOutcome, APPOINTMENT_WINDOW_MINUTES,
};
use crate::services::notification::NotificationService;

/// Timestamp formatted for a PostgREST filter value.
pub(crate) fn filter_timestamp(ts: DateTime<Utc>) -> String {
    urlencoding::encode(&ts.to_rfc3339_opts(SecondsFormat::Secs, true)).into_owned()
}

fn parse_rows<T: serde::de::DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, AppointmentError> {
    rows.into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .map_err(AppointmentError::from)
}

pub struct AppointmentService {
    supabase: SupabaseClient,
    notifications: NotificationService,
}

impl AppointmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            notifications: NotificationService::new(config),
        }
    }

    /// All appointments of a birth center, earliest first.
    pub async fn list_for_birth_center(
        &self,
        birth_center_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Fetching appointments for birth center {}", birth_center_id);

        let path = format!(
            "/rest/v1/appointments?birth_center_id=eq.{}&order=appointment_date.asc",
            birth_center_id
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, Some(auth_token), None).await?;

        parse_rows(result)
    }

    /// Appointments of a birth center starting strictly inside `(from, to)`.
    pub async fn list_between(
        &self,
        birth_center_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?birth_center_id=eq.{}&appointment_date=gt.{}&appointment_date=lt.{}&order=appointment_date.asc",
            birth_center_id,
            filter_timestamp(from),
            filter_timestamp(to)
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, Some(auth_token), None).await?;

        parse_rows(result)
    }

    /// A patient's bookings across birth centers, earliest first.
    pub async fn list_for_patient(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<PatientAppointment>, AppointmentError> {
        debug!("Fetching appointments for patient {}", patient_id);

        let path = format!(
            "/rest/v1/appointments?select=*,birth_centers(name,address)&patient_id=eq.{}&order=appointment_date.asc",
            patient_id
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, Some(auth_token), None).await?;

        parse_rows(result)
    }

    /// One patient's visits to one birth center, newest first.
    pub async fn patient_history(
        &self,
        patient_id: Uuid,
        birth_center_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&birth_center_id=eq.{}&order=appointment_date.desc",
            patient_id, birth_center_id
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, Some(auth_token), None).await?;

        parse_rows(result)
    }

    /// Write the new status, then notify the patient. The two writes are
    /// independent: a failed notification leaves the new status in place and
    /// is reported in the outcome.
    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        new_status: &str,
        birth_center_id: Option<Uuid>,
        auth_token: &str,
    ) -> Result<StatusChangeOutcome, AppointmentError> {
        debug!("Updating appointment {} to status {}", appointment_id, new_status);

        let mut path = format!(
            "/rest/v1/appointments?id=eq.{}&select=id,patient_id,birth_center_id,status",
            appointment_id
        );
        if let Some(center) = birth_center_id {
            path.push_str(&format!("&birth_center_id=eq.{}", center));
        }

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(json!({ "status": new_status })),
            Some(SupabaseClient::return_representation()),
        ).await?;

        let row = result.into_iter().next().ok_or(AppointmentError::NotFound)?;
        let change: StatusChange = serde_json::from_value(row)?;
        info!("Appointment {} status set to {}", change.id, change.status);

        match self.notifications.notify_status_change(&change, auth_token).await {
            Ok(notification) => Ok(StatusChangeOutcome {
                appointment_id: change.id,
                status: change.status,
                notification_sent: true,
                notification: Some(notification),
                notification_error: None,
            }),
            Err(e) => {
                warn!("Status for appointment {} updated but notification failed: {}", change.id, e);
                Ok(StatusChangeOutcome {
                    appointment_id: change.id,
                    status: change.status,
                    notification_sent: false,
                    notification: None,
                    notification_error: Some(e.to_string()),
                })
            }
        }
    }

    /// Patient-initiated cancellation; no notification is sent.
    pub async fn cancel_for_patient(
        &self,
        appointment_id: Uuid,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Patient {} cancelling appointment {}", patient_id, appointment_id);

        let path = format!(
            "/rest/v1/appointments?id=eq.{}&patient_id=eq.{}",
            appointment_id, patient_id
        );
        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(json!({ "status": AppointmentStatus::Cancelled })),
            Some(SupabaseClient::return_representation()),
        ).await?;

        let row = result.into_iter().next().ok_or(AppointmentError::NotFound)?;
        Ok(serde_json::from_value(row)?)
    }

    /// Create a pending appointment unless its window overlaps another
    /// non-cancelled appointment at the same birth center.
    pub async fn book(
        &self,
        patient_id: Uuid,
        request: BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let window = BookingWindow::starting_at(request.appointment_date);
        let reach = Duration::minutes(APPOINTMENT_WINDOW_MINUTES);

        let nearby = self.list_between(
            request.birth_center_id,
            window.start - reach,
            window.end,
            auth_token,
        ).await?;

        if nearby
            .iter()
            .filter(|a| !a.is_cancelled())
            .any(|a| a.window().overlaps(window.start, window.end))
        {
            warn!("Booking at {} conflicts with an existing appointment", window.start);
            return Err(AppointmentError::SlotConflict);
        }

        let appointment_data = json!({
            "patient_id": patient_id,
            "birth_center_id": request.birth_center_id,
            "service_id": request.service_id,
            "appointment_date": request.appointment_date.to_rfc3339(),
            "status": AppointmentStatus::Pending,
            "notes": request.notes
        });

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/appointments",
            Some(auth_token),
            Some(appointment_data),
            Some(SupabaseClient::return_representation()),
        ).await?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::DatabaseError("Failed to create appointment".to_string()))?;
        let appointment: Appointment = serde_json::from_value(row)?;
        info!("Appointment {} booked for patient {}", appointment.id, patient_id);

        Ok(appointment)
    }
}
