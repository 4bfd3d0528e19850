// libs/appointment-cell/src/services/notification.rs
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    AppointmentError, AppointmentStatus, Notification, NotificationTemplate, StatusChange,
};

pub const APPOINTMENT_STATUS_NOTIFICATION: &str = "appointment_status";

/// Title and body sent to the patient when an appointment moves to `status`.
pub fn status_template(status: &str) -> NotificationTemplate {
    let (title, body) = match AppointmentStatus::from(status.to_string()) {
        AppointmentStatus::Approved => (
            "Appointment Approved",
            "Your appointment has been approved by the birth center.",
        ),
        AppointmentStatus::Cancelled => (
            "Appointment Cancelled",
            "Your appointment has been cancelled.",
        ),
        AppointmentStatus::Completed => (
            "Appointment Completed",
            "Your appointment has been marked as completed.",
        ),
        AppointmentStatus::Rejected => (
            "Appointment Rejected",
            "Your appointment has been rejected by the birth center.",
        ),
        AppointmentStatus::Pending | AppointmentStatus::Other(_) => {
            return NotificationTemplate {
                title: "Appointment Status Updated".to_string(),
                body: format!("Your appointment status has been updated to {}.", status),
            };
        }
    };

    NotificationTemplate {
        title: title.to_string(),
        body: body.to_string(),
    }
}

pub struct NotificationService {
    supabase: SupabaseClient,
}

impl NotificationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Insert the patient-facing notification for a status change.
    pub async fn notify_status_change(
        &self,
        change: &StatusChange,
        auth_token: &str,
    ) -> Result<Notification, AppointmentError> {
        let template = status_template(&change.status);
        debug!("Notifying patient {} of status {}", change.patient_id, change.status);

        let notification_data = json!({
            "type": APPOINTMENT_STATUS_NOTIFICATION,
            "title": template.title,
            "body": template.body,
            "patient_id": change.patient_id,
            "birth_center_id": change.birth_center_id,
            "appointment_id": change.id,
            "receiver_id": change.patient_id,
            "is_read": false
        });

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/notifications",
            Some(auth_token),
            Some(notification_data),
            Some(SupabaseClient::return_representation()),
        ).await?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::DatabaseError("Notification insert returned no row".to_string()))?;

        let notification: Notification = serde_json::from_value(row)?;
        info!("Notification sent for appointment {}", change.id);

        Ok(notification)
    }
}
