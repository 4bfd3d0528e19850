// libs/appointment-cell/tests/notification_test.rs

use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::AppointmentError;
use appointment_cell::services::notification::status_template;
use appointment_cell::services::AppointmentService;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

const TOKEN: &str = "staff-token";

#[test]
fn test_known_statuses_have_fixed_templates() {
    let cases = [
        ("approved", "Appointment Approved", "Your appointment has been approved by the birth center."),
        ("cancelled", "Appointment Cancelled", "Your appointment has been cancelled."),
        ("completed", "Appointment Completed", "Your appointment has been marked as completed."),
        ("rejected", "Appointment Rejected", "Your appointment has been rejected by the birth center."),
    ];

    for (status, title, body) in cases {
        let template = status_template(status);
        assert_eq!(template.title, title);
        assert_eq!(template.body, body);
    }
}

#[test]
fn test_other_statuses_fall_back_to_generic_template() {
    let pending = status_template("pending");
    assert_eq!(pending.title, "Appointment Status Updated");
    assert_eq!(pending.body, "Your appointment status has been updated to pending.");

    let unknown = status_template("rescheduled");
    assert_eq!(unknown.title, "Appointment Status Updated");
    assert_eq!(unknown.body, "Your appointment status has been updated to rescheduled.");
}

#[tokio::test]
async fn test_update_status_notifies_patient() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_backend(&mock_server.uri()).to_app_config();

    let appointment_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();
    let center_id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .and(query_param("birth_center_id", format!("eq.{}", center_id)))
        .and(body_partial_json(json!({ "status": "approved" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": appointment_id,
            "patient_id": patient_id,
            "birth_center_id": center_id,
            "status": "approved"
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/notifications"))
        .and(body_partial_json(json!({
            "type": "appointment_status",
            "title": "Appointment Approved",
            "receiver_id": patient_id,
            "is_read": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::notification_response(
                &appointment_id.to_string(),
                &patient_id.to_string(),
                &center_id.to_string(),
                "Appointment Approved",
                "Your appointment has been approved by the birth center."
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let outcome = AppointmentService::new(&config)
        .update_status(appointment_id, "approved", Some(center_id), TOKEN)
        .await
        .unwrap();

    assert_eq!(outcome.appointment_id, appointment_id);
    assert_eq!(outcome.status, "approved");
    assert!(outcome.notification_sent);
    assert_eq!(outcome.notification.map(|n| n.receiver_id), Some(patient_id));
    assert!(outcome.notification_error.is_none());
}

#[tokio::test]
async fn test_failed_notification_keeps_status_change() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_backend(&mock_server.uri()).to_app_config();
    let appointment_id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": appointment_id,
            "patient_id": Uuid::new_v4(),
            "birth_center_id": Uuid::new_v4(),
            "status": "rejected"
        }])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/notifications"))
        .respond_with(ResponseTemplate::new(500).set_body_json(
            MockSupabaseResponses::error_response("insert failed", "XX000"),
        ))
        .mount(&mock_server)
        .await;

    let outcome = AppointmentService::new(&config)
        .update_status(appointment_id, "rejected", None, TOKEN)
        .await
        .unwrap();

    assert_eq!(outcome.status, "rejected");
    assert!(!outcome.notification_sent);
    assert!(outcome.notification.is_none());
    assert!(outcome.notification_error.unwrap().contains("insert failed"));
}

#[tokio::test]
async fn test_update_status_of_missing_appointment_sends_nothing() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_backend(&mock_server.uri()).to_app_config();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/notifications"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = AppointmentService::new(&config)
        .update_status(Uuid::new_v4(), "completed", None, TOKEN)
        .await;

    assert_matches!(result, Err(AppointmentError::NotFound));
}
