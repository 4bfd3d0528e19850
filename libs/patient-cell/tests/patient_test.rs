// libs/patient-cell/tests/patient_test.rs

use assert_matches::assert_matches;
use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use patient_cell::handlers;
use patient_cell::models::{PatientError, UpdatePatientRequest};
use patient_cell::services::{PatientService, PreferredCenterService};
use shared_models::error::AppError;
use shared_models::pagination::PageRequest;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig, TestUser};

const TOKEN: &str = "test-token";

fn auth_header(token: &str) -> TypedHeader<Authorization<Bearer>> {
    TypedHeader(Authorization::bearer(token).unwrap())
}

fn visit(patient_id: &str, first_name: &str, date: &str) -> serde_json::Value {
    json!({
        "patient_id": patient_id,
        "appointment_date": date,
        "status": "approved",
        "patients": MockSupabaseResponses::patient_response(patient_id, first_name, "Dela Cruz")
    })
}

#[tokio::test]
async fn test_get_by_user_reads_patient_with_same_id() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_backend(&mock_server.uri()).to_app_config();
    let user = TestUser::patient("mother@example.com");

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", format!("eq.{}", user.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::patient_response(&user.id, "Maria", "Santos")
        ])))
        .mount(&mock_server)
        .await;

    let patient = PatientService::new(&config).get_by_user(&user.id, TOKEN).await.unwrap();

    assert_eq!(patient.id.to_string(), user.id);
    assert_eq!(patient.full_name(), "Maria Santos");
    assert_eq!(patient.latitude, Some(10.3157));
}

#[tokio::test]
async fn test_update_profile_rejects_blank_names() {
    let config = TestConfig::default().to_app_config();
    let request = UpdatePatientRequest {
        last_name: Some("   ".to_string()),
        ..Default::default()
    };

    let result = PatientService::new(&config).update_profile(Uuid::new_v4(), request, TOKEN).await;
    assert_matches!(result, Err(PatientError::ValidationError(_)));
}

#[tokio::test]
async fn test_update_profile_patches_given_fields() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_backend(&mock_server.uri()).to_app_config();
    let patient_id = Uuid::new_v4();

    let mut updated = MockSupabaseResponses::patient_response(&patient_id.to_string(), "Maria", "Santos");
    updated["contact_number"] = json!("+63 999 123 4567");

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", format!("eq.{}", patient_id)))
        .and(body_partial_json(json!({ "contact_number": "+63 999 123 4567" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([updated])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = UpdatePatientRequest {
        contact_number: Some("+63 999 123 4567".to_string()),
        ..Default::default()
    };
    let patient = PatientService::new(&config)
        .update_profile(patient_id, request, TOKEN)
        .await
        .unwrap();

    assert_eq!(patient.contact_number.as_deref(), Some("+63 999 123 4567"));
}

#[tokio::test]
async fn test_birth_center_patients_are_distinct_and_paginated() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_backend(&mock_server.uri()).to_arc();
    let staff = TestUser::birth_center("staff@example.com");
    let center_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/birth_centers"))
        .and(query_param("user_id", format!("eq.{}", staff.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::birth_center_response(&center_id.to_string(), &staff.id, "approved")
        ])))
        .mount(&mock_server)
        .await;

    let ana = Uuid::new_v4().to_string();
    let bea = Uuid::new_v4().to_string();
    let cara = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("birth_center_id", format!("eq.{}", center_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            visit(&ana, "Ana", "2025-03-20T09:00:00Z"),
            visit(&bea, "Bea", "2025-03-18T09:00:00Z"),
            visit(&ana, "Ana", "2025-03-10T09:00:00Z"),
            visit(&cara, "Cara", "2025-03-01T09:00:00Z")
        ])))
        .mount(&mock_server)
        .await;

    let Json(body) = handlers::list_center_patients(
        State(config),
        Query(PageRequest::new(1, 2)),
        Extension(staff.to_user()),
        auth_header(TOKEN),
    )
    .await
    .unwrap();

    assert_eq!(body["total_items"], 3);
    assert_eq!(body["total_pages"], 2);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], ana);
    assert_eq!(items[0]["total_appointments"], 2);
    assert_eq!(items[1]["first_name"], "Bea");
}

#[tokio::test]
async fn test_patient_cannot_read_other_profiles() {
    let config = TestConfig::default().to_arc();
    let patient = TestUser::patient("mother@example.com");

    let result = handlers::get_patient(
        State(config),
        Path(Uuid::new_v4()),
        Extension(patient.to_user()),
        auth_header(TOKEN),
    )
    .await;

    assert_matches!(result, Err(AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_preferred_centers_round_trip_through_backend() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_backend(&mock_server.uri()).to_app_config();
    let patient_id = Uuid::new_v4();
    let center_id = Uuid::new_v4();

    let row = json!({
        "id": Uuid::new_v4(),
        "note": "Close to home",
        "birth_center": {
            "id": center_id,
            "name": "Sunrise Birth Center",
            "address": "12 Harbor Road",
            "contact_number": null,
            "status": "approved",
            "description": null,
            "opening_time": "08:00",
            "closing_time": "20:00",
            "available_days": ["Mon"]
        }
    });

    Mock::given(method("POST"))
        .and(path("/rest/v1/preferred_centers"))
        .and(body_partial_json(json!({ "patient_id": patient_id, "birth_center_id": center_id })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([row.clone()])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/preferred_centers"))
        .and(query_param("patient_id", format!("eq.{}", patient_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&mock_server)
        .await;

    let service = PreferredCenterService::new(&config);
    let added = service
        .add_preferred_center(patient_id, center_id, Some("Close to home".to_string()), TOKEN)
        .await
        .unwrap();
    assert_eq!(added.birth_center.as_ref().map(|c| c.id), Some(center_id));

    let listed = service.list_preferred_centers(patient_id, TOKEN).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].note.as_deref(), Some("Close to home"));
}
