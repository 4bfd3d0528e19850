use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::{AppConfig, SlotDefaults};
use shared_models::auth::{User, ROLE_ADMIN, ROLE_BIRTH_CENTER, ROLE_PATIENT};

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Config pointing the backend client at a mock server.
    pub fn with_backend(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            port: 3000,
            slot_defaults: SlotDefaults::default(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new("test@example.com", ROLE_PATIENT)
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn birth_center(email: &str) -> Self {
        Self::new(email, ROLE_BIRTH_CENTER)
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, ROLE_PATIENT)
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, ROLE_ADMIN)
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some("authenticated".to_string()),
            metadata: Some(json!({ "role": self.role })),
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": "authenticated",
            "user_metadata": { "role": user.role },
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }
}

/// Canned PostgREST rows shaped like the production tables.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn birth_center_response(id: &str, user_id: &str, status: &str) -> Value {
        json!({
            "id": id,
            "user_id": user_id,
            "name": "Sunrise Birth Center",
            "address": "12 Harbor Road, Cebu City",
            "contact_number": "+63 912 345 6789",
            "description": "Midwife-led birth center",
            "status": status,
            "latitude": 10.3157,
            "longitude": 123.8854,
            "total_rooms": 6,
            "available_rooms": 4,
            "opening_time": "08:00",
            "closing_time": "20:00",
            "available_days": ["Mon", "Tue", "Wed", "Thu", "Fri"],
            "picture_url": null,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn patient_response(id: &str, first_name: &str, last_name: &str) -> Value {
        json!({
            "id": id,
            "first_name": first_name,
            "middle_name": null,
            "last_name": last_name,
            "contact_number": "+63 917 000 0000",
            "age": 29,
            "birthday": "1996-02-14",
            "sex": "female",
            "address": "45 Mango Avenue, Cebu City",
            "latitude": "10.3157",
            "longitude": "123.8854",
            "emergency_contact": "Partner",
            "emergency_contact_number": "+63 917 111 1111",
            "blood_type": "O+",
            "allergies": null,
            "profile_picture_url": null,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn appointment_response(
        id: &str,
        patient_id: &str,
        birth_center_id: &str,
        appointment_date: &str,
        status: &str,
    ) -> Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "birth_center_id": birth_center_id,
            "service_id": Uuid::new_v4(),
            "appointment_date": appointment_date,
            "status": status,
            "notes": null,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn notification_response(appointment_id: &str, patient_id: &str, birth_center_id: &str, title: &str, body: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "type": "appointment_status",
            "title": title,
            "body": body,
            "patient_id": patient_id,
            "birth_center_id": birth_center_id,
            "appointment_id": appointment_id,
            "receiver_id": patient_id,
            "is_read": false,
            "created_at": Utc::now().to_rfc3339()
        })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "message": message,
            "code": code
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::with_backend("http://127.0.0.1:9999");
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://127.0.0.1:9999");
        assert_eq!(app_config.supabase_anon_key, "test-anon-key");
        assert!(app_config.is_configured());
    }

    #[test]
    fn test_user_roles_land_in_metadata() {
        let user = TestUser::birth_center("staff@example.com");
        let model = user.to_user();

        assert_eq!(model.id, user.id);
        assert!(model.is_birth_center());
        assert!(!TestUser::patient("p@example.com").to_user().is_birth_center());
        assert!(TestUser::admin("a@example.com").to_user().is_admin());
    }

    #[test]
    fn test_jwt_token_shape() {
        let token = JwtTestUtils::create_test_token(&TestUser::default(), "secret", Some(1));
        assert_eq!(token.split('.').count(), 3);
    }
}
