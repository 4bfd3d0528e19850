use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_BIRTH_CENTER: &str = "birth_center";
pub const ROLE_PATIENT: &str = "patient";

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub app_metadata: Option<serde_json::Value>,
    pub user_metadata: Option<serde_json::Value>,
    pub aud: Option<String>,
    pub iat: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Account role, preferring the `role` recorded in user metadata at signup
    /// over the database role claim (which is `authenticated` for every user).
    pub fn account_role(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("role"))
            .and_then(|r| r.as_str())
            .or(self.role.as_deref())
    }

    pub fn is_admin(&self) -> bool {
        self.account_role() == Some(ROLE_ADMIN)
    }

    pub fn is_birth_center(&self) -> bool {
        self.account_role() == Some(ROLE_BIRTH_CENTER)
    }

    pub fn is_patient(&self) -> bool {
        self.account_role() == Some(ROLE_PATIENT)
    }
}
