use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::validation::{max_len, one_of, required_str, validate_email, validate_password};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub email: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Staff,
    Doctor,
    Patient,
    Manager,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Admin, Role::Staff, Role::Doctor, Role::Patient, Role::Manager];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Doctor => "doctor",
            Role::Patient => "patient",
            Role::Manager => "manager",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == value)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterPayload {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Validated registration; the password is still plain text here
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub role: Role,
}

impl RegisterPayload {
    /// Column widths
    fn check_lengths(&self) -> ApiResult<()> {
        max_len("username", self.username.as_deref(), 80)?;
        max_len("email", self.email.as_deref(), 120)?;
        Ok(())
    }

    pub fn validate(self) -> ApiResult<Registration> {
        self.check_lengths()?;
        let username = required_str(self.username, "username")?;
        let password = required_str(self.password, "password")?;
        let role = required_str(self.role, "role")?;

        let role = one_of(
            "role",
            &role,
            Role::parse,
            "Role must be one of admin, staff, doctor, patient, manager",
        )?;
        validate_password(&password)?;
        let email = self.email.filter(|e| !e.is_empty());
        if let Some(email) = &email {
            validate_email("email", email)?;
        }

        Ok(Registration {
            username,
            password,
            email,
            role,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginPayload {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> RegisterPayload {
        RegisterPayload {
            username: Some("frontdesk".into()),
            password: Some("Secret123".into()),
            email: Some("desk@example.com".into()),
            role: Some("staff".into()),
        }
    }

    #[test]
    fn test_valid_registration() {
        let registration = payload().validate().unwrap();
        assert_eq!(registration.role, Role::Staff);
        assert_eq!(registration.email.as_deref(), Some("desk@example.com"));
    }

    #[test]
    fn test_weak_password_rejected() {
        let err = RegisterPayload {
            password: Some("password".into()),
            ..payload()
        }
        .validate()
        .unwrap_err();
        assert!(err.to_string().starts_with("Password must contain"));
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!(RegisterPayload {
            role: Some("janitor".into()),
            ..payload()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_hash_never_serialized() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: "frontdesk".into(),
            password_hash: "$argon2id$v=19$...".into(),
            email: None,
            role: "staff".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "staff");
    }
}
