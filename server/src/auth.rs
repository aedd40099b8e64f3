//! Password hashing, JWT issuing and the bearer-token extractor.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{Role, User};

/// Argon2id PHC string for `password`
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))
}

/// False for a wrong password or an unparseable stored hash
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is not a valid PHC string: {}", e);
            false
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Issues and checks HS256 access tokens
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry: Duration,
}

impl TokenService {
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry: Duration::hours(expiry_hours),
        }
    }

    pub fn issue(&self, user: &User) -> ApiResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: (now + self.expiry).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("token encoding failed: {}", e)))
    }

    pub fn verify(&self, token: &str) -> ApiResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Rejected token: {}", e);
                ApiError::Unauthorized("Invalid or expired token".to_string())
            })
    }
}

/// The caller identified by a valid `Authorization: Bearer` header
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: String,
}

impl AuthUser {
    pub fn require_role(&self, allowed: &[Role]) -> ApiResult<()> {
        match Role::parse(&self.role) {
            Some(role) if allowed.contains(&role) => Ok(()),
            _ => Err(ApiError::Forbidden(
                "Access forbidden: insufficient permissions".to_string(),
            )),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization token".to_string()))?;
        let header = header.to_str().map_err(|_| {
            ApiError::Unauthorized("Authorization header is not valid UTF-8".to_string())
        })?;
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or_else(|| {
                ApiError::Unauthorized("Authorization header must be 'Bearer <token>'".to_string())
            })?;

        let tokens = Arc::<TokenService>::from_ref(state);
        let claims = tokens.verify(token)?;
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(AuthUser {
            id,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: "nurse".into(),
            password_hash: String::new(),
            email: None,
            role: role.into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("Secret123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Secret123", &hash));
        assert!(!verify_password("secret123", &hash));
        assert!(!verify_password("Secret123", "plain-text"));
    }

    #[test]
    fn test_token_carries_role() {
        let tokens = TokenService::new("test-secret", 24);
        let staff = user("staff");
        let token = tokens.issue(&staff).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, staff.id.to_string());
        assert_eq!(claims.role, "staff");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let token = TokenService::new("one", 24).issue(&user("admin")).unwrap();
        let err = TokenService::new("two", 24).verify(&token).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = TokenService::new("test-secret", -2);
        let token = tokens.issue(&user("admin")).unwrap();
        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn test_require_role() {
        let manager = AuthUser {
            id: Uuid::new_v4(),
            role: "manager".into(),
        };
        assert!(manager.require_role(&[Role::Admin, Role::Manager]).is_ok());

        let staff = AuthUser {
            role: "staff".into(),
            ..manager
        };
        let err = staff.require_role(&[Role::Admin, Role::Manager]).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert_eq!(err.to_string(), "Access forbidden: insufficient permissions");
    }
}
