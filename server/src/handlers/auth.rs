use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::auth::{hash_password, verify_password, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::models::{LoginPayload, LoginResponse, RegisterPayload, User};
use crate::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterPayload>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let registration = payload.validate()?;
    let password = registration.password;
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("hashing task failed: {}", e)))??;

    state
        .db
        .create_user(
            &registration.username,
            &hash,
            registration.email.as_deref(),
            registration.role,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginPayload>,
) -> ApiResult<Json<LoginResponse>> {
    let (username, password) = match (payload.username, payload.password) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
        _ => {
            return Err(ApiError::BadRequest(
                "Username and password are required".to_string(),
            ))
        }
    };

    let invalid = || ApiError::Unauthorized("Invalid username or password".to_string());
    let user = state.db.find_user_by_username(&username).await?.ok_or_else(invalid)?;

    let stored = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| ApiError::Internal(format!("verification task failed: {}", e)))?;
    if !valid {
        tracing::info!("Failed login for {}", username);
        return Err(invalid());
    }
    if !user.is_active {
        return Err(ApiError::Forbidden("User account is inactive".to_string()));
    }

    let access_token = state.tokens.issue(&user)?;
    tracing::info!("✓ User logged in: {}", user.username);
    Ok(Json(LoginResponse { access_token, user }))
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, caller: AuthUser) -> ApiResult<Json<User>> {
    Ok(Json(state.db.get_user(caller.id).await?))
}
