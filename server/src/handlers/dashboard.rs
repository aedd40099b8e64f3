use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::models::{welcome, AdminStats, BillingFilter, Role, Stats};
use crate::AppState;

/// GET /api/stats
pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<Stats>> {
    Ok(Json(state.db.stats().await?))
}

/// GET /api/dashboard/admin-stats
/// Admins and managers only
pub async fn admin_stats(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<Json<AdminStats>> {
    caller.require_role(&[Role::Admin, Role::Manager])?;
    Ok(Json(state.db.admin_stats().await?))
}

/// GET /api/doctor/dashboard
pub async fn doctor_dashboard(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<Json<Value>> {
    caller.require_role(&[Role::Doctor])?;
    let user = state.db.get_user(caller.id).await?;

    // Accounts are not linked to doctor records, so the lists start empty
    Ok(Json(json!({
        "message": welcome(Role::Doctor, &user.username),
        "appointments": [],
        "lab_tests": [],
        "profile": user,
    })))
}

/// GET /api/patient/dashboard
pub async fn patient_dashboard(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<Json<Value>> {
    caller.require_role(&[Role::Patient])?;
    let user = state.db.get_user(caller.id).await?;

    Ok(Json(json!({
        "message": welcome(Role::Patient, &user.username),
        "appointments": [],
        "lab_results": [],
        "prescriptions": [],
        "billing": [],
        "profile": user,
    })))
}

/// GET /api/manager/dashboard
/// Pending bills and low-stock items
pub async fn manager_dashboard(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<Json<Value>> {
    caller.require_role(&[Role::Manager])?;
    let user = state.db.get_user(caller.id).await?;
    let billing = state
        .db
        .list_billing_records(BillingFilter {
            payment_status: Some("pending".to_string()),
            ..Default::default()
        })
        .await?;
    let inventory = state.db.low_stock_items().await?;

    Ok(Json(json!({
        "message": welcome(Role::Manager, &user.username),
        "billing": billing,
        "inventory": inventory,
        "profile": user,
    })))
}
