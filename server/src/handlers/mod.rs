//! HTTP handlers, one module per resource.

mod appointment;
mod auth;
mod billing;
mod dashboard;
mod doctor;
mod inventory;
mod lab_test;
mod patient;
mod prescription;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};

use crate::AppState;

/// Every `/api` route
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/patients",
            get(patient::list_patients).post(patient::create_patient),
        )
        .route(
            "/patients/:id",
            get(patient::get_patient)
                .put(patient::update_patient)
                .delete(patient::delete_patient),
        )
        .route("/doctors", get(doctor::list_doctors).post(doctor::create_doctor))
        .route(
            "/doctors/:id",
            get(doctor::get_doctor)
                .put(doctor::update_doctor)
                .delete(doctor::delete_doctor),
        )
        .route("/doctors/:id/availability", get(doctor::availability))
        .route(
            "/appointments",
            get(appointment::list_appointments).post(appointment::create_appointment),
        )
        .route(
            "/appointments/:id",
            get(appointment::get_appointment)
                .put(appointment::update_appointment)
                .delete(appointment::delete_appointment),
        )
        .route(
            "/billing",
            get(billing::list_records).post(billing::create_record),
        )
        .route(
            "/billing/:id",
            get(billing::get_record)
                .put(billing::update_record)
                .delete(billing::delete_record),
        )
        .route(
            "/billing/:id/items",
            get(billing::list_items).post(billing::create_item),
        )
        .route(
            "/billing/items/:id",
            put(billing::update_item).delete(billing::delete_item),
        )
        .route(
            "/prescriptions",
            get(prescription::list_prescriptions).post(prescription::create_prescription),
        )
        .route(
            "/prescriptions/:id",
            get(prescription::get_prescription)
                .put(prescription::update_prescription)
                .delete(prescription::delete_prescription),
        )
        .route(
            "/prescriptions/patient/:patient_id",
            get(prescription::list_for_patient),
        )
        .route(
            "/lab-tests",
            get(lab_test::list_lab_tests).post(lab_test::create_lab_test),
        )
        .route(
            "/lab-tests/:id",
            get(lab_test::get_lab_test)
                .put(lab_test::update_lab_test)
                .delete(lab_test::delete_lab_test),
        )
        .route(
            "/inventory",
            get(inventory::list_items).post(inventory::create_item),
        )
        .route("/inventory/low-stock", get(inventory::low_stock))
        .route(
            "/inventory/:id",
            get(inventory::get_item)
                .put(inventory::update_item)
                .delete(inventory::delete_item),
        )
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/stats", get(dashboard::stats))
        .route("/dashboard/admin-stats", get(dashboard::admin_stats))
        .route("/doctor/dashboard", get(dashboard::doctor_dashboard))
        .route("/patient/dashboard", get(dashboard::patient_dashboard))
        .route("/manager/dashboard", get(dashboard::manager_dashboard))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "healthy", "database": "connected" })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy", "database": "unreachable" })),
            )
        }
    }
}
