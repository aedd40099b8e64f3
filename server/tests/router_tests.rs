//! Request handling that is decided before any query reaches the database.
//! The pool is created lazily and never connects in these tests.

mod common;

use axum::http::{Method, StatusCode};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use common::{get, lazy_app, post, send, TEST_SECRET};
use hospital_server::auth::TokenService;
use hospital_server::models::User;

fn token_for(role: &str) -> String {
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        username: format!("{}-user", role),
        password_hash: String::new(),
        email: None,
        role: role.to_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    TokenService::new(TEST_SECRET, 1).issue(&user).unwrap()
}

#[tokio::test]
async fn test_create_patient_rejects_bad_gender() {
    let app = lazy_app();
    let (status, body) = post(
        &app,
        "/api/patients",
        json!({
            "first_name": "Ravi",
            "last_name": "Kumar",
            "date_of_birth": "1990-01-01",
            "gender": "Unknown",
            "phone": "9876543210"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Gender must be Male, Female, or Other");
    assert_eq!(body["field"], "gender");
}

#[tokio::test]
async fn test_create_patient_reports_missing_field() {
    let app = lazy_app();
    let (status, body) = post(
        &app,
        "/api/patients",
        json!({ "first_name": "Ravi", "date_of_birth": "1990-01-01" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required field: last_name");
}

#[tokio::test]
async fn test_create_patient_rejects_bad_phone() {
    let app = lazy_app();
    let (status, body) = post(
        &app,
        "/api/patients",
        json!({
            "first_name": "Ravi",
            "last_name": "Kumar",
            "date_of_birth": "1990-01-01",
            "gender": "Male",
            "phone": "12345"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "phone");
}

#[tokio::test]
async fn test_overlong_name_is_bad_request() {
    let app = lazy_app();
    let (status, body) = post(
        &app,
        "/api/patients",
        json!({
            "first_name": "A".repeat(60),
            "last_name": "Kumar",
            "date_of_birth": "1990-01-01",
            "gender": "Male",
            "phone": "9876543210"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "first_name");
    assert_eq!(body["error"], "first_name must be at most 50 characters");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = lazy_app();
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/doctors")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{\"first_name\": "))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let app = lazy_app();
    let (status, body) = get(&app, "/api/patients/not-a-uuid").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_billing_item_quantity_must_be_positive() {
    let app = lazy_app();
    let uri = format!("/api/billing/{}/items", Uuid::new_v4());
    let (status, body) = post(
        &app,
        &uri,
        json!({
            "item_type": "consultation",
            "description": "General check-up",
            "quantity": 0,
            "unit_price": 500.0
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "quantity");
}

#[tokio::test]
async fn test_prescription_medication_fields_are_indexed() {
    let app = lazy_app();
    let (status, body) = post(
        &app,
        "/api/prescriptions",
        json!({
            "patient_id": Uuid::new_v4(),
            "doctor_id": Uuid::new_v4(),
            "diagnosis": "Seasonal flu",
            "medications": [
                { "name": "Paracetamol", "dosage": "500mg", "frequency": "Twice daily" },
                { "name": "Cetirizine", "frequency": "Once daily" }
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "medications[1].dosage");
}

#[tokio::test]
async fn test_availability_requires_date_and_time() {
    let app = lazy_app();
    let uri = format!("/api/doctors/{}/availability?date=2026-10-20", Uuid::new_v4());
    let (status, body) = get(&app, &uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Date and time are required");
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let app = lazy_app();
    let (status, body) = post(
        &app,
        "/api/auth/register",
        json!({ "username": "frontdesk", "password": "weakpass1", "role": "staff" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password must contain at least one uppercase letter");
}

#[tokio::test]
async fn test_register_rejects_unknown_role() {
    let app = lazy_app();
    let (status, body) = post(
        &app,
        "/api/auth/register",
        json!({ "username": "frontdesk", "password": "Secret123", "role": "janitor" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "role");
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let app = lazy_app();
    let (status, body) = post(&app, "/api/auth/login", json!({ "username": "admin" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username and password are required");
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = lazy_app();
    let (status, _) = get(&app, "/api/auth/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::GET, "/api/auth/me", None, Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn test_admin_stats_forbidden_for_staff() {
    let app = lazy_app();
    let token = token_for("staff");
    let (status, body) = send(
        &app,
        Method::GET,
        "/api/dashboard/admin-stats",
        None,
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access forbidden: insufficient permissions");
}

#[tokio::test]
async fn test_role_dashboards_require_matching_role() {
    let app = lazy_app();
    let staff = token_for("staff");
    let doctor = token_for("doctor");

    for uri in ["/api/doctor/dashboard", "/api/patient/dashboard", "/api/manager/dashboard"] {
        let (status, _) = get(&app, uri).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);

        let (status, body) = send(&app, Method::GET, uri, None, Some(&staff)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
        assert_eq!(body["error"], "Access forbidden: insufficient permissions");
    }

    let (status, _) = send(&app, Method::GET, "/api/manager/dashboard", None, Some(&doctor)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = lazy_app();
    let (status, _) = get(&app, "/api/wards").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
