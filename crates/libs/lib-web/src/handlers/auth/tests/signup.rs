//! # Signup Tests

use axum::http::StatusCode;
use lib_core::dto::{AuthResponse, ErrorResponse};
use lib_core::model::Role;

use super::*;

#[tokio::test]
async fn test_signup_success() {
    // Arrange
    let app = TestApp::new().await;

    // Act
    let (status, body) = app
        .send(
            "POST",
            "/api/auth/signup",
            None,
            Some(signup_body("Sam", "sam@example.com", "SamPass123!", Role::Supplier)),
        )
        .await;

    // Assert
    assert_eq!(status, StatusCode::CREATED);
    let auth: AuthResponse = serde_json::from_value(body).unwrap();
    assert_eq!(auth.user.name, "Sam");
    assert_eq!(auth.user.role, Role::Supplier);
    assert!(!auth.user.is_admin);
    assert_eq!(auth.message, "Account created");
    assert!(!auth.token.is_empty());
}

#[tokio::test]
async fn test_signup_starts_session() {
    let app = TestApp::new().await;

    let (_, body) = app
        .send(
            "POST",
            "/api/auth/signup",
            None,
            Some(signup_body("Sam", "sam@example.com", "SamPass123!", Role::Supplier)),
        )
        .await;
    let auth: AuthResponse = serde_json::from_value(body).unwrap();

    assert!(app.state.sessions.get(auth.user.id).await.is_some());
}

#[tokio::test]
async fn test_signup_invalid_email() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/signup",
            None,
            Some(signup_body("Sam", "invalid-email", "SamPass123!", Role::Supplier)),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_value(body).unwrap();
    assert_eq!(error.code, "InvalidInput");
}

#[tokio::test]
async fn test_signup_password_too_short() {
    let app = TestApp::new().await;

    let (status, _) = app
        .send(
            "POST",
            "/api/auth/signup",
            None,
            Some(signup_body("Sam", "sam@example.com", "short", Role::Supplier)),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signup_duplicate_email() {
    let app = TestApp::new().await;
    let body = signup_body("Sam", "sam@example.com", "SamPass123!", Role::Supplier);

    let (first, _) = app.send("POST", "/api/auth/signup", None, Some(body.clone())).await;
    let (second, error) = app.send("POST", "/api/auth/signup", None, Some(body)).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(error["error"], "Email already registered");
}

#[tokio::test]
async fn test_signup_cannot_choose_admin() {
    let app = TestApp::new().await;

    let (status, _) = app
        .send(
            "POST",
            "/api/auth/signup",
            None,
            Some(signup_body("Eve", "eve@example.com", "EvePass123!", Role::Admin)),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}
