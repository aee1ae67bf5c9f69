//! # Login Tests

use axum::http::StatusCode;
use lib_core::dto::AuthResponse;
use lib_core::model::store::UserRepository;
use lib_core::model::{Role, UserForUpdate};

use super::*;

#[tokio::test]
async fn test_login_success() {
    // Arrange
    let app = TestApp::new().await;
    let (user, _) = app.user("Dana", Role::Distributor).await;

    // Act
    let (status, body) = app
        .send("POST", "/api/auth/login", None, Some(login_body(&user.email, "Password123!")))
        .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    let auth: AuthResponse = serde_json::from_value(body).unwrap();
    assert_eq!(auth.user.id, user.id);
    assert_eq!(auth.message, "Login successful");

    let stored = UserRepository::find_by_id(&app.state.db, user.id).await.unwrap().unwrap();
    assert!(stored.last_login.is_some());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new().await;
    let (user, _) = app.user("Dana", Role::Distributor).await;

    let (status, body) = app
        .send("POST", "/api/auth/login", None, Some(login_body(&user.email, "WrongPassword!")))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn test_login_unknown_email_matches_wrong_password() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send("POST", "/api/auth/login", None, Some(login_body("ghost@example.com", "Password123!")))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn test_login_disabled_account() {
    let app = TestApp::new().await;
    let (user, _) = app.user("Dana", Role::Distributor).await;
    UserRepository::update(&app.state.db, user.id, UserForUpdate::new().is_active(false))
        .await
        .unwrap();

    let (status, _) = app
        .send("POST", "/api/auth/login", None, Some(login_body(&user.email, "Password123!")))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}
