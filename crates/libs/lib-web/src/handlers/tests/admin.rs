//! Admin-only routes: user management and the approval queue.

use axum::http::StatusCode;
use lib_core::model::Role;
use serde_json::json;

use super::TestApp;

#[tokio::test]
async fn test_non_admin_is_forbidden() {
    let app = TestApp::new().await;
    let (_, token) = app.user("Dana", Role::Distributor).await;

    let (status, body) = app.send("GET", "/api/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "Forbidden");

    let (status, _) = app.send("GET", "/api/admin/summary", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_user_management() {
    let app = TestApp::new().await;
    let (admin, token) = app.user("Ada", Role::Admin).await;

    let (status, created) = app
        .send(
            "POST",
            "/api/users",
            Some(&token),
            Some(json!({ "name": "Sam", "email": "sam@example.com", "password": "SamPass123!", "role": "supplier" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["role"], "supplier");
    assert!(created.get("password_hash").is_none());
    let uri = format!("/api/users/{}", created["id"]);

    let (status, _) = app
        .send(
            "POST",
            "/api/users",
            Some(&token),
            Some(json!({ "name": "Sam", "email": "sam@example.com", "password": "SamPass123!", "role": "supplier" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = app
        .send("PUT", &uri, Some(&token), Some(json!({ "role": "distributor", "is_active": false })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["role"], "distributor");
    assert_eq!(updated["is_active"], false);

    let (_, suppliers) = app.send("GET", "/api/users?role=supplier", Some(&token), None).await;
    assert!(suppliers.as_array().unwrap().is_empty());

    let (status, _) = app.send("DELETE", &format!("/api/users/{}", admin.id), Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.send("DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.send("GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_user_update_rejected() {
    let app = TestApp::new().await;
    let (admin, token) = app.user("Ada", Role::Admin).await;

    let (status, _) = app
        .send("PUT", &format!("/api/users/{}", admin.id), Some(&token), Some(json!({})))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_approval_flow_draws_stock() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("Ada", Role::Admin).await;
    let (_, user) = app.user("Mo", Role::Manufacturer).await;

    let (_, part) = app
        .send("POST", "/api/parts", Some(&user), Some(json!({ "name": "Rotor", "quantity": 3 })))
        .await;
    let (_, tx) = app
        .send(
            "POST",
            "/api/transactions",
            Some(&user),
            Some(json!({ "part_name": "Rotor", "type": "demand", "quantity": 5, "from": "Plant", "to": "Dealer" })),
        )
        .await;
    let id = tx["id"].as_i64().unwrap();

    let (status, approved) = app
        .send("POST", &format!("/api/admin/transactions/{}/approve", id), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");
    assert_eq!(approved["approved_by"], "Ada");
    assert!(approved["approved_at"].is_string());

    // Approved transactions cannot be approved or rejected again.
    let (status, _) = app
        .send("POST", &format!("/api/admin/transactions/{}/reject", id), Some(&admin), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, completed) = app
        .send("POST", &format!("/api/transactions/{}/complete", id), Some(&user), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "completed");

    // Demand of 5 against a stock of 3 stops at zero.
    let (_, part) = app.send("GET", &format!("/api/parts/{}", part["id"]), Some(&user), None).await;
    assert_eq!(part["quantity"], 0);
}

#[tokio::test]
async fn test_reject_records_reason() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("Ada", Role::Admin).await;
    let (_, user) = app.user("Mo", Role::Manufacturer).await;

    let (_, tx) = app
        .send(
            "POST",
            "/api/transactions",
            Some(&user),
            Some(json!({ "part_name": "Rotor", "type": "demand", "quantity": 1, "from": "Plant", "to": "Dealer" })),
        )
        .await;

    let (status, rejected) = app
        .send(
            "POST",
            &format!("/api/admin/transactions/{}/reject", tx["id"]),
            Some(&admin),
            Some(json!({ "reason": "duplicate order" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(rejected["status"], "rejected");
    assert_eq!(rejected["rejection_reason"], "duplicate order");
    assert_eq!(rejected["approved_by"], "Ada");
}

#[tokio::test]
async fn test_summary_and_dataset_fall_back_to_demo() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("Ada", Role::Admin).await;

    let (status, dataset) = app.send("GET", "/api/admin/dataset", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dataset["source"], "demo");
    assert!(!dataset["parts"].as_array().unwrap().is_empty());

    let (status, _) = app.send("GET", "/api/admin/summary", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
}
