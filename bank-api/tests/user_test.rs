mod common;

use common::{authenticated_user, create_account, register_user, user_payload, TestApp};
use serde_json::{json, Value};

#[tokio::test]
async fn register_returns_created_user_without_credentials() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/v1/users", None, &user_payload("jane@example.com"))
        .await;
    assert_eq!(response.status().as_u16(), 201);

    let body: Value = response.json().await.unwrap();
    let user_id = body["id"].as_str().unwrap();
    assert!(user_id.starts_with("usr-"));
    assert_eq!(body["name"], "Jane Doe");
    assert_eq!(body["email"], "jane@example.com");
    assert_eq!(body["address"]["town"], "London");
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = TestApp::spawn().await;
    register_user(&app, "jane@example.com").await;

    let response = app
        .post("/v1/users", None, &user_payload("jane@example.com"))
        .await;
    assert_eq!(response.status().as_u16(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Email already exists");
}

#[tokio::test]
async fn invalid_registration_reports_field_details() {
    let app = TestApp::spawn().await;

    let mut payload = user_payload("jane@example.com");
    payload["phoneNumber"] = json!("07911123456");
    payload["email"] = json!("not-an-email");

    let response = app.post("/v1/users", None, &payload).await;
    assert_eq!(response.status().as_u16(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Invalid details supplied");
    let details = body["details"].as_array().unwrap();
    let fields: Vec<&str> = details
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"phoneNumber"));
    assert!(fields.contains(&"email"));
    assert!(details.iter().all(|d| d["type"] == "validation_error"));
}

#[tokio::test]
async fn users_can_only_fetch_their_own_record() {
    let app = TestApp::spawn().await;
    let (user_id, token) = authenticated_user(&app, "owner@example.com").await;
    let (other_id, _) = authenticated_user(&app, "other@example.com").await;

    let response = app
        .get(&format!("/v1/users/{}", user_id), Some(&token))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], user_id.as_str());

    // Someone else's record exists but is off limits.
    let response = app
        .get(&format!("/v1/users/{}", other_id), Some(&token))
        .await;
    assert_eq!(response.status().as_u16(), 403);

    // A missing record is a 404, not a 403.
    let response = app
        .get("/v1/users/usr-doesnotexist", Some(&token))
        .await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn malformed_user_id_is_a_bad_request() {
    let app = TestApp::spawn().await;
    let (_, token) = authenticated_user(&app, "owner@example.com").await;

    let response = app.get("/v1/users/12345", Some(&token)).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn patch_updates_only_supplied_fields() {
    let app = TestApp::spawn().await;
    let (user_id, token) = authenticated_user(&app, "owner@example.com").await;

    let response = app
        .patch(
            &format!("/v1/users/{}", user_id),
            Some(&token),
            &json!({"name": "Jane Smith"}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "Jane Smith");
    assert_eq!(body["email"], "owner@example.com");
    assert_eq!(body["phoneNumber"], "+447911123456");
}

#[tokio::test]
async fn patch_cannot_take_another_users_email() {
    let app = TestApp::spawn().await;
    let (user_id, token) = authenticated_user(&app, "owner@example.com").await;
    authenticated_user(&app, "taken@example.com").await;

    let response = app
        .patch(
            &format!("/v1/users/{}", user_id),
            Some(&token),
            &json!({"email": "taken@example.com"}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Email already exists");
}

#[tokio::test]
async fn delete_is_refused_while_accounts_remain() {
    let app = TestApp::spawn().await;
    let (user_id, token) = authenticated_user(&app, "owner@example.com").await;
    let account_number = create_account(&app, &token).await;

    let response = app
        .delete(&format!("/v1/users/{}", user_id), Some(&token))
        .await;
    assert_eq!(response.status().as_u16(), 409);

    let response = app
        .delete(&format!("/v1/accounts/{}", account_number), Some(&token))
        .await;
    assert_eq!(response.status().as_u16(), 204);

    let response = app
        .delete(&format!("/v1/users/{}", user_id), Some(&token))
        .await;
    assert_eq!(response.status().as_u16(), 204);

    // The record is gone for good.
    let response = app
        .get(&format!("/v1/users/{}", user_id), Some(&token))
        .await;
    assert_eq!(response.status().as_u16(), 404);
}
