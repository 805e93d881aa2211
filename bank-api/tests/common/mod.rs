//! Shared harness for the HTTP-level tests: spawns the application on a
//! random port against the in-memory store.

use bank_api::config::{Config, DatabaseConfig, JwtConfig, ServerConfig};
use bank_api::services::repository::InMemoryRepository;
use bank_api::Application;
use secrecy::Secret;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> TestApp {
        let config = Config {
            service_name: "bank-api".to_string(),
            log_level: "error".to_string(),
            otlp_endpoint: None,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                min_connections: 1,
            },
            jwt: JwtConfig {
                secret: Secret::new("test-secret-test-secret-test-secret!".to_string()),
                expiry_hours: 1,
            },
        };

        let application =
            Application::build_with_repository(config, Arc::new(InMemoryRepository::new()))
                .await
                .expect("Failed to build application");
        let address = format!("http://127.0.0.1:{}", application.port());
        tokio::spawn(application.run_until_stopped());

        TestApp {
            address,
            client: reqwest::Client::new(),
        }
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: &Value) -> reqwest::Response {
        let mut request = self.client.post(format!("{}{}", self.address, path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(format!("{}{}", self.address, path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request")
    }

    pub async fn patch(&self, path: &str, token: Option<&str>, body: &Value) -> reqwest::Response {
        let mut request = self.client.patch(format!("{}{}", self.address, path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut request = self.client.delete(format!("{}{}", self.address, path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request")
    }
}

pub fn user_payload(email: &str) -> Value {
    json!({
        "name": "Jane Doe",
        "address": {
            "line1": "1 Main Street",
            "town": "London",
            "county": "Greater London",
            "postcode": "E1 6AN"
        },
        "phoneNumber": "+447911123456",
        "email": email,
        "password": "supersecret"
    })
}

/// Register a user and return their id.
pub async fn register_user(app: &TestApp, email: &str) -> String {
    let response = app.post("/v1/users", None, &user_payload(email)).await;
    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.expect("Invalid user response");
    body["id"].as_str().expect("Missing user id").to_string()
}

/// Log in and return a bearer token.
pub async fn login(app: &TestApp, email: &str) -> String {
    let response = app
        .post(
            "/v1/auth/login",
            None,
            &json!({"email": email, "password": "supersecret"}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("Invalid login response");
    body["token"].as_str().expect("Missing token").to_string()
}

/// Register a user, log in, and return (user_id, token).
pub async fn authenticated_user(app: &TestApp, email: &str) -> (String, String) {
    let user_id = register_user(app, email).await;
    let token = login(app, email).await;
    (user_id, token)
}

/// Create a personal account and return its account number.
pub async fn create_account(app: &TestApp, token: &str) -> String {
    let response = app
        .post(
            "/v1/accounts",
            Some(token),
            &json!({"name": "Main Account", "accountType": "personal"}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.expect("Invalid account response");
    body["accountNumber"]
        .as_str()
        .expect("Missing account number")
        .to_string()
}

/// Post a transaction; returns the raw response for the caller to assert.
pub async fn post_transaction(
    app: &TestApp,
    token: &str,
    account_number: &str,
    transaction_type: &str,
    amount: &str,
) -> reqwest::Response {
    app.post(
        &format!("/v1/accounts/{}/transactions", account_number),
        Some(token),
        &json!({"amount": amount, "currency": "GBP", "type": transaction_type}),
    )
    .await
}
