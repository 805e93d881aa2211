mod common;

use common::{authenticated_user, create_account, post_transaction, TestApp};
use serde_json::{json, Value};

async fn account_balance(app: &TestApp, token: &str, account_number: &str) -> String {
    let response = app
        .get(&format!("/v1/accounts/{}", account_number), Some(token))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    body["balance"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn deposit_then_withdraw_lifecycle() {
    let app = TestApp::spawn().await;
    let (user_id, token) = authenticated_user(&app, "owner@example.com").await;
    let account_number = create_account(&app, &token).await;

    let response = post_transaction(&app, &token, &account_number, "deposit", "100.00").await;
    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert!(body["id"].as_str().unwrap().starts_with("tan-"));
    assert_eq!(body["amount"], "100.00");
    assert_eq!(body["type"], "deposit");
    assert_eq!(body["userId"], user_id.as_str());
    assert_eq!(account_balance(&app, &token, &account_number).await, "100.00");

    // Overdrawing is refused and the balance is untouched.
    let response = post_transaction(&app, &token, &account_number, "withdrawal", "150.00").await;
    assert_eq!(response.status().as_u16(), 422);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Insufficient funds to process transaction");
    assert_eq!(account_balance(&app, &token, &account_number).await, "100.00");

    let response = post_transaction(&app, &token, &account_number, "withdrawal", "100.00").await;
    assert_eq!(response.status().as_u16(), 201);
    assert_eq!(account_balance(&app, &token, &account_number).await, "0.00");
}

#[tokio::test]
async fn amounts_round_half_away_from_zero() {
    let app = TestApp::spawn().await;
    let (_, token) = authenticated_user(&app, "owner@example.com").await;
    let account_number = create_account(&app, &token).await;

    let response = post_transaction(&app, &token, &account_number, "deposit", "10.005").await;
    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["amount"], "10.01");
    assert_eq!(account_balance(&app, &token, &account_number).await, "10.01");
}

#[tokio::test]
async fn amount_outside_range_is_rejected() {
    let app = TestApp::spawn().await;
    let (_, token) = authenticated_user(&app, "owner@example.com").await;
    let account_number = create_account(&app, &token).await;

    let response = post_transaction(&app, &token, &account_number, "deposit", "10000.01").await;
    assert_eq!(response.status().as_u16(), 400);

    let response = post_transaction(&app, &token, &account_number, "deposit", "-5.00").await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn deposit_cannot_push_balance_over_the_cap() {
    let app = TestApp::spawn().await;
    let (_, token) = authenticated_user(&app, "owner@example.com").await;
    let account_number = create_account(&app, &token).await;

    let response = post_transaction(&app, &token, &account_number, "deposit", "9000.00").await;
    assert_eq!(response.status().as_u16(), 201);

    let response = post_transaction(&app, &token, &account_number, "deposit", "2000.00").await;
    assert_eq!(response.status().as_u16(), 422);
    assert_eq!(account_balance(&app, &token, &account_number).await, "9000.00");
}

#[tokio::test]
async fn unsupported_currency_and_type_are_rejected() {
    let app = TestApp::spawn().await;
    let (_, token) = authenticated_user(&app, "owner@example.com").await;
    let account_number = create_account(&app, &token).await;

    let response = app
        .post(
            &format!("/v1/accounts/{}/transactions", account_number),
            Some(&token),
            &json!({"amount": "10.00", "currency": "USD", "type": "deposit"}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 400);

    let response = app
        .post(
            &format!("/v1/accounts/{}/transactions", account_number),
            Some(&token),
            &json!({"amount": "10.00", "currency": "GBP", "type": "transfer"}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn transactions_on_foreign_accounts_are_forbidden() {
    let app = TestApp::spawn().await;
    let (_, owner_token) = authenticated_user(&app, "owner@example.com").await;
    let (_, intruder_token) = authenticated_user(&app, "intruder@example.com").await;
    let account_number = create_account(&app, &owner_token).await;

    let response =
        post_transaction(&app, &intruder_token, &account_number, "deposit", "10.00").await;
    assert_eq!(response.status().as_u16(), 403);

    let response = app
        .get(
            &format!("/v1/accounts/{}/transactions", account_number),
            Some(&intruder_token),
        )
        .await;
    assert_eq!(response.status().as_u16(), 403);

    let response = post_transaction(&app, &owner_token, "01999999", "deposit", "10.00").await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn listing_returns_newest_first() {
    let app = TestApp::spawn().await;
    let (_, token) = authenticated_user(&app, "owner@example.com").await;
    let account_number = create_account(&app, &token).await;

    for amount in ["10.00", "20.00", "30.00"] {
        let response = post_transaction(&app, &token, &account_number, "deposit", amount).await;
        assert_eq!(response.status().as_u16(), 201);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let response = app
        .get(
            &format!("/v1/accounts/{}/transactions", account_number),
            Some(&token),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    let amounts: Vec<&str> = body["transactions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["amount"].as_str().unwrap())
        .collect();
    assert_eq!(amounts, vec!["30.00", "20.00", "10.00"]);
}

#[tokio::test]
async fn fetching_a_single_transaction_checks_the_account_first() {
    let app = TestApp::spawn().await;
    let (_, token) = authenticated_user(&app, "owner@example.com").await;
    let account_number = create_account(&app, &token).await;
    let other_account = create_account(&app, &token).await;

    let response = post_transaction(&app, &token, &account_number, "deposit", "50.00").await;
    let transaction: Value = response.json().await.unwrap();
    let transaction_id = transaction["id"].as_str().unwrap();

    let response = app
        .get(
            &format!(
                "/v1/accounts/{}/transactions/{}",
                account_number, transaction_id
            ),
            Some(&token),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    // The id exists but belongs to a different account.
    let response = app
        .get(
            &format!(
                "/v1/accounts/{}/transactions/{}",
                other_account, transaction_id
            ),
            Some(&token),
        )
        .await;
    assert_eq!(response.status().as_u16(), 404);

    let response = app
        .get(
            &format!("/v1/accounts/{}/transactions/tan-missing", account_number),
            Some(&token),
        )
        .await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn concurrent_deposits_never_lose_money() {
    let app = TestApp::spawn().await;
    let (_, token) = authenticated_user(&app, "owner@example.com").await;
    let account_number = create_account(&app, &token).await;

    let mut handles = Vec::new();
    for _ in 0..4 {
        let client = app.client.clone();
        let url = format!(
            "{}/v1/accounts/{}/transactions",
            app.address, account_number
        );
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            client
                .post(url)
                .bearer_auth(token)
                .json(&json!({"amount": "10.00", "currency": "GBP", "type": "deposit"}))
                .send()
                .await
                .expect("Failed to execute request")
                .status()
                .as_u16()
        }));
    }

    let mut created = 0u32;
    for handle in handles {
        let status = handle.await.unwrap();
        // A loser of the version race gets a retryable conflict.
        assert!(status == 201 || status == 409, "unexpected status {status}");
        if status == 201 {
            created += 1;
        }
    }
    assert!(created >= 1);

    let balance = account_balance(&app, &token, &account_number).await;
    let expected = format!("{}.00", created * 10);
    assert_eq!(balance, expected);
}
