//! Transaction handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

use crate::dtos::{CreateTransactionRequest, ListTransactionsResponse, TransactionResponse};
use crate::middleware::AuthUser;
use crate::services::TransactionInput;
use crate::startup::AppState;
use crate::utils::validation::{check_account_number, check_transaction_id};
use crate::utils::ValidatedJson;

/// POST /v1/accounts/:account_number/transactions
pub async fn create_transaction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(account_number): Path<String>,
    ValidatedJson(request): ValidatedJson<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    check_account_number(&account_number)?;
    let transaction = state
        .transactions
        .create_transaction(
            &account_number,
            &user_id,
            TransactionInput {
                amount: request.amount,
                currency: request.currency,
                transaction_type: request.transaction_type,
                reference: request.reference,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(transaction.into())))
}

/// GET /v1/accounts/:account_number/transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(account_number): Path<String>,
) -> Result<Json<ListTransactionsResponse>, AppError> {
    check_account_number(&account_number)?;
    let transactions = state
        .transactions
        .list_transactions(&account_number, &user_id)
        .await?;
    Ok(Json(ListTransactionsResponse {
        transactions: transactions.into_iter().map(Into::into).collect(),
    }))
}

/// GET /v1/accounts/:account_number/transactions/:transaction_id
pub async fn get_transaction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((account_number, transaction_id)): Path<(String, String)>,
) -> Result<Json<TransactionResponse>, AppError> {
    check_account_number(&account_number)?;
    check_transaction_id(&transaction_id)?;
    let transaction = state
        .transactions
        .get_transaction(&account_number, &transaction_id, &user_id)
        .await?;
    Ok(Json(transaction.into()))
}
