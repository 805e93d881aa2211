//! Bank account handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

use crate::dtos::{
    BankAccountResponse, CreateBankAccountRequest, ListBankAccountsResponse,
    UpdateBankAccountRequest,
};
use crate::middleware::AuthUser;
use crate::services::AccountPatch;
use crate::startup::AppState;
use crate::utils::validation::check_account_number;
use crate::utils::ValidatedJson;

/// POST /v1/accounts
pub async fn create_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(request): ValidatedJson<CreateBankAccountRequest>,
) -> Result<(StatusCode, Json<BankAccountResponse>), AppError> {
    let account = state
        .accounts
        .create_account(&user_id, &request.name, &request.account_type)
        .await?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

/// GET /v1/accounts
pub async fn list_accounts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ListBankAccountsResponse>, AppError> {
    let accounts = state.accounts.list_accounts(&user_id).await?;
    Ok(Json(ListBankAccountsResponse {
        accounts: accounts.into_iter().map(Into::into).collect(),
    }))
}

/// GET /v1/accounts/:account_number
pub async fn get_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(account_number): Path<String>,
) -> Result<Json<BankAccountResponse>, AppError> {
    check_account_number(&account_number)?;
    let account = state
        .accounts
        .resolve_owned(&account_number, &user_id)
        .await?;
    Ok(Json(account.into()))
}

/// PATCH /v1/accounts/:account_number
pub async fn update_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(account_number): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateBankAccountRequest>,
) -> Result<Json<BankAccountResponse>, AppError> {
    check_account_number(&account_number)?;
    let account = state
        .accounts
        .update_account(
            &account_number,
            &user_id,
            AccountPatch {
                name: request.name,
                account_type: request.account_type,
            },
        )
        .await?;
    Ok(Json(account.into()))
}

/// DELETE /v1/accounts/:account_number
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(account_number): Path<String>,
) -> Result<StatusCode, AppError> {
    check_account_number(&account_number)?;
    state
        .accounts
        .delete_account(&account_number, &user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
