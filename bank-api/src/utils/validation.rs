//! Request validation helpers.
//!
//! `ValidatedJson` runs `validator::Validate` on the deserialized body and
//! surfaces failures as the 400 field-detail response. The pattern checks
//! mirror the path-parameter constraints of the public API.

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use service_core::error::AppError;
use validator::{Validate, ValidationError};

static ACCOUNT_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^01\d{6}$").expect("valid pattern"));
static USER_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^usr-[A-Za-z0-9]+$").expect("valid pattern"));
static TRANSACTION_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^tan-[A-Za-z0-9]+$").expect("valid pattern"));
static PHONE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[1-9]\d{1,14}$").expect("valid pattern"));

pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Malformed request body: {}", e)))?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

/// Build a single field-level validation error with a message.
pub fn field_error(code: &'static str, message: &str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.to_string().into());
    error
}

pub fn is_valid_phone_number(value: &str) -> bool {
    PHONE_NUMBER_RE.is_match(value)
}

/// Path-parameter check for account numbers (`^01\d{6}$`).
pub fn check_account_number(value: &str) -> Result<(), AppError> {
    if ACCOUNT_NUMBER_RE.is_match(value) {
        Ok(())
    } else {
        Err(AppError::BadRequest(anyhow::anyhow!(
            "Invalid account number format"
        )))
    }
}

/// Path-parameter check for user ids (`^usr-[A-Za-z0-9]+$`).
pub fn check_user_id(value: &str) -> Result<(), AppError> {
    if USER_ID_RE.is_match(value) {
        Ok(())
    } else {
        Err(AppError::BadRequest(anyhow::anyhow!(
            "Invalid user id format"
        )))
    }
}

/// Path-parameter check for transaction ids (`^tan-[A-Za-z0-9]+$`).
pub fn check_transaction_id(value: &str) -> Result<(), AppError> {
    if TRANSACTION_ID_RE.is_match(value) {
        Ok(())
    } else {
        Err(AppError::BadRequest(anyhow::anyhow!(
            "Invalid transaction id format"
        )))
    }
}
