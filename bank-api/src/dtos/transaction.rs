//! Transaction request/response shapes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::models::Transaction;
use crate::utils::validation::field_error;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub amount: Decimal,
    pub currency: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
    #[serde(default)]
    pub reference: Option<String>,
}

impl Validate for CreateTransactionRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.amount.is_sign_negative() {
            errors.add(
                "amount",
                field_error("range", "Amount must not be negative"),
            );
        }
        if self.currency.trim().is_empty() {
            errors.add("currency", field_error("blank", "Currency must not be blank"));
        }
        if self.transaction_type.trim().is_empty() {
            errors.add("type", field_error("blank", "Type must not be blank"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: String,
    pub amount: Decimal,
    pub currency: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub user_id: String,
    pub created_timestamp: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(transaction: Transaction) -> Self {
        TransactionResponse {
            id: transaction.id,
            amount: transaction.amount,
            currency: transaction.currency,
            transaction_type: transaction.transaction_type,
            reference: transaction.reference,
            user_id: transaction.user_id,
            created_timestamp: transaction.created_timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListTransactionsResponse {
    pub transactions: Vec<TransactionResponse>,
}
