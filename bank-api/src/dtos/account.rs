//! Bank account request/response shapes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::BankAccount;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBankAccountRequest {
    #[validate(length(min = 1, message = "Name must not be blank"))]
    pub name: String,
    pub account_type: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBankAccountRequest {
    #[validate(length(min = 1, message = "Name must not be blank"))]
    pub name: Option<String>,
    pub account_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccountResponse {
    pub account_number: String,
    pub sort_code: String,
    pub name: String,
    pub account_type: String,
    pub balance: Decimal,
    pub currency: String,
    pub created_timestamp: DateTime<Utc>,
    pub updated_timestamp: DateTime<Utc>,
}

impl From<BankAccount> for BankAccountResponse {
    fn from(account: BankAccount) -> Self {
        BankAccountResponse {
            account_number: account.account_number,
            sort_code: account.sort_code,
            name: account.name,
            account_type: account.account_type,
            balance: account.balance,
            currency: account.currency,
            created_timestamp: account.created_timestamp,
            updated_timestamp: account.updated_timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListBankAccountsResponse {
    pub accounts: Vec<BankAccountResponse>,
}
