//! Bank account model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Fixed sort code shared by every account.
pub const SORT_CODE: &str = "10-10-10";

/// Closed set of supported account types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Personal,
}

impl AccountType {
    /// Parse a client-supplied value, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "personal" => Some(Self::Personal),
            _ => None,
        }
    }

    /// Get string representation for database and responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed set of supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "GBP")]
    Gbp,
}

impl Currency {
    pub fn parse(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "GBP" => Some(Self::Gbp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gbp => "GBP",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bank account row.
///
/// The `version` column is the optimistic-concurrency token: every
/// successful write bumps it, and a write carrying a stale value loses.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BankAccount {
    pub account_number: String,
    pub sort_code: String,
    pub name: String,
    pub account_type: String,
    pub balance: Decimal,
    pub currency: String,
    pub user_id: String,
    pub version: i64,
    pub created_timestamp: DateTime<Utc>,
    pub updated_timestamp: DateTime<Utc>,
}

impl BankAccount {
    /// Get parsed account type.
    pub fn parsed_type(&self) -> Option<AccountType> {
        AccountType::parse(&self.account_type)
    }
}
