//! Ledger transaction model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Closed set of money-movement kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

impl TransactionType {
    /// Parse a client-supplied value, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "deposit" => Some(Self::Deposit),
            "withdrawal" => Some(Self::Withdrawal),
            _ => None,
        }
    }

    /// Get string representation for database and responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable ledger row. Once created a transaction is never updated or
/// deleted; the account balance is maintained incrementally alongside it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub account_number: String,
    pub user_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub transaction_type: String,
    pub reference: Option<String>,
    pub created_timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Get parsed transaction type.
    pub fn parsed_type(&self) -> Option<TransactionType> {
        TransactionType::parse(&self.transaction_type)
    }

    /// Signed amount as applied to the account balance (deposits
    /// positive, withdrawals negative).
    pub fn signed_amount(&self) -> Decimal {
        match self.parsed_type() {
            Some(TransactionType::Deposit) => self.amount,
            Some(TransactionType::Withdrawal) => -self.amount,
            None => Decimal::ZERO,
        }
    }
}
