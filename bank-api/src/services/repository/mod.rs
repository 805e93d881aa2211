//! Storage collaborator seam.
//!
//! The services only see [`BankRepository`]; durable storage is Postgres
//! ([`PgRepository`]), with a dashmap-backed [`InMemoryRepository`] for
//! tests and running without a database.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PgRepository;

use async_trait::async_trait;
use service_core::error::AppError;
use thiserror::Error;

use crate::models::{BankAccount, Transaction, User};

/// Failures surfaced by the storage layer that the services branch on.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The row's version token no longer matched at write time: a
    /// concurrent writer committed first.
    #[error("version conflict")]
    VersionConflict,

    /// A unique-key constraint rejected the write.
    #[error("duplicate key: {0}")]
    DuplicateKey(&'static str),

    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::VersionConflict => AppError::Conflict(anyhow::anyhow!(
                "Concurrent account update detected. Please retry the transaction."
            )),
            StoreError::DuplicateKey(key) => {
                AppError::Conflict(anyhow::anyhow!("Duplicate {}", key))
            }
            StoreError::Database(e) => AppError::DatabaseError(e),
        }
    }
}

/// Per-row CRUD, existence checks, and the scoped queries the services
/// need. Updates against accounts are version-checked; `apply_transaction`
/// couples the balance write and the ledger append into one atomic unit.
#[async_trait]
pub trait BankRepository: Send + Sync {
    // Users
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;
    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn email_exists(&self, email: &str) -> Result<bool, StoreError>;
    async fn update_user(&self, user: &User) -> Result<(), StoreError>;
    async fn delete_user(&self, id: &str) -> Result<(), StoreError>;
    async fn user_owns_accounts(&self, user_id: &str) -> Result<bool, StoreError>;

    // Accounts
    async fn insert_account(&self, account: &BankAccount) -> Result<(), StoreError>;
    async fn account_exists(&self, account_number: &str) -> Result<bool, StoreError>;
    async fn find_account(&self, account_number: &str) -> Result<Option<BankAccount>, StoreError>;
    async fn list_accounts_for_user(&self, user_id: &str) -> Result<Vec<BankAccount>, StoreError>;
    /// Persist the given account fields if `expected_version` still
    /// matches the stored row; bumps the version and returns the stored
    /// state. A stale token (or a concurrently deleted row) is a
    /// [`StoreError::VersionConflict`].
    async fn update_account(
        &self,
        account: &BankAccount,
        expected_version: i64,
    ) -> Result<BankAccount, StoreError>;
    async fn delete_account(&self, account_number: &str) -> Result<(), StoreError>;

    // Transactions
    async fn transaction_exists(&self, id: &str) -> Result<bool, StoreError>;
    /// Atomic unit: version-checked account write plus ledger append.
    /// Either both commit or neither does.
    async fn apply_transaction(
        &self,
        account: &BankAccount,
        expected_version: i64,
        transaction: &Transaction,
    ) -> Result<BankAccount, StoreError>;
    /// Ledger entries for one account, newest first.
    async fn list_transactions(&self, account_number: &str)
        -> Result<Vec<Transaction>, StoreError>;
    async fn find_transaction(
        &self,
        account_number: &str,
        transaction_id: &str,
    ) -> Result<Option<Transaction>, StoreError>;
}
