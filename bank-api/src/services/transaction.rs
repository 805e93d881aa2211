//! Transaction service: validate, mutate the balance under optimistic
//! concurrency, and append the ledger row in one atomic unit.

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use service_core::error::AppError;
use std::sync::Arc;
use tracing::{info, instrument};

use super::account::AccountService;
use super::repository::{BankRepository, StoreError};
use crate::models::{Currency, Transaction, TransactionType};
use crate::utils::id;

/// Largest amount a single transaction (and an account balance) may reach.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 2);

/// Client-supplied fields of a new transaction.
#[derive(Debug, Clone)]
pub struct TransactionInput {
    pub amount: Decimal,
    pub currency: String,
    pub transaction_type: String,
    pub reference: Option<String>,
}

#[derive(Clone)]
pub struct TransactionService {
    repo: Arc<dyn BankRepository>,
    accounts: AccountService,
}

/// Round to two fractional digits, half away from zero, and pin the scale
/// so amounts always carry two decimal places.
pub(crate) fn normalize_amount(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

impl TransactionService {
    pub fn new(repo: Arc<dyn BankRepository>, accounts: AccountService) -> Self {
        Self { repo, accounts }
    }

    /// Create a transaction against an owned account.
    ///
    /// The balance arithmetic is computed from the account state read at
    /// authorization time, and the write carries that state's version
    /// token: if a concurrent transaction on the same account committed
    /// first, the whole operation aborts with a retryable conflict and no
    /// ledger row is written. No internal retry; resubmission is the
    /// caller's call.
    #[instrument(skip(self, input), fields(account_number = %account_number))]
    pub async fn create_transaction(
        &self,
        account_number: &str,
        owner_id: &str,
        input: TransactionInput,
    ) -> Result<Transaction, AppError> {
        let account = self.accounts.resolve_owned(account_number, owner_id).await?;

        let user = self
            .repo
            .find_user(owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;

        let currency = Currency::parse(&input.currency)
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid currency")))?;

        let transaction_type = TransactionType::parse(&input.transaction_type)
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid transaction type")))?;

        let amount = normalize_amount(input.amount);
        if amount < Decimal::ZERO || amount > MAX_AMOUNT {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Transaction amount must be between 0.00 and 10000.00"
            )));
        }

        let new_balance = match transaction_type {
            TransactionType::Withdrawal => {
                if amount > account.balance {
                    return Err(AppError::UnprocessableEntity(anyhow::anyhow!(
                        "Insufficient funds to process transaction"
                    )));
                }
                account.balance - amount
            }
            TransactionType::Deposit => {
                let balance = account.balance + amount;
                if balance > MAX_AMOUNT {
                    return Err(AppError::UnprocessableEntity(anyhow::anyhow!(
                        "Deposit would exceed the maximum account balance"
                    )));
                }
                balance
            }
        };

        let transaction_id = self.unique_transaction_id().await?;

        let expected_version = account.version;
        let now = Utc::now();
        let mut updated = account;
        updated.balance = new_balance;
        updated.updated_timestamp = now;

        let transaction = Transaction {
            id: transaction_id,
            account_number: updated.account_number.clone(),
            user_id: user.id,
            amount,
            currency: currency.as_str().to_string(),
            transaction_type: transaction_type.as_str().to_string(),
            reference: input.reference,
            created_timestamp: now,
        };

        match self
            .repo
            .apply_transaction(&updated, expected_version, &transaction)
            .await
        {
            Ok(_) => {
                info!(
                    transaction_id = %transaction.id,
                    account_number = %transaction.account_number,
                    transaction_type = %transaction.transaction_type,
                    "Transaction created"
                );
                Ok(transaction)
            }
            Err(StoreError::VersionConflict) => Err(AppError::Conflict(anyhow::anyhow!(
                "Concurrent account update detected. Please retry the transaction."
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Ledger entries for an owned account, newest first.
    pub async fn list_transactions(
        &self,
        account_number: &str,
        owner_id: &str,
    ) -> Result<Vec<Transaction>, AppError> {
        self.accounts.resolve_owned(account_number, owner_id).await?;
        Ok(self.repo.list_transactions(account_number).await?)
    }

    /// Single ledger entry; the id must belong to that specific account.
    pub async fn get_transaction(
        &self,
        account_number: &str,
        transaction_id: &str,
        owner_id: &str,
    ) -> Result<Transaction, AppError> {
        self.accounts.resolve_owned(account_number, owner_id).await?;
        self.repo
            .find_transaction(account_number, transaction_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Transaction not found")))
    }

    async fn unique_transaction_id(&self) -> Result<String, AppError> {
        for _ in 0..id::MAX_ID_ATTEMPTS {
            let candidate = id::new_transaction_id();
            if !self.repo.transaction_exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(AppError::Conflict(anyhow::anyhow!(
            "Could not allocate a unique transaction id. Please retry."
        )))
    }
}
