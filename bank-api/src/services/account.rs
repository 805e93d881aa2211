//! Account service: creation, lookup, mutation, deletion, and the
//! ownership ladder used by every account-scoped operation.

use chrono::Utc;
use rust_decimal::Decimal;
use service_core::error::AppError;
use std::sync::Arc;
use tracing::{info, instrument};

use super::repository::{BankRepository, StoreError};
use crate::models::{AccountType, BankAccount, Currency, SORT_CODE};
use crate::utils::id;

/// Outcome of resolving an account number against a caller identity.
///
/// "Exists but not yours" and "does not exist" are deliberately distinct:
/// the former is a `Forbidden`, the latter a `NotFound`, and the
/// distinction is part of the observable API contract.
#[derive(Debug)]
pub enum AccountAccess {
    Owned(BankAccount),
    ForeignOwner,
    Missing,
}

/// Fields a partial account update may carry; absent means unchanged.
#[derive(Debug, Default)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub account_type: Option<String>,
}

#[derive(Clone)]
pub struct AccountService {
    repo: Arc<dyn BankRepository>,
}

impl AccountService {
    pub fn new(repo: Arc<dyn BankRepository>) -> Self {
        Self { repo }
    }

    /// Create an account for an existing user: balance starts at 0.00 in
    /// the fixed currency, and the account number comes from a bounded
    /// generate-and-check loop with the storage unique key as the final
    /// arbiter against concurrent creations.
    #[instrument(skip(self, name))]
    pub async fn create_account(
        &self,
        owner_id: &str,
        name: &str,
        account_type: &str,
    ) -> Result<BankAccount, AppError> {
        let user = self
            .repo
            .find_user(owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;

        let account_type = AccountType::parse(account_type)
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid account type")))?;

        for _ in 0..id::MAX_ID_ATTEMPTS {
            let account_number = id::new_account_number();
            if self.repo.account_exists(&account_number).await? {
                continue;
            }

            let now = Utc::now();
            let account = BankAccount {
                account_number,
                sort_code: SORT_CODE.to_string(),
                name: name.to_string(),
                account_type: account_type.as_str().to_string(),
                balance: Decimal::new(0, 2),
                currency: Currency::Gbp.as_str().to_string(),
                user_id: user.id.clone(),
                version: 0,
                created_timestamp: now,
                updated_timestamp: now,
            };

            match self.repo.insert_account(&account).await {
                Ok(()) => {
                    info!(
                        account_number = %account.account_number,
                        user_id = %account.user_id,
                        "Account created"
                    );
                    return Ok(account);
                }
                // Lost the race for this number; generate another.
                Err(StoreError::DuplicateKey(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::Conflict(anyhow::anyhow!(
            "Could not allocate a unique account number. Please retry."
        )))
    }

    pub async fn list_accounts(&self, owner_id: &str) -> Result<Vec<BankAccount>, AppError> {
        Ok(self.repo.list_accounts_for_user(owner_id).await?)
    }

    /// Classify an account number relative to a caller: owned, owned by
    /// someone else, or missing.
    pub async fn classify(
        &self,
        account_number: &str,
        owner_id: &str,
    ) -> Result<AccountAccess, AppError> {
        match self.repo.find_account(account_number).await? {
            Some(account) if account.user_id == owner_id => Ok(AccountAccess::Owned(account)),
            Some(_) => Ok(AccountAccess::ForeignOwner),
            None => Ok(AccountAccess::Missing),
        }
    }

    /// The ownership ladder: the authorized account record, `Forbidden`
    /// when it exists under another owner, `NotFound` when it does not
    /// exist at all.
    pub async fn resolve_owned(
        &self,
        account_number: &str,
        owner_id: &str,
    ) -> Result<BankAccount, AppError> {
        match self.classify(account_number, owner_id).await? {
            AccountAccess::Owned(account) => Ok(account),
            AccountAccess::ForeignOwner => {
                Err(AppError::Forbidden(anyhow::anyhow!("Access denied")))
            }
            AccountAccess::Missing => {
                Err(AppError::NotFound(anyhow::anyhow!("Bank account not found")))
            }
        }
    }

    /// Partial update of mutable account fields. Goes through the same
    /// version-checked write as balance mutations, so a losing patch
    /// surfaces as a retryable conflict.
    #[instrument(skip(self, patch))]
    pub async fn update_account(
        &self,
        account_number: &str,
        owner_id: &str,
        patch: AccountPatch,
    ) -> Result<BankAccount, AppError> {
        let mut account = self.resolve_owned(account_number, owner_id).await?;
        let expected_version = account.version;

        if let Some(name) = patch.name {
            account.name = name;
        }
        if let Some(account_type) = patch.account_type {
            let parsed = AccountType::parse(&account_type)
                .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid account type")))?;
            account.account_type = parsed.as_str().to_string();
        }
        account.updated_timestamp = Utc::now();

        Ok(self.repo.update_account(&account, expected_version).await?)
    }

    /// Delete an owned account. Existing transactions are left in place;
    /// user deletion is the guarded direction, not this one.
    #[instrument(skip(self))]
    pub async fn delete_account(
        &self,
        account_number: &str,
        owner_id: &str,
    ) -> Result<(), AppError> {
        let account = self.resolve_owned(account_number, owner_id).await?;
        self.repo.delete_account(&account.account_number).await?;
        info!(account_number = %account.account_number, "Account deleted");
        Ok(())
    }
}
