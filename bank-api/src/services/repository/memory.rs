//! In-memory repository used by the test suite and for running the
//! service without a database.
//!
//! The account entry lock is the serialisation point: `update_account`
//! and `apply_transaction` hold it across the version check and the
//! write, which gives the same compare-and-swap semantics as the
//! version-guarded UPDATE in Postgres.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{BankRepository, StoreError};
use crate::models::{BankAccount, Transaction, User};

#[derive(Default)]
pub struct InMemoryRepository {
    users: DashMap<String, User>,
    accounts: DashMap<String, BankAccount>,
    transactions: DashMap<String, Transaction>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BankRepository for InMemoryRepository {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        if self
            .users
            .iter()
            .any(|entry| entry.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::DuplicateKey("email"));
        }
        match self.users.entry(user.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateKey("user id")),
            Entry::Vacant(vacant) => {
                vacant.insert(user.clone());
                Ok(())
            }
        }
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(id).map(|entry| entry.clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.email.eq_ignore_ascii_case(email))
            .map(|entry| entry.clone()))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self
            .users
            .iter()
            .any(|entry| entry.email.eq_ignore_ascii_case(email)))
    }

    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        if self
            .users
            .iter()
            .any(|entry| entry.id != user.id && entry.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::DuplicateKey("email"));
        }
        if let Some(mut entry) = self.users.get_mut(&user.id) {
            *entry = user.clone();
        }
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> Result<(), StoreError> {
        self.users.remove(id);
        Ok(())
    }

    async fn user_owns_accounts(&self, user_id: &str) -> Result<bool, StoreError> {
        Ok(self.accounts.iter().any(|entry| entry.user_id == user_id))
    }

    async fn insert_account(&self, account: &BankAccount) -> Result<(), StoreError> {
        match self.accounts.entry(account.account_number.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateKey("account number")),
            Entry::Vacant(vacant) => {
                vacant.insert(account.clone());
                Ok(())
            }
        }
    }

    async fn account_exists(&self, account_number: &str) -> Result<bool, StoreError> {
        Ok(self.accounts.contains_key(account_number))
    }

    async fn find_account(&self, account_number: &str) -> Result<Option<BankAccount>, StoreError> {
        Ok(self.accounts.get(account_number).map(|entry| entry.clone()))
    }

    async fn list_accounts_for_user(&self, user_id: &str) -> Result<Vec<BankAccount>, StoreError> {
        let mut accounts: Vec<BankAccount> = self
            .accounts
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.clone())
            .collect();
        accounts.sort_by(|a, b| a.created_timestamp.cmp(&b.created_timestamp));
        Ok(accounts)
    }

    async fn update_account(
        &self,
        account: &BankAccount,
        expected_version: i64,
    ) -> Result<BankAccount, StoreError> {
        let mut entry = self
            .accounts
            .get_mut(&account.account_number)
            .ok_or(StoreError::VersionConflict)?;
        if entry.version != expected_version {
            return Err(StoreError::VersionConflict);
        }
        entry.name = account.name.clone();
        entry.account_type = account.account_type.clone();
        entry.balance = account.balance;
        entry.updated_timestamp = account.updated_timestamp;
        entry.version += 1;
        Ok(entry.clone())
    }

    async fn delete_account(&self, account_number: &str) -> Result<(), StoreError> {
        self.accounts.remove(account_number);
        Ok(())
    }

    async fn transaction_exists(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.transactions.contains_key(id))
    }

    async fn apply_transaction(
        &self,
        account: &BankAccount,
        expected_version: i64,
        transaction: &Transaction,
    ) -> Result<BankAccount, StoreError> {
        // Entry lock held across check and write: competing appliers to
        // the same account serialise here.
        let mut entry = self
            .accounts
            .get_mut(&account.account_number)
            .ok_or(StoreError::VersionConflict)?;
        if entry.version != expected_version {
            return Err(StoreError::VersionConflict);
        }
        if self.transactions.contains_key(&transaction.id) {
            return Err(StoreError::DuplicateKey("transaction id"));
        }
        entry.balance = account.balance;
        entry.updated_timestamp = account.updated_timestamp;
        entry.version += 1;
        self.transactions
            .insert(transaction.id.clone(), transaction.clone());
        Ok(entry.clone())
    }

    async fn list_transactions(
        &self,
        account_number: &str,
    ) -> Result<Vec<Transaction>, StoreError> {
        let mut transactions: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|entry| entry.account_number == account_number)
            .map(|entry| entry.clone())
            .collect();
        transactions.sort_by(|a, b| {
            b.created_timestamp
                .cmp(&a.created_timestamp)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(transactions)
    }

    async fn find_transaction(
        &self,
        account_number: &str,
        transaction_id: &str,
    ) -> Result<Option<Transaction>, StoreError> {
        Ok(self
            .transactions
            .get(transaction_id)
            .filter(|entry| entry.account_number == account_number)
            .map(|entry| entry.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, SORT_CODE};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn account(number: &str, user_id: &str) -> BankAccount {
        let now = Utc::now();
        BankAccount {
            account_number: number.to_string(),
            sort_code: SORT_CODE.to_string(),
            name: "Test account".to_string(),
            account_type: "personal".to_string(),
            balance: Decimal::new(0, 2),
            currency: Currency::Gbp.as_str().to_string(),
            user_id: user_id.to_string(),
            version: 0,
            created_timestamp: now,
            updated_timestamp: now,
        }
    }

    fn transaction(id: &str, account_number: &str, amount: Decimal) -> Transaction {
        Transaction {
            id: id.to_string(),
            account_number: account_number.to_string(),
            user_id: "usr-a".to_string(),
            amount,
            currency: "GBP".to_string(),
            transaction_type: "deposit".to_string(),
            reference: None,
            created_timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn stale_version_loses_the_write() {
        let repo = InMemoryRepository::new();
        repo.insert_account(&account("01000001", "usr-a"))
            .await
            .unwrap();

        let mut first = repo.find_account("01000001").await.unwrap().unwrap();
        let second = first.clone();

        first.balance = Decimal::new(50_00, 2);
        repo.apply_transaction(&first, 0, &transaction("tan-a", "01000001", first.balance))
            .await
            .expect("first write should win");

        // Second writer computed from the same starting version.
        let mut stale = second;
        stale.balance = Decimal::new(70_00, 2);
        let result = repo
            .apply_transaction(&stale, 0, &transaction("tan-b", "01000001", stale.balance))
            .await;
        assert!(matches!(result, Err(StoreError::VersionConflict)));

        let stored = repo.find_account("01000001").await.unwrap().unwrap();
        assert_eq!(stored.balance, Decimal::new(50_00, 2));
        assert_eq!(stored.version, 1);
        assert!(!repo.transaction_exists("tan-b").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_transaction_id_leaves_balance_untouched() {
        let repo = InMemoryRepository::new();
        repo.insert_account(&account("01000002", "usr-a"))
            .await
            .unwrap();

        let mut acc = repo.find_account("01000002").await.unwrap().unwrap();
        acc.balance = Decimal::new(10_00, 2);
        repo.apply_transaction(&acc, 0, &transaction("tan-dup", "01000002", acc.balance))
            .await
            .unwrap();

        let mut acc = repo.find_account("01000002").await.unwrap().unwrap();
        acc.balance = Decimal::new(20_00, 2);
        let result = repo
            .apply_transaction(&acc, 1, &transaction("tan-dup", "01000002", acc.balance))
            .await;
        assert!(matches!(result, Err(StoreError::DuplicateKey(_))));

        let stored = repo.find_account("01000002").await.unwrap().unwrap();
        assert_eq!(stored.balance, Decimal::new(10_00, 2));
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repo = InMemoryRepository::new();
        let now = Utc::now();
        let user = User {
            id: "usr-a".to_string(),
            name: "A".to_string(),
            address: crate::models::Address {
                line1: "1 Main St".to_string(),
                line2: None,
                line3: None,
                town: "London".to_string(),
                county: "Greater London".to_string(),
                postcode: "E1 6AN".to_string(),
            },
            phone_number: "+447911123456".to_string(),
            email: "a@example.com".to_string(),
            password_hash: "hash".to_string(),
            created_timestamp: now,
            updated_timestamp: now,
        };
        repo.insert_user(&user).await.unwrap();

        let mut duplicate = user.clone();
        duplicate.id = "usr-b".to_string();
        duplicate.email = "A@Example.com".to_string();
        let result = repo.insert_user(&duplicate).await;
        assert!(matches!(result, Err(StoreError::DuplicateKey("email"))));
    }
}
