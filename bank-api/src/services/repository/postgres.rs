//! Postgres-backed repository.

use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};

use super::{BankRepository, StoreError};
use crate::models::{BankAccount, Transaction, User};

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

fn db_error(e: sqlx::Error) -> StoreError {
    StoreError::Database(anyhow::Error::new(e))
}

fn insert_error(e: sqlx::Error, key: &'static str) -> StoreError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            StoreError::DuplicateKey(key)
        }
        other => db_error(other),
    }
}

impl PgRepository {
    /// Create a new connection pool.
    #[instrument(skip(database_url))]
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl BankRepository for PgRepository {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, line1, line2, line3, town, county, postcode,
                               phone_number, email, password_hash, created_timestamp, updated_timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.address.line1)
        .bind(&user.address.line2)
        .bind(&user.address.line3)
        .bind(&user.address.town)
        .bind(&user.address.county)
        .bind(&user.address.postcode)
        .bind(&user.phone_number)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_timestamp)
        .bind(user.updated_timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(e, "email"))?;
        Ok(())
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))",
        )
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = $2, line1 = $3, line2 = $4, line3 = $5, town = $6, county = $7,
                postcode = $8, phone_number = $9, email = $10, updated_timestamp = $11
            WHERE id = $1
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.address.line1)
        .bind(&user.address.line2)
        .bind(&user.address.line3)
        .bind(&user.address.town)
        .bind(&user.address.county)
        .bind(&user.address.postcode)
        .bind(&user.phone_number)
        .bind(&user.email)
        .bind(user.updated_timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(e, "email"))?;
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn user_owns_accounts(&self, user_id: &str) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM bank_accounts WHERE user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn insert_account(&self, account: &BankAccount) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO bank_accounts (account_number, sort_code, name, account_type, balance,
                                       currency, user_id, version, created_timestamp, updated_timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&account.account_number)
        .bind(&account.sort_code)
        .bind(&account.name)
        .bind(&account.account_type)
        .bind(account.balance)
        .bind(&account.currency)
        .bind(&account.user_id)
        .bind(account.version)
        .bind(account.created_timestamp)
        .bind(account.updated_timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(e, "account number"))?;
        Ok(())
    }

    async fn account_exists(&self, account_number: &str) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM bank_accounts WHERE account_number = $1)",
        )
        .bind(account_number)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn find_account(&self, account_number: &str) -> Result<Option<BankAccount>, StoreError> {
        sqlx::query_as::<_, BankAccount>("SELECT * FROM bank_accounts WHERE account_number = $1")
            .bind(account_number)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn list_accounts_for_user(&self, user_id: &str) -> Result<Vec<BankAccount>, StoreError> {
        sqlx::query_as::<_, BankAccount>(
            "SELECT * FROM bank_accounts WHERE user_id = $1 ORDER BY created_timestamp",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn update_account(
        &self,
        account: &BankAccount,
        expected_version: i64,
    ) -> Result<BankAccount, StoreError> {
        sqlx::query_as::<_, BankAccount>(
            r#"
            UPDATE bank_accounts
            SET name = $3, account_type = $4, balance = $5, updated_timestamp = $6,
                version = version + 1
            WHERE account_number = $1 AND version = $2
            RETURNING *
            "#,
        )
        .bind(&account.account_number)
        .bind(expected_version)
        .bind(&account.name)
        .bind(&account.account_type)
        .bind(account.balance)
        .bind(account.updated_timestamp)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or(StoreError::VersionConflict)
    }

    async fn delete_account(&self, account_number: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM bank_accounts WHERE account_number = $1")
            .bind(account_number)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn transaction_exists(&self, id: &str) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM transactions WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn apply_transaction(
        &self,
        account: &BankAccount,
        expected_version: i64,
        transaction: &Transaction,
    ) -> Result<BankAccount, StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let updated = sqlx::query_as::<_, BankAccount>(
            r#"
            UPDATE bank_accounts
            SET balance = $3, updated_timestamp = $4, version = version + 1
            WHERE account_number = $1 AND version = $2
            RETURNING *
            "#,
        )
        .bind(&account.account_number)
        .bind(expected_version)
        .bind(account.balance)
        .bind(account.updated_timestamp)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error)?
        .ok_or(StoreError::VersionConflict)?;

        sqlx::query(
            r#"
            INSERT INTO transactions (id, account_number, user_id, amount, currency,
                                      transaction_type, reference, created_timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.account_number)
        .bind(&transaction.user_id)
        .bind(transaction.amount)
        .bind(&transaction.currency)
        .bind(&transaction.transaction_type)
        .bind(&transaction.reference)
        .bind(transaction.created_timestamp)
        .execute(&mut *tx)
        .await
        .map_err(|e| insert_error(e, "transaction id"))?;

        tx.commit().await.map_err(db_error)?;

        Ok(updated)
    }

    async fn list_transactions(
        &self,
        account_number: &str,
    ) -> Result<Vec<Transaction>, StoreError> {
        sqlx::query_as::<_, Transaction>(
            r#"
            SELECT * FROM transactions
            WHERE account_number = $1
            ORDER BY created_timestamp DESC
            "#,
        )
        .bind(account_number)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn find_transaction(
        &self,
        account_number: &str,
        transaction_id: &str,
    ) -> Result<Option<Transaction>, StoreError> {
        sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE id = $1 AND account_number = $2",
        )
        .bind(transaction_id)
        .bind(account_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)
    }
}
