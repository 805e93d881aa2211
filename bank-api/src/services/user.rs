//! User service: registration and self-service profile management.

use chrono::Utc;
use service_core::error::AppError;
use std::sync::Arc;
use tracing::{info, instrument};

use super::repository::{BankRepository, StoreError};
use crate::models::{Address, User};
use crate::utils::{hash_password, id};

/// Fields required to register a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub address: Address,
    pub phone_number: String,
    pub email: String,
    pub password: String,
}

/// Partial profile update; absent means unchanged.
#[derive(Debug, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub address: Option<Address>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn BankRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn BankRepository>) -> Self {
        Self { repo }
    }

    /// Register a new user with a globally unique email.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_user(&self, input: NewUser) -> Result<User, AppError> {
        if self.repo.email_exists(&input.email).await? {
            return Err(AppError::BadRequest(anyhow::anyhow!("Email already exists")));
        }

        let password_hash = hash_password(&input.password)?;

        for _ in 0..id::MAX_ID_ATTEMPTS {
            let candidate = id::new_user_id();
            if self.repo.find_user(&candidate).await?.is_some() {
                continue;
            }

            let now = Utc::now();
            let user = User {
                id: candidate,
                name: input.name.clone(),
                address: input.address.clone(),
                phone_number: input.phone_number.clone(),
                email: input.email.clone(),
                password_hash: password_hash.clone(),
                created_timestamp: now,
                updated_timestamp: now,
            };

            match self.repo.insert_user(&user).await {
                Ok(()) => {
                    info!(user_id = %user.id, "User created");
                    return Ok(user);
                }
                Err(StoreError::DuplicateKey("email")) => {
                    return Err(AppError::BadRequest(anyhow::anyhow!("Email already exists")))
                }
                Err(StoreError::DuplicateKey(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::Conflict(anyhow::anyhow!(
            "Could not allocate a unique user id. Please retry."
        )))
    }

    /// Users may only read their own record: existence first (404), then
    /// identity (403).
    pub async fn get_user(
        &self,
        user_id: &str,
        authenticated_user_id: &str,
    ) -> Result<User, AppError> {
        let user = self
            .repo
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;

        if user.id != authenticated_user_id {
            return Err(AppError::Forbidden(anyhow::anyhow!("Access denied")));
        }

        Ok(user)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_user(
        &self,
        user_id: &str,
        authenticated_user_id: &str,
        patch: UserPatch,
    ) -> Result<User, AppError> {
        let mut user = self.get_user(user_id, authenticated_user_id).await?;

        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(address) = patch.address {
            user.address = address;
        }
        if let Some(phone_number) = patch.phone_number {
            user.phone_number = phone_number;
        }
        if let Some(email) = patch.email {
            if !email.eq_ignore_ascii_case(&user.email) && self.repo.email_exists(&email).await? {
                return Err(AppError::BadRequest(anyhow::anyhow!("Email already exists")));
            }
            user.email = email;
        }
        user.updated_timestamp = Utc::now();

        match self.repo.update_user(&user).await {
            Ok(()) => Ok(user),
            Err(StoreError::DuplicateKey("email")) => {
                Err(AppError::BadRequest(anyhow::anyhow!("Email already exists")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a user, refused while any account still belongs to them.
    #[instrument(skip(self))]
    pub async fn delete_user(
        &self,
        user_id: &str,
        authenticated_user_id: &str,
    ) -> Result<(), AppError> {
        let user = self.get_user(user_id, authenticated_user_id).await?;

        if self.repo.user_owns_accounts(&user.id).await? {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "A user cannot be deleted when they are associated with a bank account"
            )));
        }

        self.repo.delete_user(&user.id).await?;
        info!(user_id = %user.id, "User deleted");
        Ok(())
    }

    /// Ensure the authenticated principal still resolves to a stored user.
    pub async fn find_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        Ok(self.repo.find_user(user_id).await?)
    }
}
