//! Login: verify credentials and mint a bearer token.

use service_core::error::AppError;
use std::sync::Arc;
use tracing::instrument;

use super::jwt::JwtService;
use super::repository::BankRepository;
use crate::utils::verify_password;

/// Successful authentication result.
#[derive(Debug)]
pub struct AuthenticatedSession {
    pub token: String,
    pub user_id: String,
}

#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn BankRepository>,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(repo: Arc<dyn BankRepository>, jwt: JwtService) -> Self {
        Self { repo, jwt }
    }

    /// Authenticate by email and password. Unknown email and wrong
    /// password are indistinguishable to the caller.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedSession, AppError> {
        let user = self
            .repo
            .find_user_by_email(email)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Invalid credentials")))?;

        if !verify_password(password, &user.password_hash) {
            return Err(AppError::Unauthorized(anyhow::anyhow!(
                "Invalid credentials"
            )));
        }

        let token = self.jwt.generate_token(&user.id)?;
        Ok(AuthenticatedSession {
            token,
            user_id: user.id,
        })
    }
}
