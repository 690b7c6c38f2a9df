use std::sync::Arc;

use uuid::Uuid;

use crate::auth::jwt::{TokenService, hash_token};
use crate::auth::password;
use crate::db::CredentialStore;
use crate::error::AppError;
use crate::models::{AuthToken, User};
use crate::rate_limit::LoginRateLimiter;

const BAD_CREDENTIALS: &str = "invalid email or password";

/// Account lifecycle: registration, login, logout and profile changes.
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    tokens: Arc<TokenService>,
    limiter: LoginRateLimiter,
}

impl AuthService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        tokens: Arc<TokenService>,
        limiter: LoginRateLimiter,
    ) -> Self {
        Self {
            credentials,
            tokens,
            limiter,
        }
    }

    pub fn limiter(&self) -> &LoginRateLimiter {
        &self.limiter
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User, AppError> {
        let email = email.trim();
        if self.credentials.find_by_email(email).await?.is_some() {
            return Err(AppError::Conflict("email already registered".to_string()));
        }

        let hash = password::hash(password).map_err(AppError::Internal)?;
        let user = self
            .credentials
            .save(&User::new(name.trim(), email, hash))
            .await?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Checks the password and starts a new session. Earlier tokens of the
    /// user are revoked, so only the returned one stays valid.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AppError> {
        let email = email.trim();
        if let Err(retry_after) = self.limiter.check(email) {
            return Err(AppError::RateLimited(format!(
                "too many login attempts, try again in {retry_after} seconds"
            )));
        }

        let user = match self.credentials.find_by_email(email).await? {
            Some(user) if password::verify(password, &user.password_hash) => user,
            _ => {
                self.limiter.record_failure(email);
                return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
            }
        };
        self.limiter.reset(email);

        self.credentials.delete_tokens_for_user(user.id).await?;
        let token = self
            .tokens
            .issue(user.id)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        self.credentials
            .save_token(&AuthToken::new(user.id, hash_token(&token)))
            .await?;

        tracing::info!(user_id = %user.id, "user logged in");
        Ok((user, token))
    }

    pub async fn logout(&self, user_id: Uuid) -> Result<(), AppError> {
        self.credentials.delete_tokens_for_user(user_id).await?;
        tracing::info!(%user_id, "user logged out");
        Ok(())
    }

    /// A taken email surfaces as a conflict from the store.
    pub async fn update_profile(&self, mut user: User, name: &str, email: &str) -> Result<User, AppError> {
        user.name = name.trim().to_string();
        user.email = email.trim().to_string();
        user.touch();
        Ok(self.credentials.save(&user).await?)
    }

    /// Stores the new hash and revokes every token of the user.
    pub async fn change_password(
        &self,
        mut user: User,
        current: &str,
        new: &str,
    ) -> Result<User, AppError> {
        if !password::verify(current, &user.password_hash) {
            return Err(AppError::BadRequest("current password is incorrect".to_string()));
        }

        user.password_hash = password::hash(new).map_err(AppError::Internal)?;
        user.touch();
        let user = self.credentials.save(&user).await?;
        self.credentials.delete_tokens_for_user(user.id).await?;

        tracing::info!(user_id = %user.id, "password changed, sessions revoked");
        Ok(user)
    }
}
