//! Persistence seams. Handlers and services only see the traits; `PgStore`
//! backs them with Postgres and `MemoryStore` keeps everything in process.

pub mod auth_tokens;
pub mod customers;
pub mod memory;
pub mod pg;
pub mod users;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AuthToken, Customer, User};

pub use memory::MemoryStore;
pub use pg::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// User accounts and their persisted bearer tokens.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Exact, case-sensitive match.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Insert or update. A second account with the same email fails with
    /// `ConstraintViolation`.
    async fn save(&self, user: &User) -> Result<User, StoreError>;

    /// Both the owner and the token digest must match.
    async fn find_user_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<Option<AuthToken>, StoreError>;

    async fn save_token(&self, token: &AuthToken) -> Result<AuthToken, StoreError>;

    async fn delete_tokens_for_user(&self, user_id: Uuid) -> Result<(), StoreError>;
}

/// Customer rows. Every lookup and mutation is keyed by the owning user.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Customer>, StoreError>;

    async fn find_for_user(&self, id: Uuid, user_id: Uuid)
        -> Result<Option<Customer>, StoreError>;

    async fn insert(&self, customer: &Customer) -> Result<Customer, StoreError>;

    /// `None` when no row with this id belongs to `customer.user_id`.
    async fn update(&self, customer: &Customer) -> Result<Option<Customer>, StoreError>;

    /// `true` if a row was removed.
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;

    /// `(type, count)` per distinct stored type string.
    async fn count_by_type(&self, user_id: Uuid) -> Result<Vec<(String, i64)>, StoreError>;
}
