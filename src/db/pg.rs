use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{self, CredentialStore, CustomerStore, StoreError};
use crate::models::{AuthToken, Customer, User};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_unique(err: sqlx::Error, what: &str) -> StoreError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            StoreError::ConstraintViolation(format!("{what} already exists"))
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(db::users::find_by_email(&self.pool, email).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(db::users::find_by_id(&self.pool, id).await?)
    }

    async fn save(&self, user: &User) -> Result<User, StoreError> {
        db::users::upsert(&self.pool, user)
            .await
            .map_err(|e| map_unique(e, "email"))
    }

    async fn find_user_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<Option<AuthToken>, StoreError> {
        Ok(db::auth_tokens::find_for_user(&self.pool, user_id, token_hash).await?)
    }

    async fn save_token(&self, token: &AuthToken) -> Result<AuthToken, StoreError> {
        db::auth_tokens::create(&self.pool, token)
            .await
            .map_err(|e| map_unique(e, "token"))
    }

    async fn delete_tokens_for_user(&self, user_id: Uuid) -> Result<(), StoreError> {
        Ok(db::auth_tokens::delete_all_for_user(&self.pool, user_id).await?)
    }
}

#[async_trait]
impl CustomerStore for PgStore {
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Customer>, StoreError> {
        Ok(db::customers::list_by_user(&self.pool, user_id).await?)
    }

    async fn find_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Customer>, StoreError> {
        Ok(db::customers::find_by_id(&self.pool, id, user_id).await?)
    }

    async fn insert(&self, customer: &Customer) -> Result<Customer, StoreError> {
        db::customers::create(&self.pool, customer)
            .await
            .map_err(|e| map_unique(e, "customer"))
    }

    async fn update(&self, customer: &Customer) -> Result<Option<Customer>, StoreError> {
        Ok(db::customers::update(&self.pool, customer).await?)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        Ok(db::customers::delete(&self.pool, id, user_id).await?)
    }

    async fn count_by_type(&self, user_id: Uuid) -> Result<Vec<(String, i64)>, StoreError> {
        Ok(db::customers::count_by_type(&self.pool, user_id).await?)
    }
}
