use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted bearer token. Only the SHA-256 digest of the token is stored.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AuthToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
}

impl AuthToken {
    pub fn new(user_id: Uuid, token_hash: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            token_hash,
            created_at: Utc::now(),
        }
    }
}
