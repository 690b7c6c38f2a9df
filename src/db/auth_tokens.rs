use sqlx::PgPool;
use uuid::Uuid;

use crate::models::AuthToken;

pub async fn create(pool: &PgPool, token: &AuthToken) -> Result<AuthToken, sqlx::Error> {
    sqlx::query_as::<_, AuthToken>(
        "INSERT INTO auth_tokens (id, user_id, token_hash, created_at)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(token.id)
    .bind(token.user_id)
    .bind(&token.token_hash)
    .bind(token.created_at)
    .fetch_one(pool)
    .await
}

pub async fn find_for_user(
    pool: &PgPool,
    user_id: Uuid,
    token_hash: &str,
) -> Result<Option<AuthToken>, sqlx::Error> {
    sqlx::query_as::<_, AuthToken>(
        "SELECT * FROM auth_tokens WHERE user_id = $1 AND token_hash = $2",
    )
    .bind(user_id)
    .bind(token_hash)
    .fetch_optional(pool)
    .await
}

pub async fn delete_all_for_user(pool: &PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM auth_tokens WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}
