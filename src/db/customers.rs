use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Customer;

pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Customer>, sqlx::Error> {
    sqlx::query_as::<_, Customer>(
        "SELECT * FROM customers WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, customer: &Customer) -> Result<Customer, sqlx::Error> {
    sqlx::query_as::<_, Customer>(
        "INSERT INTO customers
             (id, user_id, name, email, phone, address, type, image_url, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
    )
    .bind(customer.id)
    .bind(customer.user_id)
    .bind(&customer.name)
    .bind(&customer.email)
    .bind(&customer.phone)
    .bind(&customer.address)
    .bind(&customer.customer_type)
    .bind(&customer.image_url)
    .bind(customer.created_at)
    .bind(customer.updated_at)
    .fetch_one(pool)
    .await
}

/// Writes every column except `id`, `user_id` and `created_at`.
/// Returns `None` when the row is gone or owned by someone else.
pub async fn update(pool: &PgPool, customer: &Customer) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as::<_, Customer>(
        "UPDATE customers
         SET name = $3, email = $4, phone = $5, address = $6, type = $7,
             image_url = $8, updated_at = $9
         WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(customer.id)
    .bind(customer.user_id)
    .bind(&customer.name)
    .bind(&customer.email)
    .bind(&customer.phone)
    .bind(&customer.address)
    .bind(&customer.customer_type)
    .bind(&customer.image_url)
    .bind(customer.updated_at)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM customers WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_by_type(pool: &PgPool, user_id: Uuid) -> Result<Vec<(String, i64)>, sqlx::Error> {
    sqlx::query_as::<_, (String, i64)>(
        "SELECT type, COUNT(*) FROM customers WHERE user_id = $1 GROUP BY type",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
