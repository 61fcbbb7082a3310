//! User profile queries. A profile only carries the display name shown on
//! leaderboards and trade history; ownership never depends on it.

use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;
use uuid::Uuid;

use super::models::UserRow;

pub async fn insert<'e, E>(
    executor: E,
    id: Uuid,
    username: &str,
    created_at: DateTime<Utc>,
) -> Result<UserRow, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (id, username, created_at)
        VALUES (?1, ?2, ?3)
        RETURNING id, username, created_at
        "#,
    )
    .bind(id)
    .bind(username)
    .bind(created_at)
    .fetch_one(executor)
    .await
}

pub async fn get_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<UserRow>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, UserRow>("SELECT id, username, created_at FROM users WHERE id = ?1")
        .bind(id)
        .fetch_optional(executor)
        .await
}
