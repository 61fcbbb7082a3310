//! Requests for an organiser-issued competition account

use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;
use uuid::Uuid;

/// Record the request; a repeated request is a no-op. Returns rows written.
pub async fn insert<'e, E>(
    executor: E,
    user_id: Uuid,
    competition_id: Uuid,
    requested_at: DateTime<Utc>,
) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO account_requests (user_id, competition_id, requested_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT (user_id, competition_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(competition_id)
    .bind(requested_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub async fn exists<'e, E>(executor: E, user_id: Uuid, competition_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM account_requests WHERE user_id = ?1 AND competition_id = ?2)",
    )
    .bind(user_id)
    .bind(competition_id)
    .fetch_one(executor)
    .await
}
