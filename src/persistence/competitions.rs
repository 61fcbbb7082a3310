//! Competition queries

use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;
use uuid::Uuid;

use super::models::CompetitionRow;
use crate::domain::entities::competition::Competition;

pub async fn insert<'e, E>(executor: E, competition: &Competition) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO competitions (id, name, starts_at, ends_at, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(competition.id)
    .bind(&competition.name)
    .bind(competition.starts_at)
    .bind(competition.ends_at)
    .bind(competition.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<CompetitionRow>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, CompetitionRow>(
        "SELECT id, name, starts_at, ends_at, created_at FROM competitions WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn get_start_time<'e, E>(
    executor: E,
    id: Uuid,
) -> Result<Option<DateTime<Utc>>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, DateTime<Utc>>("SELECT starts_at FROM competitions WHERE id = ?1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn exists<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM competitions WHERE id = ?1)")
        .bind(id)
        .fetch_one(executor)
        .await
}

/// The competition whose window contains `now`; the latest start wins if windows overlap
pub async fn get_current<'e, E>(
    executor: E,
    now: DateTime<Utc>,
) -> Result<Option<CompetitionRow>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, CompetitionRow>(
        r#"
        SELECT id, name, starts_at, ends_at, created_at
        FROM competitions
        WHERE starts_at <= ?1 AND ends_at > ?1
        ORDER BY starts_at DESC, created_at DESC
        LIMIT 1
        "#,
    )
    .bind(now)
    .fetch_optional(executor)
    .await
}
