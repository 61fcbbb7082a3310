//! Competition membership queries

use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;
use uuid::Uuid;

use super::models::MemberRow;

/// Insert the membership only while the competition has not started.
///
/// The start-time check and the insert are one statement, so no concurrent
/// request can slip between them. Returns the number of rows written: zero
/// means the competition is missing or already started.
pub async fn insert_before_start<'e, E>(
    executor: E,
    competition_id: Uuid,
    login: i64,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO competition_members (competition_id, trading_account_login, account_size, joined_at)
        SELECT c.id, ?2, NULL, ?3
        FROM competitions c
        WHERE c.id = ?1 AND c.starts_at > ?3
        "#,
    )
    .bind(competition_id)
    .bind(login)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub async fn get<'e, E>(
    executor: E,
    competition_id: Uuid,
    login: i64,
) -> Result<Option<MemberRow>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, MemberRow>(
        r#"
        SELECT competition_id, trading_account_login, account_size, joined_at
        FROM competition_members
        WHERE competition_id = ?1 AND trading_account_login = ?2
        "#,
    )
    .bind(competition_id)
    .bind(login)
    .fetch_optional(executor)
    .await
}

/// Outer `None`: not a member. Inner `None`: member without an account size.
pub async fn get_account_size<'e, E>(
    executor: E,
    competition_id: Uuid,
    login: i64,
) -> Result<Option<Option<f64>>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, Option<f64>>(
        r#"
        SELECT account_size
        FROM competition_members
        WHERE competition_id = ?1 AND trading_account_login = ?2
        "#,
    )
    .bind(competition_id)
    .bind(login)
    .fetch_optional(executor)
    .await
}

/// Returns rows affected; zero means no such membership
pub async fn update_account_size<'e, E>(
    executor: E,
    competition_id: Uuid,
    login: i64,
    account_size: f64,
) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE competition_members
        SET account_size = ?3
        WHERE competition_id = ?1 AND trading_account_login = ?2
        "#,
    )
    .bind(competition_id)
    .bind(login)
    .bind(account_size)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub async fn exists<'e, E>(executor: E, competition_id: Uuid, login: i64) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM competition_members
            WHERE competition_id = ?1 AND trading_account_login = ?2
        )
        "#,
    )
    .bind(competition_id)
    .bind(login)
    .fetch_one(executor)
    .await
}

/// Whether the user's trading account (if any) is a member of the competition
pub async fn user_has_joined<'e, E>(
    executor: E,
    user_id: Uuid,
    competition_id: Uuid,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1
            FROM competition_members m
            JOIN trading_accounts a ON a.login = m.trading_account_login
            WHERE a.user_id = ?1 AND m.competition_id = ?2
        )
        "#,
    )
    .bind(user_id)
    .bind(competition_id)
    .fetch_one(executor)
    .await
}
