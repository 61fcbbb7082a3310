//! Trading account queries

use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;
use uuid::Uuid;

use super::models::TradingAccountRow;

pub async fn insert<'e, E>(
    executor: E,
    login: i64,
    user_id: Uuid,
    broker: &str,
    investor_password_encrypted: &str,
    created_at: DateTime<Utc>,
) -> Result<TradingAccountRow, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, TradingAccountRow>(
        r#"
        INSERT INTO trading_accounts (login, user_id, broker, investor_password_encrypted, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING login, user_id, broker, investor_password_encrypted, created_at
        "#,
    )
    .bind(login)
    .bind(user_id)
    .bind(broker)
    .bind(investor_password_encrypted)
    .bind(created_at)
    .fetch_one(executor)
    .await
}

pub async fn get_by_login<'e, E>(
    executor: E,
    login: i64,
) -> Result<Option<TradingAccountRow>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, TradingAccountRow>(
        r#"
        SELECT login, user_id, broker, investor_password_encrypted, created_at
        FROM trading_accounts
        WHERE login = ?1
        "#,
    )
    .bind(login)
    .fetch_optional(executor)
    .await
}

pub async fn get_by_owner<'e, E>(
    executor: E,
    user_id: Uuid,
) -> Result<Option<TradingAccountRow>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, TradingAccountRow>(
        r#"
        SELECT login, user_id, broker, investor_password_encrypted, created_at
        FROM trading_accounts
        WHERE user_id = ?1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn exists<'e, E>(executor: E, login: i64) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM trading_accounts WHERE login = ?1)")
        .bind(login)
        .fetch_one(executor)
        .await
}

/// Owner's display name: `None` when the account is missing, `Some(None)`
/// when the owner never set one
pub async fn owner_username<'e, E>(
    executor: E,
    login: i64,
) -> Result<Option<Option<String>>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, Option<String>>(
        r#"
        SELECT u.username
        FROM trading_accounts a
        LEFT JOIN users u ON u.id = a.user_id
        WHERE a.login = ?1
        "#,
    )
    .bind(login)
    .fetch_optional(executor)
    .await
}
