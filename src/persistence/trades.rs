//! Trade queries

use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;
use uuid::Uuid;

use super::models::TradeRow;
use crate::domain::entities::trade::ValidTrade;

pub async fn insert<'e, E>(
    executor: E,
    competition_id: Uuid,
    login: i64,
    trade: &ValidTrade,
    created_at: DateTime<Utc>,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO trades (
            competition_id, trading_account_login, position_id, symbol, side, volume,
            open_time, close_time, open_price, close_price, profit, commission, swap, created_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
    )
    .bind(competition_id)
    .bind(login)
    .bind(trade.position_id)
    .bind(&trade.symbol)
    .bind(trade.side.as_str())
    .bind(trade.volume)
    .bind(trade.open_time)
    .bind(trade.close_time)
    .bind(trade.open_price)
    .bind(trade.close_price)
    .bind(trade.profit)
    .bind(trade.commission)
    .bind(trade.swap)
    .bind(created_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// All trades of an account across competitions, oldest close first
pub async fn list_by_login<'e, E>(executor: E, login: i64) -> Result<Vec<TradeRow>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, TradeRow>(
        r#"
        SELECT competition_id, position_id, symbol, side, volume, open_time, close_time,
               open_price, close_price, profit, commission, swap
        FROM trades
        WHERE trading_account_login = ?1
        ORDER BY close_time ASC, position_id ASC
        "#,
    )
    .bind(login)
    .fetch_all(executor)
    .await
}

pub async fn count_for_member<'e, E>(
    executor: E,
    competition_id: Uuid,
    login: i64,
) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM trades WHERE competition_id = ?1 AND trading_account_login = ?2",
    )
    .bind(competition_id)
    .bind(login)
    .fetch_one(executor)
    .await
}
