//! Leaderboard aggregation
//!
//! Per member: total profit, equity (size + profit) and gain percent
//! (profit / size * 100). Members are ranked by gain descending; members without
//! an account size rank last; ties resolve by login ascending so pages are stable.

use sqlx::SqliteExecutor;
use uuid::Uuid;

use super::models::LeaderboardRow;

pub async fn fetch<'e, E>(
    executor: E,
    competition_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<LeaderboardRow>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, LeaderboardRow>(
        r#"
        WITH totals AS (
            SELECT m.trading_account_login AS login,
                   u.username AS username,
                   m.account_size AS account_size,
                   COALESCE(SUM(t.profit), 0.0) AS profit
            FROM competition_members m
            JOIN trading_accounts a ON a.login = m.trading_account_login
            LEFT JOIN users u ON u.id = a.user_id
            LEFT JOIN trades t
                ON t.competition_id = m.competition_id
               AND t.trading_account_login = m.trading_account_login
            WHERE m.competition_id = ?1
            GROUP BY m.trading_account_login, u.username, m.account_size
        ),
        scored AS (
            SELECT login, username, account_size, profit,
                   account_size + profit AS equity,
                   profit * 100.0 / account_size AS gain_percent
            FROM totals
        ),
        ranked AS (
            SELECT ROW_NUMBER() OVER (
                       ORDER BY gain_percent IS NULL, gain_percent DESC, login ASC
                   ) AS rank,
                   login, username, account_size, profit, equity, gain_percent
            FROM scored
        )
        SELECT rank,
               login AS trading_account_login,
               username, account_size, profit, equity, gain_percent
        FROM ranked
        ORDER BY rank
        LIMIT ?2 OFFSET ?3
        "#,
    )
    .bind(competition_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await
}
