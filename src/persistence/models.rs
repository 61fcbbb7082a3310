//! Database Models
//!
//! Row shapes as stored, and their conversion into domain entities.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::entities::competition::Competition;
use crate::domain::entities::leaderboard::LeaderboardEntry;
use crate::domain::entities::member::CompetitionMember;
use crate::domain::entities::trade::TradeRecord;
use crate::domain::entities::trading_account::TradingAccount;
use crate::domain::entities::user::User;

#[derive(Debug, Clone, FromRow)]
pub struct CompetitionRow {
    pub id: Uuid,
    pub name: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<CompetitionRow> for Competition {
    fn from(row: CompetitionRow) -> Self {
        Competition {
            id: row.id,
            name: row.name,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TradingAccountRow {
    pub login: i64,
    pub user_id: Uuid,
    pub broker: String,
    pub investor_password_encrypted: String,
    pub created_at: DateTime<Utc>,
}

impl From<TradingAccountRow> for TradingAccount {
    fn from(row: TradingAccountRow) -> Self {
        TradingAccount {
            login: row.login,
            user_id: row.user_id,
            broker: row.broker,
            investor_password_encrypted: row.investor_password_encrypted,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MemberRow {
    pub competition_id: Uuid,
    pub trading_account_login: i64,
    pub account_size: Option<f64>,
    pub joined_at: DateTime<Utc>,
}

impl From<MemberRow> for CompetitionMember {
    fn from(row: MemberRow) -> Self {
        CompetitionMember {
            competition_id: row.competition_id,
            login: row.trading_account_login,
            account_size: row.account_size,
            joined_at: row.joined_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TradeRow {
    pub competition_id: Uuid,
    pub position_id: i64,
    pub symbol: String,
    pub side: String,
    pub volume: f64,
    pub open_time: DateTime<Utc>,
    pub close_time: DateTime<Utc>,
    pub open_price: f64,
    pub close_price: f64,
    pub profit: f64,
    pub commission: f64,
    pub swap: f64,
}

impl From<TradeRow> for TradeRecord {
    fn from(row: TradeRow) -> Self {
        TradeRecord {
            competition_id: row.competition_id,
            position_id: row.position_id,
            symbol: row.symbol,
            side: row.side,
            volume: row.volume,
            open_time: row.open_time,
            close_time: row.close_time,
            open_price: row.open_price,
            close_price: row.close_price,
            profit: row.profit,
            commission: row.commission,
            swap: row.swap,
        }
    }
}

/// One ranked member as produced by the aggregation query
#[derive(Debug, Clone, FromRow)]
pub struct LeaderboardRow {
    pub rank: i64,
    pub trading_account_login: i64,
    pub username: Option<String>,
    pub account_size: Option<f64>,
    pub profit: f64,
    pub equity: Option<f64>,
    pub gain_percent: Option<f64>,
}

impl From<LeaderboardRow> for LeaderboardEntry {
    fn from(row: LeaderboardRow) -> Self {
        LeaderboardEntry {
            rank: row.rank,
            login: row.trading_account_login,
            username: row.username,
            account_size: row.account_size,
            profit: row.profit,
            equity: row.equity,
            gain_percent: row.gain_percent,
        }
    }
}
