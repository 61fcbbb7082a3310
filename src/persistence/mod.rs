//! Persistence Layer
//!
//! SQLite storage for competitions, trading accounts, memberships and trades,
//! with async access via sqlx.
//!
//! Cross-request exclusivity lives entirely in the schema: primary keys,
//! unique columns and foreign keys. Query modules take any `SqliteExecutor`
//! so the same statement runs against the pool or inside an open transaction.
//!
//! # Database Schema
//!
//! ## users
//! - id: UUID (blob), the authenticated user identifier
//! - username: unique display name, optional per user
//!
//! ## competitions
//! - id: UUID (blob)
//! - name, starts_at, ends_at (CHECK ends_at > starts_at)
//!
//! ## trading_accounts
//! - login: INTEGER PRIMARY KEY
//! - user_id: UNIQUE; no profile row is required
//! - broker, investor_password_encrypted
//!
//! ## competition_members
//! - (competition_id, trading_account_login): PRIMARY KEY
//! - account_size: NULL until set, otherwise > 0
//!
//! ## trades
//! - (competition_id, trading_account_login, position_id): PRIMARY KEY
//! - references competitions, trading_accounts and competition_members
//!
//! ## account_requests
//! - (user_id, competition_id): PRIMARY KEY

pub mod account_requests;
pub mod competitions;
pub mod leaderboard;
pub mod members;
pub mod models;
pub mod trades;
pub mod trading_accounts;
pub mod users;
pub mod violation;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Database connection pool
pub type DbPool = SqlitePool;

/// Database initialization error
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(String),
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://data/tourney.db")
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Log every statement at debug level
    pub log_queries: bool,

    /// How long a writer waits on a locked database
    pub busy_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/tourney.db".to_string(),
            max_connections: 5,
            log_queries: cfg!(debug_assertions),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl DatabaseConfig {
    /// Config for an isolated in-memory database
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            ..Self::default()
        }
    }

    /// Load from environment-style lookups
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let url = lookup("DATABASE_URL").unwrap_or(defaults.url);

        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_connections);

        let log_queries = lookup("DATABASE_LOG_QUERIES")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.log_queries);

        Self {
            url,
            max_connections,
            log_queries,
            busy_timeout: defaults.busy_timeout,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:")
    }
}

/// Initialize the database connection pool and apply the schema
///
/// # Errors
/// Returns error if the database cannot be opened or a migration fails
pub async fn init_database(config: &DatabaseConfig) -> Result<DbPool, DatabaseError> {
    info!("Initializing database: {}", config.url);

    if let Some(db_path) = config.url.strip_prefix("sqlite://") {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DatabaseError::ConnectionError(sqlx::Error::Configuration(Box::new(e)))
                })?;
            }
        }
    }

    let log_level = if config.log_queries {
        tracing::log::LevelFilter::Debug
    } else {
        tracing::log::LevelFilter::Trace
    };

    let mut options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(config.busy_timeout)
        .log_statements(log_level);

    // Every connection to ":memory:" is a separate database, so keep exactly one alive.
    let pool_options = if config.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        options = options.journal_mode(SqliteJournalMode::Wal);
        SqlitePoolOptions::new().max_connections(config.max_connections)
    };

    let pool = pool_options.connect_with(options).await?;

    run_migrations(&pool).await?;

    info!("✓ Database initialized successfully");

    Ok(pool)
}

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id BLOB PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            created_at DATETIME NOT NULL
        )
        "#,
    ),
    (
        "competitions",
        r#"
        CREATE TABLE IF NOT EXISTS competitions (
            id BLOB PRIMARY KEY,
            name TEXT NOT NULL CHECK(length(trim(name)) > 0),
            starts_at DATETIME NOT NULL,
            ends_at DATETIME NOT NULL,
            created_at DATETIME NOT NULL,
            CHECK(ends_at > starts_at)
        )
        "#,
    ),
    (
        "trading_accounts",
        r#"
        CREATE TABLE IF NOT EXISTS trading_accounts (
            login INTEGER PRIMARY KEY CHECK(login > 0),
            user_id BLOB NOT NULL UNIQUE,
            broker TEXT NOT NULL CHECK(length(broker) > 0),
            investor_password_encrypted TEXT NOT NULL CHECK(length(investor_password_encrypted) > 0),
            created_at DATETIME NOT NULL
        )
        "#,
    ),
    (
        "competition_members",
        r#"
        CREATE TABLE IF NOT EXISTS competition_members (
            competition_id BLOB NOT NULL REFERENCES competitions(id),
            trading_account_login INTEGER NOT NULL REFERENCES trading_accounts(login),
            account_size REAL CHECK(account_size IS NULL OR account_size > 0),
            joined_at DATETIME NOT NULL,
            PRIMARY KEY (competition_id, trading_account_login)
        )
        "#,
    ),
    (
        "trades",
        r#"
        CREATE TABLE IF NOT EXISTS trades (
            competition_id BLOB NOT NULL,
            trading_account_login INTEGER NOT NULL,
            position_id INTEGER NOT NULL CHECK(position_id > 0),
            symbol TEXT NOT NULL,
            side TEXT NOT NULL CHECK(side IN ('buy', 'sell')),
            volume REAL NOT NULL,
            open_time DATETIME NOT NULL,
            close_time DATETIME NOT NULL,
            open_price REAL NOT NULL,
            close_price REAL NOT NULL,
            profit REAL NOT NULL,
            commission REAL NOT NULL DEFAULT 0.0,
            swap REAL NOT NULL DEFAULT 0.0,
            created_at DATETIME NOT NULL,
            PRIMARY KEY (competition_id, trading_account_login, position_id),
            FOREIGN KEY (competition_id) REFERENCES competitions(id),
            FOREIGN KEY (trading_account_login) REFERENCES trading_accounts(login),
            FOREIGN KEY (competition_id, trading_account_login)
                REFERENCES competition_members(competition_id, trading_account_login)
        )
        "#,
    ),
    (
        "account_requests",
        r#"
        CREATE TABLE IF NOT EXISTS account_requests (
            user_id BLOB NOT NULL,
            competition_id BLOB NOT NULL REFERENCES competitions(id),
            requested_at DATETIME NOT NULL,
            PRIMARY KEY (user_id, competition_id)
        )
        "#,
    ),
    (
        "idx_competitions_window",
        "CREATE INDEX IF NOT EXISTS idx_competitions_window ON competitions(starts_at, ends_at)",
    ),
    (
        "idx_trades_login_close",
        "CREATE INDEX IF NOT EXISTS idx_trades_login_close ON trades(trading_account_login, close_time)",
    ),
];

/// Run database migrations
async fn run_migrations(pool: &DbPool) -> Result<(), DatabaseError> {
    info!("Running database migrations...");

    for &(name, statement) in MIGRATIONS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| DatabaseError::MigrationError(format!("Failed to create {}: {}", name, e)))?;
        debug!("Applied migration: {}", name);
    }

    info!("✓ Database migrations completed successfully");

    Ok(())
}

/// Fresh in-memory database with the full schema
#[cfg(test)]
pub(crate) async fn test_pool() -> DbPool {
    init_database(&DatabaseConfig::in_memory()).await.unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_database_init() {
        let pool = init_database(&DatabaseConfig::in_memory()).await;
        assert!(pool.is_ok());
    }

    #[tokio::test]
    async fn test_migrations() {
        let pool = test_pool().await;

        let result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN \
             ('users', 'competitions', 'trading_accounts', 'competition_members', 'trades', 'account_requests')",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(result.0, 6);
    }

    #[tokio::test]
    async fn test_migrations_are_rerunnable() {
        let pool = test_pool().await;
        assert!(run_migrations(&pool).await.is_ok());
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let pool = test_pool().await;
        let enabled: (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(enabled.0, 1);
    }

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.url, "sqlite://data/tourney.db");
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn test_database_config_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("DATABASE_URL", "sqlite://tmp/t.db"),
            ("DATABASE_MAX_CONNECTIONS", "0"),
            ("DATABASE_LOG_QUERIES", "true"),
        ]
        .into_iter()
        .collect();
        let config = DatabaseConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.url, "sqlite://tmp/t.db");
        assert_eq!(config.max_connections, 5);
        assert!(config.log_queries);
    }
}
