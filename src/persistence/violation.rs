//! Constraint Violation Classification
//!
//! Turns a raw sqlx error into the identity of the schema constraint that
//! rejected the write, so services can translate it into a precise domain
//! error instead of a generic conflict.
//!
//! SQLite reports unique violations as
//! `UNIQUE constraint failed: table.col[, table.col]` and foreign-key
//! violations without naming the key, so foreign-key failures are only
//! classified by kind and must be disambiguated by a follow-up read.

use sqlx::error::ErrorKind;

/// Unique keys declared by the schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniqueKey {
    TradingAccountLogin,
    TradingAccountOwner,
    Membership,
    TradePosition,
    AccountRequest,
    UserId,
    Username,
    CompetitionId,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Unique(UniqueKey),
    ForeignKey,
    Check,
    NotNull,
}

const UNIQUE_PREFIX: &str = "UNIQUE constraint failed: ";

/// Identify the constraint behind a failed statement, if any
pub fn classify(err: &sqlx::Error) -> Option<Violation> {
    let db_err = err.as_database_error()?;
    let message = db_err.message();

    match db_err.kind() {
        ErrorKind::UniqueViolation => Some(Violation::Unique(unique_key(message))),
        ErrorKind::ForeignKeyViolation => Some(Violation::ForeignKey),
        ErrorKind::CheckViolation => Some(Violation::Check),
        ErrorKind::NotNullViolation => Some(Violation::NotNull),
        _ => classify_message(message),
    }
}

fn classify_message(message: &str) -> Option<Violation> {
    if message.contains(UNIQUE_PREFIX) {
        Some(Violation::Unique(unique_key(message)))
    } else if message.contains("FOREIGN KEY constraint failed") {
        Some(Violation::ForeignKey)
    } else if message.contains("CHECK constraint failed") {
        Some(Violation::Check)
    } else if message.contains("NOT NULL constraint failed") {
        Some(Violation::NotNull)
    } else {
        None
    }
}

fn unique_key(message: &str) -> UniqueKey {
    let columns = message
        .split_once(UNIQUE_PREFIX)
        .map(|(_, cols)| cols.trim())
        .unwrap_or("");

    let mut parts: Vec<&str> = columns.split(',').map(str::trim).collect();
    parts.sort_unstable();

    match parts.as_slice() {
        ["trading_accounts.login"] => UniqueKey::TradingAccountLogin,
        ["trading_accounts.user_id"] => UniqueKey::TradingAccountOwner,
        ["competition_members.competition_id", "competition_members.trading_account_login"] => {
            UniqueKey::Membership
        }
        ["trades.competition_id", "trades.position_id", "trades.trading_account_login"] => {
            UniqueKey::TradePosition
        }
        ["account_requests.competition_id", "account_requests.user_id"] => {
            UniqueKey::AccountRequest
        }
        ["users.id"] => UniqueKey::UserId,
        ["users.username"] => UniqueKey::Username,
        ["competitions.id"] => UniqueKey::CompetitionId,
        _ => UniqueKey::Other(columns.to_string()),
    }
}

pub fn is_unique(err: &sqlx::Error, key: &UniqueKey) -> bool {
    matches!(classify(err), Some(Violation::Unique(ref k)) if k == key)
}

pub fn is_foreign_key(err: &sqlx::Error) -> bool {
    matches!(classify(err), Some(Violation::ForeignKey))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::test_pool;

    #[test]
    fn test_unique_key_from_message() {
        assert_eq!(
            unique_key("UNIQUE constraint failed: trading_accounts.user_id"),
            UniqueKey::TradingAccountOwner
        );
        assert_eq!(
            unique_key("UNIQUE constraint failed: trading_accounts.login"),
            UniqueKey::TradingAccountLogin
        );
        assert_eq!(
            unique_key(
                "UNIQUE constraint failed: competition_members.competition_id, competition_members.trading_account_login"
            ),
            UniqueKey::Membership
        );
        assert_eq!(unique_key("UNIQUE constraint failed: users.id"), UniqueKey::UserId);
        assert_eq!(
            unique_key("UNIQUE constraint failed: foo.bar"),
            UniqueKey::Other("foo.bar".to_string())
        );
    }

    #[test]
    fn test_non_database_errors_are_unclassified() {
        assert_eq!(classify(&sqlx::Error::RowNotFound), None);
        assert_eq!(classify(&sqlx::Error::PoolTimedOut), None);
    }

    #[tokio::test]
    async fn test_classifies_live_sqlite_errors() {
        let pool = test_pool().await;
        sqlx::query("CREATE TABLE parent (id INTEGER PRIMARY KEY, name TEXT UNIQUE)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("CREATE TABLE child (parent_id INTEGER NOT NULL REFERENCES parent(id))")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO parent (id, name) VALUES (1, 'a')")
            .execute(&pool)
            .await
            .unwrap();

        let dup = sqlx::query("INSERT INTO parent (id, name) VALUES (2, 'a')")
            .execute(&pool)
            .await
            .unwrap_err();
        assert_eq!(
            classify(&dup),
            Some(Violation::Unique(UniqueKey::Other("parent.name".to_string())))
        );

        let orphan = sqlx::query("INSERT INTO child (parent_id) VALUES (99)")
            .execute(&pool)
            .await
            .unwrap_err();
        assert!(is_foreign_key(&orphan));
    }
}
