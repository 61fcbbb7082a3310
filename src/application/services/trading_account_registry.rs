//! Trading Account Registry
//!
//! Enforces one trading account per user and one owner per login. Both rules
//! live in the schema (primary key on `login`, unique `user_id`); this module
//! turns the constraint that fired into `LoginTaken` or `AccountAlreadyExists`,
//! and treats a repeat of the exact (user, login) pair as success.
//!
//! Owners are identified only by the authenticated user id; no profile row
//! has to exist first.

use chrono::Utc;
use sqlx::SqliteConnection;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::cipher::CredentialCipher;
use crate::domain::entities::trade::TradeHistory;
use crate::domain::entities::trading_account::{AccountCreation, TradingAccount};
use crate::domain::errors::{DomainError, DomainResult};
use crate::persistence::violation::{classify, UniqueKey, Violation};
use crate::persistence::{trades, trading_accounts, DbPool};

#[derive(Clone)]
pub struct TradingAccountRegistry {
    pool: DbPool,
    cipher: Arc<CredentialCipher>,
}

impl TradingAccountRegistry {
    pub fn new(pool: DbPool, cipher: Arc<CredentialCipher>) -> Self {
        Self { pool, cipher }
    }

    /// Create the account, or confirm it if this user already owns this login
    pub async fn create(
        &self,
        login: i64,
        user_id: Uuid,
        broker: &str,
        investor_password_encrypted: &str,
    ) -> DomainResult<TradingAccount> {
        let mut tx = self.pool.begin().await?;
        let outcome =
            create_account(&mut tx, login, user_id, broker, investor_password_encrypted).await?;
        tx.commit().await?;
        Ok(outcome.into_account())
    }

    /// Register the caller's account from a plaintext investor password,
    /// which is encrypted before it reaches the store
    pub async fn register(
        &self,
        user_id: Uuid,
        login: i64,
        broker: &str,
        investor_password: &str,
    ) -> DomainResult<TradingAccount> {
        if investor_password.is_empty() {
            return Err(DomainError::InvalidInvestorPassword);
        }
        let encrypted = self.cipher.encrypt(investor_password)?;
        self.create(login, user_id, broker, &encrypted).await
    }

    pub async fn get_by_login(&self, login: i64) -> DomainResult<TradingAccount> {
        if login <= 0 {
            return Err(DomainError::InvalidLogin);
        }
        trading_accounts::get_by_login(&self.pool, login)
            .await?
            .map(TradingAccount::from)
            .ok_or(DomainError::TradingAccountNotFound)
    }

    pub async fn get_by_owner(&self, user_id: Uuid) -> DomainResult<TradingAccount> {
        if user_id.is_nil() {
            return Err(DomainError::Unauthorized);
        }
        trading_accounts::get_by_owner(&self.pool, user_id)
            .await?
            .map(TradingAccount::from)
            .ok_or(DomainError::TradingAccountNotFound)
    }

    /// Every trade recorded for the account, with the owner's username if set
    pub async fn trade_history(&self, login: i64) -> DomainResult<TradeHistory> {
        if login <= 0 {
            return Err(DomainError::InvalidLogin);
        }
        let username = trading_accounts::owner_username(&self.pool, login)
            .await?
            .ok_or(DomainError::TradingAccountNotFound)?;
        let rows = trades::list_by_login(&self.pool, login).await?;

        Ok(TradeHistory {
            login,
            username,
            trades: rows.into_iter().map(Into::into).collect(),
        })
    }

    /// Decrypt the stored investor password for trade-sync tooling
    pub async fn investor_password(&self, login: i64) -> DomainResult<Zeroizing<String>> {
        let account = self.get_by_login(login).await?;
        self.cipher
            .decrypt(&account.investor_password_encrypted)
            .map_err(|e| {
                error!("Failed to decrypt investor password for login {}: {}", login, e);
                DomainError::from(e)
            })
    }
}

/// Insert-first account creation, usable inside a caller's transaction.
///
/// On a unique violation the conflicting row is re-read to tell an idempotent
/// repeat apart from a genuine ownership conflict.
pub(crate) async fn create_account(
    conn: &mut SqliteConnection,
    login: i64,
    user_id: Uuid,
    broker: &str,
    investor_password_encrypted: &str,
) -> DomainResult<AccountCreation> {
    if login <= 0 {
        return Err(DomainError::InvalidLogin);
    }
    if user_id.is_nil() {
        return Err(DomainError::Unauthorized);
    }
    let broker = broker.trim();
    if broker.is_empty() {
        return Err(DomainError::InvalidBroker);
    }
    if investor_password_encrypted.is_empty() {
        return Err(DomainError::InvalidCredential);
    }

    let err = match trading_accounts::insert(
        &mut *conn,
        login,
        user_id,
        broker,
        investor_password_encrypted,
        Utc::now(),
    )
    .await
    {
        Ok(row) => {
            info!("Created trading account {} for user {}", login, user_id);
            return Ok(AccountCreation::Created(row.into()));
        }
        Err(e) => e,
    };

    match classify(&err) {
        Some(Violation::Unique(UniqueKey::TradingAccountOwner)) => {
            match trading_accounts::get_by_owner(&mut *conn, user_id).await? {
                Some(existing) if existing.login == login => {
                    debug!("Trading account {} already registered to {}", login, user_id);
                    Ok(AccountCreation::Existing(existing.into()))
                }
                Some(_) => Err(DomainError::AccountAlreadyExists),
                None => Err(DomainError::Store(err)),
            }
        }
        Some(Violation::Unique(_)) => {
            match trading_accounts::get_by_login(&mut *conn, login).await? {
                Some(existing) if existing.user_id == user_id => {
                    debug!("Trading account {} already registered to {}", login, user_id);
                    Ok(AccountCreation::Existing(existing.into()))
                }
                Some(_) => Err(DomainError::LoginTaken),
                None => match trading_accounts::get_by_owner(&mut *conn, user_id).await? {
                    Some(_) => Err(DomainError::AccountAlreadyExists),
                    None => Err(DomainError::Store(err)),
                },
            }
        }
        _ => {
            error!("Failed to create trading account {}: {}", login, err);
            Err(DomainError::Store(err))
        }
    }
}
