//! Trade Ingestion Pipeline
//!
//! Accepts a batch of closed trades for one competition member. The whole batch
//! is validated before anything is written, then written in one transaction:
//! either every trade lands or none does.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::domain::entities::trade::{validate_batch, Trade};
use crate::domain::errors::{DomainError, DomainResult};
use crate::persistence::violation::{classify, UniqueKey, Violation};
use crate::persistence::{competitions, members, trades, trading_accounts, DbPool};

#[derive(Clone)]
pub struct TradeIngestionService {
    pool: DbPool,
}

impl TradeIngestionService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Validate and persist `batch` for the member. Returns the number of trades written.
    pub async fn insert_trades(
        &self,
        competition_id: Uuid,
        login: i64,
        batch: &[Trade],
    ) -> DomainResult<usize> {
        if competition_id.is_nil() {
            return Err(DomainError::CompetitionNotFound);
        }
        if login <= 0 {
            return Err(DomainError::InvalidLogin);
        }

        match members::get_account_size(&self.pool, competition_id, login).await? {
            None if competitions::exists(&self.pool, competition_id).await? => {
                return Err(DomainError::NotMember)
            }
            None => return Err(DomainError::CompetitionNotFound),
            Some(None) => return Err(DomainError::AccountSizeNotSet),
            Some(Some(_)) => {}
        }

        let valid = validate_batch(batch)?;
        if valid.is_empty() {
            debug!("Empty trade batch for login {} in {}", login, competition_id);
            return Ok(0);
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        for (index, trade) in valid.iter().enumerate() {
            if let Err(e) = trades::insert(&mut *tx, competition_id, login, trade, now).await {
                let err =
                    translate_insert_error(&mut tx, e, competition_id, login, index, trade.position_id)
                        .await;
                return Err(err);
            }
        }

        tx.commit().await?;

        info!(
            "Recorded {} trades for login {} in competition {}",
            valid.len(),
            login,
            competition_id
        );
        Ok(valid.len())
    }
}

/// Map a failed trade insert to the domain error naming what is missing or duplicated
async fn translate_insert_error(
    conn: &mut SqliteConnection,
    err: sqlx::Error,
    competition_id: Uuid,
    login: i64,
    index: usize,
    position_id: i64,
) -> DomainError {
    match classify(&err) {
        Some(Violation::Unique(UniqueKey::TradePosition)) => {
            DomainError::TradeAlreadyRecorded { index, position_id }
        }
        Some(Violation::ForeignKey) => {
            match foreign_key_cause(conn, competition_id, login).await {
                Ok(cause) => cause,
                Err(e) => DomainError::Store(e),
            }
        }
        _ => {
            error!(
                "Failed to insert trade {} for login {} in competition {}: {}",
                position_id, login, competition_id, err
            );
            DomainError::Store(err)
        }
    }
}

async fn foreign_key_cause(
    conn: &mut SqliteConnection,
    competition_id: Uuid,
    login: i64,
) -> Result<DomainError, sqlx::Error> {
    if !competitions::exists(&mut *conn, competition_id).await? {
        return Ok(DomainError::CompetitionNotFound);
    }
    if !trading_accounts::exists(&mut *conn, login).await? {
        return Ok(DomainError::TradingAccountNotFound);
    }
    Ok(DomainError::NotMember)
}
