//! Leaderboard Aggregator

use tracing::debug;
use uuid::Uuid;

use crate::domain::entities::leaderboard::{LeaderboardEntry, PageRequest};
use crate::domain::errors::{DomainError, DomainResult};
use crate::persistence::{competitions, leaderboard, DbPool};

#[derive(Clone)]
pub struct LeaderboardService {
    pool: DbPool,
}

impl LeaderboardService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// One page of the ranked leaderboard. `limit` and `offset` are clamped here,
    /// whatever the transport passed in.
    pub async fn get_leaderboard(
        &self,
        competition_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> DomainResult<Vec<LeaderboardEntry>> {
        if competition_id.is_nil() {
            return Err(DomainError::CompetitionNotFound);
        }
        let page = PageRequest::clamped(limit, offset);

        let rows = leaderboard::fetch(&self.pool, competition_id, page.limit, page.offset).await?;

        // An empty page is ambiguous: no members yet, or no such competition
        if rows.is_empty() && !competitions::exists(&self.pool, competition_id).await? {
            return Err(DomainError::CompetitionNotFound);
        }

        debug!(
            "Leaderboard for {}: {} entries (limit {}, offset {})",
            competition_id,
            rows.len(),
            page.limit,
            page.offset
        );
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
