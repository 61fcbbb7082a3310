//! Competition Registry
//!
//! Creates and looks up competitions. Records are immutable once written.

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::entities::competition::{Competition, NewCompetition};
use crate::domain::errors::{DomainError, DomainResult};
use crate::persistence::violation::{is_unique, UniqueKey};
use crate::persistence::{competitions, DbPool};

#[derive(Clone)]
pub struct CompetitionRegistry {
    pool: DbPool,
}

impl CompetitionRegistry {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewCompetition) -> DomainResult<Competition> {
        let competition = new.validate(Utc::now())?;

        if let Err(e) = competitions::insert(&self.pool, &competition).await {
            if is_unique(&e, &UniqueKey::CompetitionId) {
                return Err(DomainError::CompetitionAlreadyExists);
            }
            error!("Failed to create competition {}: {}", competition.id, e);
            return Err(DomainError::Store(e));
        }

        info!(
            "Created competition '{}' ({}) running {} to {}",
            competition.name, competition.id, competition.starts_at, competition.ends_at
        );
        Ok(competition)
    }

    pub async fn get_by_id(&self, id: Uuid) -> DomainResult<Competition> {
        if id.is_nil() {
            return Err(DomainError::CompetitionNotFound);
        }
        competitions::get_by_id(&self.pool, id)
            .await?
            .map(Competition::from)
            .ok_or(DomainError::CompetitionNotFound)
    }

    /// The competition running right now
    pub async fn get_current(&self) -> DomainResult<Competition> {
        competitions::get_current(&self.pool, Utc::now())
            .await?
            .map(Competition::from)
            .ok_or(DomainError::CompetitionNotFound)
    }
}
