//! Competition Entity
//!
//! A time-boxed trading event. Joins are accepted strictly before `starts_at`;
//! the competition is "current" while `starts_at <= now < ends_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competition {
    pub id: Uuid,
    pub name: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a competition. A nil or missing id is replaced with a fresh one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCompetition {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl NewCompetition {
    pub fn new(name: impl Into<String>, starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            name: name.into(),
            starts_at,
            ends_at,
        }
    }

    /// Trim the name, assign an id, and check the time window
    pub fn validate(self, created_at: DateTime<Utc>) -> DomainResult<Competition> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidName);
        }
        if self.ends_at <= self.starts_at {
            return Err(DomainError::InvalidTimeRange);
        }

        let id = match self.id {
            Some(id) if !id.is_nil() => id,
            _ => Uuid::new_v4(),
        };

        Ok(Competition {
            id,
            name: name.to_string(),
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            created_at,
        })
    }
}
