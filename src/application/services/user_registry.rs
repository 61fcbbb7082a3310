//! User Registry
//!
//! Display profiles for authenticated users. The user id is whatever the
//! authentication boundary vouched for; registering a profile is optional and
//! only supplies the name shown next to the user's trading account.

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::entities::user::{validate_username, User};
use crate::domain::errors::{DomainError, DomainResult};
use crate::persistence::violation::{classify, UniqueKey, Violation};
use crate::persistence::{users, DbPool};

#[derive(Clone)]
pub struct UserRegistry {
    pool: DbPool,
}

impl UserRegistry {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Register the display name for `id`. A profile is written once.
    pub async fn create(&self, id: Uuid, username: &str) -> DomainResult<User> {
        if id.is_nil() {
            return Err(DomainError::Unauthorized);
        }
        let username = validate_username(username)?;

        match users::insert(&self.pool, id, username, Utc::now()).await {
            Ok(row) => {
                info!("Registered username '{}' for user {}", username, id);
                Ok(row.into())
            }
            Err(e) => match classify(&e) {
                Some(Violation::Unique(UniqueKey::UserId)) => Err(DomainError::UserAlreadyExists),
                Some(Violation::Unique(UniqueKey::Username)) => Err(DomainError::UsernameTaken),
                _ => {
                    error!("Failed to register user {}: {}", id, e);
                    Err(DomainError::Store(e))
                }
            },
        }
    }

    pub async fn get_by_id(&self, id: Uuid) -> DomainResult<User> {
        if id.is_nil() {
            return Err(DomainError::UserNotFound);
        }
        users::get_by_id(&self.pool, id)
            .await?
            .map(User::from)
            .ok_or(DomainError::UserNotFound)
    }
}
