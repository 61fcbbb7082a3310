//! Shared fixtures for service tests

use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::cipher::CredentialCipher;
use crate::domain::entities::competition::NewCompetition;
use crate::persistence::{self, competitions, users, DbPool};

pub fn cipher() -> Arc<CredentialCipher> {
    Arc::new(CredentialCipher::new(&[42u8; 32]).unwrap())
}

pub async fn pool() -> DbPool {
    persistence::test_pool().await
}

pub async fn user(pool: &DbPool, username: &str) -> Uuid {
    let id = Uuid::new_v4();
    users::insert(pool, id, username, Utc::now()).await.unwrap();
    id
}

/// Competition starting `starts_in` from now and lasting a week
pub async fn competition(pool: &DbPool, starts_in: Duration) -> Uuid {
    let starts_at = Utc::now() + starts_in;
    let comp = NewCompetition::new("Test Cup", starts_at, starts_at + Duration::days(7))
        .validate(Utc::now())
        .unwrap();
    competitions::insert(pool, &comp).await.unwrap();
    comp.id
}
