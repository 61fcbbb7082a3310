//! Membership & Join Protocol
//!
//! Joining creates (or confirms) the caller's trading account and enrolls it in
//! a competition that has not started yet. Both writes happen in one
//! transaction; the start-time check is folded into the membership insert so
//! the decision and the write cannot be separated by a concurrent request.

use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::trading_account_registry::create_account;
use crate::cipher::CredentialCipher;
use crate::domain::entities::member::{validate_account_size, CompetitionMember, MembershipState};
use crate::domain::errors::{DomainError, DomainResult};
use crate::persistence::violation::{is_foreign_key, is_unique, UniqueKey};
use crate::persistence::{account_requests, competitions, members, DbPool};

#[derive(Clone)]
pub struct MembershipService {
    pool: DbPool,
    cipher: Arc<CredentialCipher>,
}

impl MembershipService {
    pub fn new(pool: DbPool, cipher: Arc<CredentialCipher>) -> Self {
        Self { pool, cipher }
    }

    /// Enroll the user's trading account in a competition.
    ///
    /// Either the account and the membership are both written, or nothing is.
    pub async fn join(
        &self,
        competition_id: Uuid,
        user_id: Uuid,
        login: i64,
        broker: &str,
        investor_password: &str,
    ) -> DomainResult<CompetitionMember> {
        if competition_id.is_nil() {
            return Err(DomainError::CompetitionNotFound);
        }
        if user_id.is_nil() {
            return Err(DomainError::Unauthorized);
        }
        if login <= 0 {
            return Err(DomainError::InvalidLogin);
        }
        if broker.trim().is_empty() {
            return Err(DomainError::InvalidBroker);
        }
        if investor_password.is_empty() {
            return Err(DomainError::InvalidInvestorPassword);
        }

        let encrypted = self.cipher.encrypt(investor_password)?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let account = create_account(&mut tx, login, user_id, broker, &encrypted).await?;

        let inserted = match members::insert_before_start(&mut *tx, competition_id, login, now).await
        {
            Ok(rows) => rows,
            Err(e) => {
                if is_unique(&e, &UniqueKey::Membership) {
                    return Err(DomainError::AlreadyJoined);
                }
                error!(
                    "Failed to enroll login {} in competition {}: {}",
                    login, competition_id, e
                );
                return Err(DomainError::Store(e));
            }
        };

        if inserted == 0 {
            // Nothing written: work out which precondition failed
            return match competitions::get_start_time(&mut *tx, competition_id).await? {
                None => Err(DomainError::CompetitionNotFound),
                Some(starts_at) if starts_at <= now => {
                    warn!(
                        "Login {} tried to join competition {} after it started",
                        login, competition_id
                    );
                    Err(DomainError::AlreadyStarted)
                }
                Some(_) if members::exists(&mut *tx, competition_id, login).await? => {
                    Err(DomainError::AlreadyJoined)
                }
                Some(_) => Err(DomainError::Store(sqlx::Error::RowNotFound)),
            };
        }

        let member = members::get(&mut *tx, competition_id, login)
            .await?
            .ok_or(DomainError::Store(sqlx::Error::RowNotFound))?;

        tx.commit().await?;

        info!(
            "User {} joined competition {} with login {} (account {})",
            user_id,
            competition_id,
            login,
            if account.was_created() { "created" } else { "existing" }
        );
        Ok(member.into())
    }

    /// Set the baseline balance used for gain and equity. Organiser operation.
    pub async fn update_account_size(
        &self,
        competition_id: Uuid,
        login: i64,
        account_size: f64,
    ) -> DomainResult<CompetitionMember> {
        if competition_id.is_nil() {
            return Err(DomainError::CompetitionNotFound);
        }
        if login <= 0 {
            return Err(DomainError::InvalidLogin);
        }
        let account_size = validate_account_size(account_size)?;

        let mut tx = self.pool.begin().await?;

        let updated =
            members::update_account_size(&mut *tx, competition_id, login, account_size).await?;
        if updated == 0 {
            return if competitions::exists(&mut *tx, competition_id).await? {
                Err(DomainError::NotMember)
            } else {
                Err(DomainError::CompetitionNotFound)
            };
        }

        let member = members::get(&mut *tx, competition_id, login)
            .await?
            .ok_or(DomainError::NotMember)?;
        tx.commit().await?;

        info!(
            "Set account size {} for login {} in competition {}",
            account_size, login, competition_id
        );
        Ok(member.into())
    }

    /// Whether the user has requested an account and whether they have joined
    pub async fn membership_state(
        &self,
        competition_id: Uuid,
        user_id: Uuid,
    ) -> DomainResult<MembershipState> {
        if user_id.is_nil() {
            return Err(DomainError::Unauthorized);
        }
        if competition_id.is_nil() || !competitions::exists(&self.pool, competition_id).await? {
            return Err(DomainError::CompetitionNotFound);
        }

        Ok(MembershipState {
            has_requested_account: account_requests::exists(&self.pool, user_id, competition_id)
                .await?,
            has_joined: members::user_has_joined(&self.pool, user_id, competition_id).await?,
        })
    }

    /// Ask the organisers for a competition account. Repeating the request is a no-op.
    pub async fn request_account(&self, competition_id: Uuid, user_id: Uuid) -> DomainResult<()> {
        if user_id.is_nil() {
            return Err(DomainError::Unauthorized);
        }
        if competition_id.is_nil() {
            return Err(DomainError::CompetitionNotFound);
        }

        match account_requests::insert(&self.pool, user_id, competition_id, Utc::now()).await {
            Ok(0) => Ok(()),
            Ok(_) => {
                info!(
                    "User {} requested an account for competition {}",
                    user_id, competition_id
                );
                Ok(())
            }
            Err(e) if is_foreign_key(&e) => Err(DomainError::CompetitionNotFound),
            Err(e) => {
                error!("Failed to record account request: {}", e);
                Err(DomainError::Store(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::test_support;
    use crate::application::services::trading_account_registry::TradingAccountRegistry;
    use crate::persistence::trading_accounts;
    use chrono::Duration;

    async fn service() -> (MembershipService, DbPool) {
        let pool = test_support::pool().await;
        (MembershipService::new(pool.clone(), test_support::cipher()), pool)
    }

    #[tokio::test]
    async fn test_join_creates_account_and_membership() {
        let (service, pool) = service().await;
        let user = test_support::user(&pool, "ana").await;
        let comp = test_support::competition(&pool, Duration::days(1)).await;

        let member = service.join(comp, user, 5001, "ICMarkets", "inv3stor").await.unwrap();
        assert_eq!(member.competition_id, comp);
        assert_eq!(member.login, 5001);
        assert_eq!(member.account_size, None);

        let registry = TradingAccountRegistry::new(pool.clone(), test_support::cipher());
        let account = registry.get_by_owner(user).await.unwrap();
        assert_eq!(account.login, 5001);
        assert_ne!(account.investor_password_encrypted, "inv3stor");
        assert_eq!(*registry.investor_password(5001).await.unwrap(), "inv3stor");
    }

    #[tokio::test]
    async fn test_second_join_is_rejected() {
        let (service, pool) = service().await;
        let user = test_support::user(&pool, "ana").await;
        let comp = test_support::competition(&pool, Duration::days(1)).await;

        service.join(comp, user, 5001, "ICMarkets", "pw").await.unwrap();
        assert!(matches!(
            service.join(comp, user, 5001, "ICMarkets", "pw").await,
            Err(DomainError::AlreadyJoined)
        ));
    }

    #[tokio::test]
    async fn test_existing_account_can_join_another_competition() {
        let (service, pool) = service().await;
        let user = test_support::user(&pool, "ana").await;
        let first = test_support::competition(&pool, Duration::days(1)).await;
        let second = test_support::competition(&pool, Duration::days(2)).await;

        service.join(first, user, 5001, "ICMarkets", "pw").await.unwrap();
        service.join(second, user, 5001, "ICMarkets", "pw").await.unwrap();
        assert!(service.membership_state(second, user).await.unwrap().has_joined);
    }

    #[tokio::test]
    async fn test_join_after_start_writes_nothing() {
        let (service, pool) = service().await;
        let user = test_support::user(&pool, "ana").await;
        let comp = test_support::competition(&pool, -Duration::minutes(5)).await;

        assert!(matches!(
            service.join(comp, user, 5001, "ICMarkets", "pw").await,
            Err(DomainError::AlreadyStarted)
        ));
        assert!(trading_accounts::get_by_owner(&pool, user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejoin_after_start_reports_started() {
        let (service, pool) = service().await;
        let user = test_support::user(&pool, "ana").await;
        let comp = test_support::competition(&pool, Duration::days(1)).await;
        service.join(comp, user, 5001, "ICMarkets", "pw").await.unwrap();

        sqlx::query("UPDATE competitions SET starts_at = ?1 WHERE id = ?2")
            .bind(Utc::now() - Duration::minutes(1))
            .bind(comp)
            .execute(&pool)
            .await
            .unwrap();

        assert!(matches!(
            service.join(comp, user, 5001, "ICMarkets", "pw").await,
            Err(DomainError::AlreadyStarted)
        ));
    }

    #[tokio::test]
    async fn test_user_without_profile_can_join() {
        let (service, pool) = service().await;
        let user = Uuid::new_v4();
        let comp = test_support::competition(&pool, Duration::days(1)).await;

        assert!(matches!(
            service.join(Uuid::new_v4(), user, 5001, "ICMarkets", "pw").await,
            Err(DomainError::CompetitionNotFound)
        ));

        let member = service.join(comp, user, 5001, "ICMarkets", "pw").await.unwrap();
        assert_eq!(member.login, 5001);

        service.request_account(comp, user).await.unwrap();
        let state = service.membership_state(comp, user).await.unwrap();
        assert!(state.has_joined);
        assert!(state.has_requested_account);
    }

    #[tokio::test]
    async fn test_join_unknown_competition_writes_nothing() {
        let (service, pool) = service().await;
        let user = test_support::user(&pool, "ana").await;

        assert!(matches!(
            service.join(Uuid::new_v4(), user, 5001, "ICMarkets", "pw").await,
            Err(DomainError::CompetitionNotFound)
        ));
        assert!(!trading_accounts::exists(&pool, 5001).await.unwrap());
    }

    #[tokio::test]
    async fn test_join_with_different_login_conflicts() {
        let (service, pool) = service().await;
        let user = test_support::user(&pool, "ana").await;
        let comp = test_support::competition(&pool, Duration::days(1)).await;

        service.join(comp, user, 5001, "ICMarkets", "pw").await.unwrap();
        let other = test_support::competition(&pool, Duration::days(1)).await;
        assert!(matches!(
            service.join(other, user, 5002, "ICMarkets", "pw").await,
            Err(DomainError::AccountAlreadyExists)
        ));
        assert!(!members::exists(&pool, other, 5002).await.unwrap());
    }

    #[tokio::test]
    async fn test_join_with_login_owned_by_someone_else() {
        let (service, pool) = service().await;
        let ana = test_support::user(&pool, "ana").await;
        let bo = test_support::user(&pool, "bo").await;
        let comp = test_support::competition(&pool, Duration::days(1)).await;

        service.join(comp, ana, 5001, "ICMarkets", "pw").await.unwrap();
        assert!(matches!(
            service.join(comp, bo, 5001, "ICMarkets", "pw").await,
            Err(DomainError::LoginTaken)
        ));
    }

    #[tokio::test]
    async fn test_join_precondition_order() {
        let (service, pool) = service().await;
        let user = test_support::user(&pool, "ana").await;
        let comp = test_support::competition(&pool, Duration::days(1)).await;

        assert!(matches!(
            service.join(Uuid::nil(), Uuid::nil(), 0, "", "").await,
            Err(DomainError::CompetitionNotFound)
        ));
        assert!(matches!(
            service.join(comp, Uuid::nil(), 0, "", "").await,
            Err(DomainError::Unauthorized)
        ));
        assert!(matches!(
            service.join(comp, user, 0, "", "").await,
            Err(DomainError::InvalidLogin)
        ));
        assert!(matches!(
            service.join(comp, user, 1, " ", "").await,
            Err(DomainError::InvalidBroker)
        ));
        assert!(matches!(
            service.join(comp, user, 1, "b", "").await,
            Err(DomainError::InvalidInvestorPassword)
        ));
    }

    #[tokio::test]
    async fn test_update_account_size() {
        let (service, pool) = service().await;
        let user = test_support::user(&pool, "ana").await;
        let comp = test_support::competition(&pool, Duration::days(1)).await;
        service.join(comp, user, 5001, "ICMarkets", "pw").await.unwrap();

        let member = service.update_account_size(comp, 5001, 10_000.0).await.unwrap();
        assert_eq!(member.account_size, Some(10_000.0));

        assert!(matches!(
            service.update_account_size(comp, 5001, 0.0).await,
            Err(DomainError::InvalidAccountSize)
        ));
        assert!(matches!(
            service.update_account_size(comp, 9999, 100.0).await,
            Err(DomainError::NotMember)
        ));
        assert!(matches!(
            service.update_account_size(Uuid::new_v4(), 5001, 100.0).await,
            Err(DomainError::CompetitionNotFound)
        ));
    }

    #[tokio::test]
    async fn test_account_request_is_idempotent() {
        let (service, pool) = service().await;
        let user = test_support::user(&pool, "ana").await;
        let comp = test_support::competition(&pool, Duration::days(1)).await;

        assert_eq!(
            service.membership_state(comp, user).await.unwrap(),
            MembershipState::default()
        );

        service.request_account(comp, user).await.unwrap();
        service.request_account(comp, user).await.unwrap();

        let state = service.membership_state(comp, user).await.unwrap();
        assert!(state.has_requested_account);
        assert!(!state.has_joined);
    }

    #[tokio::test]
    async fn test_account_request_errors() {
        let (service, pool) = service().await;
        let user = test_support::user(&pool, "ana").await;
        let comp = test_support::competition(&pool, Duration::days(1)).await;

        assert!(matches!(
            service.request_account(Uuid::new_v4(), user).await,
            Err(DomainError::CompetitionNotFound)
        ));
        assert!(matches!(
            service.request_account(comp, Uuid::nil()).await,
            Err(DomainError::Unauthorized)
        ));
        assert!(matches!(
            service.membership_state(Uuid::new_v4(), user).await,
            Err(DomainError::CompetitionNotFound)
        ));
    }
}
