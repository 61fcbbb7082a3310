pub mod competition_registry;
pub mod leaderboard;
pub mod membership;
pub mod trade_ingestion;
pub mod trading_account_registry;
pub mod user_registry;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use crate::cipher::CredentialCipher;
use crate::persistence::DbPool;

pub use competition_registry::CompetitionRegistry;
pub use leaderboard::LeaderboardService;
pub use membership::MembershipService;
pub use trade_ingestion::TradeIngestionService;
pub use trading_account_registry::TradingAccountRegistry;
pub use user_registry::UserRegistry;

/// Every service wired to the same pool and cipher
#[derive(Clone)]
pub struct Services {
    pub users: UserRegistry,
    pub competitions: CompetitionRegistry,
    pub accounts: TradingAccountRegistry,
    pub membership: MembershipService,
    pub trades: TradeIngestionService,
    pub leaderboard: LeaderboardService,
}

impl Services {
    pub fn new(pool: DbPool, cipher: Arc<CredentialCipher>) -> Self {
        Self {
            users: UserRegistry::new(pool.clone()),
            competitions: CompetitionRegistry::new(pool.clone()),
            accounts: TradingAccountRegistry::new(pool.clone(), cipher.clone()),
            membership: MembershipService::new(pool.clone(), cipher),
            trades: TradeIngestionService::new(pool.clone()),
            leaderboard: LeaderboardService::new(pool),
        }
    }
}
