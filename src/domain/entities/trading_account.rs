//! Trading Account Entity
//!
//! A broker login bound to exactly one platform user. The investor password is
//! only ever held here in its encrypted form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingAccount {
    pub login: i64,
    pub user_id: Uuid,
    pub broker: String,
    #[serde(skip_serializing)]
    pub investor_password_encrypted: String,
    pub created_at: DateTime<Utc>,
}

/// Result of an idempotent create
#[derive(Debug, Clone, PartialEq)]
pub enum AccountCreation {
    /// A new row was written
    Created(TradingAccount),
    /// The same (user, login) pair already existed; nothing was written
    Existing(TradingAccount),
}

impl AccountCreation {
    pub fn account(&self) -> &TradingAccount {
        match self {
            AccountCreation::Created(account) | AccountCreation::Existing(account) => account,
        }
    }

    pub fn into_account(self) -> TradingAccount {
        match self {
            AccountCreation::Created(account) | AccountCreation::Existing(account) => account,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, AccountCreation::Created(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_omits_ciphertext() {
        let account = TradingAccount {
            login: 5001234,
            user_id: Uuid::new_v4(),
            broker: "ICMarkets".to_string(),
            investor_password_encrypted: "c2VjcmV0".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("investor_password_encrypted").is_none());
        assert_eq!(json["login"], 5001234);
    }
}
