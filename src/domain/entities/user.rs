//! User Profile
//!
//! Identity comes from the authentication boundary; the profile only adds the
//! display name. Accounts and requests are keyed by the user id alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

pub const MAX_USERNAME_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Trimmed display name of 1 to 32 characters without control characters
pub fn validate_username(username: &str) -> DomainResult<&str> {
    let username = username.trim();
    if username.is_empty()
        || username.chars().count() > MAX_USERNAME_LENGTH
        || username.chars().any(char::is_control)
    {
        return Err(DomainError::InvalidUsername);
    }
    Ok(username)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_is_trimmed() {
        assert_eq!(validate_username("  ana ").unwrap(), "ana");
        assert_eq!(validate_username(&"x".repeat(32)).unwrap().len(), 32);
    }

    #[test]
    fn test_bad_usernames() {
        for bad in ["", "   ", "a\tb", "line\nbreak"] {
            assert!(matches!(
                validate_username(bad),
                Err(DomainError::InvalidUsername)
            ));
        }
        assert!(matches!(
            validate_username(&"x".repeat(33)),
            Err(DomainError::InvalidUsername)
        ));
    }
}
