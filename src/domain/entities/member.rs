use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

/// Join record linking a trading account to a competition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionMember {
    pub competition_id: Uuid,
    pub login: i64,
    /// `None` until an organiser sets it; trades are refused while unset
    pub account_size: Option<f64>,
    pub joined_at: DateTime<Utc>,
}

/// What the calling user has done for a competition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MembershipState {
    pub has_requested_account: bool,
    pub has_joined: bool,
}

/// Reject sizes that cannot serve as a gain baseline
pub fn validate_account_size(size: f64) -> DomainResult<f64> {
    if !size.is_finite() || size <= 0.0 {
        return Err(DomainError::InvalidAccountSize);
    }
    Ok(size)
}
