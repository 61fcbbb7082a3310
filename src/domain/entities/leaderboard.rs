//! Leaderboard Projection
//!
//! Derived per request from competition members and their summed trade profit.
//! Never stored.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 50;
pub const MAX_LEADERBOARD_LIMIT: i64 = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position across the whole competition, not just this page
    pub rank: i64,
    pub login: i64,
    /// Owner's display name, if they registered one
    pub username: Option<String>,
    pub account_size: Option<f64>,
    pub profit: f64,
    pub equity: Option<f64>,
    /// Profit as a percentage of account size
    pub gain_percent: Option<f64>,
}

/// Offset/limit window, clamped at the service boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
}

impl PageRequest {
    /// Non-positive limits fall back to the default, large ones are capped,
    /// negative offsets become zero.
    pub fn clamped(limit: i64, offset: i64) -> Self {
        let limit = if limit <= 0 {
            DEFAULT_LEADERBOARD_LIMIT
        } else {
            limit.min(MAX_LEADERBOARD_LIMIT)
        };
        Self {
            limit,
            offset: offset.max(0),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::clamped(0, 0)
    }
}
