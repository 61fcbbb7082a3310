//! Trade Entity
//!
//! A closed position reported for an account within a competition. Trades are
//! append-only; a batch is validated in full before anything is written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::{DomainError, DomainResult, TradeViolation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "buy",
            TradeSide::Sell => "sell",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeSide {
    type Err = TradeViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(TradeSide::Buy),
            "sell" => Ok(TradeSide::Sell),
            _ => Err(TradeViolation::InvalidSide),
        }
    }
}

/// Trade as submitted by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub position_id: i64,
    pub symbol: String,
    pub side: String,
    pub volume: f64,
    pub open_time: DateTime<Utc>,
    pub close_time: DateTime<Utc>,
    pub open_price: f64,
    pub close_price: f64,
    pub profit: f64,
    pub commission: f64,
    pub swap: f64,
}

/// Trade that passed validation, ready for the store
#[derive(Debug, Clone, PartialEq)]
pub struct ValidTrade {
    pub position_id: i64,
    pub symbol: String,
    pub side: TradeSide,
    pub volume: f64,
    pub open_time: DateTime<Utc>,
    pub close_time: DateTime<Utc>,
    pub open_price: f64,
    pub close_price: f64,
    pub profit: f64,
    pub commission: f64,
    pub swap: f64,
}

impl Trade {
    pub fn validate(&self) -> Result<ValidTrade, TradeViolation> {
        if self.position_id <= 0 {
            return Err(TradeViolation::InvalidPositionId);
        }
        let symbol = self.symbol.trim();
        if symbol.is_empty() {
            return Err(TradeViolation::InvalidSymbol);
        }
        let side = self.side.parse::<TradeSide>()?;
        if self.close_time <= self.open_time {
            return Err(TradeViolation::InvalidTimeRange);
        }
        let amounts = [
            self.volume,
            self.open_price,
            self.close_price,
            self.profit,
            self.commission,
            self.swap,
        ];
        if !amounts.iter().all(|v| v.is_finite()) {
            return Err(TradeViolation::NonFiniteValue);
        }

        Ok(ValidTrade {
            position_id: self.position_id,
            symbol: symbol.to_string(),
            side,
            volume: self.volume,
            open_time: self.open_time,
            close_time: self.close_time,
            open_price: self.open_price,
            close_price: self.close_price,
            profit: self.profit,
            commission: self.commission,
            swap: self.swap,
        })
    }
}

/// Validate every trade; the first failure aborts with its index
pub fn validate_batch(trades: &[Trade]) -> DomainResult<Vec<ValidTrade>> {
    trades
        .iter()
        .enumerate()
        .map(|(index, trade)| {
            trade
                .validate()
                .map_err(|violation| DomainError::InvalidTrade { index, violation })
        })
        .collect()
}

/// Stored trade as returned by history queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub competition_id: uuid::Uuid,
    pub position_id: i64,
    pub symbol: String,
    pub side: String,
    pub volume: f64,
    pub open_time: DateTime<Utc>,
    pub close_time: DateTime<Utc>,
    pub open_price: f64,
    pub close_price: f64,
    pub profit: f64,
    pub commission: f64,
    pub swap: f64,
}

/// All trades of one account plus its owner's display name, if any
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeHistory {
    pub login: i64,
    pub username: Option<String>,
    pub trades: Vec<TradeRecord>,
}

#[cfg(test)]
pub(crate) fn sample_trade(position_id: i64, profit: f64) -> Trade {
    let open_time = Utc::now() - chrono::Duration::hours(2);
    Trade {
        position_id,
        symbol: "EURUSD".to_string(),
        side: "buy".to_string(),
        volume: 1.0,
        open_time,
        close_time: open_time + chrono::Duration::minutes(30),
        open_price: 1.0850,
        close_price: 1.0880,
        profit,
        commission: -3.5,
        swap: 0.0,
    }
}
