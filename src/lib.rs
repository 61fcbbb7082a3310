//! Tourney Trading Competition Library
//!
//! Core of a timed trading competition: trading account registration, joins
//! before the competition starts, trade ingestion and the ranked leaderboard.

pub mod application;
pub mod auth;
pub mod cipher;
pub mod config;
pub mod domain;
pub mod persistence;
pub mod secrets;
