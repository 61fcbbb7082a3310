pub mod competition;
pub mod leaderboard;
pub mod member;
pub mod trade;
pub mod trading_account;
pub mod user;
