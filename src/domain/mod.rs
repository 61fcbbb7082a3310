pub mod entities;
pub mod errors;

pub use errors::{DomainError, DomainResult, ErrorKind, TradeViolation};
