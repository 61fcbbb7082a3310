use thiserror::Error;

use crate::cipher::CipherError;

/// Coarse classification a transport boundary maps to its own status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Precondition,
    Authorization,
    Infrastructure,
}

/// Why a single trade in a batch was rejected
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TradeViolation {
    #[error("invalid position id")]
    InvalidPositionId,

    #[error("invalid symbol")]
    InvalidSymbol,

    #[error("invalid side")]
    InvalidSide,

    #[error("close time must be after open time")]
    InvalidTimeRange,

    #[error("numeric fields must be finite")]
    NonFiniteValue,
}

/// Every error the competition core returns
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid competition name")]
    InvalidName,

    #[error("competition must end after it starts")]
    InvalidTimeRange,

    #[error("invalid trading account login")]
    InvalidLogin,

    #[error("invalid broker")]
    InvalidBroker,

    #[error("invalid encrypted credential")]
    InvalidCredential,

    #[error("invalid investor password")]
    InvalidInvestorPassword,

    #[error("invalid account size")]
    InvalidAccountSize,

    #[error("invalid username")]
    InvalidUsername,

    #[error("trade[{index}]: {violation}")]
    InvalidTrade {
        index: usize,
        violation: TradeViolation,
    },

    #[error("competition not found")]
    CompetitionNotFound,

    #[error("trading account not found")]
    TradingAccountNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("competition already exists")]
    CompetitionAlreadyExists,

    #[error("competition already started")]
    AlreadyStarted,

    #[error("trading account already joined competition")]
    AlreadyJoined,

    #[error("trading account login already taken")]
    LoginTaken,

    #[error("user already has a trading account")]
    AccountAlreadyExists,

    #[error("user profile already exists")]
    UserAlreadyExists,

    #[error("username already taken")]
    UsernameTaken,

    #[error("trade[{index}]: position {position_id} already recorded")]
    TradeAlreadyRecorded { index: usize, position_id: i64 },

    #[error("account size is not set for this competition member")]
    AccountSizeNotSet,

    #[error("trading account is not a member of this competition")]
    NotMember,

    #[error("unauthorized")]
    Unauthorized,

    #[error("internal store failure")]
    Store(#[source] sqlx::Error),

    #[error("credential cipher failure")]
    Cipher(#[from] CipherError),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::InvalidName
            | DomainError::InvalidTimeRange
            | DomainError::InvalidLogin
            | DomainError::InvalidBroker
            | DomainError::InvalidCredential
            | DomainError::InvalidInvestorPassword
            | DomainError::InvalidAccountSize
            | DomainError::InvalidUsername
            | DomainError::InvalidTrade { .. } => ErrorKind::Validation,
            DomainError::CompetitionNotFound
            | DomainError::TradingAccountNotFound
            | DomainError::UserNotFound => ErrorKind::NotFound,
            DomainError::CompetitionAlreadyExists
            | DomainError::AlreadyStarted
            | DomainError::AlreadyJoined
            | DomainError::LoginTaken
            | DomainError::AccountAlreadyExists
            | DomainError::UserAlreadyExists
            | DomainError::UsernameTaken
            | DomainError::TradeAlreadyRecorded { .. } => ErrorKind::Conflict,
            DomainError::AccountSizeNotSet | DomainError::NotMember => ErrorKind::Precondition,
            DomainError::Unauthorized => ErrorKind::Authorization,
            DomainError::Store(_) | DomainError::Cipher(_) => ErrorKind::Infrastructure,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.kind() == ErrorKind::Infrastructure
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(e: sqlx::Error) -> Self {
        DomainError::Store(e)
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
