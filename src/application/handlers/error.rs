use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::errors::{DomainError, ErrorKind};

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Domain error on its way out of a handler
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match (&self.0, self.0.kind()) {
            (DomainError::NotMember, _) => StatusCode::FORBIDDEN,
            (_, ErrorKind::Validation | ErrorKind::Precondition) => StatusCode::BAD_REQUEST,
            (_, ErrorKind::NotFound) => StatusCode::NOT_FOUND,
            (_, ErrorKind::Conflict) => StatusCode::CONFLICT,
            (_, ErrorKind::Authorization) => StatusCode::UNAUTHORIZED,
            (_, ErrorKind::Infrastructure) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if self.0.is_internal() {
            match std::error::Error::source(&self.0) {
                Some(source) => error!("Request failed: {}: {}", self.0, source),
                None => error!("Request failed: {}", self.0),
            }
            "internal error".to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::CipherError;
    use crate::domain::errors::TradeViolation;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (DomainError::InvalidLogin, StatusCode::BAD_REQUEST),
            (
                DomainError::InvalidTrade {
                    index: 0,
                    violation: TradeViolation::InvalidSide,
                },
                StatusCode::BAD_REQUEST,
            ),
            (DomainError::AccountSizeNotSet, StatusCode::BAD_REQUEST),
            (DomainError::NotMember, StatusCode::FORBIDDEN),
            (DomainError::CompetitionNotFound, StatusCode::NOT_FOUND),
            (DomainError::TradingAccountNotFound, StatusCode::NOT_FOUND),
            (DomainError::UserNotFound, StatusCode::NOT_FOUND),
            (DomainError::UsernameTaken, StatusCode::CONFLICT),
            (DomainError::AlreadyJoined, StatusCode::CONFLICT),
            (DomainError::AlreadyStarted, StatusCode::CONFLICT),
            (DomainError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                DomainError::Cipher(CipherError::AuthenticationFailed),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }

    #[test]
    fn test_internal_errors_are_opaque() {
        let response =
            ApiError(DomainError::Store(sqlx::Error::Protocol("disk I/O at /var/db".into())))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
