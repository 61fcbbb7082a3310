use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use zeroize::Zeroizing;

/// Caller identity placed in request extensions by [`require_user`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Uuid);

/// Claims carried by user tokens. `sub` is the user id.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: u64,
}

/// Validates user bearer tokens (HS256) and organiser API keys
pub struct Authenticator {
    decoding_key: DecodingKey,
    validation: Validation,
    admin_keys: Vec<Zeroizing<String>>,
}

impl Authenticator {
    pub fn new(jwt_secret: &[u8], admin_keys: Vec<Zeroizing<String>>) -> Self {
        tracing::info!(
            "✓ API authentication initialized with {} admin key(s)",
            admin_keys.len()
        );
        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret),
            validation: Validation::new(Algorithm::HS256),
            admin_keys,
        }
    }

    /// Resolve a user token to the user id in its `sub` claim
    pub fn verify_user_token(&self, token: &str) -> Option<Uuid> {
        let data = match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Rejected user token: {}", e);
                return None;
            }
        };
        Uuid::parse_str(&data.claims.sub)
            .ok()
            .filter(|id| !id.is_nil())
    }

    fn is_valid_admin_key(&self, key: &str) -> bool {
        self.admin_keys.iter().any(|k| k.as_str() == key)
    }
}

fn bearer(request: &Request) -> Result<&str, StatusCode> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(auth) if auth.starts_with("Bearer ") => Ok(&auth[7..]),
        Some(_) => {
            tracing::warn!("Invalid Authorization header format (expected Bearer token)");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            tracing::warn!("Missing Authorization header");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Middleware for user endpoints: requires a valid user token
pub async fn require_user(
    State(auth): State<Arc<Authenticator>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let user_id = auth
        .verify_user_token(bearer(&request)?)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(AuthenticatedUser(user_id));
    Ok(next.run(request).await)
}

/// Middleware for organiser endpoints: requires an admin API key
pub async fn require_admin(
    State(auth): State<Arc<Authenticator>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth.is_valid_admin_key(bearer(&request)?) {
        Ok(next.run(request).await)
    } else {
        tracing::warn!("Invalid API key attempted");
        Err(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    pub(crate) const JWT_SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";
    pub(crate) const ADMIN_KEY: &str = "adminkeyadminkeyadminkeyadminkey";

    pub(crate) fn authenticator() -> Authenticator {
        Authenticator::new(JWT_SECRET, vec![Zeroizing::new(ADMIN_KEY.to_string())])
    }

    pub(crate) fn token_for(sub: &str, secret: &[u8]) -> String {
        let exp = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as u64;
        encode(
            &Header::default(),
            &Claims {
                sub: sub.to_string(),
                exp,
            },
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    #[test]
    fn test_user_token_validation() {
        let auth = authenticator();
        let user = Uuid::new_v4();

        assert_eq!(
            auth.verify_user_token(&token_for(&user.to_string(), JWT_SECRET)),
            Some(user)
        );
        assert_eq!(
            auth.verify_user_token(&token_for(&user.to_string(), b"another-secret-another-secret-xx")),
            None
        );
        assert_eq!(auth.verify_user_token(&token_for("not-a-uuid", JWT_SECRET)), None);
        assert_eq!(
            auth.verify_user_token(&token_for(&Uuid::nil().to_string(), JWT_SECRET)),
            None
        );
        assert_eq!(auth.verify_user_token("garbage"), None);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let auth = authenticator();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            exp: (chrono::Utc::now() - chrono::Duration::hours(2)).timestamp() as u64,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET))
            .unwrap();
        assert_eq!(auth.verify_user_token(&token), None);
    }

    #[test]
    fn test_api_key_validation() {
        let auth = authenticator();
        assert!(auth.is_valid_admin_key(ADMIN_KEY));
        assert!(!auth.is_valid_admin_key("invalid_key"));
        assert!(!auth.is_valid_admin_key(""));
    }
}
