//! Secure secret management module
//!
//! Loads the credential cipher key, the token signing secret and the admin API
//! keys. Every secret is returned in a `Zeroizing` buffer so it is wiped from
//! memory when dropped.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{error, warn};
use zeroize::Zeroizing;

use crate::cipher::KEY_LEN;

/// Minimum length for signing secrets and API keys (256 bits of entropy)
pub const MIN_SECRET_LENGTH: usize = 32;

/// Error type for secret loading operations
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    #[error("Secret validation failed: {0}")]
    ValidationFailed(String),
}

/// Fetch a required secret through `lookup`
pub fn require_secret(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Zeroizing<String>, SecretError> {
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(Zeroizing::new(value)),
        _ => {
            error!("Required secret {} is not set", name);
            Err(SecretError::EnvVarNotSet(name.to_string()))
        }
    }
}

/// Validate that a secret meets minimum security requirements
pub fn validate_secret_strength(secret: &str, min_length: usize) -> Result<(), SecretError> {
    if secret.len() < min_length {
        return Err(SecretError::ValidationFailed(format!(
            "Secret too short: {} characters (minimum: {})",
            secret.len(),
            min_length
        )));
    }

    // Check for obviously weak secrets
    let weak_patterns = ["test", "demo", "example", "placeholder", "changeme", "12345"];
    let secret_lower = secret.to_lowercase();

    for pattern in &weak_patterns {
        if secret_lower.contains(pattern) {
            return Err(SecretError::ValidationFailed(format!(
                "Secret contains weak pattern: {}",
                pattern
            )));
        }
    }

    Ok(())
}

/// Decode a base64 cipher key; it must be exactly 32 bytes
pub fn decode_cipher_key(encoded: &str) -> Result<Zeroizing<Vec<u8>>, SecretError> {
    let bytes = Zeroizing::new(STANDARD.decode(encoded.trim()).map_err(|_| {
        SecretError::ValidationFailed("Cipher key is not valid base64".to_string())
    })?);

    if bytes.len() != KEY_LEN {
        return Err(SecretError::ValidationFailed(format!(
            "Cipher key must decode to {} bytes, got {}",
            KEY_LEN,
            bytes.len()
        )));
    }

    Ok(bytes)
}

/// Split a comma-separated key list, validating each entry
pub fn parse_api_keys(raw: &str) -> Result<Vec<Zeroizing<String>>, SecretError> {
    let mut keys = Vec::new();

    for key in raw.split(',').map(str::trim).filter(|k| !k.is_empty()) {
        if let Err(e) = validate_secret_strength(key, MIN_SECRET_LENGTH) {
            warn!("Rejected weak admin API key (length: {})", key.len());
            return Err(e);
        }
        keys.push(Zeroizing::new(key.to_string()));
    }

    if keys.is_empty() {
        return Err(SecretError::ValidationFailed(format!(
            "At least one API key with length >= {} characters is required",
            MIN_SECRET_LENGTH
        )));
    }

    Ok(keys)
}
