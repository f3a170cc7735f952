//! Common error types for the Keycloak client.

use thiserror::Error;

/// Errors surfaced while verifying access tokens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Token was rejected (bad format, unknown signer, bad signature, expired,
    /// wrong issuer or audience). The message is intentionally generic.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Key material could not be encoded for the verification backend
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type alias using `AuthError`
pub type Result<T> = std::result::Result<T, AuthError>;
