//! Token issuer configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Issuer stamped into every token: the local test realm.
pub const DEFAULT_ISSUER: &str = "http://localhost/realms/test";

/// Lifetime of non-expired tokens (60 minutes).
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

pub const DEFAULT_KEY_SIZE_BITS: usize = 2048;

/// Smallest RSA modulus the RS256 signer accepts.
pub const MIN_KEY_SIZE_BITS: usize = 2048;

/// Largest RSA modulus the RS256 signer accepts.
pub const MAX_KEY_SIZE_BITS: usize = 4096;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Issuer must not be empty")]
    EmptyIssuer,

    #[error("Token lifetime must be at least one second")]
    ZeroLifetime,

    #[error(
        "Unsupported RSA key size: {0} bits (expected {min}..={max})",
        min = MIN_KEY_SIZE_BITS,
        max = MAX_KEY_SIZE_BITS
    )]
    UnsupportedKeySize(usize),
}

/// Access-token issuer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuerConfig {
    /// Value stamped into the `iss` claim.
    pub issuer: String,
    /// Seconds between `iat` and `exp` for non-expired tokens.
    pub token_lifetime_secs: u64,
    /// RSA modulus size for the generated signing key.
    pub key_size_bits: usize,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            token_lifetime_secs: DEFAULT_TOKEN_LIFETIME.as_secs(),
            key_size_bits: DEFAULT_KEY_SIZE_BITS,
        }
    }
}

impl IssuerConfig {
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Set the token lifetime. Sub-second precision is truncated.
    #[must_use]
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime_secs = lifetime.as_secs();
        self
    }

    #[must_use]
    pub fn with_key_size(mut self, bits: usize) -> Self {
        self.key_size_bits = bits;
        self
    }

    pub fn token_lifetime(&self) -> Duration {
        Duration::from_secs(self.token_lifetime_secs)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::EmptyIssuer);
        }

        if self.token_lifetime_secs == 0 {
            return Err(ConfigError::ZeroLifetime);
        }

        if !(MIN_KEY_SIZE_BITS..=MAX_KEY_SIZE_BITS).contains(&self.key_size_bits) {
            return Err(ConfigError::UnsupportedKeySize(self.key_size_bits));
        }

        Ok(())
    }
}
