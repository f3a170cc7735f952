//! Verifier configuration.

use crate::jwt::{DEFAULT_CLOCK_SKEW, MAX_CLOCK_SKEW};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Issuer expected by default: the local test realm.
pub const DEFAULT_EXPECTED_ISSUER: &str = "http://localhost/realms/test";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Expected issuer must not be empty")]
    EmptyIssuer,

    #[error("Clock skew {0}s exceeds maximum of {max}s", max = MAX_CLOCK_SKEW.as_secs())]
    ClockSkewTooLarge(u64),
}

/// Access-token verifier configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Value the `iss` claim must equal.
    pub expected_issuer: String,
    /// When set, the `aud` claim must equal this value.
    pub audience: Option<String>,
    /// Tolerance for `iat` values in the future, in seconds.
    pub clock_skew_secs: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            expected_issuer: DEFAULT_EXPECTED_ISSUER.to_string(),
            audience: None,
            clock_skew_secs: DEFAULT_CLOCK_SKEW.as_secs(),
        }
    }
}

impl VerifierConfig {
    /// Creates a configuration expecting the given issuer, with default skew.
    pub fn for_issuer(issuer: impl Into<String>) -> Self {
        Self {
            expected_issuer: issuer.into(),
            ..Self::default()
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the issuer is empty or the clock skew is
    /// larger than [`MAX_CLOCK_SKEW`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.expected_issuer.trim().is_empty() {
            return Err(ConfigError::EmptyIssuer);
        }
        if self.clock_skew_secs > MAX_CLOCK_SKEW.as_secs() {
            return Err(ConfigError::ClockSkewTooLarge(self.clock_skew_secs));
        }
        Ok(())
    }

    #[must_use]
    pub fn clock_skew(&self) -> Duration {
        Duration::from_secs(self.clock_skew_secs)
    }
}
