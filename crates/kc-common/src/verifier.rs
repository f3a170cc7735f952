//! Access-token verification against keys from a [`PublicKeyLocator`].
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (via [`crate::jwt::extract_kid`])
//! - Only RS256 is accepted
//! - `exp` is checked with zero leeway, `iat` with the configured clock skew
//! - An unknown `kid` is a verification failure, never a panic
//! - All failures map to one generic message; details go to debug logs

use crate::claims::AccessToken;
use crate::config::{ConfigError, VerifierConfig};
use crate::error::AuthError;
use crate::jwt::{extract_kid, validate_iat};
use crate::key_locator::PublicKeyLocator;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::RsaPublicKey;
use tracing::instrument;

const INVALID_TOKEN_MESSAGE: &str = "The access token is invalid or expired";

fn invalid_token() -> AuthError {
    AuthError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string())
}

/// Verifies Keycloak access tokens.
pub struct AccessTokenVerifier<L> {
    locator: L,
    config: VerifierConfig,
}

impl<L: PublicKeyLocator> AccessTokenVerifier<L> {
    /// Create a verifier that resolves signing keys through `locator`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `config` does not validate.
    pub fn new(locator: L, config: VerifierConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { locator, config })
    }

    #[must_use]
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    #[must_use]
    pub fn locator(&self) -> &L {
        &self.locator
    }

    /// Drop any keys cached by the locator.
    pub fn reset_keys(&self) {
        self.locator.reset();
    }

    /// Verify a token and return its claims.
    ///
    /// # Checks
    ///
    /// 1. Size and format check, `kid` extraction
    /// 2. Key lookup through the locator
    /// 3. RS256 signature verification
    /// 4. `exp` (required, zero leeway) and `iss` (required, exact match)
    /// 5. `aud` when an audience is configured
    /// 6. `iat` clock skew, when present
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` with a generic message for every
    /// rejection, and `AuthError::Crypto` if the located key cannot be encoded
    /// for the verification backend.
    #[instrument(skip_all)]
    pub fn verify(&self, token: &str) -> Result<AccessToken, AuthError> {
        let kid = extract_kid(token).map_err(|e| {
            tracing::debug!(target: "kc.common.verifier", error = ?e, "Token kid extraction failed");
            invalid_token()
        })?;

        let Some(public_key) = self.locator.resolve_public_key(&kid) else {
            tracing::debug!(target: "kc.common.verifier", kid = %kid, "Token signed by unknown key");
            return Err(invalid_token());
        };

        let claims = self.verify_signature(token, &public_key)?;

        if let Some(iat) = claims.iat {
            if let Err(e) = validate_iat(iat, self.config.clock_skew()) {
                tracing::debug!(target: "kc.common.verifier", error = ?e, "Token iat validation failed");
                return Err(invalid_token());
            }
        }

        tracing::debug!(target: "kc.common.verifier", kid = %kid, "Token verified successfully");
        Ok(claims)
    }

    fn verify_signature(
        &self,
        token: &str,
        public_key: &RsaPublicKey,
    ) -> Result<AccessToken, AuthError> {
        let public_pem = public_key.to_public_key_pem(LineEnding::LF).map_err(|e| {
            tracing::error!(target: "kc.common.verifier", error = %e, "Failed to encode public key");
            AuthError::Crypto(format!("Public key encoding failed: {e}"))
        })?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem.as_bytes()).map_err(|e| {
            tracing::error!(target: "kc.common.verifier", error = %e, "Failed to load public key");
            AuthError::Crypto(format!("Public key loading failed: {e}"))
        })?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.set_issuer(&[self.config.expected_issuer.as_str()]);
        match &self.config.audience {
            Some(audience) => validation.set_audience(&[audience.as_str()]),
            None => validation.validate_aud = false,
        }

        let token_data = decode::<AccessToken>(token, &decoding_key, &validation).map_err(|e| {
            tracing::debug!(target: "kc.common.verifier", error = %e, "Token verification failed");
            invalid_token()
        })?;

        Ok(token_data.claims)
    }
}
