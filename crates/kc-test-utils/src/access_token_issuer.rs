//! Signed access-token issuer for tests
//!
//! `AccessTokenIssuer` owns one RSA keypair for its whole lifetime and signs
//! Keycloak-style access tokens with it. It also implements
//! [`PublicKeyLocator`], so a verifier under test can be pointed straight at
//! the issuer to resolve the signing key from a token's `kid`.
//!
//! # Example
//! ```rust,ignore
//! let issuer = AccessTokenIssuer::new()?;
//!
//! let mut claims = AccessToken::new();
//! let token = issuer.issue(&mut claims)?;
//! assert_eq!(claims.exp, claims.iat.map(|iat| iat + 3600));
//!
//! let expired = issuer.issue_token(&mut AccessToken::new(), true)?;
//! ```

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use kc_common::claims::AccessToken;
use kc_common::key_locator::PublicKeyLocator;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde_json::json;
use std::fmt;
use std::sync::OnceLock;
use tracing::instrument;

use crate::config::IssuerConfig;
use crate::crypto_fixtures::{create_key_id, generate_rsa_key, test_rsa_key, FixtureError};

/// `typ` header value of issued tokens.
pub const TOKEN_TYPE: &str = "JWT";

/// Claims the issuer owns; untyped copies would serialize as duplicate keys.
const STAMPED_CLAIMS: [&str; 3] = ["iss", "iat", "exp"];

/// Issues RS256-signed access tokens from a keypair generated at construction.
pub struct AccessTokenIssuer {
    config: IssuerConfig,
    encoding_key: EncodingKey,
    public_key: RsaPublicKey,
    key_id: String,
}

impl fmt::Debug for AccessTokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenIssuer")
            .field("config", &self.config)
            .field("key_id", &self.key_id)
            .field("encoding_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl AccessTokenIssuer {
    /// Create an issuer with the default configuration and a fresh 2048-bit key.
    ///
    /// # Errors
    /// Returns `FixtureError::Crypto` if key generation fails.
    pub fn new() -> Result<Self, FixtureError> {
        Self::with_config(IssuerConfig::default())
    }

    /// Create an issuer with a fresh key of `config.key_size_bits`.
    ///
    /// # Errors
    /// Returns `FixtureError::Configuration` for an invalid config and
    /// `FixtureError::Crypto` if key generation fails.
    pub fn with_config(config: IssuerConfig) -> Result<Self, FixtureError> {
        config.validate()?;
        let private_key = generate_rsa_key(config.key_size_bits)?;
        Self::from_private_key(config, &private_key)
    }

    /// Create an issuer whose keypair is derived from `seed`.
    ///
    /// Issuers built from the same seed share a key id, which lets tests
    /// hard-code expectations or simulate a restarted realm.
    pub fn from_seed(seed: u64) -> Result<Self, FixtureError> {
        let config = IssuerConfig::default();
        let private_key = test_rsa_key(seed, config.key_size_bits)?;
        Self::from_private_key(config, &private_key)
    }

    #[instrument(skip_all)]
    fn from_private_key(
        config: IssuerConfig,
        private_key: &RsaPrivateKey,
    ) -> Result<Self, FixtureError> {
        let private_pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| FixtureError::Crypto(format!("Private key encoding failed: {e}")))?;
        let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes())
            .map_err(|e| FixtureError::Crypto(format!("Signing key loading failed: {e}")))?;

        let public_key = private_key.to_public_key();
        let key_id = create_key_id(&public_key)?;

        tracing::debug!(
            target: "kc.test_utils.issuer",
            kid = %key_id,
            issuer = %config.issuer,
            bits = public_key.size() * 8,
            "Created access token issuer"
        );

        Ok(Self {
            config,
            encoding_key,
            public_key,
            key_id,
        })
    }

    pub fn config(&self) -> &IssuerConfig {
        &self.config
    }

    /// Key id placed in the `kid` header of every issued token.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    /// Public key as SPKI PEM, the form Keycloak realm configuration carries.
    pub fn public_key_pem(&self) -> Result<String, FixtureError> {
        self.public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| FixtureError::Crypto(format!("Public key PEM encoding failed: {e}")))
    }

    /// JSON Web Key Set holding the issuer's signing key.
    pub fn jwks(&self) -> serde_json::Value {
        json!({
            "keys": [{
                "kty": "RSA",
                "use": "sig",
                "alg": "RS256",
                "kid": self.key_id,
                "n": URL_SAFE_NO_PAD.encode(self.public_key.n().to_bytes_be()),
                "e": URL_SAFE_NO_PAD.encode(self.public_key.e().to_bytes_be()),
            }]
        })
    }

    /// Stamp `token` and sign it with a one-hour (configured) lifetime.
    ///
    /// Equivalent to `issue_token(token, false)`.
    pub fn issue(&self, token: &mut AccessToken) -> Result<String, FixtureError> {
        self.issue_token(token, false)
    }

    /// Stamp `token` and sign it.
    ///
    /// Sets `iat` to now, `iss` to the configured issuer, and `exp` to either
    /// `iat + lifetime` or, when `force_expired` is true, to 0 so the token is
    /// already expired. Untyped `other_claims` entries with those names are
    /// dropped. All other claims are signed as supplied.
    ///
    /// # Errors
    /// Returns `FixtureError::Signing` if the claims cannot be serialized or signed.
    pub fn issue_token(
        &self,
        token: &mut AccessToken,
        force_expired: bool,
    ) -> Result<String, FixtureError> {
        let now = chrono::Utc::now().timestamp();
        self.issue_at(token, force_expired, now)
    }

    /// Deterministic variant of [`Self::issue_token`] with an explicit `now`.
    #[instrument(skip_all, fields(force_expired = force_expired))]
    pub(crate) fn issue_at(
        &self,
        token: &mut AccessToken,
        force_expired: bool,
        now: i64,
    ) -> Result<String, FixtureError> {
        for name in STAMPED_CLAIMS {
            if token.other_claims.remove(name).is_some() {
                tracing::debug!(
                    target: "kc.test_utils.issuer",
                    claim = name,
                    "Dropped untyped copy of stamped claim"
                );
            }
        }

        token.iat = Some(now);
        token.issuer(self.config.issuer.as_str());
        if force_expired {
            token.expiration(0);
        } else {
            token.expiration(self.expiration_for(now));
        }

        let mut header = Header::new(Algorithm::RS256);
        header.typ = Some(TOKEN_TYPE.to_string());
        header.kid = Some(self.key_id.clone());

        let signed = encode(&header, &*token, &self.encoding_key).map_err(|e| {
            tracing::error!(target: "kc.test_utils.issuer", error = %e, "Failed to sign access token");
            FixtureError::Signing(e.to_string())
        })?;

        tracing::debug!(
            target: "kc.test_utils.issuer",
            kid = %self.key_id,
            iat = now,
            exp = token.exp,
            "Issued access token"
        );

        Ok(signed)
    }

    fn expiration_for(&self, issued_at: i64) -> i64 {
        let lifetime = i64::try_from(self.config.token_lifetime_secs).unwrap_or(i64::MAX);
        issued_at.saturating_add(lifetime)
    }
}

impl PublicKeyLocator for AccessTokenIssuer {
    fn resolve_public_key(&self, kid: &str) -> Option<RsaPublicKey> {
        if kid == self.key_id {
            return Some(self.public_key.clone());
        }

        tracing::debug!(target: "kc.test_utils.issuer", kid = %kid, "No key for requested kid");
        None
    }

    /// Nothing is cached, so there is nothing to invalidate.
    fn reset(&self) {}
}

/// Process-wide issuer shared by every test in the binary.
///
/// Key generation dominates fixture setup time; tests that only need "some
/// valid issuer" should use this instead of constructing their own.
///
/// # Panics
/// Panics if the key cannot be generated, which aborts the test run.
pub fn shared_issuer() -> &'static AccessTokenIssuer {
    static SHARED: OnceLock<AccessTokenIssuer> = OnceLock::new();
    SHARED.get_or_init(|| {
        AccessTokenIssuer::new().expect("Failed to create shared access token issuer")
    })
}
