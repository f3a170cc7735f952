//! RSA cryptographic fixtures for testing
//!
//! Provides RSA keypairs (random or seed-deterministic) and the key id
//! fingerprint used in token headers.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::{OsRng, StdRng};
use rand::SeedableRng;
use ring::digest::{digest, SHA256};
use rsa::pkcs8::EncodePublicKey;
use rsa::{RsaPrivateKey, RsaPublicKey};
use thiserror::Error;
use tracing::instrument;

use crate::config::ConfigError;

/// Test fixture error type
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Cryptographic operation failed: {0}")]
    Crypto(String),

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Invalid issuer configuration: {0}")]
    Configuration(#[from] ConfigError),
}

/// Generate an RSA signing key from the operating system CSPRNG.
///
/// # Errors
/// Returns `FixtureError::Crypto` if key generation fails.
#[instrument(skip_all, fields(bits = bits))]
pub fn generate_rsa_key(bits: usize) -> Result<RsaPrivateKey, FixtureError> {
    RsaPrivateKey::new(&mut OsRng, bits)
        .map_err(|e| FixtureError::Crypto(format!("RSA key generation failed: {e}")))
}

/// Generate a deterministic RSA signing key for testing.
///
/// The same seed and size always produce the same keypair, so key ids in
/// test expectations stay stable across runs.
///
/// # Example
/// ```rust,ignore
/// let key1 = test_rsa_key(1, 2048)?;
/// let key2 = test_rsa_key(1, 2048)?;
/// assert_eq!(key1, key2);
/// ```
#[instrument(skip_all, fields(seed = seed, bits = bits))]
pub fn test_rsa_key(seed: u64, bits: usize) -> Result<RsaPrivateKey, FixtureError> {
    let mut rng = StdRng::seed_from_u64(seed);
    RsaPrivateKey::new(&mut rng, bits)
        .map_err(|e| FixtureError::Crypto(format!("Seeded RSA key generation failed: {e}")))
}

/// Compute the key id of a public key.
///
/// The id is the unpadded base64url SHA-256 digest of the key's X.509
/// SubjectPublicKeyInfo DER encoding, the same fingerprint Keycloak puts in
/// the `kid` header of realm-signed tokens.
pub fn create_key_id(public_key: &RsaPublicKey) -> Result<String, FixtureError> {
    let spki_der = public_key
        .to_public_key_der()
        .map_err(|e| FixtureError::Crypto(format!("Public key encoding failed: {e}")))?;

    Ok(URL_SAFE_NO_PAD.encode(digest(&SHA256, spki_der.as_bytes())))
}
