//! # Keycloak Test Utilities
//!
//! Shared test utilities for exercising the Keycloak access-token client.
//!
//! This crate provides:
//! - A token issuer that signs access tokens with a generated RSA key and
//!   doubles as the verifier's public key locator (`AccessTokenIssuer`)
//! - RSA crypto fixtures (random and seed-deterministic keys, key ids)
//! - Test data builders (`TestTokenBuilder`)
//! - Fixed test IDs (UUIDs, realm and client constants)
//! - Custom assertions (`TokenAssertions` trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kc_common::verifier::AccessTokenVerifier;
//! use kc_test_utils::*;
//!
//! #[test]
//! fn test_example() -> Result<(), anyhow::Error> {
//!     let issuer = shared_issuer();
//!
//!     let mut claims = TestTokenBuilder::new()
//!         .for_user("alice")
//!         .with_realm_role("offline_access")
//!         .build();
//!     let token = issuer.issue(&mut claims)?;
//!
//!     token
//!         .assert_valid_jwt()
//!         .assert_signed_by(issuer.key_id())
//!         .assert_lifetime(3600);
//!
//!     let verifier = AccessTokenVerifier::new(issuer, Default::default())?;
//!     verifier.verify(&token)?;
//!     Ok(())
//! }
//! ```

pub mod access_token_issuer;
pub mod assertions;
pub mod config;
pub mod crypto_fixtures;
pub mod test_ids;
pub mod token_builders;

// Re-export commonly used items
pub use access_token_issuer::*;
pub use assertions::*;
pub use config::IssuerConfig;
pub use crypto_fixtures::*;
pub use test_ids::*;
pub use token_builders::*;
