//! Public key lookup capability used during token verification.
//!
//! A verifier asks its locator for the key named by a token's `kid` header.
//! Locators may cache keys; `reset` lets callers drop such caches.

use rsa::RsaPublicKey;
use std::sync::Arc;

/// Resolves verification keys by key id.
pub trait PublicKeyLocator: Send + Sync {
    /// Return the public key for `kid`, or `None` when the signer is unknown.
    ///
    /// `None` is an expected outcome, not a fault: the caller treats it as a
    /// verification failure.
    fn resolve_public_key(&self, kid: &str) -> Option<RsaPublicKey>;

    /// Invalidate any cached keys.
    fn reset(&self);
}

impl<L: PublicKeyLocator + ?Sized> PublicKeyLocator for Arc<L> {
    fn resolve_public_key(&self, kid: &str) -> Option<RsaPublicKey> {
        (**self).resolve_public_key(kid)
    }

    fn reset(&self) {
        (**self).reset();
    }
}

impl<L: PublicKeyLocator + ?Sized> PublicKeyLocator for &L {
    fn resolve_public_key(&self, kid: &str) -> Option<RsaPublicKey> {
        (**self).resolve_public_key(kid)
    }

    fn reset(&self) {
        (**self).reset();
    }
}
