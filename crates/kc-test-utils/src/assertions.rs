//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions on signed token strings. None of them
//! verify signatures; use `kc_common::verifier` for that.

use kc_common::claims::AccessToken;
use kc_common::jwt::{decode_unverified_header, decode_unverified_payload};
use serde::Deserialize;

/// JWT header structure
#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    #[serde(default)]
    pub typ: Option<String>,
    #[serde(default)]
    pub kid: Option<String>,
}

fn header_of(token: &str) -> JwtHeader {
    decode_unverified_header(token).expect("Failed to parse JWT header")
}

fn claims_of(token: &str) -> AccessToken {
    decode_unverified_payload(token).expect("Failed to parse JWT claims")
}

/// Custom assertions for issued tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_signed_by(issuer.key_id())
///     .assert_issued_by("http://localhost/realms/test")
///     .assert_lifetime(3600);
/// ```
pub trait TokenAssertions {
    /// Assert that the token is a three-part RS256 JWT with a `kid`
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert that the token was signed by the specified key
    fn assert_signed_by(&self, key_id: &str) -> &Self;

    /// Assert that the token carries the specified issuer
    fn assert_issued_by(&self, issuer: &str) -> &Self;

    /// Assert that `exp - iat` is exactly the specified number of seconds
    fn assert_lifetime(&self, seconds: i64) -> &Self;

    /// Assert that the token expires within the specified seconds from now
    fn assert_expires_in(&self, seconds: u64) -> &Self;

    /// Assert that the token is already expired
    fn assert_expired(&self) -> &Self;

    /// Assert that the token is for the specified subject
    fn assert_for_subject(&self, subject: &str) -> &Self;

    /// Assert that the token carries the specified realm role
    fn assert_has_realm_role(&self, role: &str) -> &Self;
}

impl TokenAssertions for str {
    fn assert_valid_jwt(&self) -> &Self {
        let parts: Vec<_> = self.split('.').collect();
        assert_eq!(
            parts.len(),
            3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts.len()
        );
        assert!(
            parts.iter().all(|p| !p.is_empty()),
            "JWT parts must not be empty"
        );

        let header = header_of(self);
        assert_eq!(header.alg, "RS256", "Expected RS256 algorithm");
        assert_eq!(header.typ.as_deref(), Some("JWT"), "Expected JWT type");
        assert!(
            header.kid.as_deref().is_some_and(|kid| !kid.is_empty()),
            "JWT header must carry a kid"
        );

        claims_of(self);

        self
    }

    fn assert_signed_by(&self, key_id: &str) -> &Self {
        let header = header_of(self);
        assert_eq!(
            header.kid.as_deref(),
            Some(key_id),
            "Expected key_id '{}', got {:?}",
            key_id,
            header.kid
        );

        self
    }

    fn assert_issued_by(&self, issuer: &str) -> &Self {
        let claims = claims_of(self);
        assert_eq!(
            claims.iss.as_deref(),
            Some(issuer),
            "Expected issuer '{}', got {:?}",
            issuer,
            claims.iss
        );

        self
    }

    fn assert_lifetime(&self, seconds: i64) -> &Self {
        let claims = claims_of(self);
        let iat = claims.iat.expect("Token has no iat claim");
        let exp = claims.exp.expect("Token has no exp claim");

        assert_eq!(
            exp - iat,
            seconds,
            "Expected token lifetime of {} seconds, got {} (iat={}, exp={})",
            seconds,
            exp - iat,
            iat,
            exp
        );

        self
    }

    fn assert_expires_in(&self, seconds: u64) -> &Self {
        let claims = claims_of(self);
        let exp = claims.exp.expect("Token has no exp claim");

        let now = chrono::Utc::now().timestamp();
        let expires_in = exp - now;
        let expected = i64::try_from(seconds).unwrap_or(i64::MAX);

        // Allow 5-second tolerance for slow test runs
        assert!(
            expires_in.abs_diff(expected) <= 5,
            "Expected token to expire in {} seconds, but expires in {} seconds",
            seconds,
            expires_in
        );

        self
    }

    fn assert_expired(&self) -> &Self {
        let claims = claims_of(self);
        let now = chrono::Utc::now().timestamp();

        assert!(
            claims.is_expired_at(now),
            "Expected token to be expired, exp={:?} now={}",
            claims.exp,
            now
        );

        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        let claims = claims_of(self);
        assert_eq!(
            claims.sub.as_deref(),
            Some(subject),
            "Expected subject '{}'",
            subject
        );

        self
    }

    fn assert_has_realm_role(&self, role: &str) -> &Self {
        let claims = claims_of(self);
        assert!(
            claims.has_realm_role(role),
            "Token does not carry realm role '{}'. Available: {:?}",
            role,
            claims.realm_access.map(|access| access.roles)
        );

        self
    }
}
