//! Builder patterns for test data construction
//!
//! Provides a fluent API for creating access-token claims. Timing fields and
//! the issuer are left unset: `AccessTokenIssuer` stamps them at issue time.

use kc_common::claims::{Access, AccessToken};

use crate::test_ids::{TEST_CLIENT_ID, TEST_USERNAME_ALICE, TEST_USER_ALICE};

/// Builder for creating test access-token claims
///
/// # Example
/// ```rust,ignore
/// let mut claims = TestTokenBuilder::new()
///     .for_user("alice")
///     .with_realm_role("offline_access")
///     .with_client_role("pravega-controller", "create-scope")
///     .build();
/// let token = issuer.issue(&mut claims)?;
/// ```
pub struct TestTokenBuilder {
    token: AccessToken,
}

impl TestTokenBuilder {
    /// Create a new builder for a Bearer token held by Alice via the test client
    pub fn new() -> Self {
        Self {
            token: AccessToken {
                sub: Some(TEST_USER_ALICE.to_string()),
                typ: Some("Bearer".to_string()),
                azp: Some(TEST_CLIENT_ID.to_string()),
                preferred_username: Some(TEST_USERNAME_ALICE.to_string()),
                ..AccessToken::default()
            },
        }
    }

    /// Set the subject (user id)
    pub fn for_user(mut self, subject: &str) -> Self {
        self.token.sub = Some(subject.to_string());
        self
    }

    pub fn with_username(mut self, username: &str) -> Self {
        self.token.preferred_username = Some(username.to_string());
        self
    }

    pub fn with_token_id(mut self, jti: &str) -> Self {
        self.token.jti = Some(jti.to_string());
        self
    }

    /// Set the scope (space-separated)
    pub fn with_scope(mut self, scope: &str) -> Self {
        self.token.scope = Some(scope.to_string());
        self
    }

    /// Add an audience; call repeatedly for a multi-audience token
    pub fn with_audience(mut self, audience: &str) -> Self {
        self.token.aud.push(audience.to_string());
        self
    }

    pub fn authorized_party(mut self, client_id: &str) -> Self {
        self.token.azp = Some(client_id.to_string());
        self
    }

    /// Add a realm role
    pub fn with_realm_role(mut self, role: &str) -> Self {
        self.token
            .realm_access
            .get_or_insert_with(Access::default)
            .roles
            .push(role.to_string());
        self
    }

    /// Add a role for a client (`resource_access.<client_id>.roles`)
    pub fn with_client_role(mut self, client_id: &str, role: &str) -> Self {
        self.token
            .resource_access
            .entry(client_id.to_string())
            .or_default()
            .roles
            .push(role.to_string());
        self
    }

    /// Add an arbitrary claim that the token type does not model
    pub fn with_claim(mut self, name: &str, value: serde_json::Value) -> Self {
        self.token.other_claims.insert(name.to_string(), value);
        self
    }

    /// Build the claims
    pub fn build(self) -> AccessToken {
        self.token
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
