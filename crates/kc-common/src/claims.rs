//! Keycloak access-token claims.
//!
//! Every claim is optional so that callers can start from an empty token and
//! let the issuer stamp `iss`, `iat` and `exp`. Claims this struct does not
//! model are kept in [`AccessToken::other_claims`] and serialized back
//! unchanged. The `sub` field is redacted in Debug output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Role set attached to a realm or to a client (`realm_access`,
/// `resource_access.<client>`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Access {
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Access {
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Keycloak access-token payload.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    /// Token identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Issuer (realm URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Subject (user id) - redacted in Debug output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Audiences. A single audience is serialized as a bare string.
    #[serde(default, skip_serializing_if = "Vec::is_empty", with = "one_or_many")]
    pub aud: Vec<String>,

    /// Token type, `Bearer` for access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,

    /// Authorized party (client the token was issued to).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,

    /// Issued-at timestamp (Unix epoch seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration timestamp (Unix epoch seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,

    /// Space-separated scopes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm_access: Option<Access>,

    /// Client roles keyed by client id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resource_access: BTreeMap<String, Access>,

    /// Claims not modelled above, passed through untouched.
    #[serde(flatten)]
    pub other_claims: serde_json::Map<String, serde_json::Value>,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("jti", &self.jti)
            .field("iss", &self.iss)
            .field("sub", &self.sub.as_ref().map(|_| "[REDACTED]"))
            .field("aud", &self.aud)
            .field("typ", &self.typ)
            .field("azp", &self.azp)
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .field("scope", &self.scope)
            .field("realm_access", &self.realm_access)
            .field("resource_access", &self.resource_access)
            .finish_non_exhaustive()
    }
}

impl AccessToken {
    /// Creates an empty token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issuer(&mut self, issuer: impl Into<String>) -> &mut Self {
        self.iss = Some(issuer.into());
        self
    }

    pub fn expiration(&mut self, exp: i64) -> &mut Self {
        self.exp = Some(exp);
        self
    }

    /// Check if the token is intended for the given audience.
    #[must_use]
    pub fn has_audience(&self, audience: &str) -> bool {
        self.aud.iter().any(|a| a == audience)
    }

    /// Check if the token carries a realm role.
    #[must_use]
    pub fn has_realm_role(&self, role: &str) -> bool {
        self.realm_access
            .as_ref()
            .is_some_and(|access| access.has_role(role))
    }

    /// Check if the token carries a role for the given client.
    #[must_use]
    pub fn has_resource_role(&self, client_id: &str, role: &str) -> bool {
        self.resource_access
            .get(client_id)
            .is_some_and(|access| access.has_role(role))
    }

    /// Check if the token has a specific scope.
    ///
    /// Scopes are space-separated in the JWT claims.
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes().contains(&scope)
    }

    /// Get all scopes as a vector.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scope
            .as_deref()
            .map(|s| s.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// A token without `exp` never expires; `exp == now` is already expired.
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp.is_some_and(|exp| exp <= now)
    }
}

/// `aud` is either a string or an array of strings on the wire.
mod one_or_many {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    pub(super) fn serialize<S: Serializer>(
        values: &[String],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match values {
            [single] => single.serialize(serializer),
            _ => values.serialize(serializer),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<String>, D::Error> {
        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        })
    }
}
