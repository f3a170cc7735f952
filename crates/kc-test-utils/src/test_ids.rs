//! Fixed test IDs for deterministic tests
//!
//! All test IDs are deterministic to ensure reproducible test results.

use uuid::Uuid;

pub use crate::config::DEFAULT_ISSUER as TEST_ISSUER;

// User IDs (100-199)
pub const TEST_USER_ALICE: Uuid = Uuid::from_u128(100);
pub const TEST_USER_BOB: Uuid = Uuid::from_u128(101);

pub const TEST_USERNAME_ALICE: &str = "alice";
pub const TEST_USERNAME_BOB: &str = "bob";

// Client IDs
pub const TEST_CLIENT_ID: &str = "test-client";
pub const TEST_RESOURCE_CLIENT_ID: &str = "pravega-controller";

// Key IDs that no test issuer ever produces
pub const TEST_UNKNOWN_KEY_ID: &str = "unknown-key-id";

// Roles and scopes
pub const ROLE_OFFLINE_ACCESS: &str = "offline_access";
pub const ROLE_CREATE_SCOPE: &str = "create-scope";
pub const SCOPE_OPENID_PROFILE: &str = "openid profile";
