//! Common access-token types and verification utilities for the Keycloak client.

#![warn(clippy::pedantic)]

/// Module for common error types
pub mod error;

/// Module for verifier configuration
pub mod config;

/// Module for Keycloak access-token claims
pub mod claims;

/// Module for JWT utilities (size limits, kid extraction, iat validation)
pub mod jwt;

/// Module for the public key lookup capability
pub mod key_locator;

/// Module for access-token signature and claims verification
pub mod verifier;
