//! End-to-end tests: tokens from the issuer through the access-token verifier,
//! with the issuer acting as the verifier's key locator.

use kc_common::claims::AccessToken;
use kc_common::config::VerifierConfig;
use kc_common::error::AuthError;
use kc_common::verifier::AccessTokenVerifier;
use kc_test_utils::{
    shared_issuer, AccessTokenIssuer, IssuerConfig, TestTokenBuilder, ROLE_OFFLINE_ACCESS,
    TEST_RESOURCE_CLIENT_ID,
};
use std::sync::Arc;

fn is_rejected(result: &Result<AccessToken, AuthError>) -> bool {
    matches!(result, Err(AuthError::InvalidToken(_)))
}

#[test]
fn test_verifier_accepts_issued_token() -> Result<(), anyhow::Error> {
    let issuer = shared_issuer();
    let verifier = AccessTokenVerifier::new(issuer, VerifierConfig::default())?;

    let mut claims = TestTokenBuilder::new()
        .for_user("alice-id")
        .with_realm_role(ROLE_OFFLINE_ACCESS)
        .build();
    let token = issuer.issue(&mut claims)?;

    let verified = verifier.verify(&token)?;
    assert_eq!(verified, claims);
    assert!(verified.has_realm_role(ROLE_OFFLINE_ACCESS));
    Ok(())
}

#[test]
fn test_verifier_rejects_forced_expired_token() -> Result<(), anyhow::Error> {
    let issuer = shared_issuer();
    let verifier = AccessTokenVerifier::new(issuer, VerifierConfig::default())?;

    let token = issuer.issue_token(&mut TestTokenBuilder::new().build(), true)?;

    assert!(is_rejected(&verifier.verify(&token)));
    Ok(())
}

#[test]
fn test_verifier_rejects_token_from_unknown_signer() -> Result<(), anyhow::Error> {
    let foreign = AccessTokenIssuer::new()?;
    let verifier = AccessTokenVerifier::new(shared_issuer(), VerifierConfig::default())?;

    let token = foreign.issue(&mut AccessToken::new())?;

    assert!(is_rejected(&verifier.verify(&token)));
    Ok(())
}

#[test]
fn test_verifier_rejects_other_realm() -> Result<(), anyhow::Error> {
    let issuer = shared_issuer();
    let config = VerifierConfig::for_issuer("http://localhost/realms/production");
    let verifier = AccessTokenVerifier::new(issuer, config)?;

    let token = issuer.issue(&mut AccessToken::new())?;

    assert!(is_rejected(&verifier.verify(&token)));
    Ok(())
}

#[test]
fn test_verifier_with_custom_issuer_realm() -> Result<(), anyhow::Error> {
    let realm = "http://localhost/realms/pravega";
    let issuer = Arc::new(AccessTokenIssuer::with_config(
        IssuerConfig::default().with_issuer(realm),
    )?);
    let verifier = AccessTokenVerifier::new(Arc::clone(&issuer), VerifierConfig::for_issuer(realm))?;

    let token = issuer.issue(&mut AccessToken::new())?;

    let verified = verifier.verify(&token)?;
    assert_eq!(verified.iss.as_deref(), Some(realm));
    Ok(())
}

#[test]
fn test_verifier_audience_check() -> Result<(), anyhow::Error> {
    let issuer = shared_issuer();
    let config = VerifierConfig {
        audience: Some(TEST_RESOURCE_CLIENT_ID.to_string()),
        ..VerifierConfig::default()
    };
    let verifier = AccessTokenVerifier::new(issuer, config)?;

    let mut for_controller = TestTokenBuilder::new()
        .with_audience(TEST_RESOURCE_CLIENT_ID)
        .build();
    let mut for_someone_else = TestTokenBuilder::new().with_audience("account").build();

    assert!(verifier.verify(&issuer.issue(&mut for_controller)?).is_ok());
    assert!(is_rejected(
        &verifier.verify(&issuer.issue(&mut for_someone_else)?)
    ));
    Ok(())
}

#[test]
fn test_verifier_accepts_multi_audience_token() -> Result<(), anyhow::Error> {
    let issuer = shared_issuer();
    let config = VerifierConfig {
        audience: Some(TEST_RESOURCE_CLIENT_ID.to_string()),
        ..VerifierConfig::default()
    };
    let verifier = AccessTokenVerifier::new(issuer, config)?;

    let mut claims = TestTokenBuilder::new()
        .with_audience("account")
        .with_audience(TEST_RESOURCE_CLIENT_ID)
        .build();
    let token = issuer.issue(&mut claims)?;

    let verified = verifier.verify(&token)?;
    assert!(verified.has_audience("account"));
    assert!(verified.has_audience(TEST_RESOURCE_CLIENT_ID));
    Ok(())
}

#[test]
fn test_verifier_accepts_token_with_shadowed_stamped_claims() -> Result<(), anyhow::Error> {
    let issuer = shared_issuer();
    let verifier = AccessTokenVerifier::new(issuer, VerifierConfig::default())?;

    let mut claims = TestTokenBuilder::new()
        .with_claim("exp", serde_json::json!(1))
        .with_claim("iss", serde_json::json!("http://localhost/realms/other"))
        .build();
    let token = issuer.issue(&mut claims)?;

    let verified = verifier.verify(&token)?;
    assert_eq!(verified, claims);
    Ok(())
}

#[test]
fn test_reset_does_not_break_verification() -> Result<(), anyhow::Error> {
    let issuer = shared_issuer();
    let verifier = AccessTokenVerifier::new(issuer, VerifierConfig::default())?;
    let token = issuer.issue(&mut AccessToken::new())?;

    verifier.reset_keys();

    assert!(verifier.verify(&token).is_ok());
    Ok(())
}

#[test]
fn test_verifier_rejects_garbage() -> Result<(), anyhow::Error> {
    let verifier = AccessTokenVerifier::new(shared_issuer(), VerifierConfig::default())?;

    for token in ["", "not-a-jwt", "a.b.c", "a.b.c.d"] {
        assert!(is_rejected(&verifier.verify(token)), "{token:?} should be rejected");
    }
    Ok(())
}
