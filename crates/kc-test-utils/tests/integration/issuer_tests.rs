//! Issuer behaviour observed through the public API: token shape, timing
//! claims and key lookup.

use kc_common::claims::AccessToken;
use kc_common::jwt::{decode_unverified_payload, extract_kid};
use kc_common::key_locator::PublicKeyLocator;
use kc_test_utils::{
    create_key_id, shared_issuer, AccessTokenIssuer, TestTokenBuilder, TokenAssertions,
    ROLE_CREATE_SCOPE, ROLE_OFFLINE_ACCESS, TEST_ISSUER, TEST_RESOURCE_CLIENT_ID,
    TEST_UNKNOWN_KEY_ID,
};
use std::thread;
use std::time::Duration;

#[test]
fn test_issued_token_expires_one_hour_after_issue() -> Result<(), anyhow::Error> {
    let issuer = shared_issuer();
    let mut claims = AccessToken::new();

    let token = issuer.issue_token(&mut claims, false)?;

    let decoded: AccessToken = decode_unverified_payload(&token)?;
    let iat = decoded.iat.ok_or_else(|| anyhow::anyhow!("missing iat"))?;
    assert_eq!(decoded.exp, Some(iat + 3600));
    token
        .assert_valid_jwt()
        .assert_lifetime(3600)
        .assert_expires_in(3600);
    Ok(())
}

#[test]
fn test_convenience_issue_is_not_expired() -> Result<(), anyhow::Error> {
    let mut claims = TestTokenBuilder::new().build();

    let token = shared_issuer().issue(&mut claims)?;

    token.assert_lifetime(3600);
    assert!(!claims.is_expired_at(chrono::Utc::now().timestamp()));
    Ok(())
}

#[test]
fn test_forced_expired_token_has_zero_exp_and_test_issuer() -> Result<(), anyhow::Error> {
    let token = shared_issuer().issue_token(&mut AccessToken::new(), true)?;

    let payload: serde_json::Value = decode_unverified_payload(&token)?;
    assert_eq!(payload["exp"], 0);
    assert_eq!(payload["iss"], "http://localhost/realms/test");
    token.assert_valid_jwt().assert_expired();
    Ok(())
}

#[test]
fn test_token_kid_resolves_to_issuer_key() -> Result<(), anyhow::Error> {
    let issuer = shared_issuer();
    let token = issuer.issue(&mut AccessToken::new())?;

    let kid = extract_kid(&token)?;
    assert_eq!(kid, create_key_id(issuer.public_key())?);
    assert_eq!(
        issuer.resolve_public_key(&kid).as_ref(),
        Some(issuer.public_key())
    );
    assert!(issuer.resolve_public_key(TEST_UNKNOWN_KEY_ID).is_none());
    Ok(())
}

#[test]
fn test_key_id_is_stable_across_issues() -> Result<(), anyhow::Error> {
    let issuer = shared_issuer();

    let first = issuer.issue(&mut AccessToken::new())?;
    let second = issuer.issue_token(&mut AccessToken::new(), true)?;

    first.assert_signed_by(issuer.key_id());
    second.assert_signed_by(issuer.key_id());
    Ok(())
}

#[test]
fn test_reissuing_same_claims_advances_iat() -> Result<(), anyhow::Error> {
    let issuer = shared_issuer();
    let mut claims = TestTokenBuilder::new().build();

    let first = issuer.issue(&mut claims)?;
    let first_iat = claims.iat;

    thread::sleep(Duration::from_millis(1100));

    let second = issuer.issue(&mut claims)?;

    assert!(claims.iat > first_iat, "iat should advance with the clock");
    assert_ne!(first, second);
    first.assert_valid_jwt();
    second.assert_valid_jwt().assert_lifetime(3600);
    Ok(())
}

#[test]
fn test_builder_claims_survive_issue() -> Result<(), anyhow::Error> {
    let mut claims = TestTokenBuilder::new()
        .for_user("user-42")
        .with_realm_role(ROLE_OFFLINE_ACCESS)
        .with_client_role(TEST_RESOURCE_CLIENT_ID, ROLE_CREATE_SCOPE)
        .build();

    let token = shared_issuer().issue(&mut claims)?;

    token
        .assert_for_subject("user-42")
        .assert_has_realm_role(ROLE_OFFLINE_ACCESS)
        .assert_issued_by(TEST_ISSUER);
    let decoded: AccessToken = decode_unverified_payload(&token)?;
    assert!(decoded.has_resource_role(TEST_RESOURCE_CLIENT_ID, ROLE_CREATE_SCOPE));
    Ok(())
}

#[test]
fn test_builder_claim_cannot_shadow_stamped_expiry() -> Result<(), anyhow::Error> {
    let mut claims = TestTokenBuilder::new()
        .with_claim("exp", serde_json::json!(1))
        .build();

    let token = shared_issuer().issue(&mut claims)?;

    let decoded: AccessToken = decode_unverified_payload(&token)?;
    assert_eq!(decoded, claims);
    assert!(!decoded.other_claims.contains_key("exp"));
    token.assert_lifetime(3600);
    Ok(())
}

#[test]
fn test_multiple_audiences_survive_issue() -> Result<(), anyhow::Error> {
    let mut claims = TestTokenBuilder::new()
        .with_audience(TEST_RESOURCE_CLIENT_ID)
        .with_audience("account")
        .build();

    let token = shared_issuer().issue(&mut claims)?;

    let payload: serde_json::Value = decode_unverified_payload(&token)?;
    assert_eq!(
        payload["aud"],
        serde_json::json!([TEST_RESOURCE_CLIENT_ID, "account"])
    );
    let decoded: AccessToken = decode_unverified_payload(&token)?;
    assert!(decoded.has_audience("account"));
    Ok(())
}

#[test]
fn test_seeded_issuers_share_key_id() -> Result<(), anyhow::Error> {
    let first = AccessTokenIssuer::from_seed(42)?;
    let second = AccessTokenIssuer::from_seed(42)?;

    assert_eq!(first.key_id(), second.key_id());

    // A token from one resolves against the other
    let token = first.issue(&mut AccessToken::new())?;
    assert!(second.resolve_public_key(&extract_kid(&token)?).is_some());
    Ok(())
}

#[test]
fn test_independent_issuers_do_not_resolve_each_other() -> Result<(), anyhow::Error> {
    let other = AccessTokenIssuer::new()?;
    let issuer = shared_issuer();

    assert_ne!(other.key_id(), issuer.key_id());
    assert!(issuer.resolve_public_key(other.key_id()).is_none());
    assert!(other.resolve_public_key(issuer.key_id()).is_none());
    Ok(())
}

#[test]
fn test_issuer_is_shareable_across_threads() -> Result<(), anyhow::Error> {
    let issuer = shared_issuer();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            thread::spawn(move || {
                let mut claims = TestTokenBuilder::new()
                    .for_user(&format!("user-{i}"))
                    .build();
                issuer.issue(&mut claims)
            })
        })
        .collect();

    for handle in handles {
        let token = handle
            .join()
            .map_err(|_| anyhow::anyhow!("issuing thread panicked"))??;
        token.assert_valid_jwt().assert_signed_by(issuer.key_id());
    }
    Ok(())
}
