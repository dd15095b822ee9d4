//! Expiry boundary tests for `AccessToken`.

use chrono::{Duration, Utc};
use gcl_auth::AccessToken;

fn make_token(expires_in_secs: i64) -> AccessToken {
    AccessToken::new("ya29.test", Utc::now() + Duration::seconds(expires_in_secs))
}

// ── Expiry Detection ──

#[test]
fn is_expired_when_past() {
    let token = make_token(-60);
    assert!(token.is_expired());
}

#[test]
fn is_not_expired_when_future() {
    let token = make_token(3600);
    assert!(!token.is_expired());
}

#[test]
fn is_expired_one_second_ago() {
    let token = make_token(-1);
    assert!(token.is_expired());
}

// ── Expires Within Margin ──

#[test]
fn expires_within_secs_true_when_close() {
    let token = make_token(200);
    assert!(token.expires_within_secs(300));
}

#[test]
fn expires_within_secs_false_when_far() {
    let token = make_token(3600);
    assert!(!token.expires_within_secs(300));
}

#[test]
fn expires_within_secs_with_already_expired() {
    let token = make_token(-60);
    assert!(token.expires_within_secs(300));
}

#[test]
fn expires_within_secs_zero_margin() {
    let token = make_token(3600);
    assert!(!token.expires_within_secs(0));

    let expired = make_token(-1);
    assert!(expired.expires_within_secs(0));
}

// ── Serialization ──

#[test]
fn access_token_json_roundtrip() {
    let token = make_token(3600);
    let json = serde_json::to_string(&token).unwrap();
    let restored: AccessToken = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.token, token.token);
    assert_eq!(restored.expires_at, token.expires_at);
}
