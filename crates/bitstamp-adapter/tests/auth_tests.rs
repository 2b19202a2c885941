/*
[INPUT]:  Credential parts and signature inputs
[OUTPUT]: Test results for credential validation and request signing
[POS]:    Integration tests - authentication
[UPDATE]: When credential handling or the signing scheme changes
*/

mod common;

use bitstamp_adapter::http::SignatureInput;
use bitstamp_adapter::{BitstampError, Credentials, HttpVerb, RequestSigner};
use common::test_credentials;

#[test]
fn test_credentials_require_every_part() {
    let err = Credentials::from_parts(Some("1".to_string()), None, Some(b"s".to_vec()))
        .expect_err("missing key");
    match err {
        BitstampError::Config(message) => {
            assert!(message.ends_with("(missing: api_key)"), "{message}");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }
}

#[test]
fn test_credentials_debug_hides_secret() {
    let rendered = format!("{:?}", test_credentials());
    assert!(rendered.contains("test-key"));
    assert!(!rendered.contains("test-secret"));
}

#[test]
fn test_signature_is_lowercase_hex_sha256() {
    let signer = RequestSigner::new(test_credentials());
    let nonce = RequestSigner::nonce();
    let timestamp = RequestSigner::timestamp_millis();
    let signature = signer.sign(&SignatureInput {
        method: HttpVerb::Get,
        domain: "www.bitstamp.net",
        endpoint: "/api/v2/ticker/btcusd/",
        query: "",
        content_type: None,
        nonce: &nonce,
        timestamp: &timestamp,
        body: "",
    });

    assert_eq!(signature.len(), 64);
    assert!(signature.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
}

#[test]
fn test_missing_credentials_cannot_sign() {
    let err = RequestSigner::from_optional(None).expect_err("should fail");
    assert!(matches!(err, BitstampError::Config(_)));
}
