//! Shared fixture loading for the integration tests.
//!
//! Fixtures live in `tests/fixtures/sign/`: an RSA test CA (`ca.*`), an RSA
//! client certificate issued by it (`server.pem`, `private.key`) and a GOST
//! client certificate from the same CA (`gost.*`).

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use esia_auth::domain::crypto::HashAlgorithm;
use esia_auth::infra::pem;
use esia_auth::services::codec::base64url_encode;
use esia_auth::services::engine_for;
use esia_auth::SignatureSuite;

pub const REFERENCE_SCOPE: &str = "fullname email";
pub const REFERENCE_TIMESTAMP: &str = "2018.09.24 21:30:45 +1000";
pub const REFERENCE_CLIENT_ID: &str = "ABC123";
pub const REFERENCE_STATE: &str = "TEST123";

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("sign")
        .join(name)
}

pub fn fixture_text(name: &str) -> String {
    fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|e| panic!("fixture {name} should be readable: {e}"))
}

pub fn certificates(names: &[&str]) -> Vec<Vec<u8>> {
    names
        .iter()
        .flat_map(|name| pem::certificates_from_pem(&fixture_text(name)).unwrap())
        .collect()
}

pub fn private_key(name: &str) -> Vec<u8> {
    pem::der_from_pem(&fixture_text(name), "PRIVATE KEY").unwrap()
}

pub fn public_key(name: &str) -> Vec<u8> {
    pem::der_from_pem(&fixture_text(name), "PUBLIC KEY").unwrap()
}

/// Compact token signed with `key_name` under `suite`; the header `alg` is
/// taken verbatim so tests can declare anything.
pub fn sign_token(alg: &str, claims: &serde_json::Value, key_name: &str, suite: SignatureSuite) -> String {
    let header = serde_json::json!({ "alg": alg, "typ": "JWT", "ver": 1 });
    sign_token_with_header(&header, claims, key_name, suite)
}

/// Same as [`sign_token`] with an arbitrary JSON header.
pub fn sign_token_with_header(
    header: &serde_json::Value,
    claims: &serde_json::Value,
    key_name: &str,
    suite: SignatureSuite,
) -> String {
    let header = base64url_encode(header.to_string().as_bytes());
    let payload = base64url_encode(claims.to_string().as_bytes());
    let signing_input = format!("{header}.{payload}");

    let engine = engine_for(suite);
    let key = engine.import_private_key(&private_key(key_name), suite).unwrap();
    let hash: HashAlgorithm = suite.hash_algorithm();
    let signature = engine.sign(&key, hash, signing_input.as_bytes()).unwrap();
    format!("{signing_input}.{}", base64url_encode(signature.as_slice()))
}

pub fn sample_claims() -> serde_json::Value {
    serde_json::json!({
        "urn:esia:sbj_id": 1000299353,
        "scope": "fullname?oid=1000299353 email?oid=1000299353",
        "iss": "http://esia-portal1.test.gosuslugi.ru/",
        "exp": 1537792245
    })
}
