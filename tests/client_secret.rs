//! Client-secret construction against the fixture key material.

mod common;

use common::*;
use esia_auth::domain::crypto::CertificateDer;
use esia_auth::services::codec::base64url_decode;
use esia_auth::{build_client_secret, ClientSecretBuilder, EsiaError, SignatureSuite, SignedMessageInspector};

const CMS_DATA: &str = "1.2.840.113549.1.7.1";
const CMS_SIGNED_DATA: &str = "1.2.840.113549.1.7.2";

#[test]
fn rsa_secret_matches_regression_fixture() {
    let secret = build_client_secret(
        "test123",
        "",
        "",
        "",
        &certificates(&["server.pem"]),
        &private_key("private.key"),
        SignatureSuite::RsaSha256,
    )
    .unwrap();

    assert_eq!(secret, fixture_text("secret.txt").trim());
}

#[test]
fn full_plaintext_with_chain_matches_regression_fixture() {
    let secret = build_client_secret(
        REFERENCE_SCOPE,
        REFERENCE_TIMESTAMP,
        REFERENCE_CLIENT_ID,
        REFERENCE_STATE,
        &certificates(&["server.pem", "ca.pem"]),
        &private_key("private.key"),
        SignatureSuite::RsaSha256,
    )
    .unwrap();

    assert_eq!(secret, fixture_text("secret_chain.txt").trim());
}

#[test]
fn secret_is_url_safe() {
    let secret = fixture_text("secret_chain.txt");
    let secret = secret.trim();
    assert!(!secret.contains('+'));
    assert!(!secret.contains('/'));
    assert!(base64url_decode(secret).is_ok());
}

#[test]
fn secret_structure_has_one_signer_and_full_chain() {
    let chain = certificates(&["server.pem", "ca.pem"]);
    let secret = build_client_secret(
        REFERENCE_SCOPE,
        REFERENCE_TIMESTAMP,
        REFERENCE_CLIENT_ID,
        REFERENCE_STATE,
        &chain,
        &private_key("private.key"),
        SignatureSuite::RsaSha256,
    )
    .unwrap();

    let summary = SignedMessageInspector::new().inspect(&secret).unwrap();
    assert_eq!(summary.content_type, CMS_SIGNED_DATA);
    assert_eq!(summary.version, 1);
    assert_eq!(summary.encapsulated_content_type, CMS_DATA);
    assert_eq!(summary.signer_count, 1);
    assert_eq!(summary.signer_version, 1);
    assert_eq!(summary.certificates, chain);
    assert_eq!(
        summary.plaintext,
        b"fullname email2018.09.24 21:30:45 +1000ABC123TEST123".to_vec()
    );
    assert_eq!(summary.digest_algorithms, vec!["2.16.840.1.101.3.4.2.1".to_string()]);
    assert_eq!(summary.digest_algorithm, "2.16.840.1.101.3.4.2.1");
    assert_eq!(summary.signature_algorithm, "1.2.840.113549.1.1.11");
    assert_eq!(
        summary.indefinite_length_paths,
        vec![vec![], vec![1], vec![1, 0]]
    );

    let leaf = CertificateDer::from_der(chain[0].clone());
    let signer_id = leaf.issuer_and_serial().unwrap();
    assert_eq!(summary.signer_issuer, signer_id.issuer_der());
    assert_eq!(summary.signer_serial, signer_id.serial_der());
}

#[test]
fn rsa_secret_verifies_against_leaf_certificate() {
    let secret = fixture_text("secret_chain.txt");
    let inspector = SignedMessageInspector::new();
    assert!(inspector
        .verify_signed_message(secret.trim(), SignatureSuite::RsaSha256)
        .unwrap());

    // The secret carries RSA identifiers, so the GOST suite is refused outright.
    assert!(matches!(
        inspector.verify_signed_message(secret.trim(), SignatureSuite::Gost34_10_2012_256),
        Err(EsiaError::ValidationError(_))
    ));
}

#[test]
fn gost_secret_builds_and_verifies() {
    let chain = certificates(&["gost.pem", "ca.pem"]);
    let secret = build_client_secret(
        REFERENCE_SCOPE,
        REFERENCE_TIMESTAMP,
        REFERENCE_CLIENT_ID,
        REFERENCE_STATE,
        &chain,
        &private_key("gost.key"),
        SignatureSuite::Gost34_10_2012_256,
    )
    .unwrap();

    let inspector = SignedMessageInspector::new();
    let summary = inspector.inspect(&secret).unwrap();
    assert_eq!(summary.digest_algorithm, "1.2.643.7.1.1.2.2");
    assert_eq!(summary.signature_algorithm, "1.2.643.7.1.1.1.1");
    assert_eq!(summary.signature.len(), 64);
    assert_eq!(summary.certificates.len(), 2);
    assert_eq!(
        summary.indefinite_length_paths,
        vec![vec![], vec![1], vec![1, 0]]
    );
    assert!(inspector
        .verify_signed_message(&secret, SignatureSuite::Gost34_10_2012_256)
        .unwrap());
}

#[test]
fn gost_plaintext_and_structure_are_stable_across_calls() {
    let builder = ClientSecretBuilder::new(
        esia_auth::CertificateChain::new(certificates(&["gost.pem"])).unwrap(),
        SignatureSuite::Gost34_10_2012_256,
    );
    let key = private_key("gost.key");
    let inspector = SignedMessageInspector::new();

    let first = builder
        .build_client_secret(REFERENCE_SCOPE, REFERENCE_TIMESTAMP, REFERENCE_CLIENT_ID, REFERENCE_STATE, &key)
        .unwrap();
    let second = builder
        .build_client_secret(REFERENCE_SCOPE, REFERENCE_TIMESTAMP, REFERENCE_CLIENT_ID, REFERENCE_STATE, &key)
        .unwrap();

    let first = inspector.inspect(&first).unwrap();
    let second = inspector.inspect(&second).unwrap();
    assert_eq!(first.plaintext, second.plaintext);
    assert_eq!(first.certificates, second.certificates);
    assert_eq!(first.signer_issuer, second.signer_issuer);
    assert_eq!(first.indefinite_length_paths, second.indefinite_length_paths);
}

#[test]
fn empty_chain_is_configuration_error() {
    let result = build_client_secret(
        REFERENCE_SCOPE,
        REFERENCE_TIMESTAMP,
        REFERENCE_CLIENT_ID,
        REFERENCE_STATE,
        &[],
        &private_key("private.key"),
        SignatureSuite::RsaSha256,
    );
    assert!(matches!(result, Err(EsiaError::ConfigurationError(_))));
}

#[test]
fn empty_key_is_configuration_error() {
    let result = build_client_secret(
        REFERENCE_SCOPE,
        REFERENCE_TIMESTAMP,
        REFERENCE_CLIENT_ID,
        REFERENCE_STATE,
        &certificates(&["server.pem"]),
        &[],
        SignatureSuite::RsaSha256,
    );
    assert!(matches!(result, Err(EsiaError::ConfigurationError(_))));
}

#[test]
fn malformed_key_is_import_error() {
    let result = build_client_secret(
        REFERENCE_SCOPE,
        REFERENCE_TIMESTAMP,
        REFERENCE_CLIENT_ID,
        REFERENCE_STATE,
        &certificates(&["server.pem"]),
        &[0x30, 0x03, 0x02, 0x01, 0x00],
        SignatureSuite::RsaSha256,
    );
    assert!(matches!(result, Err(EsiaError::KeyImportError(_))));
}

#[test]
fn key_from_other_suite_is_import_error() {
    let rsa_key_as_gost = build_client_secret(
        REFERENCE_SCOPE,
        REFERENCE_TIMESTAMP,
        REFERENCE_CLIENT_ID,
        REFERENCE_STATE,
        &certificates(&["gost.pem"]),
        &private_key("private.key"),
        SignatureSuite::Gost34_10_2012_256,
    );
    assert!(matches!(rsa_key_as_gost, Err(EsiaError::KeyImportError(_))));

    let gost_key_as_rsa = build_client_secret(
        REFERENCE_SCOPE,
        REFERENCE_TIMESTAMP,
        REFERENCE_CLIENT_ID,
        REFERENCE_STATE,
        &certificates(&["server.pem"]),
        &private_key("gost.key"),
        SignatureSuite::RsaSha256,
    );
    assert!(matches!(gost_key_as_rsa, Err(EsiaError::KeyImportError(_))));
}

#[tokio::test]
async fn concurrent_calls_with_different_suites_do_not_interfere() {
    let mut handles = Vec::new();
    for round in 0..8 {
        let (suite, cert, key) = if round % 2 == 0 {
            (SignatureSuite::RsaSha256, "server.pem", "private.key")
        } else {
            (SignatureSuite::Gost34_10_2012_256, "gost.pem", "gost.key")
        };
        handles.push(tokio::spawn(async move {
            let secret = esia_auth::build_client_secret_async(
                REFERENCE_SCOPE.to_string(),
                REFERENCE_TIMESTAMP.to_string(),
                REFERENCE_CLIENT_ID.to_string(),
                format!("state-{round}"),
                certificates(&[cert]),
                private_key(key),
                suite,
            )
            .await
            .unwrap();
            (suite, secret)
        }));
    }

    let inspector = SignedMessageInspector::new();
    for handle in handles {
        let (suite, secret) = handle.await.unwrap();
        assert!(inspector.verify_signed_message(&secret, suite).unwrap());
    }
}
