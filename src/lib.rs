//! ESIA client library
//!
//! Builds the signed `client_secret` the identity provider expects from OAuth2
//! clients and verifies the compact tokens it issues. Two signature suites are
//! supported: RSA with SHA-256 and GOST R 34.10-2012 (256-bit) with Streebog.

pub mod domain;
pub mod infra;
pub mod pipelines;
pub mod services;

pub use domain::crypto::{CertificateChain, HashAlgorithm, SignatureSuite};
pub use domain::verification::{VerificationOutcome, VerifiedToken};
pub use infra::config::{ConfigManager, EsiaConfiguration, ExportFormat};
pub use infra::error::{EsiaError, EsiaResult};
pub use pipelines::{AuthorizationParams, EsiaOAuthFlow, TokenParams};
pub use services::codec::{timestamp_now, url_safe};
pub use services::{ClientSecretBuilder, SignedMessageInspector, TokenVerifier};

/// Sign `scope ++ timestamp ++ client_id ++ state` and return the URL-safe
/// base64 client secret.
///
/// `certificate_chain` is DER, leaf first; `private_key` is PKCS#8 DER for
/// the same `suite`.
pub fn build_client_secret(
    scope: &str,
    timestamp: &str,
    client_id: &str,
    state: &str,
    certificate_chain: &[Vec<u8>],
    private_key: &[u8],
    suite: SignatureSuite,
) -> EsiaResult<String> {
    if private_key.is_empty() {
        return Err(EsiaError::ConfigurationError(
            "Private key is empty".to_string(),
        ));
    }
    let chain = CertificateChain::new(certificate_chain.to_vec())?;
    let secret = ClientSecretBuilder::new(chain, suite).build_client_secret(
        scope,
        timestamp,
        client_id,
        state,
        private_key,
    )?;
    log::info!("Client secret built for {client_id} ({suite})");
    Ok(secret)
}

/// [`build_client_secret`] on the blocking pool.
pub async fn build_client_secret_async(
    scope: String,
    timestamp: String,
    client_id: String,
    state: String,
    certificate_chain: Vec<Vec<u8>>,
    private_key: Vec<u8>,
    suite: SignatureSuite,
) -> EsiaResult<String> {
    tokio::task::spawn_blocking(move || {
        build_client_secret(
            &scope,
            &timestamp,
            &client_id,
            &state,
            &certificate_chain,
            &private_key,
            suite,
        )
    })
    .await
    .map_err(|e| EsiaError::SigningError(format!("Signing task failed: {e}")))?
}

/// Decode a compact token and check its signature when a trusted SPKI key is
/// supplied. A mismatch is an outcome, not an error.
pub fn verify_token(token: &str, trusted_public_key: Option<&[u8]>) -> EsiaResult<VerifiedToken> {
    TokenVerifier::new().verify(token, trusted_public_key)
}

/// [`verify_token`] on the blocking pool.
pub async fn verify_token_async(
    token: String,
    trusted_public_key: Option<Vec<u8>>,
) -> EsiaResult<VerifiedToken> {
    tokio::task::spawn_blocking(move || verify_token(&token, trusted_public_key.as_deref()))
        .await
        .map_err(|e| EsiaError::SigningError(format!("Verification task failed: {e}")))?
}
