//! Error types for client-secret signing and token verification.

use thiserror::Error;

/// Result type for signing and verification operations
pub type EsiaResult<T> = Result<T, EsiaError>;

/// Error taxonomy for the signing and verification paths.
///
/// None of the variants are retried inside the crate; callers treat any of
/// them as an authentication failure. Messages never carry key material,
/// plaintext-to-sign or signature bytes.
#[derive(Error, Debug, miette::Diagnostic)]
pub enum EsiaError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Key import error: {0}")]
    KeyImportError(String),

    #[error("Signing error: {0}")]
    SigningError(String),

    #[error("Malformed token: {0}")]
    MalformedTokenError(String),

    #[error("Token signature does not match the trusted public key")]
    SignatureMismatch,

    #[error("Unsupported signature suite: {0}")]
    UnsupportedSuiteError(String),

    #[error("Certificate error: {0}")]
    CertificateError(String),

    #[error("ASN.1 encoding/decoding error: {0}")]
    Asn1Error(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl EsiaError {
    /// True for failures where verification ran to completion but rejected
    /// the signature, as opposed to parse/import/system faults.
    #[must_use]
    pub fn is_signature_mismatch(&self) -> bool {
        matches!(self, EsiaError::SignatureMismatch)
    }
}

impl From<der::Error> for EsiaError {
    fn from(error: der::Error) -> Self {
        EsiaError::Asn1Error(error.to_string())
    }
}

impl From<std::io::Error> for EsiaError {
    fn from(error: std::io::Error) -> Self {
        EsiaError::IoError(error.to_string())
    }
}

// openssl::error::ErrorStack is deliberately not converted with `From`: each
// call site maps it to the variant of the step that failed.
