//! Algorithm-agnostic crypto engine.
//!
//! The two suites differ only in OIDs, parameter shapes and key/signature
//! byte conventions. Each variant implements [`CryptoEngine`]; callers pick
//! one with [`engine_for`] and pass it explicitly through the whole signing
//! or verification call. There is no process-wide "active engine".

use der::asn1::ObjectIdentifier;

use crate::domain::cms::BerNode;
use crate::domain::constants;
use crate::domain::crypto::{
    HashAlgorithm, KeyMaterial, SignatureSuite, SignatureValue, TrustedPublicKey,
};
use crate::infra::error::EsiaResult;

pub mod curves;
pub mod gost;
pub mod rsa;

pub use gost::GostEngine;
pub use rsa::RsaEngine;

/// OIDs identifying a suite inside CMS structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuiteAlgorithms {
    pub signature: ObjectIdentifier,
    pub digest: ObjectIdentifier,
}

/// Ready-to-encode AlgorithmIdentifier SEQUENCEs for a SignerInfo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureParameters {
    pub signature_algorithm: BerNode,
    pub digest_algorithm: BerNode,
}

/// Capability set shared by both signature suites.
pub trait CryptoEngine: Send + Sync {
    /// Suite this engine implements.
    fn suite(&self) -> SignatureSuite;

    /// Import a PKCS#8 DER private key. Fails with `KeyImportError` on
    /// malformed input or when `suite` is not this engine's suite.
    fn import_private_key(&self, pkcs8_der: &[u8], suite: SignatureSuite)
        -> EsiaResult<KeyMaterial>;

    /// Import a SubjectPublicKeyInfo DER public key for verification.
    fn import_public_key(
        &self,
        spki_der: &[u8],
        suite: SignatureSuite,
    ) -> EsiaResult<TrustedPublicKey>;

    /// Hash `message` with `hash` and sign the digest.
    fn sign(
        &self,
        key: &KeyMaterial,
        hash: HashAlgorithm,
        message: &[u8],
    ) -> EsiaResult<SignatureValue>;

    /// `Ok(false)` when the signature does not match; `Err` only when the
    /// check could not be carried out.
    fn verify(
        &self,
        key: &TrustedPublicKey,
        suite: SignatureSuite,
        signature: &[u8],
        message: &[u8],
    ) -> EsiaResult<bool>;

    /// Fixed OID lookup for `suite`. `UnsupportedSuiteError` for a suite this
    /// engine does not implement.
    fn algorithm_identifier_for(&self, suite: SignatureSuite) -> EsiaResult<SuiteAlgorithms>;

    /// AlgorithmIdentifiers to place in a SignerInfo for `key`, with the
    /// digest forced to `hash`.
    fn signature_parameters_for(
        &self,
        key: &KeyMaterial,
        hash: HashAlgorithm,
    ) -> EsiaResult<SignatureParameters>;
}

static RSA_ENGINE: RsaEngine = RsaEngine;
static GOST_ENGINE: GostEngine = GostEngine;

/// Stateless engine instance for `suite`.
#[must_use]
pub fn engine_for(suite: SignatureSuite) -> &'static dyn CryptoEngine {
    match suite {
        SignatureSuite::RsaSha256 => &RSA_ENGINE,
        SignatureSuite::Gost34_10_2012_256 => &GOST_ENGINE,
    }
}

/// `SEQUENCE { OID, [NULL] }`
pub(crate) fn algorithm_identifier(oid: &[u8], null_parameters: bool) -> BerNode {
    let mut children = vec![BerNode::oid(oid)];
    if null_parameters {
        children.push(BerNode::encoded(constants::ASN1_NULL.to_vec()));
    }
    BerNode::sequence(children)
}
