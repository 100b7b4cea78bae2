//! RSA PKCS#1 v1.5 / SHA-256 engine over OpenSSL.

use der::asn1::ObjectIdentifier;
use openssl::md::Md;
use openssl::pkey::{Id, PKey};
use openssl::pkey_ctx::PkeyCtx;
use openssl::rsa::Padding;

use super::{algorithm_identifier, CryptoEngine, SignatureParameters, SuiteAlgorithms};
use crate::domain::constants;
use crate::domain::crypto::{
    HashAlgorithm, KeyMaterial, PrivateKeyInner, PublicKeyInner, SignatureSuite, SignatureValue,
    TrustedPublicKey,
};
use crate::infra::error::{EsiaError, EsiaResult};

const SHA256_WITH_RSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");
const SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.1");

/// RSA/SHA-256 suite.
#[derive(Debug, Default, Clone, Copy)]
pub struct RsaEngine;

fn require_rsa_suite(suite: SignatureSuite) -> EsiaResult<()> {
    if suite == SignatureSuite::RsaSha256 {
        Ok(())
    } else {
        Err(EsiaError::KeyImportError(format!(
            "RSA engine cannot import a key for suite '{suite}'"
        )))
    }
}

fn require_sha256(hash: HashAlgorithm) -> EsiaResult<()> {
    if hash == HashAlgorithm::Sha256 {
        Ok(())
    } else {
        Err(EsiaError::SigningError(format!(
            "RSA suite signs with sha256, not {hash}"
        )))
    }
}

impl CryptoEngine for RsaEngine {
    fn suite(&self) -> SignatureSuite {
        SignatureSuite::RsaSha256
    }

    fn import_private_key(
        &self,
        pkcs8_der: &[u8],
        suite: SignatureSuite,
    ) -> EsiaResult<KeyMaterial> {
        require_rsa_suite(suite)?;
        let pkey = PKey::private_key_from_pkcs8(pkcs8_der)
            .map_err(|e| EsiaError::KeyImportError(format!("Invalid PKCS#8 private key: {e}")))?;
        if pkey.id() != Id::RSA {
            return Err(EsiaError::KeyImportError(
                "PKCS#8 key is not an RSA key".to_string(),
            ));
        }
        log::debug!("Imported RSA private key ({} bits)", pkey.bits());
        Ok(KeyMaterial::rsa(pkey))
    }

    fn import_public_key(
        &self,
        spki_der: &[u8],
        suite: SignatureSuite,
    ) -> EsiaResult<TrustedPublicKey> {
        require_rsa_suite(suite)?;
        let pkey = PKey::public_key_from_der(spki_der).map_err(|e| {
            EsiaError::KeyImportError(format!("Invalid SubjectPublicKeyInfo: {e}"))
        })?;
        if pkey.id() != Id::RSA {
            return Err(EsiaError::KeyImportError(
                "Public key is not an RSA key".to_string(),
            ));
        }
        Ok(TrustedPublicKey::rsa(pkey))
    }

    fn sign(
        &self,
        key: &KeyMaterial,
        hash: HashAlgorithm,
        message: &[u8],
    ) -> EsiaResult<SignatureValue> {
        require_sha256(hash)?;
        let PrivateKeyInner::Rsa(pkey) = key.inner() else {
            return Err(EsiaError::SigningError(format!(
                "RSA engine cannot sign with a {} key",
                key.suite()
            )));
        };

        let digest = hash.digest(message);
        let signing_error = |e: openssl::error::ErrorStack| {
            EsiaError::SigningError(format!("RSA signing failed: {e}"))
        };
        let mut ctx = PkeyCtx::new(pkey).map_err(signing_error)?;
        ctx.sign_init().map_err(signing_error)?;
        ctx.set_rsa_padding(Padding::PKCS1).map_err(signing_error)?;
        ctx.set_signature_md(Md::sha256()).map_err(signing_error)?;

        let mut signature = Vec::new();
        ctx.sign_to_vec(&digest, &mut signature)
            .map_err(signing_error)?;
        Ok(SignatureValue::new(SignatureSuite::RsaSha256, signature))
    }

    fn verify(
        &self,
        key: &TrustedPublicKey,
        suite: SignatureSuite,
        signature: &[u8],
        message: &[u8],
    ) -> EsiaResult<bool> {
        if suite != SignatureSuite::RsaSha256 {
            return Err(EsiaError::UnsupportedSuiteError(format!(
                "RSA engine cannot verify suite '{suite}'"
            )));
        }
        let PublicKeyInner::Rsa(pkey) = key.inner() else {
            return Err(EsiaError::KeyImportError(format!(
                "Trusted key is a {} key, token declares rsa",
                key.suite()
            )));
        };

        let digest = HashAlgorithm::Sha256.digest(message);
        let setup_error = |e: openssl::error::ErrorStack| {
            EsiaError::KeyImportError(format!("RSA verification setup failed: {e}"))
        };
        let mut ctx = PkeyCtx::new(pkey).map_err(setup_error)?;
        ctx.verify_init().map_err(setup_error)?;
        ctx.set_rsa_padding(Padding::PKCS1).map_err(setup_error)?;
        ctx.set_signature_md(Md::sha256()).map_err(setup_error)?;

        // OpenSSL reports a bad PKCS#1 block through its error stack, which is
        // still a completed check with a negative answer.
        match ctx.verify(&digest, signature) {
            Ok(valid) => Ok(valid),
            Err(e) => {
                log::debug!("RSA signature rejected: {e}");
                Ok(false)
            }
        }
    }

    fn algorithm_identifier_for(&self, suite: SignatureSuite) -> EsiaResult<SuiteAlgorithms> {
        match suite {
            SignatureSuite::RsaSha256 => Ok(SuiteAlgorithms {
                signature: SHA256_WITH_RSA,
                digest: SHA256,
            }),
            other => Err(EsiaError::UnsupportedSuiteError(format!(
                "RSA engine has no identifiers for suite '{other}'"
            ))),
        }
    }

    fn signature_parameters_for(
        &self,
        key: &KeyMaterial,
        hash: HashAlgorithm,
    ) -> EsiaResult<SignatureParameters> {
        if key.suite() != SignatureSuite::RsaSha256 {
            return Err(EsiaError::SigningError(format!(
                "RSA engine cannot describe a {} key",
                key.suite()
            )));
        }
        require_sha256(hash)?;
        Ok(SignatureParameters {
            signature_algorithm: algorithm_identifier(constants::SHA256_WITH_RSA_OID, true),
            digest_algorithm: algorithm_identifier(hash.oid_bytes(), true),
        })
    }
}
