//! Client-secret builder: CMS `SignedData` over the authorization plaintext.
//!
//! Produces ContentInfo(SignedData) with:
//! - one SignerInfo (version 1, issuer+serial, no signed attributes), whose
//!   signature covers the plaintext bytes directly
//! - the plaintext as a `data` OCTET STRING in the encapsulated content
//! - the full certificate chain, in supplied order
//!
//! The provider only accepts the variant where the outer ContentInfo, its
//! `[0]` content and the SignedData SEQUENCE use indefinite length while
//! every other element stays definite.

use crate::domain::cms::{BerNode, LengthForm, SignedMessage, INDEFINITE_LENGTH_PATHS};
use crate::domain::constants;
use crate::domain::crypto::{CertificateChain, SignatureSuite};
use crate::infra::error::EsiaResult;
use crate::services::codec;
use crate::services::crypto_engine::{engine_for, CryptoEngine};

/// Builds signed client secrets for one certificate chain and suite.
#[derive(Debug, Clone)]
pub struct ClientSecretBuilder {
    chain: CertificateChain,
    suite: SignatureSuite,
}

impl ClientSecretBuilder {
    #[must_use]
    pub fn new(chain: CertificateChain, suite: SignatureSuite) -> Self {
        Self { chain, suite }
    }

    #[must_use]
    pub fn suite(&self) -> SignatureSuite {
        self.suite
    }

    #[must_use]
    pub fn chain(&self) -> &CertificateChain {
        &self.chain
    }

    /// `scope ++ timestamp ++ client_id ++ state`, no separators. The
    /// provider rebuilds exactly this string when checking the secret.
    #[must_use]
    pub fn compose_plaintext(scope: &str, timestamp: &str, client_id: &str, state: &str) -> String {
        let mut plaintext =
            String::with_capacity(scope.len() + timestamp.len() + client_id.len() + state.len());
        plaintext.push_str(scope);
        plaintext.push_str(timestamp);
        plaintext.push_str(client_id);
        plaintext.push_str(state);
        plaintext
    }

    /// Sign `plaintext` and return the BER ContentInfo.
    pub fn sign_message(
        &self,
        plaintext: &[u8],
        private_key_pkcs8: &[u8],
    ) -> EsiaResult<SignedMessage> {
        self.sign_message_with(engine_for(self.suite), plaintext, private_key_pkcs8)
    }

    /// Same as [`Self::sign_message`] with an explicitly supplied engine.
    pub fn sign_message_with(
        &self,
        engine: &dyn CryptoEngine,
        plaintext: &[u8],
        private_key_pkcs8: &[u8],
    ) -> EsiaResult<SignedMessage> {
        let hash = self.suite.hash_algorithm();
        let signer_id = self.chain.leaf().issuer_and_serial()?;
        let key = engine.import_private_key(private_key_pkcs8, self.suite)?;
        let parameters = engine.signature_parameters_for(&key, hash)?;
        let signature = engine.sign(&key, hash, plaintext)?;
        log::debug!(
            "Signed {} plaintext bytes with {} ({} signature bytes)",
            plaintext.len(),
            self.suite,
            signature.as_slice().len()
        );

        let signer_info = BerNode::sequence(vec![
            BerNode::encoded(constants::CMS_VERSION_1.to_vec()),
            BerNode::sequence(vec![
                BerNode::encoded(signer_id.issuer_der().to_vec()),
                BerNode::encoded(signer_id.serial_der().to_vec()),
            ]),
            parameters.digest_algorithm.clone(),
            parameters.signature_algorithm,
            BerNode::octet_string(signature.into_vec()),
        ]);

        let encap_content_info = BerNode::sequence(vec![
            BerNode::oid(constants::CMS_DATA_OID),
            BerNode::context_0(vec![BerNode::octet_string(plaintext.to_vec())]),
        ]);

        let certificates = BerNode::context_0(
            self.chain
                .iter()
                .map(|cert| BerNode::encoded(cert.as_der().to_vec()))
                .collect(),
        );

        let signed_data = BerNode::sequence(vec![
            BerNode::encoded(constants::CMS_VERSION_1.to_vec()),
            BerNode::set(vec![parameters.digest_algorithm]),
            encap_content_info,
            certificates,
            BerNode::set(vec![signer_info]),
        ]);

        let mut content_info = BerNode::sequence(vec![
            BerNode::oid(constants::CMS_SIGNED_DATA_OID),
            BerNode::context_0(vec![signed_data]),
        ]);
        for path in INDEFINITE_LENGTH_PATHS {
            content_info.set_length_form_at(path, LengthForm::Indefinite)?;
        }

        let ber = content_info.encode();
        log::debug!(
            "ContentInfo encoded: {} bytes, {} certificate(s)",
            ber.len(),
            self.chain.len()
        );
        Ok(SignedMessage::from_ber(ber))
    }

    /// Compose the plaintext, sign it and return the URL-safe base64 secret.
    pub fn build_client_secret(
        &self,
        scope: &str,
        timestamp: &str,
        client_id: &str,
        state: &str,
        private_key_pkcs8: &[u8],
    ) -> EsiaResult<String> {
        let plaintext = Self::compose_plaintext(scope, timestamp, client_id, state);
        let message = self.sign_message(plaintext.as_bytes(), private_key_pkcs8)?;
        Ok(codec::base64url_encode(message.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plaintext_has_no_separators() {
        assert_eq!(
            ClientSecretBuilder::compose_plaintext(
                "fullname email",
                "2018.09.24 21:30:45 +1000",
                "ABC123",
                "TEST123"
            ),
            "fullname email2018.09.24 21:30:45 +1000ABC123TEST123"
        );
    }

    #[test]
    fn test_garbage_leaf_fails_before_key_import() {
        let chain = CertificateChain::new(vec![vec![0x30, 0x00]]).unwrap();
        let builder = ClientSecretBuilder::new(chain, SignatureSuite::RsaSha256);
        assert!(matches!(
            builder.sign_message(b"x", b"not a key"),
            Err(crate::infra::error::EsiaError::CertificateError(_))
        ));
    }
}
