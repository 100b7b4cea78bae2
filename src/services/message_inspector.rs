//! Read-back of client secrets: decode the BER ContentInfo into a summary and
//! optionally check the embedded signature against the leaf certificate.

use der::asn1::ObjectIdentifier;

use crate::domain::cms::ber::{read_single, BerElement};
use crate::domain::cms::LengthForm;
use crate::domain::constants;
use crate::domain::crypto::{CertificateDer, SignatureSuite};
use crate::infra::error::{EsiaError, EsiaResult};
use crate::services::codec;
use crate::services::crypto_engine::engine_for;

/// Decoded view of a ContentInfo(SignedData) with a single signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessageSummary {
    pub content_type: String,
    pub version: u8,
    pub digest_algorithms: Vec<String>,
    pub encapsulated_content_type: String,
    pub plaintext: Vec<u8>,
    pub certificates: Vec<Vec<u8>>,
    pub signer_count: usize,
    pub signer_version: u8,
    /// DER `Name` of the signer's issuer.
    pub signer_issuer: Vec<u8>,
    /// DER `INTEGER` serial of the signer certificate.
    pub signer_serial: Vec<u8>,
    pub digest_algorithm: String,
    pub signature_algorithm: String,
    pub signature: Vec<u8>,
    /// Child-index paths (from the outer ContentInfo) of every element
    /// encoded with indefinite length.
    pub indefinite_length_paths: Vec<Vec<usize>>,
}

fn oid_string(element: BerElement<'_>) -> EsiaResult<String> {
    let element = element.expect_tag(constants::ASN1_OID_TAG, "OBJECT IDENTIFIER")?;
    ObjectIdentifier::from_bytes(element.content)
        .map(|oid| oid.to_string())
        .map_err(|e| EsiaError::Asn1Error(format!("Invalid OBJECT IDENTIFIER: {e}")))
}

fn small_integer(element: BerElement<'_>, what: &str) -> EsiaResult<u8> {
    let element = element.expect_tag(constants::ASN1_INTEGER_TAG, what)?;
    match element.content {
        [value] => Ok(*value),
        _ => Err(EsiaError::Asn1Error(format!("{what} is not a small integer"))),
    }
}

/// `AlgorithmIdentifier` -> dotted OID.
fn algorithm_oid(element: BerElement<'_>, what: &str) -> EsiaResult<String> {
    let element = element.expect_tag(constants::ASN1_SEQUENCE_TAG, what)?;
    oid_string(element.child(0, what)?)
}

fn collect_indefinite(
    element: BerElement<'_>,
    path: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) -> EsiaResult<()> {
    if element.form == LengthForm::Indefinite {
        out.push(path.clone());
    }
    if element.is_constructed() {
        for (index, child) in element.children()?.into_iter().enumerate() {
            path.push(index);
            collect_indefinite(child, path, out)?;
            path.pop();
        }
    }
    Ok(())
}

/// Decodes client secrets produced by `ClientSecretBuilder`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignedMessageInspector;

impl SignedMessageInspector {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Decode a URL-safe base64 client secret.
    pub fn inspect(&self, client_secret: &str) -> EsiaResult<SignedMessageSummary> {
        let ber = codec::base64url_decode(client_secret)?;
        self.inspect_bytes(&ber)
    }

    /// Decode BER ContentInfo bytes.
    pub fn inspect_bytes(&self, ber: &[u8]) -> EsiaResult<SignedMessageSummary> {
        let root = read_single(ber)?.expect_tag(constants::ASN1_SEQUENCE_TAG, "ContentInfo")?;
        let content_type = oid_string(root.child(0, "contentType")?)?;
        let signed_data = root
            .child(1, "content")?
            .expect_tag(constants::ASN1_CONTEXT_0_EXPLICIT_TAG, "[0] content")?
            .child(0, "SignedData")?
            .expect_tag(constants::ASN1_SEQUENCE_TAG, "SignedData")?;

        let fields = signed_data.children()?;
        let mut fields = fields.into_iter();
        let mut next = |what: &str| {
            fields
                .next()
                .ok_or_else(|| EsiaError::Asn1Error(format!("SignedData is missing {what}")))
        };

        let version = small_integer(next("version")?, "SignedData version")?;
        let digest_algorithms = next("digestAlgorithms")?
            .expect_tag(constants::ASN1_SET_TAG, "digestAlgorithms")?
            .children()?
            .into_iter()
            .map(|alg| algorithm_oid(alg, "digest AlgorithmIdentifier"))
            .collect::<EsiaResult<Vec<_>>>()?;

        let encap = next("encapContentInfo")?
            .expect_tag(constants::ASN1_SEQUENCE_TAG, "encapContentInfo")?;
        let encapsulated_content_type = oid_string(encap.child(0, "eContentType")?)?;
        let plaintext = encap
            .child(1, "eContent")?
            .expect_tag(constants::ASN1_CONTEXT_0_EXPLICIT_TAG, "[0] eContent")?
            .child(0, "eContent OCTET STRING")?
            .expect_tag(constants::ASN1_OCTET_STRING_TAG, "eContent OCTET STRING")?
            .content
            .to_vec();

        let mut certificates = Vec::new();
        let mut element = next("signerInfos")?;
        if element.tag == constants::ASN1_CONTEXT_0_EXPLICIT_TAG {
            certificates = element
                .children()?
                .into_iter()
                .map(|cert| cert.raw.to_vec())
                .collect();
            element = next("signerInfos")?;
        }
        // [1] crls
        if element.tag == 0xa1 {
            element = next("signerInfos")?;
        }
        let signer_infos = element
            .expect_tag(constants::ASN1_SET_TAG, "signerInfos")?
            .children()?;
        let signer = signer_infos
            .first()
            .copied()
            .ok_or_else(|| EsiaError::Asn1Error("SignedData has no SignerInfo".to_string()))?
            .expect_tag(constants::ASN1_SEQUENCE_TAG, "SignerInfo")?;

        let signer_fields = signer.children()?;
        let field = |index: usize, what: &str| {
            signer_fields
                .get(index)
                .copied()
                .ok_or_else(|| EsiaError::Asn1Error(format!("SignerInfo is missing {what}")))
        };
        let signer_version = small_integer(field(0, "version")?, "SignerInfo version")?;
        let sid = field(1, "sid")?.expect_tag(constants::ASN1_SEQUENCE_TAG, "issuerAndSerialNumber")?;
        let digest_algorithm = algorithm_oid(field(2, "digestAlgorithm")?, "digestAlgorithm")?;
        // Skip [0] signedAttrs when present
        let mut index = 3;
        if field(index, "signatureAlgorithm")?.tag == constants::ASN1_CONTEXT_0_EXPLICIT_TAG {
            index += 1;
        }
        let signature_algorithm =
            algorithm_oid(field(index, "signatureAlgorithm")?, "signatureAlgorithm")?;
        let signature = field(index + 1, "signature")?
            .expect_tag(constants::ASN1_OCTET_STRING_TAG, "signature")?
            .content
            .to_vec();

        let mut indefinite_length_paths = Vec::new();
        collect_indefinite(root, &mut Vec::new(), &mut indefinite_length_paths)?;

        Ok(SignedMessageSummary {
            content_type,
            version,
            digest_algorithms,
            encapsulated_content_type,
            plaintext,
            certificates,
            signer_count: signer_infos.len(),
            signer_version,
            signer_issuer: sid.child(0, "issuer")?.raw.to_vec(),
            signer_serial: sid.child(1, "serialNumber")?.raw.to_vec(),
            digest_algorithm,
            signature_algorithm,
            signature,
            indefinite_length_paths,
        })
    }

    /// Check the embedded signature against the first certificate's public
    /// key under `suite`.
    pub fn verify_signed_message(
        &self,
        client_secret: &str,
        suite: SignatureSuite,
    ) -> EsiaResult<bool> {
        let summary = self.inspect(client_secret)?;
        let engine = engine_for(suite);
        let expected = engine.algorithm_identifier_for(suite)?;
        if summary.signature_algorithm != expected.signature.to_string()
            || summary.digest_algorithm != expected.digest.to_string()
        {
            return Err(EsiaError::ValidationError(format!(
                "Signed message uses {}/{}, not the {suite} suite",
                summary.signature_algorithm, summary.digest_algorithm
            )));
        }

        let leaf = summary.certificates.first().ok_or_else(|| {
            EsiaError::CertificateError("Signed message carries no certificate".to_string())
        })?;
        let spki = CertificateDer::from_der(leaf.clone()).subject_public_key_info()?;
        let key = engine.import_public_key(&spki, suite)?;
        engine.verify(&key, suite, &summary.signature, &summary.plaintext)
    }
}
