use std::fmt;

use der::{Decode, Encode};
use x509_cert::Certificate;

use crate::infra::error::{EsiaError, EsiaResult};

/// DER-encoded X.509 certificate wrapper.
#[derive(Clone, PartialEq, Eq)]
pub struct CertificateDer {
    der: Box<[u8]>,
}

/// Signer identifier by issuer and serial number, both kept as DER
/// (`Name` SEQUENCE and `INTEGER` TLVs) ready to be spliced into a SignerInfo.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuerAndSerial {
    issuer: Vec<u8>,
    serial: Vec<u8>,
}

/// Ordered certificate chain (leaf first, then whatever the caller supplied).
/// Never empty.
#[derive(Clone)]
pub struct CertificateChain {
    leaf: CertificateDer,
    rest: Vec<CertificateDer>,
}

impl CertificateDer {
    #[must_use]
    pub fn from_der(der: Vec<u8>) -> Self {
        Self {
            der: der.into_boxed_slice(),
        }
    }
    #[must_use]
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    fn parse(&self) -> EsiaResult<Certificate> {
        Certificate::from_der(&self.der)
            .map_err(|e| EsiaError::CertificateError(format!("Failed to parse certificate: {e}")))
    }

    /// Issuer `Name` and serial number of this certificate.
    pub fn issuer_and_serial(&self) -> EsiaResult<IssuerAndSerial> {
        let cert = self.parse()?;
        let tbs = &cert.tbs_certificate;
        Ok(IssuerAndSerial {
            issuer: tbs.issuer.to_der()?,
            serial: tbs.serial_number.to_der()?,
        })
    }

    /// DER `SubjectPublicKeyInfo` of this certificate.
    pub fn subject_public_key_info(&self) -> EsiaResult<Vec<u8>> {
        let cert = self.parse()?;
        Ok(cert.tbs_certificate.subject_public_key_info.to_der()?)
    }

    /// RFC 4514 rendering of the subject name.
    pub fn subject(&self) -> EsiaResult<String> {
        Ok(self.parse()?.tbs_certificate.subject.to_string())
    }
}

impl IssuerAndSerial {
    #[must_use]
    pub fn issuer_der(&self) -> &[u8] {
        &self.issuer
    }
    #[must_use]
    pub fn serial_der(&self) -> &[u8] {
        &self.serial
    }
}

impl CertificateChain {
    /// Build a chain from DER certificates in order, leaf first.
    ///
    /// An empty list is a configuration fault: there is no signer to identify.
    pub fn new(certificates: Vec<Vec<u8>>) -> EsiaResult<Self> {
        let mut iter = certificates.into_iter();
        let leaf = iter.next().ok_or_else(|| {
            EsiaError::ConfigurationError("Certificate chain is empty".to_string())
        })?;
        if leaf.is_empty() {
            return Err(EsiaError::ConfigurationError(
                "Leaf certificate is empty".to_string(),
            ));
        }
        Ok(Self {
            leaf: CertificateDer::from_der(leaf),
            rest: iter.map(CertificateDer::from_der).collect(),
        })
    }

    #[must_use]
    pub fn leaf(&self) -> &CertificateDer {
        &self.leaf
    }

    /// All certificates in supplied order, leaf first.
    pub fn iter(&self) -> impl Iterator<Item = &CertificateDer> {
        std::iter::once(&self.leaf).chain(self.rest.iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Debug for CertificateDer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CertificateDer(len={})", self.der.len())
    }
}
impl fmt::Debug for IssuerAndSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IssuerAndSerial(issuer_len={}, serial_len={})",
            self.issuer.len(),
            self.serial.len()
        )
    }
}
impl fmt::Debug for CertificateChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CertificateChain(leaf_len={}, others={})",
            self.leaf.der.len(),
            self.rest.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_chain_is_configuration_error() {
        match CertificateChain::new(Vec::new()) {
            Err(EsiaError::ConfigurationError(msg)) => assert!(msg.contains("empty")),
            other => panic!("Expected ConfigurationError, got {other:?}"),
        }
        assert!(matches!(
            CertificateChain::new(vec![Vec::new()]),
            Err(EsiaError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_chain_order_is_preserved() {
        let chain = CertificateChain::new(vec![vec![1], vec![2], vec![3]]).unwrap();
        let ders: Vec<&[u8]> = chain.iter().map(CertificateDer::as_der).collect();
        assert_eq!(ders, vec![&[1u8][..], &[2u8][..], &[3u8][..]]);
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.leaf().as_der(), &[1]);
    }

    #[test]
    fn test_garbage_leaf_is_certificate_error() {
        let chain = CertificateChain::new(vec![vec![0x30, 0x03, 0x02, 0x01, 0x01]]).unwrap();
        assert!(matches!(
            chain.leaf().issuer_and_serial(),
            Err(EsiaError::CertificateError(_))
        ));
    }

    #[test]
    fn test_debug_does_not_dump_bytes() {
        let chain = CertificateChain::new(vec![vec![0xAB; 40]]).unwrap();
        assert_eq!(format!("{chain:?}"), "CertificateChain(leaf_len=40, others=0)");
    }
}
