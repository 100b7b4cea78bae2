//! Hash algorithm domain type.
//!
//! Provides the `HashAlgorithm` enumeration for the two digests the provider
//! accepts: SHA-256 for the RSA suite and Streebog-256 (GOST R 34.11-2012)
//! for the GOST suite. Both are computed through the RustCrypto `Digest` trait.

use std::fmt;
use std::str::FromStr;

use sha2::Digest;

use crate::domain::constants;
use crate::infra::error::EsiaError;

/// Supported hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha256,
    Streebog256,
}

impl HashAlgorithm {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Streebog256 => "streebog256",
        }
    }

    #[must_use]
    pub fn digest_size(&self) -> usize {
        32
    }

    /// DER content bytes of the algorithm OID (without tag and length).
    #[must_use]
    pub fn oid_bytes(&self) -> &'static [u8] {
        match self {
            HashAlgorithm::Sha256 => constants::SHA256_ALGORITHM_OID,
            HashAlgorithm::Streebog256 => constants::GOST_DIGEST_2012_256_OID,
        }
    }

    /// Hash `data` in one shot.
    #[must_use]
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => sha2::Sha256::digest(data).to_vec(),
            HashAlgorithm::Streebog256 => streebog::Streebog256::digest(data).to_vec(),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = EsiaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "streebog256" | "streebog-256" | "gostr3411_2012_256" => {
                Ok(HashAlgorithm::Streebog256)
            }
            other => Err(EsiaError::ValidationError(format!(
                "Unsupported hash algorithm: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_answer() {
        let digest = HashAlgorithm::Sha256.digest(b"abc");
        assert_eq!(
            digest[..4],
            [0xba, 0x78, 0x16, 0xbf],
            "SHA-256(\"abc\") prefix"
        );
    }

    #[test]
    fn test_streebog256_known_answer() {
        // GOST R 34.11-2012 example M1: "012345678901234567890123456789012345678901234567890123456789012"
        let message = b"012345678901234567890123456789012345678901234567890123456789012";
        let digest = HashAlgorithm::Streebog256.digest(message);
        assert_eq!(digest.len(), 32);
        assert_eq!(
            digest[..4],
            [0x9d, 0x15, 0x1e, 0xef],
            "Streebog-256(M1) prefix"
        );
    }

    #[test]
    fn test_hash_parsing() {
        assert_eq!(
            "SHA256".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Sha256
        );
        assert_eq!(
            "streebog256".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Streebog256
        );
        assert!("md5".parse::<HashAlgorithm>().is_err());
    }
}
