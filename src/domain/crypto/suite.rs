//! Signature suite domain type.
//!
//! A suite pairs a public-key signature algorithm with the hash it is always
//! used with. Exactly two suites exist and they are never mixed within one
//! signing or verification operation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::HashAlgorithm;
use crate::domain::constants;
use crate::infra::error::EsiaError;

/// Signature suite accepted by the identity provider.
///
/// Serialized under its configuration tag, so config files read `suite = "gost"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureSuite {
    /// RSA PKCS#1 v1.5 with SHA-256.
    #[serde(rename = "rsa", alias = "rsa_sha256")]
    RsaSha256,
    /// GOST R 34.10-2012 (256-bit) with GOST R 34.11-2012 Streebog-256.
    #[serde(rename = "gost", alias = "gost34_10_2012_256")]
    Gost34_10_2012_256,
}

impl SignatureSuite {
    /// Configuration tag (`"rsa"` / `"gost"`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureSuite::RsaSha256 => "rsa",
            SignatureSuite::Gost34_10_2012_256 => "gost",
        }
    }

    /// The hash algorithm bound to this suite.
    #[must_use]
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        match self {
            SignatureSuite::RsaSha256 => HashAlgorithm::Sha256,
            SignatureSuite::Gost34_10_2012_256 => HashAlgorithm::Streebog256,
        }
    }

    /// Token header `alg` value the provider uses for this suite.
    #[must_use]
    pub fn token_alg(&self) -> &'static str {
        match self {
            SignatureSuite::RsaSha256 => constants::TOKEN_ALG_RSA,
            SignatureSuite::Gost34_10_2012_256 => constants::TOKEN_ALG_GOST,
        }
    }

    /// Select a suite from a token header `alg` value.
    ///
    /// Only the exact GOST identifier selects GOST; every other value,
    /// including unknown ones, selects RSA/SHA-256.
    #[must_use]
    pub fn from_token_alg(alg: &str) -> Self {
        if alg == constants::TOKEN_ALG_GOST {
            SignatureSuite::Gost34_10_2012_256
        } else {
            SignatureSuite::RsaSha256
        }
    }
}

impl fmt::Display for SignatureSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureSuite {
    type Err = EsiaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rsa" | "rsa_sha256" | "rs256" => Ok(SignatureSuite::RsaSha256),
            "gost" | "gost34_10_2012_256" | "gost3410_2012_256" => {
                Ok(SignatureSuite::Gost34_10_2012_256)
            }
            other => Err(EsiaError::UnsupportedSuiteError(format!(
                "'{other}' (expected 'rsa' or 'gost')"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suite_parsing() {
        assert_eq!(
            "rsa".parse::<SignatureSuite>().unwrap(),
            SignatureSuite::RsaSha256
        );
        assert_eq!(
            "GOST".parse::<SignatureSuite>().unwrap(),
            SignatureSuite::Gost34_10_2012_256
        );
        assert!(matches!(
            "dsa".parse::<SignatureSuite>(),
            Err(EsiaError::UnsupportedSuiteError(_))
        ));
    }

    #[test]
    fn test_suite_serializes_as_config_tag() {
        #[derive(Serialize, Deserialize)]
        struct Holder {
            suite: SignatureSuite,
        }

        let text = toml::to_string(&Holder {
            suite: SignatureSuite::Gost34_10_2012_256,
        })
        .unwrap();
        assert_eq!(text.trim(), "suite = \"gost\"");

        let holder: Holder = toml::from_str("suite = \"rsa\"").unwrap();
        assert_eq!(holder.suite, SignatureSuite::RsaSha256);
        let holder: Holder = toml::from_str("suite = \"gost34_10_2012_256\"").unwrap();
        assert_eq!(holder.suite, SignatureSuite::Gost34_10_2012_256);
        assert!(toml::from_str::<Holder>("suite = \"ecdsa\"").is_err());
    }

    #[test]
    fn test_suite_hash_binding() {
        assert_eq!(
            SignatureSuite::RsaSha256.hash_algorithm(),
            HashAlgorithm::Sha256
        );
        assert_eq!(
            SignatureSuite::Gost34_10_2012_256.hash_algorithm(),
            HashAlgorithm::Streebog256
        );
    }

    #[test]
    fn test_token_alg_defaults_to_rsa() {
        assert_eq!(
            SignatureSuite::from_token_alg("GOST3410_2012_256"),
            SignatureSuite::Gost34_10_2012_256
        );
        assert_eq!(
            SignatureSuite::from_token_alg("RS256"),
            SignatureSuite::RsaSha256
        );
        // Case and unknown values both fall through to RSA
        assert_eq!(
            SignatureSuite::from_token_alg("gost3410_2012_256"),
            SignatureSuite::RsaSha256
        );
        assert_eq!(
            SignatureSuite::from_token_alg("none"),
            SignatureSuite::RsaSha256
        );
    }
}
