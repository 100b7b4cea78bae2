//! Centralized constants for commonly repeated DER/OID bytes, tags and masks.
//! Keep this intentionally small; only broadly reused literals should live here.

// === ASN.1 DER Constants ===

/// ASN.1 NULL value (tag + length + null)
pub const ASN1_NULL: &[u8] = &[0x05, 0x00];

/// ASN.1 SEQUENCE tag
pub const ASN1_SEQUENCE_TAG: u8 = 0x30;

/// ASN.1 SET tag
pub const ASN1_SET_TAG: u8 = 0x31;

/// ASN.1 INTEGER tag
pub const ASN1_INTEGER_TAG: u8 = 0x02;

/// ASN.1 OBJECT IDENTIFIER tag
pub const ASN1_OID_TAG: u8 = 0x06;

/// ASN.1 OCTET STRING tag
pub const ASN1_OCTET_STRING_TAG: u8 = 0x04;

/// ASN.1 context-specific tag [0], constructed
pub const ASN1_CONTEXT_0_EXPLICIT_TAG: u8 = 0xa0;

/// Length octet announcing an indefinite-length encoding
pub const BER_INDEFINITE_LENGTH: u8 = 0x80;

/// End-of-contents marker terminating an indefinite-length value
pub const BER_END_OF_CONTENTS: &[u8] = &[0x00, 0x00];

/// DER long form length encoding: high bit set, low bits count the length octets
pub const DER_LONG_FORM_FLAG: u8 = 0x80;

// === CMS ===

/// `SignedData` and `SignerInfo` version used for issuer+serial signer identifiers
pub const CMS_VERSION_1: &[u8] = &[0x02, 0x01, 0x01];

/// CMS `data` content type (1.2.840.113549.1.7.1) DER encoding
pub const CMS_DATA_OID: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x07, 0x01];

/// CMS `signedData` content type (1.2.840.113549.1.7.2) DER encoding
pub const CMS_SIGNED_DATA_OID: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x07, 0x02];

// === RSA suite ===

/// SHA-256 (2.16.840.1.101.3.4.2.1) DER encoding
pub const SHA256_ALGORITHM_OID: &[u8] = &[0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01];

/// sha256WithRSAEncryption (1.2.840.113549.1.1.11) DER encoding
pub const SHA256_WITH_RSA_OID: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x0b];

// === GOST suite ===

/// GOST R 34.10-2012 256-bit signature (1.2.643.7.1.1.1.1) DER encoding
pub const GOST_SIGN_2012_256_OID: &[u8] = &[0x2a, 0x85, 0x03, 0x07, 0x01, 0x01, 0x01, 0x01];

/// GOST R 34.11-2012 256-bit digest, Streebog (1.2.643.7.1.1.2.2) DER encoding
pub const GOST_DIGEST_2012_256_OID: &[u8] = &[0x2a, 0x85, 0x03, 0x07, 0x01, 0x01, 0x02, 0x02];

/// Dotted form of the GOST signature algorithm, as it appears in key structures
pub const GOST_SIGN_2012_256_OID_STR: &str = "1.2.643.7.1.1.1.1";

/// Dotted form of the Streebog-256 digest algorithm
pub const GOST_DIGEST_2012_256_OID_STR: &str = "1.2.643.7.1.1.2.2";

/// Token header `alg` value announcing a GOST R 34.10-2012 signature
pub const TOKEN_ALG_GOST: &str = "GOST3410_2012_256";

/// Token header `alg` value announcing an RSA SHA-256 signature
pub const TOKEN_ALG_RSA: &str = "RS256";

/// Byte length of one GOST 256-bit scalar or coordinate
pub const GOST_256_FIELD_LEN: usize = 32;
