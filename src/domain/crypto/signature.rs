use std::fmt;

use super::SignatureSuite;

/// Raw signature value as placed in a SignerInfo or a token segment.
///
/// RSA: PKCS#1 v1.5 block, modulus-sized. GOST: `s || r`, 32 bytes each,
/// big-endian.
#[derive(Clone, Eq, PartialEq)]
pub struct SignatureValue {
    suite: SignatureSuite,
    bytes: Box<[u8]>,
}

impl SignatureValue {
    #[must_use]
    pub fn new(suite: SignatureSuite, bytes: Vec<u8>) -> Self {
        Self {
            suite,
            bytes: bytes.into_boxed_slice(),
        }
    }
    #[must_use]
    pub fn suite(&self) -> SignatureSuite {
        self.suite
    }
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes.into_vec()
    }
}

impl fmt::Debug for SignatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SignatureValue(suite={}, len={})",
            self.suite,
            self.bytes.len()
        )
    }
}
