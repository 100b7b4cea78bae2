//! CMS `SignedData` domain wrapper.
//! Newtype around the BER bytes of a finished ContentInfo, plus the BER tree
//! used to assemble and read it.

use std::fmt;

pub mod ber;

pub use ber::{BerElement, BerNode, LengthForm};

/// Child-index paths (from the outer ContentInfo) of the nodes that are
/// encoded with indefinite length: ContentInfo, its `[0]` content and the
/// SignedData SEQUENCE inside it.
pub const INDEFINITE_LENGTH_PATHS: [&[usize]; 3] = [&[], &[1], &[1, 0]];

/// Finished ContentInfo(SignedData). Immutable once produced.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedMessage {
    ber: Vec<u8>,
}

impl SignedMessage {
    #[must_use]
    pub fn from_ber(ber: Vec<u8>) -> Self {
        Self { ber }
    }
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.ber
    }
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.ber
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.ber.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ber.is_empty()
    }
}

impl fmt::Debug for SignedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignedMessage(len={})", self.ber.len())
    }
}
