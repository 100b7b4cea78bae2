//! Foundational cryptographic domain types.
//!
//! Provides strongly-typed wrappers for cryptographic artifacts including:
//! - Signature suites and the hash each one is bound to
//! - Certificate representations and chain structures
//! - Opaque private/public key handles
//! - Signature values tagged with their suite

mod cert;
mod hash;
mod key;
mod signature;
mod suite;

pub use cert::{CertificateChain, CertificateDer, IssuerAndSerial};
pub use hash::HashAlgorithm;
pub use key::{GostCurveId, KeyMaterial, TrustedPublicKey};
pub(crate) use key::{PrivateKeyInner, PublicKeyInner};
pub use signature::SignatureValue;
pub use suite::SignatureSuite;
