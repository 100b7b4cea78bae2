//! Opaque key handles.
//!
//! Private keys are imported fresh for each call and dropped when the call
//! returns. Neither handle exposes its bytes and both redact `Debug` output.

use std::fmt;

use openssl::bn::BigNum;
use openssl::pkey::{PKey, Private, Public};

use super::SignatureSuite;

/// Named GOST R 34.10 256-bit curve parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GostCurveId {
    /// id-GostR3410-2001-CryptoPro-A-ParamSet
    CryptoProA,
    /// id-GostR3410-2001-CryptoPro-B-ParamSet
    CryptoProB,
    /// id-GostR3410-2001-CryptoPro-XchA-ParamSet (same curve as A)
    CryptoProXchA,
    /// id-tc26-gost-3410-2012-256-paramSetA
    Tc26A,
}

impl GostCurveId {
    #[must_use]
    pub fn oid(&self) -> &'static str {
        match self {
            GostCurveId::CryptoProA => "1.2.643.2.2.35.1",
            GostCurveId::CryptoProB => "1.2.643.2.2.35.2",
            GostCurveId::CryptoProXchA => "1.2.643.2.2.36.0",
            GostCurveId::Tc26A => "1.2.643.7.1.2.1.1.1",
        }
    }

    #[must_use]
    pub fn from_oid(oid: &str) -> Option<Self> {
        [
            GostCurveId::CryptoProA,
            GostCurveId::CryptoProB,
            GostCurveId::CryptoProXchA,
            GostCurveId::Tc26A,
        ]
        .into_iter()
        .find(|c| c.oid() == oid)
    }
}

pub(crate) enum PrivateKeyInner {
    Rsa(PKey<Private>),
    Gost { curve: GostCurveId, scalar: BigNum },
}

pub(crate) enum PublicKeyInner {
    Rsa(PKey<Public>),
    Gost {
        curve: GostCurveId,
        x: BigNum,
        y: BigNum,
    },
}

/// Private signing key bound to exactly one suite.
pub struct KeyMaterial {
    inner: PrivateKeyInner,
}

/// Verify-only public key.
pub struct TrustedPublicKey {
    inner: PublicKeyInner,
}

impl KeyMaterial {
    pub(crate) fn rsa(pkey: PKey<Private>) -> Self {
        Self {
            inner: PrivateKeyInner::Rsa(pkey),
        }
    }

    pub(crate) fn gost(curve: GostCurveId, scalar: BigNum) -> Self {
        Self {
            inner: PrivateKeyInner::Gost { curve, scalar },
        }
    }

    pub(crate) fn inner(&self) -> &PrivateKeyInner {
        &self.inner
    }

    /// Suite this key signs with.
    #[must_use]
    pub fn suite(&self) -> SignatureSuite {
        match self.inner {
            PrivateKeyInner::Rsa(_) => SignatureSuite::RsaSha256,
            PrivateKeyInner::Gost { .. } => SignatureSuite::Gost34_10_2012_256,
        }
    }
}

impl TrustedPublicKey {
    pub(crate) fn rsa(pkey: PKey<Public>) -> Self {
        Self {
            inner: PublicKeyInner::Rsa(pkey),
        }
    }

    pub(crate) fn gost(curve: GostCurveId, x: BigNum, y: BigNum) -> Self {
        Self {
            inner: PublicKeyInner::Gost { curve, x, y },
        }
    }

    pub(crate) fn inner(&self) -> &PublicKeyInner {
        &self.inner
    }

    /// Suite this key verifies with.
    #[must_use]
    pub fn suite(&self) -> SignatureSuite {
        match self.inner {
            PublicKeyInner::Rsa(_) => SignatureSuite::RsaSha256,
            PublicKeyInner::Gost { .. } => SignatureSuite::Gost34_10_2012_256,
        }
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial(suite={}, [REDACTED])", self.suite())
    }
}

impl fmt::Debug for TrustedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            PublicKeyInner::Rsa(pkey) => write!(f, "TrustedPublicKey(rsa, bits={})", pkey.bits()),
            PublicKeyInner::Gost { curve, .. } => {
                write!(f, "TrustedPublicKey(gost, curve={curve:?})")
            }
        }
    }
}
