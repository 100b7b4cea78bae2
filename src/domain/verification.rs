//! Verification domain types for identity tokens.

use std::fmt;

use serde_json::{Map, Value};

use crate::domain::crypto::SignatureSuite;
use crate::domain::token::TokenHeader;

/// Result of checking a token signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Signature checked and valid.
    Verified,
    /// Verification ran to completion and rejected the signature.
    SignatureMismatch,
    /// No trusted key was supplied; claims are trusted by the caller.
    SkippedNoKey,
}

impl VerificationOutcome {
    /// True when the caller may act on the claims.
    #[must_use]
    pub fn is_trusted(&self) -> bool {
        !matches!(self, VerificationOutcome::SignatureMismatch)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationOutcome::Verified => "verified",
            VerificationOutcome::SignatureMismatch => "signature-mismatch",
            VerificationOutcome::SkippedNoKey => "skipped-no-key",
        }
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded token plus how far it could be trusted.
///
/// Claims are exposed even on `SignatureMismatch` so the caller can log the
/// rejection.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub header: TokenHeader,
    pub claims: Map<String, Value>,
    pub outcome: VerificationOutcome,
    /// Suite used for the check; `None` when verification was skipped.
    pub suite: Option<SignatureSuite>,
}

impl VerifiedToken {
    #[must_use]
    pub fn is_trusted(&self) -> bool {
        self.outcome.is_trusted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_trust() {
        assert!(VerificationOutcome::Verified.is_trusted());
        assert!(VerificationOutcome::SkippedNoKey.is_trusted());
        assert!(!VerificationOutcome::SignatureMismatch.is_trusted());
        assert_eq!(
            VerificationOutcome::SignatureMismatch.to_string(),
            "signature-mismatch"
        );
    }
}
