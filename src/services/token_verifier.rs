//! Token verification service: parse a compact token, pick the suite from its
//! header and check the signature against a trusted public key.

use crate::domain::crypto::SignatureSuite;
use crate::domain::token::CompactToken;
use crate::domain::verification::{VerificationOutcome, VerifiedToken};
use crate::infra::error::EsiaResult;
use crate::services::crypto_engine::engine_for;

/// Stateless verifier for provider-issued tokens.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokenVerifier;

impl TokenVerifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Verify `token` against `trusted_public_key` (SPKI DER).
    ///
    /// Without a key the claims are returned with `SkippedNoKey`. The header's
    /// `alg` decides the suite, not the key's own type; any value other than
    /// the GOST identifier is checked as RSA/SHA-256. A failed check is
    /// reported as `SignatureMismatch` with the claims still attached;
    /// parse and key import failures are errors.
    pub fn verify(
        &self,
        token: &str,
        trusted_public_key: Option<&[u8]>,
    ) -> EsiaResult<VerifiedToken> {
        let token = CompactToken::parse(token)?;

        let Some(spki_der) = trusted_public_key else {
            log::debug!("No trusted key supplied; token signature not checked");
            let header = token.header().clone();
            return Ok(VerifiedToken {
                header,
                claims: token.into_claims(),
                outcome: VerificationOutcome::SkippedNoKey,
                suite: None,
            });
        };

        let suite = token.header().declared_suite();
        if suite == SignatureSuite::RsaSha256 && token.header().alg() != Some(suite.token_alg()) {
            log::warn!(
                "Token declares algorithm {:?}; verifying as {}",
                token.header().get("alg"),
                suite.token_alg()
            );
        }
        log::debug!("Verifying token signature with suite {suite}");

        let engine = engine_for(suite);
        let key = engine.import_public_key(spki_der, suite)?;
        let valid = engine.verify(&key, suite, token.signature(), token.signing_input())?;

        let outcome = if valid {
            log::info!("Token signature verified ({suite})");
            VerificationOutcome::Verified
        } else {
            log::warn!("Token signature does not match the trusted key ({suite})");
            VerificationOutcome::SignatureMismatch
        };

        let header = token.header().clone();
        Ok(VerifiedToken {
            header,
            claims: token.into_claims(),
            outcome,
            suite: Some(suite),
        })
    }
}
