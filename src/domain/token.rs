//! Compact signed token (`header.payload.signature`, all base64url).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::crypto::SignatureSuite;
use crate::infra::error::{EsiaError, EsiaResult};
use crate::services::codec::base64url_decode;

/// Decoded token header, kept as the JSON object it arrived as.
///
/// Only `alg` influences verification, and only when it is a string; any
/// other shape of any field is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenHeader(Map<String, Value>);

impl TokenHeader {
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// `alg` when present as a string.
    #[must_use]
    pub fn alg(&self) -> Option<&str> {
        self.0.get("alg").and_then(Value::as_str)
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Suite declared by the header. Anything other than the GOST identifier,
    /// including a missing or non-string `alg`, maps to RSA/SHA-256.
    #[must_use]
    pub fn declared_suite(&self) -> SignatureSuite {
        SignatureSuite::from_token_alg(self.alg().unwrap_or_default())
    }
}

/// Parsed compact token. Keeps the original segment text so the signing
/// input is the exact received bytes, never a re-serialization.
#[derive(Clone)]
pub struct CompactToken {
    signing_input: String,
    header: TokenHeader,
    claims: Map<String, Value>,
    signature: Vec<u8>,
}

fn decode_json_segment(segment: &str, what: &str) -> EsiaResult<Map<String, Value>> {
    let bytes = base64url_decode(segment)
        .map_err(|_| EsiaError::MalformedTokenError(format!("{what} is not valid base64url")))?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(EsiaError::MalformedTokenError(format!(
            "{what} is not a JSON object"
        ))),
        Err(e) => Err(EsiaError::MalformedTokenError(format!(
            "{what} is not valid JSON: {e}"
        ))),
    }
}

impl CompactToken {
    pub fn parse(token: &str) -> EsiaResult<Self> {
        let token = token.trim();
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 {
            return Err(EsiaError::MalformedTokenError(format!(
                "expected 3 dot-separated segments, found {}",
                segments.len()
            )));
        }

        let header = TokenHeader::new(decode_json_segment(segments[0], "header")?);
        let claims = decode_json_segment(segments[1], "payload")?;
        let signature = base64url_decode(segments[2]).map_err(|_| {
            EsiaError::MalformedTokenError("signature is not valid base64url".to_string())
        })?;

        Ok(Self {
            signing_input: format!("{}.{}", segments[0], segments[1]),
            header,
            claims,
            signature,
        })
    }

    #[must_use]
    pub fn header(&self) -> &TokenHeader {
        &self.header
    }
    #[must_use]
    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }
    #[must_use]
    pub fn into_claims(self) -> Map<String, Value> {
        self.claims
    }
    /// Bytes covered by the signature: `header_segment.payload_segment`.
    #[must_use]
    pub fn signing_input(&self) -> &[u8] {
        self.signing_input.as_bytes()
    }
    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}

impl fmt::Debug for CompactToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CompactToken(alg={:?}, claims={}, signature_len={})",
            self.header.alg(),
            self.claims.len(),
            self.signature.len()
        )
    }
}
