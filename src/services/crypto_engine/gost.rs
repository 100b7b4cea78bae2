//! GOST R 34.10-2012 (256-bit) engine with Streebog-256.
//!
//! Scalar and point arithmetic run on OpenSSL `BigNum`/`EcPoint` over curves
//! assembled from their parameters, so no GOST engine or provider is needed.
//!
//! Byte conventions follow the Russian PKI profile: digests and key values
//! are little-endian, the signature is `s || r` in big-endian.

use der::asn1::{ObjectIdentifier, OctetStringRef, UintRef};
use der::{Decode, Encode};
use openssl::bn::{BigNum, BigNumContext, BigNumRef};
use openssl::ec::EcPoint;

use super::curves::CurveContext;
use super::{algorithm_identifier, CryptoEngine, SignatureParameters, SuiteAlgorithms};
use crate::domain::constants::{self, GOST_256_FIELD_LEN};
use crate::domain::crypto::{
    GostCurveId, HashAlgorithm, KeyMaterial, PrivateKeyInner, PublicKeyInner, SignatureSuite,
    SignatureValue, TrustedPublicKey,
};
use crate::infra::error::{EsiaError, EsiaResult};

const GOST_SIGN_2012_256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.643.7.1.1.1.1");
const GOST_DIGEST_2012_256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.643.7.1.1.2.2");

/// GOST R 34.10-2012 256-bit suite.
#[derive(Debug, Default, Clone, Copy)]
pub struct GostEngine;

type ArithResult<T> = Result<T, openssl::error::ErrorStack>;

fn reversed(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().rev().copied().collect()
}

fn is_zero(n: &BigNumRef) -> bool {
    n.num_bits() == 0
}

fn import_error(e: impl std::fmt::Display) -> EsiaError {
    EsiaError::KeyImportError(format!("Invalid GOST key: {e}"))
}

/// Digest as the integer `e`: little-endian, reduced mod q, never zero.
fn digest_scalar(digest: &[u8], q: &BigNumRef, ctx: &mut BigNumContext) -> ArithResult<BigNum> {
    let raw = BigNum::from_slice(&reversed(digest))?;
    let mut e = BigNum::new()?;
    e.nnmod(&raw, q, ctx)?;
    if is_zero(&e) {
        e = BigNum::from_u32(1)?;
    }
    Ok(e)
}

/// One signing attempt with nonce `k`. `None` when `k` produces a zero `r`
/// or `s` and a new nonce is needed.
fn sign_with_nonce(
    curve: &CurveContext,
    d: &BigNumRef,
    e: &BigNumRef,
    k: &BigNumRef,
    ctx: &mut BigNumContext,
) -> ArithResult<Option<(BigNum, BigNum)>> {
    let mut c = EcPoint::new(&curve.group)?;
    c.mul_generator2(&curve.group, k, ctx)?;
    let mut x = BigNum::new()?;
    let mut y = BigNum::new()?;
    c.affine_coordinates_gfp(&curve.group, &mut x, &mut y, ctx)?;

    let mut r = BigNum::new()?;
    r.nnmod(&x, &curve.q, ctx)?;
    if is_zero(&r) {
        return Ok(None);
    }

    let mut rd = BigNum::new()?;
    rd.mod_mul(&r, d, &curve.q, ctx)?;
    let mut ke = BigNum::new()?;
    ke.mod_mul(k, e, &curve.q, ctx)?;
    let mut s = BigNum::new()?;
    s.mod_add(&rd, &ke, &curve.q, ctx)?;
    if is_zero(&s) {
        return Ok(None);
    }
    Ok(Some((r, s)))
}

/// Check `(r, s)` against public point `q_point` for digest scalar `e`.
fn verify_scalars(
    curve: &CurveContext,
    q_point: &EcPoint,
    e: &BigNumRef,
    r: &BigNumRef,
    s: &BigNumRef,
    ctx: &mut BigNumContext,
) -> ArithResult<bool> {
    if is_zero(r) || is_zero(s) || r >= &*curve.q || s >= &*curve.q {
        return Ok(false);
    }

    let mut v = BigNum::new()?;
    v.mod_inverse(e, &curve.q, ctx)?;
    let mut z1 = BigNum::new()?;
    z1.mod_mul(s, &v, &curve.q, ctx)?;
    let mut rv = BigNum::new()?;
    rv.mod_mul(r, &v, &curve.q, ctx)?;
    let mut z2 = BigNum::new()?;
    z2.mod_sub(&*BigNum::new()?, &rv, &curve.q, ctx)?;

    let mut c = EcPoint::new(&curve.group)?;
    c.mul_full(&curve.group, &z1, q_point, &z2, ctx)?;
    if c.is_infinity(&curve.group) {
        return Ok(false);
    }
    let mut x = BigNum::new()?;
    let mut y = BigNum::new()?;
    c.affine_coordinates_gfp(&curve.group, &mut x, &mut y, ctx)?;
    let mut big_r = BigNum::new()?;
    big_r.nnmod(&x, &curve.q, ctx)?;
    Ok(big_r == *r)
}

fn public_point(
    curve: &CurveContext,
    x: &BigNumRef,
    y: &BigNumRef,
    ctx: &mut BigNumContext,
) -> ArithResult<EcPoint> {
    let mut point = EcPoint::new(&curve.group)?;
    point.set_affine_coordinates_gfp(&curve.group, x, y, ctx)?;
    Ok(point)
}

/// Curve named by the first OID of the algorithm parameters
/// `SEQUENCE { curve, [digest], [cipher] }`.
fn curve_from_parameters(parameters: Option<der::AnyRef<'_>>) -> EsiaResult<GostCurveId> {
    let parameters = parameters.ok_or_else(|| {
        EsiaError::KeyImportError("GOST key has no curve parameters".to_string())
    })?;
    let oids = Vec::<ObjectIdentifier>::from_der(&parameters.to_der()?).map_err(import_error)?;
    let curve_oid = oids
        .first()
        .ok_or_else(|| EsiaError::KeyImportError("GOST key parameters are empty".to_string()))?;
    GostCurveId::from_oid(&curve_oid.to_string()).ok_or_else(|| {
        EsiaError::KeyImportError(format!("Unsupported GOST curve {curve_oid}"))
    })
}

fn require_gost_algorithm(oid: ObjectIdentifier) -> EsiaResult<()> {
    if oid == GOST_SIGN_2012_256 {
        Ok(())
    } else {
        Err(EsiaError::KeyImportError(format!(
            "Key algorithm {oid} is not {}",
            constants::GOST_SIGN_2012_256_OID_STR
        )))
    }
}

fn require_gost_suite(suite: SignatureSuite) -> EsiaResult<()> {
    if suite == SignatureSuite::Gost34_10_2012_256 {
        Ok(())
    } else {
        Err(EsiaError::KeyImportError(format!(
            "GOST engine cannot import a key for suite '{suite}'"
        )))
    }
}

/// Private scalar from the PKCS#8 `privateKey` octets. Accepts an inner
/// OCTET STRING (little-endian), an inner INTEGER, or the bare 32 bytes.
fn private_scalar(private_key: &[u8]) -> EsiaResult<BigNum> {
    let big_endian = match private_key.first() {
        Some(&constants::ASN1_OCTET_STRING_TAG) if private_key.len() > GOST_256_FIELD_LEN => {
            let inner = OctetStringRef::from_der(private_key).map_err(import_error)?;
            reversed(inner.as_bytes())
        }
        Some(&constants::ASN1_INTEGER_TAG) if private_key.len() > GOST_256_FIELD_LEN => {
            UintRef::from_der(private_key)
                .map_err(import_error)?
                .as_bytes()
                .to_vec()
        }
        _ if private_key.len() == GOST_256_FIELD_LEN => reversed(private_key),
        _ => {
            return Err(EsiaError::KeyImportError(format!(
                "Unrecognized GOST private key encoding ({} bytes)",
                private_key.len()
            )))
        }
    };
    BigNum::from_slice(&big_endian).map_err(import_error)
}

impl GostEngine {
    fn sign_digest(
        &self,
        curve_id: GostCurveId,
        d: &BigNumRef,
        digest: &[u8],
    ) -> EsiaResult<Vec<u8>> {
        let signing_error =
            |e: openssl::error::ErrorStack| EsiaError::SigningError(format!("GOST signing failed: {e}"));
        let curve = CurveContext::for_curve(curve_id)?;
        let mut ctx = BigNumContext::new().map_err(signing_error)?;
        let e = digest_scalar(digest, &curve.q, &mut ctx).map_err(signing_error)?;

        loop {
            let mut k = BigNum::new().map_err(signing_error)?;
            curve.q.rand_range(&mut k).map_err(signing_error)?;
            if is_zero(&k) {
                continue;
            }
            if let Some((r, s)) =
                sign_with_nonce(&curve, d, &e, &k, &mut ctx).map_err(signing_error)?
            {
                let mut out = s
                    .to_vec_padded(GOST_256_FIELD_LEN as i32)
                    .map_err(signing_error)?;
                out.extend(
                    r.to_vec_padded(GOST_256_FIELD_LEN as i32)
                        .map_err(signing_error)?,
                );
                return Ok(out);
            }
        }
    }
}

impl CryptoEngine for GostEngine {
    fn suite(&self) -> SignatureSuite {
        SignatureSuite::Gost34_10_2012_256
    }

    fn import_private_key(
        &self,
        pkcs8_der: &[u8],
        suite: SignatureSuite,
    ) -> EsiaResult<KeyMaterial> {
        require_gost_suite(suite)?;
        let info = pkcs8::PrivateKeyInfo::try_from(pkcs8_der)
            .map_err(|e| EsiaError::KeyImportError(format!("Invalid PKCS#8 private key: {e}")))?;
        require_gost_algorithm(info.algorithm.oid)?;
        let curve_id = curve_from_parameters(info.algorithm.parameters)?;
        let d = private_scalar(info.private_key)?;

        let curve = CurveContext::for_curve(curve_id)?;
        if is_zero(&d) || d >= curve.q {
            return Err(EsiaError::KeyImportError(
                "GOST private key is out of range".to_string(),
            ));
        }
        log::debug!("Imported GOST private key on curve {curve_id:?}");
        Ok(KeyMaterial::gost(curve_id, d))
    }

    fn import_public_key(
        &self,
        spki_der: &[u8],
        suite: SignatureSuite,
    ) -> EsiaResult<TrustedPublicKey> {
        require_gost_suite(suite)?;
        let spki = spki::SubjectPublicKeyInfoRef::try_from(spki_der).map_err(|e| {
            EsiaError::KeyImportError(format!("Invalid SubjectPublicKeyInfo: {e}"))
        })?;
        require_gost_algorithm(spki.algorithm.oid)?;
        let curve_id = curve_from_parameters(spki.algorithm.parameters)?;

        let bits = spki.subject_public_key.as_bytes().ok_or_else(|| {
            EsiaError::KeyImportError("GOST public key has unused bits".to_string())
        })?;
        let point = OctetStringRef::from_der(bits).map_err(import_error)?;
        let point = point.as_bytes();
        if point.len() != 2 * GOST_256_FIELD_LEN {
            return Err(EsiaError::KeyImportError(format!(
                "GOST public key must be {} bytes, got {}",
                2 * GOST_256_FIELD_LEN,
                point.len()
            )));
        }
        let x = BigNum::from_slice(&reversed(&point[..GOST_256_FIELD_LEN])).map_err(import_error)?;
        let y = BigNum::from_slice(&reversed(&point[GOST_256_FIELD_LEN..])).map_err(import_error)?;

        let curve = CurveContext::for_curve(curve_id)?;
        let mut ctx = BigNumContext::new().map_err(import_error)?;
        let on_curve = public_point(&curve, &x, &y, &mut ctx)
            .and_then(|p| p.is_on_curve(&curve.group, &mut ctx))
            .unwrap_or(false);
        if !on_curve {
            return Err(EsiaError::KeyImportError(
                "GOST public key is not a point on its curve".to_string(),
            ));
        }
        Ok(TrustedPublicKey::gost(curve_id, x, y))
    }

    fn sign(
        &self,
        key: &KeyMaterial,
        hash: HashAlgorithm,
        message: &[u8],
    ) -> EsiaResult<SignatureValue> {
        if hash != HashAlgorithm::Streebog256 {
            return Err(EsiaError::SigningError(format!(
                "GOST suite signs with streebog256, not {hash}"
            )));
        }
        let PrivateKeyInner::Gost { curve, scalar } = key.inner() else {
            return Err(EsiaError::SigningError(format!(
                "GOST engine cannot sign with a {} key",
                key.suite()
            )));
        };
        let signature = self.sign_digest(*curve, scalar, &hash.digest(message))?;
        Ok(SignatureValue::new(
            SignatureSuite::Gost34_10_2012_256,
            signature,
        ))
    }

    fn verify(
        &self,
        key: &TrustedPublicKey,
        suite: SignatureSuite,
        signature: &[u8],
        message: &[u8],
    ) -> EsiaResult<bool> {
        if suite != SignatureSuite::Gost34_10_2012_256 {
            return Err(EsiaError::UnsupportedSuiteError(format!(
                "GOST engine cannot verify suite '{suite}'"
            )));
        }
        let PublicKeyInner::Gost { curve, x, y } = key.inner() else {
            return Err(EsiaError::KeyImportError(format!(
                "Trusted key is a {} key, token declares gost",
                key.suite()
            )));
        };
        if signature.len() != 2 * GOST_256_FIELD_LEN {
            log::debug!("GOST signature has length {}", signature.len());
            return Ok(false);
        }

        let setup_error = |e: openssl::error::ErrorStack| {
            EsiaError::KeyImportError(format!("GOST verification setup failed: {e}"))
        };
        let curve = CurveContext::for_curve(*curve)?;
        let mut ctx = BigNumContext::new().map_err(setup_error)?;
        let q_point = public_point(&curve, x, y, &mut ctx).map_err(setup_error)?;
        let digest = HashAlgorithm::Streebog256.digest(message);
        let e = digest_scalar(&digest, &curve.q, &mut ctx).map_err(setup_error)?;
        let s = BigNum::from_slice(&signature[..GOST_256_FIELD_LEN]).map_err(setup_error)?;
        let r = BigNum::from_slice(&signature[GOST_256_FIELD_LEN..]).map_err(setup_error)?;

        verify_scalars(&curve, &q_point, &e, &r, &s, &mut ctx).map_err(setup_error)
    }

    fn algorithm_identifier_for(&self, suite: SignatureSuite) -> EsiaResult<SuiteAlgorithms> {
        match suite {
            SignatureSuite::Gost34_10_2012_256 => Ok(SuiteAlgorithms {
                signature: GOST_SIGN_2012_256,
                digest: GOST_DIGEST_2012_256,
            }),
            other => Err(EsiaError::UnsupportedSuiteError(format!(
                "GOST engine has no identifiers for suite '{other}'"
            ))),
        }
    }

    /// The digest identifier is always derived from `hash`; a generic
    /// lookup for this key type would pick the wrong one.
    fn signature_parameters_for(
        &self,
        key: &KeyMaterial,
        hash: HashAlgorithm,
    ) -> EsiaResult<SignatureParameters> {
        if key.suite() != SignatureSuite::Gost34_10_2012_256 {
            return Err(EsiaError::SigningError(format!(
                "GOST engine cannot describe a {} key",
                key.suite()
            )));
        }
        if hash != HashAlgorithm::Streebog256 {
            return Err(EsiaError::SigningError(format!(
                "GOST suite requires streebog256, not {hash}"
            )));
        }
        Ok(SignatureParameters {
            signature_algorithm: algorithm_identifier(constants::GOST_SIGN_2012_256_OID, false),
            digest_algorithm: algorithm_identifier(hash.oid_bytes(), false),
        })
    }
}
