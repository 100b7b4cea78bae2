//! GOST R 34.10 256-bit curve parameter sets.
//!
//! OpenSSL without the GOST engine knows none of these curves, so the groups
//! are assembled from their components at runtime.

use openssl::bn::{BigNum, BigNumContext};
use openssl::ec::{EcGroup, EcPoint};

use crate::domain::crypto::GostCurveId;
use crate::infra::error::{EsiaError, EsiaResult};

/// Short Weierstrass curve `y^2 = x^3 + ax + b (mod p)` with a generator of
/// prime order `q`. All values are big-endian hex.
#[derive(Debug)]
pub struct GostCurveParams {
    pub p: &'static str,
    pub a: &'static str,
    pub b: &'static str,
    pub q: &'static str,
    pub x: &'static str,
    pub y: &'static str,
    pub cofactor: u32,
}

const CRYPTO_PRO_A: GostCurveParams = GostCurveParams {
    p: "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFD97",
    a: "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFD94",
    b: "A6",
    q: "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF6C611070995AD10045841B09B761B893",
    x: "01",
    y: "8D91E471E0989CDA27DF505A453F2B7635294F2DDF23E3B122ACC99C9E9F1E14",
    cofactor: 1,
};

const CRYPTO_PRO_B: GostCurveParams = GostCurveParams {
    p: "8000000000000000000000000000000000000000000000000000000000000C99",
    a: "8000000000000000000000000000000000000000000000000000000000000C96",
    b: "3E1AF419A269A5F866A7D3C25C3DF80AE979259373FF2B182F49D4CE7E1BBC8B",
    q: "800000000000000000000000000000015F700CFFF1A624E5E497161BCC8A198F",
    x: "01",
    y: "3FA8124359F96680B83D1C3EB2C070E5C545C9858D03ECFB744BF8D717717EFC",
    cofactor: 1,
};

const TC26_256_A: GostCurveParams = GostCurveParams {
    p: "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFD97",
    a: "C2173F1513981673AF4892C23035A27CE25E2013BF95AA33B22C656F277E7335",
    b: "295F9BAE7428ED9CCC20E7C359A9D41A22FCCD9108E17BF7BA9337A6F8AE9513",
    q: "400000000000000000000000000000000FD8CDDFC87B6635C115AF556C360C67",
    x: "91E38443A5E82C0D880923425712B2BB658B9196932E02C78B2582FE742DAA28",
    y: "32879423AB1A0375895786C4BB46E9565FDE0B5344766740AF268ADB32322E5C",
    cofactor: 4,
};

/// Parameters of a named curve.
#[must_use]
pub fn params_for(curve: GostCurveId) -> &'static GostCurveParams {
    match curve {
        GostCurveId::CryptoProA | GostCurveId::CryptoProXchA => &CRYPTO_PRO_A,
        GostCurveId::CryptoProB => &CRYPTO_PRO_B,
        GostCurveId::Tc26A => &TC26_256_A,
    }
}

/// An assembled group plus the subgroup order used for scalar arithmetic.
pub struct CurveContext {
    pub group: EcGroup,
    pub q: BigNum,
}

fn curve_error(e: openssl::error::ErrorStack) -> EsiaError {
    EsiaError::SigningError(format!("Failed to assemble GOST curve: {e}"))
}

fn hex(value: &str) -> EsiaResult<BigNum> {
    BigNum::from_hex_str(value).map_err(curve_error)
}

impl CurveContext {
    pub fn new(params: &GostCurveParams) -> EsiaResult<Self> {
        let mut ctx = BigNumContext::new().map_err(curve_error)?;
        let mut group =
            EcGroup::from_components(hex(params.p)?, hex(params.a)?, hex(params.b)?, &mut ctx)
                .map_err(curve_error)?;

        let mut generator = EcPoint::new(&group).map_err(curve_error)?;
        generator
            .set_affine_coordinates_gfp(&group, &*hex(params.x)?, &*hex(params.y)?, &mut ctx)
            .map_err(curve_error)?;
        if !generator.is_on_curve(&group, &mut ctx).map_err(curve_error)? {
            return Err(EsiaError::SigningError(
                "GOST curve generator is not on the curve".to_string(),
            ));
        }

        let cofactor = BigNum::from_u32(params.cofactor).map_err(curve_error)?;
        group
            .set_generator(generator, hex(params.q)?, cofactor)
            .map_err(curve_error)?;

        Ok(Self {
            group,
            q: hex(params.q)?,
        })
    }

    pub fn for_curve(curve: GostCurveId) -> EsiaResult<Self> {
        Self::new(params_for(curve))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_curves_assemble() {
        for curve in [
            GostCurveId::CryptoProA,
            GostCurveId::CryptoProB,
            GostCurveId::CryptoProXchA,
            GostCurveId::Tc26A,
        ] {
            let ctx = CurveContext::for_curve(curve)
                .unwrap_or_else(|e| panic!("curve {curve:?} should assemble: {e}"));
            assert!(ctx.q.num_bits() >= 254, "{curve:?} order size");
        }
    }

    #[test]
    fn test_generator_has_order_q() {
        let curve = CurveContext::for_curve(GostCurveId::CryptoProA).unwrap();
        let mut ctx = BigNumContext::new().unwrap();
        let mut q_minus_one = BigNum::new().unwrap();
        q_minus_one
            .checked_sub(&curve.q, &BigNum::from_u32(1).unwrap())
            .unwrap();

        let mut point = EcPoint::new(&curve.group).unwrap();
        point.mul_generator2(&curve.group, &q_minus_one, &mut ctx).unwrap();
        let generator = curve.group.generator_opt().unwrap();
        let mut sum = EcPoint::new(&curve.group).unwrap();
        sum.add(&curve.group, &point, generator, &mut ctx).unwrap();
        assert!(sum.is_infinity(&curve.group));
    }
}
