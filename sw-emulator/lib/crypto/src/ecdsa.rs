/*++

Licensed under the Apache-2.0 license.

File Name:

    ecdsa.rs

Abstract:

    File contains the ECDSA model of the ECC engine for the NIST P-256,
    P-384 and P-521 curves. Signing takes the ephemeral scalar from the
    caller, as the engine does. All operands are big endian and exactly
    one curve size long.

--*/

use num_bigint::BigUint;

/// Supported curves
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EccCurve {
    P256,
    P384,
    P521,
}

impl EccCurve {
    /// Operand size in bytes
    pub fn size(&self) -> usize {
        match self {
            Self::P256 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }

    fn order(&self) -> BigUint {
        let hex: &[u8] = match self {
            Self::P256 => b"FFFFFFFF00000000FFFFFFFFFFFFFFFFBCE6FAADA7179E84F3B9CAC2FC632551",
            Self::P384 => b"FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF\
                            C7634D81F4372DDF581A0DB248B0A77AECEC196ACCC52973",
            Self::P521 => b"01FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFA\
                            51868783BF2F966B7FCC0148F709A5D03BB5C9B8899C47AEBB6FB71E91386409",
        };
        BigUint::parse_bytes(hex, 16).unwrap_or_default()
    }

    /// `value mod n` as a curve sized big endian string
    fn reduce(&self, value: &[u8]) -> Vec<u8> {
        let r = (BigUint::from_bytes_be(value) % self.order()).to_bytes_be();
        let mut out = vec![0u8; self.size() - r.len()];
        out.extend_from_slice(&r);
        out
    }
}

/// Failures reported by the engine model
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EccError {
    KeyZero,
    KeyWrongOrder,
    KeyNotOnCurve,
    BadSignature,
    BadRandomNumber,
    RsZero,
    BadLength,
}

type Coords = (Vec<u8>, Vec<u8>);

macro_rules! curve_ops {
    ($module:ident, $krate:ident) => {
        mod $module {
            use super::{Coords, EccCurve, EccError};
            use $krate::elliptic_curve::ff::{Field, PrimeField};
            use $krate::elliptic_curve::group::{Curve, Group};
            use $krate::elliptic_curve::point::AffineCoordinates;
            use $krate::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
            use $krate::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar};

            fn scalar(bytes: &[u8]) -> Option<Scalar> {
                Option::from(<Scalar as PrimeField>::from_repr(
                    FieldBytes::clone_from_slice(bytes),
                ))
            }

            fn nonzero(bytes: &[u8], err: EccError) -> Result<Scalar, EccError> {
                match scalar(bytes) {
                    Some(s) if !bool::from(Field::is_zero(&s)) => Ok(s),
                    _ => Err(err),
                }
            }

            fn private_key(d: &[u8]) -> Result<Scalar, EccError> {
                if d.iter().all(|&b| b == 0) {
                    return Err(EccError::KeyZero);
                }
                scalar(d).ok_or(EccError::KeyWrongOrder)
            }

            fn coords(point: &AffinePoint) -> Result<Coords, EccError> {
                let encoded = point.to_encoded_point(false);
                match (encoded.x(), encoded.y()) {
                    (Some(x), Some(y)) => Ok((x.to_vec(), y.to_vec())),
                    _ => Err(EccError::KeyNotOnCurve),
                }
            }

            fn point(qx: &[u8], qy: &[u8]) -> Result<AffinePoint, EccError> {
                let encoded = EncodedPoint::from_affine_coordinates(
                    &FieldBytes::clone_from_slice(qx),
                    &FieldBytes::clone_from_slice(qy),
                    false,
                );
                Option::from(AffinePoint::from_encoded_point(&encoded))
                    .ok_or(EccError::KeyNotOnCurve)
            }

            fn hash_scalar(curve: EccCurve, hash: &[u8]) -> Result<Scalar, EccError> {
                scalar(&curve.reduce(hash)).ok_or(EccError::BadLength)
            }

            pub(super) fn public_key(d: &[u8]) -> Result<Coords, EccError> {
                let d = private_key(d)?;
                coords(&Curve::to_affine(&(ProjectivePoint::generator() * d)))
            }

            pub(super) fn validate(qx: &[u8], qy: &[u8]) -> Result<(), EccError> {
                point(qx, qy).map(|_| ())
            }

            pub(super) fn sign(
                curve: EccCurve,
                d: &[u8],
                k: &[u8],
                hash: &[u8],
            ) -> Result<Coords, EccError> {
                let d = private_key(d)?;
                let k = nonzero(k, EccError::BadRandomNumber)?;
                let e = hash_scalar(curve, hash)?;

                let kg = Curve::to_affine(&(ProjectivePoint::generator() * k));
                let r = nonzero(&curve.reduce(&AffineCoordinates::x(&kg)), EccError::RsZero)?;
                let k_inv: Scalar =
                    Option::from(Field::invert(&k)).ok_or(EccError::BadRandomNumber)?;
                let s = k_inv * (e + r * d);
                if bool::from(Field::is_zero(&s)) {
                    return Err(EccError::RsZero);
                }
                Ok((
                    PrimeField::to_repr(&r).to_vec(),
                    PrimeField::to_repr(&s).to_vec(),
                ))
            }

            pub(super) fn verify(
                curve: EccCurve,
                qx: &[u8],
                qy: &[u8],
                hash: &[u8],
                r: &[u8],
                s: &[u8],
            ) -> Result<(), EccError> {
                let q = ProjectivePoint::from(point(qx, qy)?);
                let r_scalar = nonzero(r, EccError::RsZero)?;
                let s = nonzero(s, EccError::RsZero)?;
                let e = hash_scalar(curve, hash)?;

                let w: Scalar = Option::from(Field::invert(&s)).ok_or(EccError::RsZero)?;
                let sum = ProjectivePoint::generator() * (e * w) + q * (r_scalar * w);
                if bool::from(Group::is_identity(&sum)) {
                    return Err(EccError::BadSignature);
                }
                if curve.reduce(&AffineCoordinates::x(&Curve::to_affine(&sum))) != r {
                    return Err(EccError::BadSignature);
                }
                Ok(())
            }
        }
    };
}

curve_ops!(nist_p256, p256);
curve_ops!(nist_p384, p384);
curve_ops!(nist_p521, p521);

pub enum Ecdsa {}

impl Ecdsa {
    fn check_len(curve: EccCurve, operands: &[&[u8]]) -> Result<(), EccError> {
        if operands.iter().any(|op| op.len() != curve.size()) {
            return Err(EccError::BadLength);
        }
        Ok(())
    }

    /// Public key `d * G` as `(x, y)`.
    pub fn public_key(curve: EccCurve, d: &[u8]) -> Result<Coords, EccError> {
        Self::check_len(curve, &[d])?;
        match curve {
            EccCurve::P256 => nist_p256::public_key(d),
            EccCurve::P384 => nist_p384::public_key(d),
            EccCurve::P521 => nist_p521::public_key(d),
        }
    }

    /// Check that `(x, y)` is a point on the curve.
    pub fn validate(curve: EccCurve, qx: &[u8], qy: &[u8]) -> Result<(), EccError> {
        Self::check_len(curve, &[qx, qy])?;
        match curve {
            EccCurve::P256 => nist_p256::validate(qx, qy),
            EccCurve::P384 => nist_p384::validate(qx, qy),
            EccCurve::P521 => nist_p521::validate(qx, qy),
        }
    }

    /// Sign a curve sized hash with ephemeral scalar `k`, returning `(r, s)`.
    pub fn sign(curve: EccCurve, d: &[u8], k: &[u8], hash: &[u8]) -> Result<Coords, EccError> {
        Self::check_len(curve, &[d, k, hash])?;
        match curve {
            EccCurve::P256 => nist_p256::sign(curve, d, k, hash),
            EccCurve::P384 => nist_p384::sign(curve, d, k, hash),
            EccCurve::P521 => nist_p521::sign(curve, d, k, hash),
        }
    }

    pub fn verify(
        curve: EccCurve,
        qx: &[u8],
        qy: &[u8],
        hash: &[u8],
        r: &[u8],
        s: &[u8],
    ) -> Result<(), EccError> {
        Self::check_len(curve, &[qx, qy, hash, r, s])?;
        match curve {
            EccCurve::P256 => nist_p256::verify(curve, qx, qy, hash, r, s),
            EccCurve::P384 => nist_p384::verify(curve, qx, qy, hash, r, s),
            EccCurve::P521 => nist_p521::verify(curve, qx, qy, hash, r, s),
        }
    }
}
