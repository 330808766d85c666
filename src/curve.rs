// Copyright (c) 2021-2022 Toposware, Inc.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This module binds the arithmetic of the NIST prime-order curves
//! to the domain constants and the point encoding used by every
//! hash derivation of this crate.

use super::constants::UNCOMPRESSED_POINT_TAG;
use super::error::Error;

use alloc::vec::Vec;
use elliptic_curve::ff::{Field, PrimeField};
use elliptic_curve::ops::Reduce;
use elliptic_curve::sec1::{Coordinates, EncodedPoint, FromEncodedPoint, ToEncodedPoint};
use elliptic_curve::{CurveArithmetic, FieldBytes};
use num_bigint::BigUint;

pub use p224::NistP224;
pub use p256::NistP256;
pub use p384::NistP384;
pub use p521::NistP521;

/// A short Weierstrass curve `y² = x³ − 3x + B` of prime order,
/// with the constants needed to derive points and scalars from bytes.
pub trait CurveDomain: CurveArithmetic {
    /// Name of the curve, used as salt of every hash derivation
    const NAME: &'static str;

    /// Prime modulus `P` of the base field, as big-endian hex
    const FIELD_MODULUS: &'static str;

    /// Constant `B` of the curve equation, as big-endian hex
    const CURVE_B: &'static str;

    /// Constructs a point from big-endian affine coordinates.
    ///
    /// Returns `None` if the coordinates are not reduced or do not
    /// satisfy the curve equation.
    fn from_coordinates(x: &FieldBytes<Self>, y: &FieldBytes<Self>) -> Option<Self::AffinePoint>;

    /// Returns the big-endian affine coordinates of a point.
    /// The identity is mapped to the all-zero pair.
    fn to_coordinates(point: &Self::AffinePoint) -> (FieldBytes<Self>, FieldBytes<Self>);
}

macro_rules! impl_curve_domain {
    ($curve:ty, $name:expr, $modulus:expr, $b:expr) => {
        impl CurveDomain for $curve {
            const NAME: &'static str = $name;
            const FIELD_MODULUS: &'static str = $modulus;
            const CURVE_B: &'static str = $b;

            fn from_coordinates(
                x: &FieldBytes<Self>,
                y: &FieldBytes<Self>,
            ) -> Option<Self::AffinePoint> {
                let encoded = EncodedPoint::<Self>::from_affine_coordinates(x, y, false);
                Option::from(
                    <<Self as CurveArithmetic>::AffinePoint as FromEncodedPoint<Self>>::from_encoded_point(
                        &encoded,
                    ),
                )
            }

            fn to_coordinates(point: &Self::AffinePoint) -> (FieldBytes<Self>, FieldBytes<Self>) {
                match point.to_encoded_point(false).coordinates() {
                    Coordinates::Uncompressed { x, y } => (*x, *y),
                    _ => Default::default(),
                }
            }
        }
    };
}

impl_curve_domain!(
    NistP224,
    "P-224",
    "ffffffffffffffffffffffffffffffff000000000000000000000001",
    "b4050a850c04b3abf54132565044b0b7d7bfd8ba270b39432355ffb4"
);

impl_curve_domain!(
    NistP256,
    "P-256",
    "ffffffff00000001000000000000000000000000ffffffffffffffffffffffff",
    "5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b"
);

impl_curve_domain!(
    NistP384,
    "P-384",
    "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffeffffffff0000000000000000ffffffff",
    "b3312fa7e23ee7e4988e056be3f82d19181d9c6efe8141120314088f5013875ac656398d8a2ed19d2a85c8edd3ec2aef"
);

impl_curve_domain!(
    NistP521,
    "P-521",
    "1ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
    "0051953eb9618e1c9a1f929a21a0b68540eea2da725b99b315f3b8b489918ef109e156193951ec7e937b1652c0bd3bb1bf073573df883d2c34f1ef451fd46b503f00"
);

/// Canonical encoding of a point: `0x04 ‖ X ‖ Y`, each coordinate
/// big-endian and padded to the field length.
///
/// This is the exact byte string fed to the challenge hash, so it must
/// match bit for bit between interoperating implementations.
pub fn encode_point<C: CurveDomain>(point: &C::AffinePoint) -> Vec<u8> {
    let (x, y) = C::to_coordinates(point);

    let mut bytes = Vec::with_capacity(1 + x.len() + y.len());
    bytes.push(UNCOMPRESSED_POINT_TAG);
    bytes.extend_from_slice(&x);
    bytes.extend_from_slice(&y);

    bytes
}

/// Inverse of `encode_point`, rejecting anything that is not an
/// uncompressed encoding of a point on the curve.
pub(crate) fn decode_point<C: CurveDomain>(bytes: &[u8]) -> Option<C::AffinePoint> {
    let length = field_length::<C>();
    if bytes.len() != 1 + 2 * length || bytes[0] != UNCOMPRESSED_POINT_TAG {
        return None;
    }

    let (x, y) = bytes[1..].split_at(length);
    C::from_coordinates(FieldBytes::<C>::from_slice(x), FieldBytes::<C>::from_slice(y))
}

/// Byte length of a serialized field element or scalar.
pub(crate) fn field_length<C: CurveDomain>() -> usize {
    FieldBytes::<C>::default().len()
}

pub(crate) fn field_modulus<C: CurveDomain>() -> BigUint {
    parse_hex(C::FIELD_MODULUS)
}

pub(crate) fn curve_b<C: CurveDomain>() -> BigUint {
    parse_hex(C::CURVE_B)
}

/// The group order `N`, read back from the scalar field as `(N - 1) + 1`.
pub(crate) fn group_order<C: CurveDomain>() -> BigUint {
    let minus_one = -C::Scalar::ONE;
    BigUint::from_bytes_be(&minus_one.to_repr()) + 1u32
}

fn parse_hex(hex: &str) -> BigUint {
    BigUint::parse_bytes(hex.as_bytes(), 16).expect("Domain constants are well-formed hex.")
}

/// Writes `value` big-endian into a field-sized buffer.
/// `value` must fit, which holds for anything reduced modulo `P` or `N`.
pub(crate) fn to_field_bytes<C: CurveDomain>(value: &BigUint) -> FieldBytes<C> {
    let mut bytes = FieldBytes::<C>::default();
    let digits = value.to_bytes_be();
    let offset = bytes.len() - digits.len();
    bytes[offset..].copy_from_slice(&digits);

    bytes
}

/// Maps bytes already known to encode an integer below `N` to a scalar.
pub(crate) fn reduce_scalar<C: CurveDomain>(bytes: &FieldBytes<C>) -> C::Scalar {
    <C::Scalar as Reduce<C::Uint>>::reduce_bytes(bytes)
}

/// Decodes a big-endian scalar of exactly the field length.
pub(crate) fn decode_scalar<C: CurveDomain>(bytes: &[u8]) -> Result<C::Scalar, Error> {
    if bytes.len() != field_length::<C>() {
        return Err(Error::InvalidLength);
    }

    Option::<C::Scalar>::from(C::Scalar::from_repr(FieldBytes::<C>::clone_from_slice(
        bytes,
    )))
    .ok_or(Error::InvalidScalar)
}

/// Concatenates the big-endian encodings of `scalars`.
pub(crate) fn encode_scalars<C: CurveDomain>(scalars: &[C::Scalar]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(scalars.len() * field_length::<C>());
    for scalar in scalars {
        bytes.extend_from_slice(&scalar.to_repr());
    }

    bytes
}

/// Splits `bytes` into exactly `K` scalars of the field length.
pub(crate) fn decode_scalars<C: CurveDomain, const K: usize>(
    bytes: &[u8],
) -> Result<[C::Scalar; K], Error> {
    let length = field_length::<C>();
    if bytes.len() != K * length {
        return Err(Error::InvalidLength);
    }

    let mut scalars = [C::Scalar::ZERO; K];
    for (scalar, chunk) in scalars.iter_mut().zip(bytes.chunks_exact(length)) {
        *scalar = decode_scalar::<C>(chunk)?;
    }

    Ok(scalars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use elliptic_curve::group::Group;

    fn check_generator_equation<C: CurveDomain>() {
        let p = field_modulus::<C>();
        let b = curve_b::<C>();
        let generator: C::AffinePoint = C::ProjectivePoint::generator().into();
        let (x, y) = C::to_coordinates(&generator);
        let x = BigUint::from_bytes_be(&x);
        let y = BigUint::from_bytes_be(&y);

        let lhs = &y * &y % &p;
        let rhs = (&x * &x % &p * &x + &b + &p * 3u32 - &x * 3u32) % &p;
        assert_eq!(lhs, rhs, "{}", C::NAME);
    }

    #[test]
    fn test_domain_constants() {
        check_generator_equation::<NistP224>();
        check_generator_equation::<NistP256>();
        check_generator_equation::<NistP384>();
        check_generator_equation::<NistP521>();
    }

    #[test]
    fn test_group_order() {
        assert_eq!(
            group_order::<NistP256>(),
            BigUint::parse_bytes(
                b"ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551",
                16
            )
            .unwrap()
        );
        assert_eq!(
            group_order::<NistP224>(),
            BigUint::parse_bytes(b"ffffffffffffffffffffffffffff16a2e0b8f03e13dd29455c5c2a3d", 16)
                .unwrap()
        );
        assert_eq!(group_order::<NistP521>().bits(), 521);
        assert_eq!(field_length::<NistP521>(), 66);
    }

    #[test]
    fn test_point_encoding() {
        let generator: <NistP256 as CurveArithmetic>::AffinePoint =
            <NistP256 as CurveArithmetic>::ProjectivePoint::generator().into();
        let bytes = encode_point::<NistP256>(&generator);
        assert_eq!(bytes.len(), 65);
        assert_eq!(bytes[0], UNCOMPRESSED_POINT_TAG);
        assert_eq!(decode_point::<NistP256>(&bytes), Some(generator));

        // The identity has no affine coordinates and never decodes
        let identity: <NistP256 as CurveArithmetic>::AffinePoint =
            <NistP256 as CurveArithmetic>::ProjectivePoint::identity().into();
        let bytes = encode_point::<NistP256>(&identity);
        assert_eq!(bytes[0], UNCOMPRESSED_POINT_TAG);
        assert!(bytes[1..].iter().all(|&b| b == 0));
        assert!(decode_point::<NistP256>(&bytes).is_none());

        // Tampered coordinates fall off the curve
        let mut bytes = encode_point::<NistP256>(&generator);
        bytes[64] ^= 1;
        assert!(decode_point::<NistP256>(&bytes).is_none());

        // Compressed or truncated inputs are rejected
        let bytes = encode_point::<NistP256>(&generator);
        assert!(decode_point::<NistP256>(&bytes[..64]).is_none());
        let mut bytes = bytes;
        bytes[0] = 0x02;
        assert!(decode_point::<NistP256>(&bytes).is_none());
    }

    #[test]
    fn test_scalar_decoding() {
        let order = group_order::<NistP256>();
        let too_large = to_field_bytes::<NistP256>(&order);
        assert_eq!(
            decode_scalar::<NistP256>(&too_large),
            Err(Error::InvalidScalar)
        );

        let largest = to_field_bytes::<NistP256>(&(order - 1u32));
        assert_eq!(
            decode_scalar::<NistP256>(&largest),
            Ok(-<NistP256 as CurveArithmetic>::Scalar::ONE)
        );
        assert_eq!(reduce_scalar::<NistP256>(&largest), -p256::Scalar::ONE);

        assert_eq!(
            decode_scalar::<NistP256>(&[0u8; 31]),
            Err(Error::InvalidLength)
        );
    }
}
