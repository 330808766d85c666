// Copyright (c) 2021-2022 Toposware, Inc.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This module provides the `Info` point both parties of a session
//! agree on, compressed from public context bytes.

use super::curve::{self, CurveDomain};
use super::derivation::hash_to_point;
use super::error::Error;

use alloc::vec::Vec;
use core::fmt::{Display, Formatter};
use num_bigint::BigUint;
use subtle::{Choice, ConstantTimeEq};

/// Public information bound into a signature, as a curve point
#[derive(Clone, Copy, Debug)]
pub struct Info<C: CurveDomain>(C::AffinePoint);

impl<C: CurveDomain> Info<C> {
    /// Compresses arbitrary context bytes into an info point
    pub fn new(context: &[u8]) -> Self {
        Info(hash_to_point::<C>(context))
    }

    /// Returns the underlying curve point
    pub fn as_affine(&self) -> &C::AffinePoint {
        &self.0
    }

    /// Converts this info to its canonical uncompressed encoding
    pub fn to_bytes(&self) -> Vec<u8> {
        curve::encode_point::<C>(&self.0)
    }

    /// Constructs an info from its uncompressed encoding,
    /// checking that it lies on the curve
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        curve::decode_point::<C>(bytes)
            .map(Info)
            .ok_or(Error::PointNotOnCurve)
    }
}

/// Compresses arbitrary context bytes into an info point.
pub fn compress_info<C: CurveDomain>(context: &[u8]) -> Info<C> {
    Info::new(context)
}

impl<C: CurveDomain> ConstantTimeEq for Info<C> {
    fn ct_eq(&self, other: &Self) -> Choice {
        let (x1, y1) = C::to_coordinates(&self.0);
        let (x2, y2) = C::to_coordinates(&other.0);

        x1.as_slice().ct_eq(x2.as_slice()) & y1.as_slice().ct_eq(y2.as_slice())
    }
}

impl<C: CurveDomain> PartialEq for Info<C> {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl<C: CurveDomain> Eq for Info<C> {}

impl<C: CurveDomain> Display for Info<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let (x, y) = C::to_coordinates(&self.0);
        write!(
            f,
            "({} {})",
            BigUint::from_bytes_be(&x),
            BigUint::from_bytes_be(&y)
        )
    }
}
