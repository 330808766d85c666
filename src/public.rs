// Copyright (c) 2021-2022 Toposware, Inc.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This module provides a `PublicKey` wrapping
//! struct around an affine curve point.

use super::curve::{self, CurveDomain};
use super::error::Error;
use super::signature::check;
use super::{Info, SecretKey, Signature};

use alloc::vec::Vec;
use core::fmt::{Display, Formatter};
use elliptic_curve::group::Group;
use num_bigint::BigUint;

/// A public key, equal to `sk·G` for its secret key `sk`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PublicKey<C: CurveDomain>(pub(crate) C::AffinePoint);

impl<C: CurveDomain> PublicKey<C> {
    /// Computes a public key from a provided secret key
    pub fn from_secret_key(sk: &SecretKey<C>) -> Self {
        PublicKey((C::ProjectivePoint::generator() * sk.0).into())
    }

    /// Returns the underlying curve point
    pub fn as_affine(&self) -> &C::AffinePoint {
        &self.0
    }

    /// Converts this public key to its canonical uncompressed encoding
    pub fn to_bytes(&self) -> Vec<u8> {
        curve::encode_point::<C>(&self.0)
    }

    /// Constructs a public key from its uncompressed encoding,
    /// checking that it lies on the curve
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        curve::decode_point::<C>(bytes)
            .map(PublicKey)
            .ok_or(Error::InvalidPublicKey)
    }

    /// Checks a signature against this public key, a shared info
    /// and a message
    pub fn check(&self, signature: &Signature<C>, info: &Info<C>, message: &[u8]) -> bool {
        check(self, signature, info, message)
    }

    /// Verifies a signature against this public key, a shared info
    /// and a message
    pub fn verify_signature(
        &self,
        signature: &Signature<C>,
        info: &Info<C>,
        message: &[u8],
    ) -> Result<(), Error> {
        signature.verify(message, info, self)
    }
}

impl<C: CurveDomain> From<&SecretKey<C>> for PublicKey<C> {
    fn from(sk: &SecretKey<C>) -> Self {
        PublicKey::from_secret_key(sk)
    }
}

impl<C: CurveDomain> Display for PublicKey<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let (x, y) = C::to_coordinates(&self.0);
        write!(
            f,
            "{}-pk: (x = {}, y = {})",
            C::NAME,
            BigUint::from_bytes_be(&x),
            BigUint::from_bytes_be(&y)
        )
    }
}
