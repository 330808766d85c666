// Copyright (c) 2021-2022 Toposware, Inc.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This module provides a `SecretKey` wrapping
//! struct around a curve scalar.

use super::curve::{self, CurveDomain};
use super::derivation::random_scalar;
use super::error::Error;
use super::PublicKey;

use core::fmt::{Debug, Formatter};
use elliptic_curve::ff::PrimeField;
use elliptic_curve::FieldBytes;
use rand_core::{CryptoRng, RngCore};
use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A secret key, owned by the signer and never transmitted
#[derive(Clone)]
pub struct SecretKey<C: CurveDomain>(pub(crate) C::Scalar);

impl<C: CurveDomain> SecretKey<C> {
    /// Generates a new random secret key, uniform in `[0, N)`
    pub fn new(rng: impl CryptoRng + RngCore) -> Result<Self, Error> {
        random_scalar::<C>(rng).map(SecretKey)
    }

    /// Generates a new secret key from a provided scalar.
    ///
    /// If the source or generation method of the scalar is
    /// unknown, it is preferable to use the `SecretKey::new`
    /// method instead.
    pub fn from_scalar(scalar: C::Scalar) -> Self {
        SecretKey(scalar)
    }

    /// Computes the public key associated to this secret key
    pub fn public_key(&self) -> PublicKey<C> {
        PublicKey::from_secret_key(self)
    }

    /// Converts this secret key to big-endian bytes of the field length
    pub fn to_bytes(&self) -> FieldBytes<C> {
        self.0.to_repr()
    }

    /// Constructs a secret key from a big-endian integer.
    ///
    /// Inputs shorter than the field length are read as integers with
    /// their leading zeros stripped. Longer inputs, and values not
    /// below the group order, are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let length = curve::field_length::<C>();
        if bytes.len() > length {
            return Err(Error::InvalidScalar);
        }

        let mut padded = FieldBytes::<C>::default();
        padded[length - bytes.len()..].copy_from_slice(bytes);
        let scalar = curve::decode_scalar::<C>(&padded);
        padded.as_mut_slice().zeroize();

        scalar.map(SecretKey)
    }
}

impl<C: CurveDomain> ConstantTimeEq for SecretKey<C> {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl<C: CurveDomain> PartialEq for SecretKey<C> {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl<C: CurveDomain> Eq for SecretKey<C> {}

impl<C: CurveDomain> Debug for SecretKey<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}-sk: (s = ..)", C::NAME)
    }
}

impl<C: CurveDomain> Zeroize for SecretKey<C> {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl<C: CurveDomain> Drop for SecretKey<C> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl<C: CurveDomain> ZeroizeOnDrop for SecretKey<C> {}
