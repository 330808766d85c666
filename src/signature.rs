// Copyright (c) 2021-2022 Toposware, Inc.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This module provides a Signature struct, the unblinded output
//! of a signing session, and its verification.

use super::curve::{self, CurveDomain};
use super::derivation::hash_to_scalar;
use super::error::Error;
use super::{Info, PublicKey};

use alloc::vec::Vec;
use elliptic_curve::group::Group;
use subtle::ConstantTimeEq;

/// A partially blind signature, bound to a message and an info.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Signature<C: CurveDomain> {
    /// Unblinded response `r + t1`
    pub p: C::Scalar,
    /// Unblinded challenge share `c + t2`
    pub w: C::Scalar,
    /// Unblinded nonce `s + t3`
    pub o: C::Scalar,
    /// Unblinded challenge share `d + t4`
    pub g: C::Scalar,
}

impl<C: CurveDomain> Signature<C> {
    /// Verifies this signature against a message, a shared info
    /// and the signer's public key
    pub fn verify(&self, message: &[u8], info: &Info<C>, pkey: &PublicKey<C>) -> Result<(), Error> {
        if check(pkey, self, info, message) {
            Ok(())
        } else {
            Err(Error::InvalidSignature)
        }
    }

    /// Converts this signature to `P ‖ W ‖ O ‖ G`
    pub fn to_bytes(&self) -> Vec<u8> {
        curve::encode_scalars::<C>(&[self.p, self.w, self.o, self.g])
    }

    /// Constructs a signature from `P ‖ W ‖ O ‖ G`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let [p, w, o, g] = curve::decode_scalars::<C, 4>(bytes)?;

        Ok(Signature { p, w, o, g })
    }
}

/// Checks a signature against a public key, a shared info and a message.
///
/// Accepts iff `W + G = H(enc(P·G + W·Y) ‖ enc(O·G + G·Z) ‖ enc(Z) ‖ m)`,
/// where `Y` is the public key and `Z` the info point.
pub fn check<C: CurveDomain>(
    public_key: &PublicKey<C>,
    signature: &Signature<C>,
    info: &Info<C>,
    message: &[u8],
) -> bool {
    let generator = C::ProjectivePoint::generator();

    let alpha: C::AffinePoint = (generator * signature.p
        + C::ProjectivePoint::from(public_key.0) * signature.w)
        .into();
    let beta: C::AffinePoint = (generator * signature.o
        + C::ProjectivePoint::from(*info.as_affine()) * signature.g)
        .into();

    let lhs = signature.w + signature.g;
    let rhs = challenge::<C>(&alpha, &beta, info, message);

    lhs.ct_eq(&rhs).into()
}

/// Fiat-Shamir challenge over the blinded commitments, the info and
/// the message.
pub(crate) fn challenge<C: CurveDomain>(
    alpha: &C::AffinePoint,
    beta: &C::AffinePoint,
    info: &Info<C>,
    message: &[u8],
) -> C::Scalar {
    let mut transcript = curve::encode_point::<C>(alpha);
    transcript.extend_from_slice(&curve::encode_point::<C>(beta));
    transcript.extend_from_slice(&info.to_bytes());
    transcript.extend_from_slice(message);

    hash_to_scalar::<C>(&transcript)
}
