// Copyright (c) 2021-2022 Toposware, Inc.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This module provides the three messages exchanged during a
//! signing session.
//!
//! `Message1` goes from the signer to the requester, `Message2` back
//! to the signer, and `Message3` to the requester again. All of them
//! are plain public data.

use super::curve::{self, CurveDomain};
use super::error::Error;

use alloc::vec::Vec;
use elliptic_curve::FieldBytes;

/// First message of a session, carrying the signer commitments
/// `A = u·G` and `B = s·G + d·Z` as raw affine coordinates.
///
/// Coordinates are only checked against the curve equation when the
/// requester processes the message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Message1<C: CurveDomain> {
    /// x-coordinate of `A`
    pub ax: FieldBytes<C>,
    /// y-coordinate of `A`
    pub ay: FieldBytes<C>,
    /// x-coordinate of `B`
    pub bx: FieldBytes<C>,
    /// y-coordinate of `B`
    pub by: FieldBytes<C>,
}

impl<C: CurveDomain> Message1<C> {
    pub(crate) fn from_points(a: &C::AffinePoint, b: &C::AffinePoint) -> Self {
        let (ax, ay) = C::to_coordinates(a);
        let (bx, by) = C::to_coordinates(b);

        Message1 { ax, ay, bx, by }
    }

    /// Converts this message to `Ax ‖ Ay ‖ Bx ‖ By`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(4 * self.ax.len());
        for coordinate in [&self.ax, &self.ay, &self.bx, &self.by] {
            bytes.extend_from_slice(coordinate);
        }

        bytes
    }

    /// Constructs a message from `Ax ‖ Ay ‖ Bx ‖ By`.
    /// Only the length is checked here.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let length = curve::field_length::<C>();
        if bytes.len() != 4 * length {
            return Err(Error::InvalidLength);
        }

        let mut chunks = bytes.chunks_exact(length).map(FieldBytes::<C>::clone_from_slice);
        match (chunks.next(), chunks.next(), chunks.next(), chunks.next()) {
            (Some(ax), Some(ay), Some(bx), Some(by)) => Ok(Message1 { ax, ay, bx, by }),
            _ => Err(Error::InvalidLength),
        }
    }
}

/// Second message of a session, carrying the blinded challenge `e`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Message2<C: CurveDomain> {
    /// The blinded challenge
    pub e: C::Scalar,
}

impl<C: CurveDomain> Message2<C> {
    /// Converts this message to the big-endian bytes of `e`
    pub fn to_bytes(&self) -> Vec<u8> {
        curve::encode_scalars::<C>(&[self.e])
    }

    /// Constructs a message from the big-endian bytes of `e`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let [e] = curve::decode_scalars::<C, 1>(bytes)?;

        Ok(Message2 { e })
    }
}

/// Third message of a session, carrying the signer responses
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Message3<C: CurveDomain> {
    /// `r = u − c·x`
    pub r: C::Scalar,
    /// `c = e − d`
    pub c: C::Scalar,
    /// The signer nonce `s`, revealed
    pub s: C::Scalar,
}

impl<C: CurveDomain> Message3<C> {
    /// Converts this message to `R ‖ C ‖ S`
    pub fn to_bytes(&self) -> Vec<u8> {
        curve::encode_scalars::<C>(&[self.r, self.c, self.s])
    }

    /// Constructs a message from `R ‖ C ‖ S`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let [r, c, s] = curve::decode_scalars::<C, 3>(bytes)?;

        Ok(Message3 { r, c, s })
    }
}
