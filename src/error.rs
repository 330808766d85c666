// Copyright (c) 2021-2022 Toposware, Inc.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use core::fmt::{Display, Formatter, Result};

/// Custom error type during key handling and signing sessions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// A received point does not satisfy the curve equation
    PointNotOnCurve,
    /// A signer operation was invoked out of sequence
    InvalidSignerState,
    /// A requester operation was invoked out of sequence
    InvalidRequesterState,
    /// Invalid signature
    InvalidSignature,
    /// A decoded scalar is not smaller than the group order
    InvalidScalar,
    /// A decoded public key is not a point of the curve
    InvalidPublicKey,
    /// The random source failed to produce bytes
    RandomSource,
    /// A byte encoding has the wrong length
    InvalidLength,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::PointNotOnCurve => write!(f, "The received point is not on the curve."),
            Self::InvalidSignerState => {
                write!(f, "The signer is in an invalid state for this operation.")
            }
            Self::InvalidRequesterState => {
                write!(f, "The requester is in an invalid state for this operation.")
            }
            Self::InvalidSignature => {
                write!(f, "The signature is invalid or was incorrectly computed.")
            }
            Self::InvalidScalar => write!(f, "The scalar is too large."),
            Self::InvalidPublicKey => write!(f, "The public key is invalid."),
            Self::RandomSource => write!(f, "The random source failed."),
            Self::InvalidLength => write!(f, "The encoding has an invalid length."),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// A session transition that failed.
///
/// The session is handed back untouched, so the caller may inspect it,
/// retry with a correct message, or drop it.
pub struct Rejected<S> {
    /// The session, in the state it had before the failed call
    pub session: S,
    /// Why the transition was refused
    pub error: Error,
}

impl<S> core::fmt::Debug for Rejected<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Rejected")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<S> Display for Rejected<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        Display::fmt(&self.error, f)
    }
}

impl<S> From<Rejected<S>> for Error {
    fn from(rejected: Rejected<S>) -> Self {
        rejected.error
    }
}
