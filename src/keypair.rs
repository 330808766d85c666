// Copyright (c) 2021-2022 Toposware, Inc.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This module provides a `KeyPair` struct
//! combining a `SecretKey` and an associated `PublicKey`.

use super::curve::CurveDomain;
use super::error::Error;
use super::{Info, PublicKey, SecretKey, Signature};

use elliptic_curve::FieldBytes;
use rand_core::{CryptoRng, RngCore};

/// A KeyPair
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyPair<C: CurveDomain> {
    /// A secret key
    pub secret_key: SecretKey<C>,
    /// A public key
    pub public_key: PublicKey<C>,
}

impl<C: CurveDomain> KeyPair<C> {
    /// Generates a new random key pair
    pub fn new(rng: impl CryptoRng + RngCore) -> Result<Self, Error> {
        SecretKey::new(rng).map(Self::from_secret_key)
    }

    /// Generates a new key pair from a provided secret key.
    pub fn from_secret_key(secret_key: SecretKey<C>) -> Self {
        let public_key = PublicKey::from_secret_key(&secret_key);

        KeyPair {
            secret_key,
            public_key,
        }
    }

    /// Converts this key pair to an array of bytes
    ///
    /// To ensure consistency between the secret key and public key
    /// during reconstruction without extra checks, KeyPair serialization
    /// only serializes the secret_key part, and reconstructs the public
    /// key when deserializing.
    pub fn to_bytes(&self) -> FieldBytes<C> {
        self.secret_key.to_bytes()
    }

    /// Constructs a key pair from an array of bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        SecretKey::from_bytes(bytes).map(Self::from_secret_key)
    }

    /// Checks a signature against this key pair, a shared info
    /// and a message
    pub fn check(&self, signature: &Signature<C>, info: &Info<C>, message: &[u8]) -> bool {
        self.public_key.check(signature, info, message)
    }

    /// Verifies a signature against this key pair, a shared info
    /// and a message
    pub fn verify_signature(
        &self,
        signature: &Signature<C>,
        info: &Info<C>,
        message: &[u8],
    ) -> Result<(), Error> {
        self.public_key.verify_signature(signature, info, message)
    }
}

impl<C: CurveDomain> From<SecretKey<C>> for KeyPair<C> {
    fn from(secret_key: SecretKey<C>) -> Self {
        KeyPair::from_secret_key(secret_key)
    }
}
