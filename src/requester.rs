// Copyright (c) 2021-2022 Toposware, Inc.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This module provides the requester side of a signing session.
//!
//! `RequesterFresh` → `RequesterMsg1Processed` → `RequesterMsg2Created`
//! → `Signature`
//!
//! Transitions that act on signer input return `Rejected` with the
//! untouched session when the input is refused, so the requester can
//! decide to retry or give up. `RequesterSession` wraps the same
//! transitions behind runtime order checks.

use super::curve::CurveDomain;
use super::derivation::random_scalar;
use super::error::{Error, Rejected};
use super::signature::{challenge, check};
use super::{Info, Message1, Message2, Message3, PublicKey, Signature};

use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};
use elliptic_curve::ff::Field;
use elliptic_curve::group::Group;
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, trace, warn};
use zeroize::Zeroize;

/// Blinding factors of a requester session, wiped when dropped.
struct RequesterSecrets<C: CurveDomain> {
    t1: C::Scalar,
    t2: C::Scalar,
    t3: C::Scalar,
    t4: C::Scalar,
}

impl<C: CurveDomain> Drop for RequesterSecrets<C> {
    fn drop(&mut self) {
        self.t1.zeroize();
        self.t2.zeroize();
        self.t3.zeroize();
        self.t4.zeroize();
    }
}

/// Public inputs of a requester session.
struct RequesterContext<C: CurveDomain> {
    public_key: PublicKey<C>,
    info: Info<C>,
    message: Vec<u8>,
}

/// A requester session waiting for message 1
pub struct RequesterFresh<C: CurveDomain> {
    context: RequesterContext<C>,
    secrets: RequesterSecrets<C>,
}

impl<C: CurveDomain> RequesterFresh<C> {
    /// Opens a session to get `message` signed under `info` by the
    /// holder of `public_key`, sampling the blinding factors
    /// `t1`, `t2`, `t3`, `t4` uniformly in `[0, N)`.
    ///
    /// Fails with `Error::RandomSource` if `rng` cannot deliver.
    pub fn new(
        public_key: &PublicKey<C>,
        info: Info<C>,
        message: &[u8],
        mut rng: impl CryptoRng + RngCore,
    ) -> Result<Self, Error> {
        let mut secrets = RequesterSecrets {
            t1: C::Scalar::ZERO,
            t2: C::Scalar::ZERO,
            t3: C::Scalar::ZERO,
            t4: C::Scalar::ZERO,
        };
        secrets.t1 = random_scalar::<C>(&mut rng)?;
        secrets.t2 = random_scalar::<C>(&mut rng)?;
        secrets.t3 = random_scalar::<C>(&mut rng)?;
        secrets.t4 = random_scalar::<C>(&mut rng)?;

        trace!(curve = C::NAME, "requester session opened");

        Ok(RequesterFresh {
            context: RequesterContext {
                public_key: *public_key,
                info,
                message: message.to_vec(),
            },
            secrets,
        })
    }

    /// Returns the info this session is signed under
    pub fn info(&self) -> &Info<C> {
        &self.context.info
    }

    /// Blinds the signer commitments into
    /// `α = A + t1·G + t2·Y` and `β = B + t3·G + t4·Z`,
    /// and derives the blinded challenge `e = H(α, β, Z, m) − t2 − t4`.
    ///
    /// Both commitments must lie on the curve, otherwise the session
    /// is handed back with `Error::PointNotOnCurve`.
    pub fn process_message_1(
        self,
        message: &Message1<C>,
    ) -> Result<RequesterMsg1Processed<C>, Rejected<Self>> {
        let (a, b) = match (
            C::from_coordinates(&message.ax, &message.ay),
            C::from_coordinates(&message.bx, &message.by),
        ) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                warn!(curve = C::NAME, "requester rejected an off-curve commitment");
                return Err(Rejected {
                    session: self,
                    error: Error::PointNotOnCurve,
                });
            }
        };

        let generator = C::ProjectivePoint::generator();
        let y = C::ProjectivePoint::from(*self.context.public_key.as_affine());
        let z = C::ProjectivePoint::from(*self.context.info.as_affine());
        let secrets = &self.secrets;

        let alpha: C::AffinePoint =
            (C::ProjectivePoint::from(a) + generator * secrets.t1 + y * secrets.t2).into();
        let beta: C::AffinePoint =
            (C::ProjectivePoint::from(b) + generator * secrets.t3 + z * secrets.t4).into();

        let e = challenge::<C>(&alpha, &beta, &self.context.info, &self.context.message)
            - secrets.t2
            - secrets.t4;

        trace!(curve = C::NAME, "requester processed message 1");

        let RequesterFresh { context, secrets } = self;
        Ok(RequesterMsg1Processed {
            context,
            secrets,
            e,
        })
    }
}

/// A requester session holding the blinded challenge
pub struct RequesterMsg1Processed<C: CurveDomain> {
    context: RequesterContext<C>,
    secrets: RequesterSecrets<C>,
    e: C::Scalar,
}

impl<C: CurveDomain> RequesterMsg1Processed<C> {
    /// Returns the info this session is signed under
    pub fn info(&self) -> &Info<C> {
        &self.context.info
    }

    /// Sends the blinded challenge to the signer
    pub fn create_message_2(self) -> (RequesterMsg2Created<C>, Message2<C>) {
        trace!(curve = C::NAME, "requester created message 2");

        let message = Message2 { e: self.e };
        let RequesterMsg1Processed {
            context,
            secrets,
            e,
        } = self;

        (
            RequesterMsg2Created {
                context,
                secrets,
                e,
            },
            message,
        )
    }
}

/// A requester session waiting for message 3
pub struct RequesterMsg2Created<C: CurveDomain> {
    context: RequesterContext<C>,
    secrets: RequesterSecrets<C>,
    e: C::Scalar,
}

impl<C: CurveDomain> RequesterMsg2Created<C> {
    /// Returns the info this session is signed under
    pub fn info(&self) -> &Info<C> {
        &self.context.info
    }

    /// Unblinds the signer responses into a signature and checks it
    /// before handing it out.
    ///
    /// If the signature does not verify, the session is handed back
    /// with `Error::InvalidSignature`. The blinding factors are wiped
    /// once a signature is returned.
    pub fn process_message_3(
        self,
        message: &Message3<C>,
    ) -> Result<Signature<C>, Rejected<Self>> {
        let secrets = &self.secrets;
        let d = self.e - message.c;

        let signature = Signature {
            p: message.r + secrets.t1,
            w: message.c + secrets.t2,
            o: message.s + secrets.t3,
            g: d + secrets.t4,
        };

        if !check(
            &self.context.public_key,
            &signature,
            &self.context.info,
            &self.context.message,
        ) {
            warn!(curve = C::NAME, "requester rejected an invalid signature");
            return Err(Rejected {
                session: self,
                error: Error::InvalidSignature,
            });
        }

        trace!(curve = C::NAME, "requester processed message 3");

        Ok(signature)
    }
}

macro_rules! impl_redacted_debug {
    ($($state:ident),*) => {
        $(
            impl<C: CurveDomain> Debug for $state<C> {
                fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
                    f.debug_struct(stringify!($state))
                        .field("public_key", &self.context.public_key)
                        .field("info", &self.context.info)
                        .finish_non_exhaustive()
                }
            }
        )*
    };
}

impl_redacted_debug!(
    RequesterFresh,
    RequesterMsg1Processed,
    RequesterMsg2Created
);

/// Position of a `RequesterSession` in the protocol
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RequesterState {
    /// Waiting for message 1
    Fresh,
    /// Message 1 was processed, message 2 not produced yet
    Msg1Processed,
    /// Message 2 was sent, waiting for message 3
    Msg2Created,
    /// A valid signature was obtained, the session is over
    Msg3Processed,
}

enum RequesterStage<C: CurveDomain> {
    Fresh(RequesterFresh<C>),
    Msg1Processed(RequesterMsg1Processed<C>),
    Msg2Created(RequesterMsg2Created<C>),
    Msg3Processed(Signature<C>),
    /// Placeholder while a transition owns the previous stage
    Transitioning,
}

/// A requester session checking the order of its operations at runtime.
///
/// Operations called out of order fail with
/// `Error::InvalidRequesterState`. No failing operation changes the
/// state of the session.
pub struct RequesterSession<C: CurveDomain> {
    stage: RequesterStage<C>,
}

impl<C: CurveDomain> RequesterSession<C> {
    /// Opens a session. See `RequesterFresh::new`.
    pub fn new(
        public_key: &PublicKey<C>,
        info: Info<C>,
        message: &[u8],
        rng: impl CryptoRng + RngCore,
    ) -> Result<Self, Error> {
        RequesterFresh::new(public_key, info, message, rng).map(Self::from)
    }

    /// Returns the current state of this session
    pub fn state(&self) -> RequesterState {
        match self.stage {
            RequesterStage::Fresh(_) => RequesterState::Fresh,
            RequesterStage::Msg1Processed(_) => RequesterState::Msg1Processed,
            RequesterStage::Msg2Created(_) => RequesterState::Msg2Created,
            RequesterStage::Msg3Processed(_) => RequesterState::Msg3Processed,
            RequesterStage::Transitioning => {
                unreachable!("Requester session observed during a transition.")
            }
        }
    }

    /// Processes message 1. Requires `RequesterState::Fresh`.
    pub fn process_message_1(&mut self, message: &Message1<C>) -> Result<(), Error> {
        let (stage, result) = match self.take_stage() {
            RequesterStage::Fresh(requester) => match requester.process_message_1(message) {
                Ok(requester) => (RequesterStage::Msg1Processed(requester), Ok(())),
                Err(Rejected { session, error }) => (RequesterStage::Fresh(session), Err(error)),
            },
            stage => (stage, Err(Self::out_of_sequence("process_message_1"))),
        };
        self.stage = stage;

        result
    }

    /// Produces message 2. Requires `RequesterState::Msg1Processed`.
    pub fn create_message_2(&mut self) -> Result<Message2<C>, Error> {
        let (stage, result) = match self.take_stage() {
            RequesterStage::Msg1Processed(requester) => {
                let (requester, message) = requester.create_message_2();
                (RequesterStage::Msg2Created(requester), Ok(message))
            }
            stage => (stage, Err(Self::out_of_sequence("create_message_2"))),
        };
        self.stage = stage;

        result
    }

    /// Processes message 3 and keeps the resulting signature.
    /// Requires `RequesterState::Msg2Created`.
    pub fn process_message_3(&mut self, message: &Message3<C>) -> Result<(), Error> {
        let (stage, result) = match self.take_stage() {
            RequesterStage::Msg2Created(requester) => match requester.process_message_3(message) {
                Ok(signature) => (RequesterStage::Msg3Processed(signature), Ok(())),
                Err(Rejected { session, error }) => {
                    (RequesterStage::Msg2Created(session), Err(error))
                }
            },
            stage => (stage, Err(Self::out_of_sequence("process_message_3"))),
        };
        self.stage = stage;

        result
    }

    /// Returns the signature. Requires `RequesterState::Msg3Processed`.
    pub fn signature(&self) -> Result<Signature<C>, Error> {
        match &self.stage {
            RequesterStage::Msg3Processed(signature) => Ok(*signature),
            _ => Err(Self::out_of_sequence("signature")),
        }
    }

    fn take_stage(&mut self) -> RequesterStage<C> {
        core::mem::replace(&mut self.stage, RequesterStage::Transitioning)
    }

    fn out_of_sequence(operation: &'static str) -> Error {
        debug!(
            curve = C::NAME,
            operation, "requester operation called out of sequence"
        );

        Error::InvalidRequesterState
    }
}

impl<C: CurveDomain> From<RequesterFresh<C>> for RequesterSession<C> {
    fn from(requester: RequesterFresh<C>) -> Self {
        RequesterSession {
            stage: RequesterStage::Fresh(requester),
        }
    }
}

impl<C: CurveDomain> Debug for RequesterSession<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RequesterSession")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{NistP224, NistP256};
    use crate::{KeyPair, SignerFresh};
    use elliptic_curve::CurveArithmetic;
    use rand_chacha::ChaCha20Rng;
    use rand_core::{OsRng, SeedableRng};

    fn run<C: CurveDomain>(info: &[u8], message: &[u8]) -> (KeyPair<C>, Info<C>, Signature<C>) {
        let key_pair = KeyPair::<C>::new(OsRng).unwrap();
        let info = Info::new(info);

        let signer = SignerFresh::new(&key_pair.secret_key, info, OsRng).unwrap();
        let requester = RequesterFresh::new(&key_pair.public_key, info, message, OsRng).unwrap();

        let (signer, message_1) = signer.create_message_1();
        let requester = requester.process_message_1(&message_1).unwrap();
        let (requester, message_2) = requester.create_message_2();
        let message_3 = signer.process_message_2(&message_2).create_message_3();
        let signature = requester.process_message_3(&message_3).unwrap();

        (key_pair, info, signature)
    }

    #[test]
    fn test_interaction() {
        let (key_pair, info, signature) = run::<NistP256>(b"context for signature", b"sign me");
        assert!(key_pair.check(&signature, &info, b"sign me"));
        assert!(!key_pair.check(&signature, &info, b"sign me!"));

        let (key_pair, info, signature) = run::<NistP224>(b"", b"");
        assert!(key_pair.public_key.check(&signature, &info, b""));
    }

    #[test]
    fn test_off_curve_commitment() {
        let key_pair = KeyPair::<NistP256>::new(OsRng).unwrap();
        let info = Info::new(b"context for signature");

        let signer = SignerFresh::new(&key_pair.secret_key, info, OsRng).unwrap();
        let requester =
            RequesterFresh::new(&key_pair.public_key, info, b"sign me", OsRng).unwrap();
        let (_, message_1) = signer.create_message_1();

        let mut bad_a = message_1.clone();
        bad_a.ay[31] ^= 0x01;
        let requester = match requester.process_message_1(&bad_a) {
            Err(Rejected { session, error }) => {
                assert_eq!(error, Error::PointNotOnCurve);
                session
            }
            Ok(_) => panic!("off-curve A was accepted"),
        };

        let mut bad_b = message_1.clone();
        bad_b.bx[0] ^= 0x80;
        let requester = match requester.process_message_1(&bad_b) {
            Err(rejected) => {
                assert_eq!(rejected.error, Error::PointNotOnCurve);
                rejected.session
            }
            Ok(_) => panic!("off-curve B was accepted"),
        };

        // The identity has no affine coordinates on these curves
        let zero = Message1::<NistP256>::from_bytes(&[0u8; 128]).unwrap();
        let requester = requester.process_message_1(&zero).unwrap_err().session;

        // The untouched session still accepts the genuine message
        assert!(requester.process_message_1(&message_1).is_ok());
    }

    #[test]
    fn test_faulty_signer() {
        let key_pair = KeyPair::<NistP256>::new(OsRng).unwrap();
        let info = Info::new(b"context for signature");

        let signer = SignerFresh::new(&key_pair.secret_key, info, OsRng).unwrap();
        let requester =
            RequesterFresh::new(&key_pair.public_key, info, b"sign me", OsRng).unwrap();

        let (signer, message_1) = signer.create_message_1();
        let (requester, message_2) = requester
            .process_message_1(&message_1)
            .unwrap()
            .create_message_2();
        let message_3 = signer.process_message_2(&message_2).create_message_3();

        let mut wrong = message_3;
        wrong.r += <NistP256 as CurveArithmetic>::Scalar::ONE;
        let requester = match requester.process_message_3(&wrong) {
            Err(Rejected { session, error }) => {
                assert_eq!(error, Error::InvalidSignature);
                session
            }
            Ok(_) => panic!("forged response was accepted"),
        };

        let signature = requester.process_message_3(&message_3).unwrap();
        assert!(key_pair.check(&signature, &info, b"sign me"));
    }

    #[test]
    fn test_blinding() {
        let key_pair = KeyPair::<NistP256>::new(OsRng).unwrap();
        let info = Info::new(b"context for signature");
        let signer = SignerFresh::new(&key_pair.secret_key, info, OsRng).unwrap();
        let (_, message_1) = signer.create_message_1();

        let first = RequesterFresh::new(&key_pair.public_key, info, b"sign me", OsRng).unwrap();
        let second = RequesterFresh::new(&key_pair.public_key, info, b"sign me", OsRng).unwrap();
        let (_, first) = first.process_message_1(&message_1).unwrap().create_message_2();
        let (_, second) = second
            .process_message_1(&message_1)
            .unwrap()
            .create_message_2();
        assert_ne!(first, second);

        // Identical blinding factors give identical challenges
        let seeded = || ChaCha20Rng::seed_from_u64(5);
        let first = RequesterFresh::new(&key_pair.public_key, info, b"sign me", seeded()).unwrap();
        let second = RequesterFresh::new(&key_pair.public_key, info, b"sign me", seeded()).unwrap();
        let (_, first) = first.process_message_1(&message_1).unwrap().create_message_2();
        let (_, second) = second
            .process_message_1(&message_1)
            .unwrap()
            .create_message_2();
        assert_eq!(first, second);
    }

    #[test]
    fn test_session_order() {
        let key_pair = KeyPair::<NistP256>::new(OsRng).unwrap();
        let info = Info::new(b"context for signature");
        let mut signer = crate::SignerSession::new(&key_pair.secret_key, info, OsRng).unwrap();
        let mut requester =
            RequesterSession::new(&key_pair.public_key, info, b"sign me", OsRng).unwrap();

        let message_3 = Message3::<NistP256> {
            r: <NistP256 as CurveArithmetic>::Scalar::ONE,
            c: <NistP256 as CurveArithmetic>::Scalar::ONE,
            s: <NistP256 as CurveArithmetic>::Scalar::ONE,
        };

        assert_eq!(requester.state(), RequesterState::Fresh);
        assert_eq!(requester.create_message_2(), Err(Error::InvalidRequesterState));
        assert_eq!(
            requester.process_message_3(&message_3),
            Err(Error::InvalidRequesterState)
        );
        assert_eq!(requester.signature(), Err(Error::InvalidRequesterState));
        assert_eq!(requester.state(), RequesterState::Fresh);

        let message_1 = signer.create_message_1().unwrap();
        requester.process_message_1(&message_1).unwrap();
        assert_eq!(requester.state(), RequesterState::Msg1Processed);
        assert_eq!(
            requester.process_message_1(&message_1),
            Err(Error::InvalidRequesterState)
        );
        assert_eq!(requester.signature(), Err(Error::InvalidRequesterState));

        let message_2 = requester.create_message_2().unwrap();
        assert_eq!(requester.state(), RequesterState::Msg2Created);
        assert_eq!(requester.create_message_2(), Err(Error::InvalidRequesterState));

        // A bogus response is refused and the session stays put
        assert_eq!(
            requester.process_message_3(&message_3),
            Err(Error::InvalidSignature)
        );
        assert_eq!(requester.state(), RequesterState::Msg2Created);

        signer.process_message_2(&message_2).unwrap();
        let message_3 = signer.create_message_3().unwrap();
        requester.process_message_3(&message_3).unwrap();
        assert_eq!(requester.state(), RequesterState::Msg3Processed);
        assert_eq!(
            requester.process_message_3(&message_3),
            Err(Error::InvalidRequesterState)
        );
        assert_eq!(
            requester.process_message_1(&message_1),
            Err(Error::InvalidRequesterState)
        );

        let signature = requester.signature().unwrap();
        assert!(key_pair.check(&signature, &info, b"sign me"));
        assert_eq!(
            format!("{:?}", requester),
            "RequesterSession { state: Msg3Processed, .. }"
        );
    }
}
