// Copyright (c) 2021-2022 Toposware, Inc.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This module provides the signer side of a signing session.
//!
//! Each state is its own type and every transition consumes it:
//!
//! `SignerFresh` → `SignerMsg1Created` → `SignerMsg2Processed` → `Message3`
//!
//! so an operation can only ever be called in the state it belongs to.
//! `SignerSession` drives the same transitions through `&mut self` for
//! callers that keep sessions in collections, and checks the order at
//! runtime instead.

use super::curve::CurveDomain;
use super::derivation::random_scalar;
use super::error::Error;
use super::{Info, Message1, Message2, Message3, SecretKey};

use core::fmt::{Debug, Formatter};
use elliptic_curve::ff::Field;
use elliptic_curve::group::Group;
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, trace};
use zeroize::Zeroize;

/// Secret material of a signer session, wiped when dropped.
struct SignerSecrets<C: CurveDomain> {
    secret_key: C::Scalar,
    u: C::Scalar,
    s: C::Scalar,
    d: C::Scalar,
}

impl<C: CurveDomain> Drop for SignerSecrets<C> {
    fn drop(&mut self) {
        self.secret_key.zeroize();
        self.u.zeroize();
        self.s.zeroize();
        self.d.zeroize();
    }
}

/// A signer session that has not produced any message yet
pub struct SignerFresh<C: CurveDomain> {
    info: Info<C>,
    secrets: SignerSecrets<C>,
}

impl<C: CurveDomain> SignerFresh<C> {
    /// Opens a session for `info`, sampling the nonces `u`, `s`, `d`
    /// uniformly in `[0, N)`.
    ///
    /// Fails with `Error::RandomSource` if `rng` cannot deliver.
    pub fn new(
        secret_key: &SecretKey<C>,
        info: Info<C>,
        mut rng: impl CryptoRng + RngCore,
    ) -> Result<Self, Error> {
        let mut secrets = SignerSecrets {
            secret_key: secret_key.0,
            u: C::Scalar::ZERO,
            s: C::Scalar::ZERO,
            d: C::Scalar::ZERO,
        };
        secrets.u = random_scalar::<C>(&mut rng)?;
        secrets.s = random_scalar::<C>(&mut rng)?;
        secrets.d = random_scalar::<C>(&mut rng)?;

        trace!(curve = C::NAME, "signer session opened");

        Ok(SignerFresh { info, secrets })
    }

    /// Returns the info this session signs under
    pub fn info(&self) -> &Info<C> {
        &self.info
    }

    /// Commits to the nonces with `A = u·G` and `B = s·G + d·Z`
    pub fn create_message_1(self) -> (SignerMsg1Created<C>, Message1<C>) {
        let generator = C::ProjectivePoint::generator();
        let z = C::ProjectivePoint::from(*self.info.as_affine());

        let a: C::AffinePoint = (generator * self.secrets.u).into();
        let b: C::AffinePoint = (generator * self.secrets.s + z * self.secrets.d).into();

        trace!(curve = C::NAME, "signer created message 1");

        let SignerFresh { info, secrets } = self;
        (
            SignerMsg1Created { info, secrets },
            Message1::from_points(&a, &b),
        )
    }
}

/// A signer session waiting for the blinded challenge
pub struct SignerMsg1Created<C: CurveDomain> {
    info: Info<C>,
    secrets: SignerSecrets<C>,
}

impl<C: CurveDomain> SignerMsg1Created<C> {
    /// Returns the info this session signs under
    pub fn info(&self) -> &Info<C> {
        &self.info
    }

    /// Records the blinded challenge. It is opaque to the signer, so
    /// nothing beyond its encoding can be checked.
    pub fn process_message_2(self, message: &Message2<C>) -> SignerMsg2Processed<C> {
        trace!(curve = C::NAME, "signer processed message 2");

        let SignerMsg1Created { info, secrets } = self;
        SignerMsg2Processed {
            info,
            secrets,
            e: message.e,
        }
    }
}

/// A signer session ready to answer the blinded challenge
pub struct SignerMsg2Processed<C: CurveDomain> {
    info: Info<C>,
    secrets: SignerSecrets<C>,
    e: C::Scalar,
}

impl<C: CurveDomain> SignerMsg2Processed<C> {
    /// Returns the info this session signs under
    pub fn info(&self) -> &Info<C> {
        &self.info
    }

    /// Answers with `c = e − d`, `r = u − c·x` and reveals `s`.
    /// The session secrets are wiped on return.
    pub fn create_message_3(self) -> Message3<C> {
        let c = self.e - self.secrets.d;
        let r = self.secrets.u - c * self.secrets.secret_key;

        trace!(curve = C::NAME, "signer created message 3");

        Message3 {
            r,
            c,
            s: self.secrets.s,
        }
    }
}

macro_rules! impl_redacted_debug {
    ($($state:ident),*) => {
        $(
            impl<C: CurveDomain> Debug for $state<C> {
                fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
                    f.debug_struct(stringify!($state))
                        .field("info", &self.info)
                        .finish_non_exhaustive()
                }
            }
        )*
    };
}

impl_redacted_debug!(SignerFresh, SignerMsg1Created, SignerMsg2Processed);

/// Position of a `SignerSession` in the protocol
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SignerState {
    /// No message produced yet
    Fresh,
    /// Message 1 was sent, waiting for message 2
    Msg1Created,
    /// Message 2 was received, message 3 not produced yet
    Msg2Processed,
    /// Message 3 was sent, the session is over
    Msg3Created,
}

enum SignerStage<C: CurveDomain> {
    Fresh(SignerFresh<C>),
    Msg1Created(SignerMsg1Created<C>),
    Msg2Processed(SignerMsg2Processed<C>),
    Msg3Created,
}

/// A signer session checking the order of its operations at runtime.
///
/// Operations called out of order fail with `Error::InvalidSignerState`
/// and leave the session as it was.
pub struct SignerSession<C: CurveDomain> {
    stage: SignerStage<C>,
}

impl<C: CurveDomain> SignerSession<C> {
    /// Opens a session for `info`. See `SignerFresh::new`.
    pub fn new(
        secret_key: &SecretKey<C>,
        info: Info<C>,
        rng: impl CryptoRng + RngCore,
    ) -> Result<Self, Error> {
        SignerFresh::new(secret_key, info, rng).map(Self::from)
    }

    /// Returns the current state of this session
    pub fn state(&self) -> SignerState {
        match self.stage {
            SignerStage::Fresh(_) => SignerState::Fresh,
            SignerStage::Msg1Created(_) => SignerState::Msg1Created,
            SignerStage::Msg2Processed(_) => SignerState::Msg2Processed,
            SignerStage::Msg3Created => SignerState::Msg3Created,
        }
    }

    /// Produces message 1. Requires `SignerState::Fresh`.
    pub fn create_message_1(&mut self) -> Result<Message1<C>, Error> {
        match core::mem::replace(&mut self.stage, SignerStage::Msg3Created) {
            SignerStage::Fresh(signer) => {
                let (signer, message) = signer.create_message_1();
                self.stage = SignerStage::Msg1Created(signer);
                Ok(message)
            }
            stage => self.refuse(stage, "create_message_1"),
        }
    }

    /// Records message 2. Requires `SignerState::Msg1Created`.
    pub fn process_message_2(&mut self, message: &Message2<C>) -> Result<(), Error> {
        match core::mem::replace(&mut self.stage, SignerStage::Msg3Created) {
            SignerStage::Msg1Created(signer) => {
                self.stage = SignerStage::Msg2Processed(signer.process_message_2(message));
                Ok(())
            }
            stage => self.refuse(stage, "process_message_2"),
        }
    }

    /// Produces message 3. Requires `SignerState::Msg2Processed`.
    pub fn create_message_3(&mut self) -> Result<Message3<C>, Error> {
        match core::mem::replace(&mut self.stage, SignerStage::Msg3Created) {
            SignerStage::Msg2Processed(signer) => Ok(signer.create_message_3()),
            stage => self.refuse(stage, "create_message_3"),
        }
    }

    fn refuse<T>(&mut self, stage: SignerStage<C>, operation: &'static str) -> Result<T, Error> {
        self.stage = stage;
        debug!(
            curve = C::NAME,
            state = ?self.state(),
            operation,
            "signer operation called out of sequence"
        );

        Err(Error::InvalidSignerState)
    }
}

impl<C: CurveDomain> From<SignerFresh<C>> for SignerSession<C> {
    fn from(signer: SignerFresh<C>) -> Self {
        SignerSession {
            stage: SignerStage::Fresh(signer),
        }
    }
}

impl<C: CurveDomain> Debug for SignerSession<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SignerSession")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{NistP256, NistP384};
    use crate::KeyPair;
    use core::num::NonZeroU32;
    use elliptic_curve::CurveArithmetic;
    use rand_chacha::ChaCha20Rng;
    use rand_core::{OsRng, SeedableRng};

    struct FailingRng;

    impl RngCore for FailingRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {}

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand_core::Error> {
            Err(rand_core::Error::from(
                NonZeroU32::new(rand_core::Error::CUSTOM_START).unwrap(),
            ))
        }
    }

    impl CryptoRng for FailingRng {}

    #[test]
    fn test_responses() {
        type Projective = <NistP256 as CurveArithmetic>::ProjectivePoint;
        type Scalar = <NistP256 as CurveArithmetic>::Scalar;

        let key_pair = KeyPair::<NistP256>::new(OsRng).unwrap();
        let info = Info::new(b"context for signature");

        let signer = SignerFresh::new(&key_pair.secret_key, info, OsRng).unwrap();
        let (signer, message_1) = signer.create_message_1();

        let e = Scalar::random(&mut OsRng);
        let signer = signer.process_message_2(&Message2 { e });
        let message_3 = signer.create_message_3();

        // r·G + c·Y recovers the commitment A
        let a: <NistP256 as CurveArithmetic>::AffinePoint = (Projective::generator()
            * message_3.r
            + Projective::from(*key_pair.public_key.as_affine()) * message_3.c)
            .into();
        let (ax, ay) = NistP256::to_coordinates(&a);
        assert_eq!(ax, message_1.ax);
        assert_eq!(ay, message_1.ay);

        // B − s·G is a multiple of the info point: (e − c)·Z
        let b: <NistP256 as CurveArithmetic>::AffinePoint = (Projective::generator()
            * message_3.s
            + Projective::from(*info.as_affine()) * (e - message_3.c))
            .into();
        let (bx, by) = NistP256::to_coordinates(&b);
        assert_eq!(bx, message_1.bx);
        assert_eq!(by, message_1.by);
    }

    #[test]
    fn test_deterministic_nonces() {
        let secret_key = SecretKey::<NistP384>::new(OsRng).unwrap();
        let info = Info::new(b"");

        let (_, first) = SignerFresh::new(&secret_key, info, ChaCha20Rng::seed_from_u64(3))
            .unwrap()
            .create_message_1();
        let (_, second) = SignerFresh::new(&secret_key, info, ChaCha20Rng::seed_from_u64(3))
            .unwrap()
            .create_message_1();
        let (_, third) = SignerFresh::new(&secret_key, info, ChaCha20Rng::seed_from_u64(4))
            .unwrap()
            .create_message_1();

        assert_eq!(first, second);
        assert_ne!(first, third);
    }

    #[test]
    fn test_random_source_failure() {
        let secret_key = SecretKey::<NistP256>::new(OsRng).unwrap();
        let info = Info::new(b"");

        assert_eq!(
            SignerFresh::new(&secret_key, info, FailingRng).unwrap_err(),
            Error::RandomSource
        );
        assert_eq!(
            SignerSession::new(&secret_key, info, FailingRng).unwrap_err(),
            Error::RandomSource
        );
    }

    #[test]
    fn test_session_order() {
        let secret_key = SecretKey::<NistP256>::new(OsRng).unwrap();
        let info = Info::new(b"context for signature");
        let mut session = SignerSession::new(&secret_key, info, OsRng).unwrap();
        let message_2 = Message2 {
            e: <NistP256 as CurveArithmetic>::Scalar::ONE,
        };

        assert_eq!(session.state(), SignerState::Fresh);
        assert_eq!(
            session.process_message_2(&message_2),
            Err(Error::InvalidSignerState)
        );
        assert_eq!(session.create_message_3(), Err(Error::InvalidSignerState));
        assert_eq!(session.state(), SignerState::Fresh);

        let message_1 = session.create_message_1().unwrap();
        assert_eq!(session.state(), SignerState::Msg1Created);
        assert_eq!(session.create_message_1(), Err(Error::InvalidSignerState));
        assert_eq!(session.create_message_3(), Err(Error::InvalidSignerState));
        assert_eq!(session.state(), SignerState::Msg1Created);

        session.process_message_2(&message_2).unwrap();
        assert_eq!(session.state(), SignerState::Msg2Processed);
        assert_eq!(session.create_message_1(), Err(Error::InvalidSignerState));
        assert_eq!(
            session.process_message_2(&message_2),
            Err(Error::InvalidSignerState)
        );
        assert_eq!(session.state(), SignerState::Msg2Processed);

        let message_3 = session.create_message_3().unwrap();
        assert_eq!(session.state(), SignerState::Msg3Created);
        assert_eq!(session.create_message_1(), Err(Error::InvalidSignerState));
        assert_eq!(
            session.process_message_2(&message_2),
            Err(Error::InvalidSignerState)
        );
        assert_eq!(session.create_message_3(), Err(Error::InvalidSignerState));

        // The commitment survived the refused calls
        let a: <NistP256 as CurveArithmetic>::AffinePoint =
            (<NistP256 as CurveArithmetic>::ProjectivePoint::generator() * message_3.r
                + <NistP256 as CurveArithmetic>::ProjectivePoint::from(
                    *secret_key.public_key().as_affine(),
                ) * message_3.c)
                .into();
        assert_eq!(NistP256::to_coordinates(&a).0, message_1.ax);
    }

    #[test]
    fn test_debug_is_redacted() {
        let secret_key = SecretKey::<NistP256>::new(OsRng).unwrap();
        let session = SignerSession::new(&secret_key, Info::new(b""), OsRng).unwrap();
        assert_eq!(
            format!("{:?}", session),
            "SignerSession { state: Fresh, .. }"
        );

        let signer = SignerFresh::new(&secret_key, Info::new(b""), OsRng).unwrap();
        let debug = format!("{:?}", signer);
        assert!(debug.starts_with("SignerFresh { info: "));
        assert!(debug.ends_with(", .. }"));
    }
}
