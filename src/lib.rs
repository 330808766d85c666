// Copyright (c) 2021-2022 Toposware, Inc.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This crate provides an implementation of Abe-Okamoto partially
//! blind signatures over the NIST prime-order curves.
//!
//! A requester obtains a signature on a message the signer never
//! sees, while both parties bind a shared public `Info` into it.

//! # Usage
//!
//! To generate a new random key pair, consisting of a secret scalar
//! and an associated curve point, pick a curve and do as the following:
//!
//! ```rust
//! use pblind::{KeyPair, NistP256};
//! use rand_core::OsRng;
//!
//! let mut rng = OsRng;
//! let key_pair = KeyPair::<NistP256>::new(&mut rng).unwrap();
//! ```
//!
//! Both parties first agree on some public context, compressed into an
//! `Info` point. The signer then opens a session with its secret key,
//! and the requester with the signer's public key and the message to
//! get signed. Three messages are exchanged, after which the requester
//! holds a signature it has already checked:
//!
//! ```rust
//! use pblind::{compress_info, KeyPair, NistP256, RequesterFresh, SignerFresh};
//! use rand_core::OsRng;
//!
//! let mut rng = OsRng;
//! let key_pair = KeyPair::<NistP256>::new(&mut rng).unwrap();
//! let info = compress_info::<NistP256>(b"context for signature");
//! let message = b"sign me";
//!
//! let signer = SignerFresh::new(&key_pair.secret_key, info, &mut rng).unwrap();
//! let requester = RequesterFresh::new(&key_pair.public_key, info, message, &mut rng).unwrap();
//!
//! let (signer, message_1) = signer.create_message_1();
//! let requester = requester.process_message_1(&message_1).unwrap();
//! let (requester, message_2) = requester.create_message_2();
//! let message_3 = signer.process_message_2(&message_2).create_message_3();
//! let signature = requester.process_message_3(&message_3).unwrap();
//!
//! assert!(key_pair.public_key.check(&signature, &info, message));
//! ```
//!
//! Every transition consumes the session, so calling an operation in
//! the wrong state does not compile. Callers that need to keep sessions
//! around in a single type can use `SignerSession` and
//! `RequesterSession` instead, which check the order at runtime:
//!
//! ```rust
//! use pblind::{Error, Info, KeyPair, NistP384, RequesterSession, RequesterState, SignerSession};
//! use rand_core::OsRng;
//!
//! let mut rng = OsRng;
//! let key_pair = KeyPair::<NistP384>::new(&mut rng).unwrap();
//! let info = Info::new(b"");
//!
//! let mut signer = SignerSession::new(&key_pair.secret_key, info, &mut rng).unwrap();
//! let mut requester = RequesterSession::new(&key_pair.public_key, info, b"", &mut rng).unwrap();
//!
//! assert_eq!(requester.signature(), Err(Error::InvalidRequesterState));
//!
//! requester.process_message_1(&signer.create_message_1().unwrap()).unwrap();
//! signer.process_message_2(&requester.create_message_2().unwrap()).unwrap();
//! requester.process_message_3(&signer.create_message_3().unwrap()).unwrap();
//!
//! assert_eq!(requester.state(), RequesterState::Msg3Processed);
//! let signature = requester.signature().unwrap();
//! ```
//!
//! To verify a signature against a given `message` and `info`, with a
//! provided public key `pkey`, you can call the `verify` method from
//! the signature, the `verify_signature` method of the public key, or
//! the `check` predicate:
//!
//! ```rust
//! # use pblind::{Info, KeyPair, NistP224, RequesterFresh, SignerFresh};
//! # use rand_core::OsRng;
//! # let mut rng = OsRng;
//! # let key_pair = KeyPair::<NistP224>::new(&mut rng).unwrap();
//! # let info = Info::new(b"context for signature");
//! # let message = b"sign me";
//! # let signer = SignerFresh::new(&key_pair.secret_key, info, &mut rng).unwrap();
//! # let requester = RequesterFresh::new(&key_pair.public_key, info, message, &mut rng).unwrap();
//! # let (signer, message_1) = signer.create_message_1();
//! # let (requester, message_2) = requester.process_message_1(&message_1).unwrap().create_message_2();
//! # let message_3 = signer.process_message_2(&message_2).create_message_3();
//! # let signature = requester.process_message_3(&message_3).unwrap();
//! let pkey = key_pair.public_key;
//!
//! assert!(signature.verify(message, &info, &pkey).is_ok());
//! assert!(pkey.verify_signature(&signature, &info, message).is_ok());
//! assert!(pblind::check(&pkey, &signature, &info, message));
//! assert!(!pblind::check(&pkey, &signature, &info, b"another message"));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_debug_implementations)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![no_std]

extern crate alloc;

#[cfg(any(feature = "std", test))]
#[macro_use]
extern crate std;

mod constants;
mod error;

/// The curve domain module.
mod curve;

/// The hash derivation module.
mod derivation;

/// The secret key module.
mod private;

/// The public key module.
mod public;

/// The key pair module.
mod keypair;

/// The shared info module.
mod info;

/// The protocol messages module.
mod messages;

/// The signature and verification module.
mod signature;

/// The signer session module.
mod signer;

/// The requester session module.
mod requester;

#[cfg(feature = "serialize")]
mod encoding;

pub use constants::{POINT_HASHING_LABEL, SCALAR_HASHING_LABEL};
pub use curve::{encode_point, CurveDomain, NistP224, NistP256, NistP384, NistP521};
pub use derivation::{hash_to_point, hash_to_scalar};
pub use error::{Error, Rejected};

pub use private::SecretKey;
pub use public::PublicKey;

pub use keypair::KeyPair;

pub use info::{compress_info, Info};

pub use messages::{Message1, Message2, Message3};

pub use signature::{check, Signature};

pub use requester::{
    RequesterFresh, RequesterMsg1Processed, RequesterMsg2Created, RequesterSession,
    RequesterState,
};
pub use signer::{SignerFresh, SignerMsg1Created, SignerMsg2Processed, SignerSession, SignerState};
