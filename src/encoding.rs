// Copyright (c) 2021-2022 Toposware, Inc.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Serde support. Every public type is serialized as a tuple of the
//! bytes of its fixed-length encoding, so that compact formats such as
//! bincode produce exactly `to_bytes()`.

use super::curve::{field_length, CurveDomain};
use super::{Info, Message1, Message2, Message3, PublicKey, Signature};

use alloc::vec::Vec;
use core::fmt::Formatter;
use serde::de::{Error as _, SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

fn serialize_bytes<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    let mut tuple = serializer.serialize_tuple(bytes.len())?;
    for byte in bytes {
        tuple.serialize_element(byte)?;
    }

    tuple.end()
}

struct ByteTupleVisitor {
    length: usize,
}

impl<'de> Visitor<'de> for ByteTupleVisitor {
    type Value = Vec<u8>;

    fn expecting(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "a tuple of {} bytes", self.length)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Vec<u8>, A::Error> {
        let mut bytes = Vec::with_capacity(self.length);
        for i in 0..self.length {
            let byte = seq
                .next_element()?
                .ok_or_else(|| A::Error::invalid_length(i, &self))?;
            bytes.push(byte);
        }

        Ok(bytes)
    }
}

fn deserialize_bytes<'de, D: Deserializer<'de>>(
    length: usize,
    deserializer: D,
) -> Result<Vec<u8>, D::Error> {
    deserializer.deserialize_tuple(length, ByteTupleVisitor { length })
}

macro_rules! impl_serde {
    ($type:ident, $length:expr) => {
        impl<C: CurveDomain> Serialize for $type<C> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serialize_bytes(&self.to_bytes(), serializer)
            }
        }

        impl<'de, C: CurveDomain> Deserialize<'de> for $type<C> {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let bytes = deserialize_bytes($length, deserializer)?;

                Self::from_bytes(&bytes).map_err(D::Error::custom)
            }
        }
    };
}

impl_serde!(PublicKey, 1 + 2 * field_length::<C>());
impl_serde!(Info, 1 + 2 * field_length::<C>());
impl_serde!(Message1, 4 * field_length::<C>());
impl_serde!(Message2, field_length::<C>());
impl_serde!(Message3, 3 * field_length::<C>());
impl_serde!(Signature, 4 * field_length::<C>());
