// Copyright (c) 2021-2022 Toposware, Inc.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This module provides the deterministic derivation of curve points
//! and scalars from arbitrary bytes, on top of an HKDF-SHA512 expansion
//! stream, and the uniform sampling of scalars from a random source.
//!
//! Both derivations must give the same output as any other
//! implementation fed the same bytes: the stream is read sequentially,
//! candidates are drawn by rejection over the bit length of the bound,
//! and square roots follow a fixed algorithm per modulus class.

use super::constants::{
    EXPANSION_BLOCK_LENGTH, EXPANSION_MAX_BLOCKS, POINT_HASHING_LABEL, SCALAR_HASHING_LABEL,
};
use super::curve::{self, CurveDomain};
use super::error::Error;

use elliptic_curve::FieldBytes;
use hmac::{Hmac, Mac};
use num_bigint::BigUint;
use rand_core::{CryptoRng, RngCore};
use sha2::Sha512;
use zeroize::Zeroize;

type HmacSha512 = Hmac<Sha512>;

/// The expansion stream was read past the 255 blocks HKDF allows.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct StreamExhausted;

/// Sequential reader over the HKDF-SHA512 expansion of an input,
/// with the curve name as salt and a domain label as info.
pub(crate) struct ExpansionStream {
    prk: HmacSha512,
    info: &'static [u8],
    block: [u8; EXPANSION_BLOCK_LENGTH],
    position: usize,
    counter: u8,
}

impl ExpansionStream {
    pub(crate) fn new(ikm: &[u8], salt: &[u8], info: &'static [u8]) -> Self {
        let mut extract =
            HmacSha512::new_from_slice(salt).expect("HMAC can take a key of any size.");
        extract.update(ikm);
        let prk = extract.finalize().into_bytes();

        ExpansionStream {
            prk: HmacSha512::new_from_slice(&prk).expect("HMAC can take a key of any size."),
            info,
            block: [0u8; EXPANSION_BLOCK_LENGTH],
            position: EXPANSION_BLOCK_LENGTH,
            counter: 0,
        }
    }

    /// T(i) = HMAC(PRK, T(i-1) || info || i)
    fn next_block(&mut self) -> Result<(), StreamExhausted> {
        if self.counter == EXPANSION_MAX_BLOCKS {
            return Err(StreamExhausted);
        }

        let mut mac = self.prk.clone();
        if self.counter > 0 {
            mac.update(&self.block);
        }
        mac.update(self.info);
        self.counter += 1;
        mac.update(&[self.counter]);

        self.block.copy_from_slice(&mac.finalize().into_bytes());
        self.position = 0;

        Ok(())
    }

    /// Fills `dest` with the next bytes of the stream.
    pub(crate) fn fill(&mut self, dest: &mut [u8]) -> Result<(), StreamExhausted> {
        let mut written = 0;
        while written < dest.len() {
            if self.position == EXPANSION_BLOCK_LENGTH {
                self.next_block()?;
            }

            let count = core::cmp::min(
                dest.len() - written,
                EXPANSION_BLOCK_LENGTH - self.position,
            );
            dest[written..written + count]
                .copy_from_slice(&self.block[self.position..self.position + count]);
            written += count;
            self.position += count;
        }

        Ok(())
    }
}

/// Bit length of `bound - 1`, for a big-endian `bound`.
fn predecessor_bit_length(bound: &[u8]) -> usize {
    let bits = match bound.iter().position(|&byte| byte != 0) {
        Some(i) => (bound.len() - i) * 8 - bound[i].leading_zeros() as usize,
        None => return 0,
    };

    let is_power_of_two = bound.iter().map(|byte| byte.count_ones()).sum::<u32>() == 1;
    if is_power_of_two {
        bits - 1
    } else {
        bits
    }
}

/// Writes into `out` a big-endian integer drawn uniformly below the
/// big-endian `bound` of the same length.
///
/// Each candidate takes exactly as many bytes from `fill` as needed to
/// hold `bound - 1`, with the excess top bits cleared, and is rejected
/// if not below `bound`.
pub(crate) fn sample_below<E>(
    bound: &[u8],
    out: &mut [u8],
    mut fill: impl FnMut(&mut [u8]) -> Result<(), E>,
) -> Result<(), E> {
    debug_assert_eq!(bound.len(), out.len());

    let bits = predecessor_bit_length(bound);
    let length = (bits + 7) / 8;
    let offset = out.len() - length;
    out.fill(0);
    if length == 0 {
        return Ok(());
    }

    let mask = match bits % 8 {
        0 => 0xff,
        excess => (1u8 << excess) - 1,
    };

    loop {
        fill(&mut out[offset..])?;
        out[offset] &= mask;
        if &*out < bound {
            return Ok(());
        }
    }
}

/// Right-hand side of `y² = x³ − 3x + B mod P`, for `x < P`.
pub(crate) fn curve_equation(x: &BigUint, b: &BigUint, p: &BigUint) -> BigUint {
    (x * x % p * x + b + p * 3u32 - x * 3u32) % p
}

/// Square root of `a` modulo the odd prime `p`, or `None` if `a` is
/// not a quadratic residue.
///
/// For `p = 3 mod 4` the root is `a^((p+1)/4)`; otherwise it is the
/// Tonelli-Shanks root built from the smallest non-residue.
pub(crate) fn modular_sqrt(a: &BigUint, p: &BigUint) -> Option<BigUint> {
    let a = a % p;
    if a.bits() == 0 {
        return Some(a);
    }

    let one = BigUint::from(1u32);
    let p_minus_one = p - &one;

    // Euler's criterion
    if a.modpow(&(&p_minus_one >> 1u32), p) != one {
        return None;
    }

    if p % 4u32 == BigUint::from(3u32) {
        return Some(a.modpow(&((p + &one) >> 2u32), p));
    }

    Some(tonelli_shanks(&a, p))
}

fn tonelli_shanks(a: &BigUint, p: &BigUint) -> BigUint {
    let one = BigUint::from(1u32);
    let p_minus_one = p - &one;

    // p - 1 = s * 2^e with s odd
    let e = p_minus_one.trailing_zeros().unwrap_or(0);
    let s = &p_minus_one >> e;

    let half_order = &p_minus_one >> 1u32;
    let mut n = BigUint::from(2u32);
    while n.modpow(&half_order, p) != p_minus_one {
        n += 1u32;
    }

    let mut y = a.modpow(&((&s + &one) >> 1u32), p);
    let mut b = a.modpow(&s, p);
    let mut g = n.modpow(&s, p);
    let mut r = e;

    loop {
        // least m such that b^(2^m) = 1
        let mut m = 0u64;
        let mut t = b.clone();
        while t != one {
            t = &t * &t % p;
            m += 1;
        }
        if m == 0 {
            return y;
        }

        let t = g.modpow(&(&one << (r - m - 1)), p);
        g = &t * &t % p;
        y = y * &t % p;
        b = b * &g % p;
        r = m;
    }
}

/// Deterministically derives a point of the curve from `value`.
///
/// Candidates for `x` are drawn from the expansion stream until
/// `x³ − 3x + B` is a square. This is not constant time and must only
/// be fed public data.
///
/// # Panics
///
/// Panics if the derived point fails the final curve membership check
/// or if the expansion stream runs dry, both of which denote a bug in
/// this derivation rather than a bad input.
pub fn hash_to_point<C: CurveDomain>(value: &[u8]) -> C::AffinePoint {
    let p = curve::field_modulus::<C>();
    let b = curve::curve_b::<C>();
    let bound = curve::to_field_bytes::<C>(&p);

    let mut stream = ExpansionStream::new(value, C::NAME.as_bytes(), POINT_HASHING_LABEL);
    let mut x_bytes = FieldBytes::<C>::default();

    loop {
        if sample_below(bound.as_slice(), x_bytes.as_mut_slice(), |chunk| {
            stream.fill(chunk)
        })
        .is_err()
        {
            panic!("Point hashing exhausted its expansion stream, implementation error.");
        }

        let x = BigUint::from_bytes_be(&x_bytes);
        let y = match modular_sqrt(&curve_equation(&x, &b, &p), &p) {
            Some(y) => y,
            None => continue,
        };

        let y_bytes = curve::to_field_bytes::<C>(&y);
        match C::from_coordinates(&x_bytes, &y_bytes) {
            Some(point) => return point,
            None => panic!("Point not on curve, implementation error."),
        }
    }
}

/// Deterministically derives a scalar, uniform in `[0, N)`, from `value`.
///
/// # Panics
///
/// Panics if the expansion stream runs dry, which cannot happen for the
/// supported group orders short of a bug in this derivation.
pub fn hash_to_scalar<C: CurveDomain>(value: &[u8]) -> C::Scalar {
    let bound = curve::to_field_bytes::<C>(&curve::group_order::<C>());

    let mut stream = ExpansionStream::new(value, C::NAME.as_bytes(), SCALAR_HASHING_LABEL);
    let mut bytes = FieldBytes::<C>::default();

    if sample_below(bound.as_slice(), bytes.as_mut_slice(), |chunk| {
        stream.fill(chunk)
    })
    .is_err()
    {
        panic!("Scalar hashing exhausted its expansion stream, implementation error.");
    }

    curve::reduce_scalar::<C>(&bytes)
}

/// Samples a scalar uniformly in `[0, N)` from a secure random source.
pub(crate) fn random_scalar<C: CurveDomain>(
    mut rng: impl CryptoRng + RngCore,
) -> Result<C::Scalar, Error> {
    let bound = curve::to_field_bytes::<C>(&curve::group_order::<C>());
    let mut bytes = FieldBytes::<C>::default();

    let sampled = sample_below(bound.as_slice(), bytes.as_mut_slice(), |chunk| {
        rng.try_fill_bytes(chunk).map_err(|_| Error::RandomSource)
    });
    let scalar = sampled.map(|()| curve::reduce_scalar::<C>(&bytes));
    bytes.as_mut_slice().zeroize();

    scalar
}
