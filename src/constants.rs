// Copyright (c) 2021-2022 Toposware, Inc.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This module defines all constants used in this crate.

/// Domain separation label for deriving curve points
pub const POINT_HASHING_LABEL: &[u8] = b"POINT-HASHING";

/// Domain separation label for deriving scalars
pub const SCALAR_HASHING_LABEL: &[u8] = b"SCALAR-HASHING";

/// SEC1 tag of an uncompressed point encoding
pub(crate) const UNCOMPRESSED_POINT_TAG: u8 = 0x04;

/// Output length of the underlying SHA-512 based expansion, in bytes
pub(crate) const EXPANSION_BLOCK_LENGTH: usize = 64;

/// Maximum number of blocks an HKDF expansion may produce
pub(crate) const EXPANSION_MAX_BLOCKS: u8 = 255;
