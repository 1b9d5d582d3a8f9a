// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/bury

//! The arrhythmic pixel walk.
//!
//! Payload bits are scattered along a pseudo-random walk through the raster:
//! starting at the password-derived offset, each step advances by a stride
//! drawn from a seeded MT19937. The deliberately non-constant step defeats
//! trivial periodicity detection on the LSB plane, and without the password
//! an attacker cannot reconstruct which pixels were touched.
//!
//! # Cross-platform portability
//!
//! The walk is part of the wire format: encoder and decoder must produce the
//! identical pixel sequence on every platform and under every dependency
//! version. Draws therefore use a plain modulo reduction over `next_u32`
//! rather than a range adapter whose internals may change between releases.

use rand_mt::Mt19937GenRand32;

use crate::codec::keys::DerivedParams;

/// Seeded stride source drawing steps in `[1, max_stride - 1]`.
pub struct StrideGenerator {
    rng: Mt19937GenRand32,
    bound: u32,
}

impl StrideGenerator {
    /// `max_stride` must be at least 2 (the derivation guarantees `[2, 15]`).
    pub fn new(seed: u32, max_stride: u8) -> Self {
        debug_assert!(max_stride >= 2);
        Self {
            rng: Mt19937GenRand32::new(seed),
            bound: u32::from(max_stride) - 1,
        }
    }

    /// Draw the next stride. Never zero, so the walk always advances.
    pub fn next_stride(&mut self) -> u64 {
        u64::from(self.rng.next_u32() % self.bound) + 1
    }
}

/// Generate the full pixel schedule for a raster of `width × height`.
///
/// Returns the strictly increasing indices `p₁, p₂, …` of the pixels that
/// carry payload bits. The offset pixel `p₀` is not included; it holds the
/// channel spec and is not produced by the PRNG. Every returned index is
/// below `width · height`.
pub fn demarcate(width: u32, height: u32, params: &DerivedParams) -> Vec<u64> {
    demarcate_area(u64::from(width) * u64::from(height), params)
}

fn demarcate_area(pixels: u64, params: &DerivedParams) -> Vec<u64> {
    let mut strides = StrideGenerator::new(params.stride_seed, params.max_stride);
    let mut walk = Vec::new();
    let mut cursor = u64::from(params.offset);
    loop {
        let next = cursor + strides.next_stride();
        if next >= pixels {
            return walk;
        }
        walk.push(next);
        cursor = next;
    }
}

/// Generate walk indices up to and including `limit`.
///
/// Used by the password-compatibility check, which only needs to know which
/// low pixel indices a walk crosses, independent of any carrier size.
pub fn demarcate_until(limit: u64, params: &DerivedParams) -> Vec<u64> {
    let mut strides = StrideGenerator::new(params.stride_seed, params.max_stride);
    let mut walk = Vec::new();
    let mut cursor = u64::from(params.offset);
    loop {
        cursor += strides.next_stride();
        if cursor > limit {
            return walk;
        }
        walk.push(cursor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::keys::derive;

    #[test]
    fn strides_stay_in_bounds() {
        let mut strides = StrideGenerator::new(0xBEEF, 15);
        for _ in 0..10_000 {
            let s = strides.next_stride();
            assert!((1..=14).contains(&s), "stride {s} out of range");
        }
    }

    #[test]
    fn minimal_stride_range_is_constant_one() {
        let mut strides = StrideGenerator::new(42, 2);
        for _ in 0..100 {
            assert_eq!(strides.next_stride(), 1);
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = StrideGenerator::new(12345, 9);
        let mut b = StrideGenerator::new(12345, 9);
        for _ in 0..1000 {
            assert_eq!(a.next_stride(), b.next_stride());
        }
    }

    #[test]
    fn walk_is_strictly_increasing_and_in_range() {
        let params = derive(b"saddroPs").unwrap();
        let walk = demarcate(256, 256, &params);
        assert!(!walk.is_empty());
        let mut prev = u64::from(params.offset);
        for &p in &walk {
            assert!(p > prev);
            assert!(p < 256 * 256);
            prev = p;
        }
    }

    #[test]
    fn walk_depends_only_on_dims_and_params() {
        let params = derive(b"saddroPs").unwrap();
        assert_eq!(demarcate(128, 64, &params), demarcate(128, 64, &params));
    }

    #[test]
    fn tiny_raster_yields_empty_walk() {
        let params = derive(b"saddroPs").unwrap();
        // A 1x1 raster cannot hold any walk pixel past the offset.
        assert!(demarcate(1, 1, &params).is_empty());
    }

    #[test]
    fn bounded_walk_is_a_prefix() {
        let params = derive(b"saddroPs").unwrap();
        let full = demarcate(256, 256, &params);
        let bounded = demarcate_until(full[5], &params);
        assert_eq!(bounded, full[..6].to_vec());
    }
}
