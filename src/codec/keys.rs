// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/bury

//! Password-derived layout and key parameters.
//!
//! A single password drives everything: where the walk starts (`offset`),
//! how far each step may reach (`max_stride`), the walk's PRNG seed
//! (`stride_seed`), and the cipher key. All four are independent projections
//! of the same SHA-256 digest, so encoder and decoder derive identical
//! parameters from the password alone, with no carrier state involved.
//!
//! The cipher key additionally passes through a variable number of extra
//! SHA-256 rounds (bounded by [`MAX_KEY_ROUNDS`]), a modest work factor
//! against brute-force password search.

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::codec::error::{BuryError, Result};

/// Minimum accepted password length in bytes.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Upper bound (exclusive) on the key-stretching round count.
pub const MAX_KEY_ROUNDS: u32 = 9000;

/// Stride bounds derive from one digest byte into the range `[2, 15]`.
const STRIDE_SPAN: u8 = 14;

/// Everything a burial operation derives from the password.
///
/// Identical passwords yield identical parameters on every platform; raster
/// dimensions never enter the derivation.
pub struct DerivedParams {
    /// Linear pixel index of the channel-spec pixel, start of the walk.
    pub offset: u8,
    /// Exclusive upper bound on stride draws, in `[2, 15]`.
    pub max_stride: u8,
    /// Seed for the walk PRNG. Always below 2³¹.
    pub stride_seed: u32,
    cipher_key: Zeroizing<[u8; 32]>,
}

impl DerivedParams {
    /// The stretched 32-byte key. The cipher uses the first 16 bytes.
    pub fn cipher_key(&self) -> &[u8; 32] {
        &self.cipher_key
    }
}

impl std::fmt::Debug for DerivedParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of Debug output.
        f.debug_struct("DerivedParams")
            .field("offset", &self.offset)
            .field("max_stride", &self.max_stride)
            .field("stride_seed", &self.stride_seed)
            .finish_non_exhaustive()
    }
}

/// Derive all burial parameters from a password.
///
/// # Errors
/// [`BuryError::ShortPassword`] if the password is shorter than 8 bytes.
pub fn derive(password: &[u8]) -> Result<DerivedParams> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(BuryError::ShortPassword);
    }

    let mut h: [u8; 32] = Sha256::digest(password).into();

    let offset = h[0];
    let rounds = u32::from(u16::from_be_bytes([h[1], h[2]])) % MAX_KEY_ROUNDS;
    let max_stride = 2 + (h[3] % STRIDE_SPAN);

    // Fold the remaining digest bytes into four accumulators, one per seed
    // byte. The top accumulator is masked to 7 bits so the seed stays
    // below 2^31.
    let mut t = [0u8; 4];
    for i in 0..6 {
        t[0] ^= h[4 + i];
        t[1] ^= h[11 + i];
        t[2] ^= h[18 + i];
        t[3] ^= h[25 + i];
    }
    let stride_seed = u32::from_be_bytes([t[0] & 0x7F, t[1], t[2], t[3]]);

    for _ in 0..rounds {
        h = Sha256::digest(h).into();
    }

    Ok(DerivedParams {
        offset,
        max_stride,
        stride_seed,
        cipher_key: Zeroizing::new(h),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_password_rejected() {
        assert_eq!(derive(b"seven!!").unwrap_err(), BuryError::ShortPassword);
        assert!(derive(b"eight!!!").is_ok());
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = derive(b"saddroPs").unwrap();
        let b = derive(b"saddroPs").unwrap();
        assert_eq!(a.offset, b.offset);
        assert_eq!(a.max_stride, b.max_stride);
        assert_eq!(a.stride_seed, b.stride_seed);
        assert_eq!(a.cipher_key(), b.cipher_key());
    }

    #[test]
    fn parameters_are_digest_projections() {
        let d: [u8; 32] = Sha256::digest(b"saddroPs").into();
        let p = derive(b"saddroPs").unwrap();
        assert_eq!(p.offset, d[0]);
        assert_eq!(p.max_stride, 2 + (d[3] % 14));
    }

    #[test]
    fn max_stride_stays_in_range() {
        for pw in ["password1", "password2", "correct horse", "hunter22", "aaaaaaaaaa"] {
            let p = derive(pw.as_bytes()).unwrap();
            assert!((2..=15).contains(&p.max_stride), "max_stride {} for {pw}", p.max_stride);
        }
    }

    #[test]
    fn stride_seed_below_2_pow_31() {
        for pw in ["password1", "password2", "another password", "saddroPs"] {
            let p = derive(pw.as_bytes()).unwrap();
            assert!(p.stride_seed < 1 << 31);
        }
    }

    #[test]
    fn different_passwords_differ() {
        let a = derive(b"saddroPs").unwrap();
        let b = derive(b"Saddrops").unwrap();
        assert!(
            a.offset != b.offset
                || a.stride_seed != b.stride_seed
                || a.cipher_key() != b.cipher_key()
        );
    }

    #[test]
    fn stretched_key_differs_from_digest() {
        // Round count is password-dependent but virtually never zero; pick a
        // password whose round count is nonzero and check the stretch ran.
        let d: [u8; 32] = Sha256::digest(b"saddroPs").into();
        let rounds = u32::from(u16::from_be_bytes([d[1], d[2]])) % MAX_KEY_ROUNDS;
        let p = derive(b"saddroPs").unwrap();
        if rounds > 0 {
            assert_ne!(p.cipher_key()[..], d[..]);
        } else {
            assert_eq!(p.cipher_key()[..], d[..]);
        }
    }

    #[test]
    fn debug_omits_key_material() {
        let p = derive(b"saddroPs").unwrap();
        let s = format!("{p:?}");
        assert!(!s.contains("cipher_key"));
    }
}
