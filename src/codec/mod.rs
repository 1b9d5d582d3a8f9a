// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/bury

//! The steganographic burial codec.
//!
//! One password drives everything: key derivation, the walk's start pixel
//! and stride PRNG seed, and therefore the entire spatial layout. Without
//! the password an attacker cannot even locate the payload bits, let alone
//! decrypt them.
//!
//! Encode data flow: message → (filename field?) → (BZip2?) → AES-128-CBC →
//! header ‖ IV ‖ ciphertext ‖ MD5 → LSB stream along the walk. Decode
//! inverts, recovering the channel set from the offset pixel first.

pub mod bits;
pub mod compat;
pub mod crypto;
pub mod error;
pub mod header;
pub mod keys;
pub mod options;
pub mod pipeline;
pub mod rescale;
pub mod stride;

pub use compat::are_compatible;
pub use crypto::validate_filename;
pub use error::{BuryError, Result};
pub use options::{Channels, Options};
pub use pipeline::{BuryOp, Decoded};

use crate::raster::Raster;

/// Bury a message in the carrier. One-shot convenience over [`BuryOp`].
pub fn bury_encode(
    carrier: Raster,
    password: &[u8],
    message: &[u8],
    options: Options,
) -> Result<Raster> {
    BuryOp::new(carrier, password, options)?.encode(message)
}

/// Unearth the message buried in the carrier under this password.
pub fn bury_decode(carrier: Raster, password: &[u8]) -> Result<Decoded> {
    BuryOp::new(carrier, password, Options::default())?.decode()
}

/// Conservative estimate of the largest plaintext this carrier can hold
/// under this password and channel set.
///
/// Subtracts the fixed framing overhead (header, IV, checksum) plus a full
/// padding block; ignores compression gains and any filename field, so the
/// true fit may be somewhat larger.
pub fn estimate_capacity(carrier: &Raster, password: &[u8], channels: &Channels) -> Result<usize> {
    channels.validate()?;
    let params = keys::derive(password)?;
    let walk = stride::demarcate(carrier.width(), carrier.height(), &params);
    let framed = (walk.len() as u64 * u64::from(channels.bits_per_pixel()) / 8) as usize;
    Ok(framed.saturating_sub(header::HEADER_LEN + crypto::PAYLOAD_OVERHEAD + 16))
}
