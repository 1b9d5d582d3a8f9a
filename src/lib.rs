// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/bury

//! # bury-core
//!
//! Password-keyed LSB steganography for RGB rasters. A message is
//! encrypted, optionally compressed, framed, and buried in the
//! least-significant bits of the carrier's color channels, not in a
//! contiguous block, but along an arrhythmic pseudo-random walk whose
//! start, step bounds, and PRNG seed all derive from the password. The
//! output image is visually indistinguishable from the original.
//!
//! Carrier file I/O stays outside this crate: callers decode the image to
//! an [`image::RgbImage`], wrap it in a [`Raster`], and serialize the
//! result losslessly (PNG; a lossy format destroys the buried bits).
//!
//! # Quick start
//!
//! ```rust,ignore
//! use bury_core::{bury_encode, bury_decode, Options, Raster};
//!
//! let carrier = Raster::new(image::open("photo.png")?.to_rgb8())?;
//! let stego = bury_encode(carrier, b"long password", b"the message", Options::default())?;
//! stego.as_image().save("stego.png")?;
//!
//! let decoded = bury_decode(Raster::new(image::open("stego.png")?.to_rgb8())?, b"long password")?;
//! assert_eq!(decoded.message, b"the message");
//! ```

pub mod codec;
pub mod raster;

pub use codec::{
    are_compatible, bury_decode, bury_encode, estimate_capacity, validate_filename, BuryError,
    BuryOp, Channels, Decoded, Options, Result,
};
pub use raster::Raster;
