// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/bury

//! Error types for the burial codec.
//!
//! [`BuryError`] covers all failure modes from parameter derivation through
//! demodulation and decryption. Every failure is fatal to the current
//! operation; nothing is retried internally.

use std::fmt;

/// Errors that can occur while burying or unearthing a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuryError {
    /// Password is shorter than the 8-byte minimum.
    ShortPassword,
    /// Carrier is not a usable raster (zero area).
    UnsupportedCarrier,
    /// A pixel index fell outside the raster.
    BadGeometry { index: u64, pixels: u64 },
    /// All three color channels are disabled.
    NoChannels,
    /// The framed payload exceeds the carrier's capacity under this walk.
    PayloadTooLarge { needed: usize, capacity: usize },
    /// Payload size does not fit the header's 32-bit length field.
    HeaderOverflow,
    /// Demodulated header carries an unknown format version.
    BadVersion(u16),
    /// Fewer than 9 bytes could be demodulated.
    ShortHeader,
    /// MD5 over the ciphertext does not match the buried checksum
    /// (wrong password, truncated carrier, or lossy recompression).
    BadChecksum,
    /// Block cipher padding check failed.
    DecryptFailure,
    /// BZip2 stream is malformed or overlong.
    DecompressFailure,
    /// Filename field is missing from a plaintext whose flags promise one,
    /// or the strict validation helper rejected the name (not ASCII, empty,
    /// or containing a path separator).
    FilenameInvalid,
}

impl fmt::Display for BuryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortPassword => write!(f, "password must be at least 8 bytes"),
            Self::UnsupportedCarrier => write!(f, "carrier is not a usable raster"),
            Self::BadGeometry { index, pixels } => {
                write!(f, "pixel index {index} out of range (raster has {pixels} pixels)")
            }
            Self::NoChannels => write!(f, "no color channels enabled"),
            Self::PayloadTooLarge { needed, capacity } => {
                write!(f, "payload needs {needed} bytes but carrier holds {capacity}")
            }
            Self::HeaderOverflow => write!(f, "payload size exceeds the 32-bit header field"),
            Self::BadVersion(v) => write!(f, "unsupported format version: {v:#06x}"),
            Self::ShortHeader => write!(f, "carrier too small to hold a header"),
            Self::BadChecksum => write!(f, "ciphertext checksum mismatch (wrong password?)"),
            Self::DecryptFailure => write!(f, "decryption failed"),
            Self::DecompressFailure => write!(f, "decompression failed"),
            Self::FilenameInvalid => write!(f, "buried filename is invalid"),
        }
    }
}

impl std::error::Error for BuryError {}

pub type Result<T> = std::result::Result<T, BuryError>;
