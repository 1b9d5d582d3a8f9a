// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/bury

//! Encoding options and the channel selection record.

use crate::codec::error::{BuryError, Result};

/// Which RGB channels carry payload bits.
///
/// At least one channel must be enabled. The enabled set is recorded in the
/// LSBs of the offset pixel so the decoder can recover it before reading
/// anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channels {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
}

impl Channels {
    /// All three channels enabled (the default, one payload byte per ~3 pixels).
    pub const ALL: Channels = Channels { red: true, green: true, blue: true };

    /// Number of payload bits each walked pixel carries (1–3).
    pub fn bits_per_pixel(&self) -> u32 {
        u32::from(self.red) + u32::from(self.green) + u32::from(self.blue)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bits_per_pixel() == 0 {
            return Err(BuryError::NoChannels);
        }
        Ok(())
    }
}

impl Default for Channels {
    fn default() -> Self {
        Self::ALL
    }
}

/// The recognized option set for a burial operation.
///
/// Decode needs none of these: the channel set travels in the offset pixel
/// and the compression/filename flags travel in the header. Decode always
/// hands any stored filename back; whether to honor it when persisting the
/// message is decided where the file I/O happens.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Channels that carry payload bits.
    pub channels: Channels,
    /// BZip2-compress the plaintext before encryption.
    pub compress: bool,
    /// Shrink the carrier to the smallest size that still fits the payload.
    pub rescale_carrier: bool,
    /// Prepend a 32-byte filename field to the plaintext. `Some` both
    /// enables the field and supplies the name.
    pub filename: Option<String>,
    /// Debug mode: paint walked pixels solid red (payload) or green (filler)
    /// instead of modulating LSBs.
    pub visible_result: bool,
}
