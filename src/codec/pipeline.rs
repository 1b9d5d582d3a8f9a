// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/bury

//! The burial operation: encode and decode pipelines.
//!
//! A [`BuryOp`] owns one raster, one set of password-derived parameters, and
//! one walk. Each instance performs exactly one directed operation: both
//! `encode` and `decode` consume `self`, so a spent operation cannot be
//! reused and a fresh IV is guaranteed per burial.

use log::debug;

use crate::codec::bits;
use crate::codec::crypto;
use crate::codec::error::{BuryError, Result};
use crate::codec::header::{self, HEADER_LEN};
use crate::codec::keys::{self, DerivedParams};
use crate::codec::options::Options;
use crate::codec::rescale;
use crate::codec::stride;
use crate::raster::Raster;

/// A decoded message and the filename stored alongside it, if any.
///
/// The filename is the raw trimmed field; callers that intend to write the
/// file out should run it through
/// [`validate_filename`](crate::codec::crypto::validate_filename) first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub message: Vec<u8>,
    pub filename: Option<Vec<u8>>,
}

/// One directed burial operation over one carrier.
#[derive(Debug)]
pub struct BuryOp {
    raster: Raster,
    params: DerivedParams,
    options: Options,
    walk: Vec<u64>,
}

impl BuryOp {
    /// Derive parameters and demarcate the walk over the carrier.
    ///
    /// # Errors
    /// [`BuryError::ShortPassword`] or [`BuryError::NoChannels`].
    pub fn new(raster: Raster, password: &[u8], options: Options) -> Result<Self> {
        options.channels.validate()?;
        let params = keys::derive(password)?;
        let walk = stride::demarcate(raster.width(), raster.height(), &params);
        Ok(Self { raster, params, options, walk })
    }

    /// Maximum framed bytes (header included) this carrier holds under the
    /// current walk and channel set.
    pub fn capacity(&self) -> usize {
        (self.walk.len() as u64 * u64::from(self.options.channels.bits_per_pixel()) / 8) as usize
    }

    /// Bury a message, returning the modified carrier.
    ///
    /// Pipeline: seal (filename → compress → encrypt → checksum), frame,
    /// capacity check, optional rescale, channel spec, modulate.
    pub fn encode(mut self, message: &[u8]) -> Result<Raster> {
        // 1. Seal the message into the wire payload.
        let sealed = crypto::seal(message, &self.options, &self.params)?;

        // 2. Frame: header first, payload after. Modulation never starts
        //    before the full framed length is known, since that length
        //    drives both the capacity check and the rescale.
        let packed =
            header::pack_header(header::VERSION, sealed.msg_params, sealed.payload.len() as u64)?;
        let mut framed = Vec::with_capacity(HEADER_LEN + sealed.payload.len());
        framed.extend_from_slice(&packed);
        framed.extend_from_slice(&sealed.payload);

        // 3. Capacity check against the original carrier.
        let capacity = self.capacity();
        if framed.len() > capacity {
            return Err(BuryError::PayloadTooLarge { needed: framed.len(), capacity });
        }
        debug!("burying {} framed bytes across {} walk pixels", framed.len(), self.walk.len());

        // 4. Optional minimum-fit shrink; the walk regenerates with the
        //    new dimensions.
        if self.options.rescale_carrier {
            if let Some((raster, walk)) =
                rescale::attempt(&self.raster, &self.params, &self.options.channels, framed.len())
            {
                self.raster = raster;
                self.walk = walk;
            }
        }

        // 5. Channel spec at the offset pixel, then the bit stream.
        header::write_channel_spec(&mut self.raster, self.params.offset, &self.options.channels)?;
        bits::modulate(
            &mut self.raster,
            &self.walk,
            &self.options.channels,
            &framed,
            self.options.visible_result,
        )?;

        Ok(self.raster)
    }

    /// Unearth the buried message.
    ///
    /// Pipeline: channel spec, demodulate the full walk, parse header,
    /// slice payload, verify/decrypt/decompress/split.
    pub fn decode(self) -> Result<Decoded> {
        // 1. The channel set travels in the offset pixel, not the header.
        let channels = header::read_channel_spec(&self.raster, self.params.offset)?;

        // 2. Demodulate everything the walk can address.
        let stream = bits::demodulate(&self.raster, &self.walk, &channels)?;

        // 3. Header, then exactly payload_size bytes after it.
        let parsed = header::parse_header(&stream)?;
        let end = HEADER_LEN as u64 + u64::from(parsed.payload_size);
        if end > stream.len() as u64 {
            // The header claims more than this carrier can hold: the image
            // was cropped or recompressed after burial.
            return Err(BuryError::BadChecksum);
        }
        debug!("unearthing {} payload bytes from {} walk pixels", parsed.payload_size, self.walk.len());

        // 4. Verify, decrypt, decompress, split the filename.
        let opened =
            crypto::open(&stream[HEADER_LEN..end as usize], parsed.msg_params, &self.params)?;
        Ok(Decoded { message: opened.message, filename: opened.filename })
    }
}
