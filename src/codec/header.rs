// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/bury

//! Header packing and the channel-spec pixel.
//!
//! The header is the first 9 demodulated bytes:
//!
//! ```text
//! [2 bytes] VERSION        little-endian u16, 0x0002
//! [1 byte ] reserved       random on write, ignored on read
//! [1 byte ] MSG_PARAMS     bit0 compressed, bit1 encrypted, bit2 filename;
//!                          remaining bits random on write
//! [1 byte ] reserved       random on write, ignored on read
//! [4 bytes] PAYLOAD_SIZE   big-endian u32, length of IV ‖ ciphertext ‖ MD5
//! ```
//!
//! VERSION travels little-endian while PAYLOAD_SIZE travels big-endian;
//! the asymmetry is fixed for carriers at version 0x0002.
//!
//! The header does not describe the channel set. That travels separately in
//! the three LSBs of the offset pixel (red/green/blue LSB = channel enabled)
//! so the decoder can learn the bit density before demodulating anything.
//! The reserved bytes and the unused MSG_PARAMS bits are randomized so the
//! header contributes no fixed plaintext to the LSB plane beyond the version.

use rand::Rng;

use crate::codec::error::{BuryError, Result};
use crate::codec::options::Channels;
use crate::raster::Raster;

/// Wire format version.
pub const VERSION: u16 = 0x0002;

/// Header length in bytes.
pub const HEADER_LEN: usize = 9;

/// MSG_PARAMS bit 0: plaintext was BZip2-compressed.
pub const PARAM_COMPRESSED: u8 = 0b0000_0001;
/// MSG_PARAMS bit 1: payload is encrypted. Always set on write; readers
/// ignore it (every version-2 payload is encrypted).
pub const PARAM_ENCRYPTED: u8 = 0b0000_0010;
/// MSG_PARAMS bit 2: a 32-byte filename field precedes the message.
pub const PARAM_FILENAME: u8 = 0b0000_0100;

const PARAM_RESERVED_MASK: u8 = 0b1111_1000;

/// Parsed header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u16,
    pub msg_params: u8,
    pub payload_size: u32,
}

impl Header {
    pub fn compressed(&self) -> bool {
        self.msg_params & PARAM_COMPRESSED != 0
    }

    pub fn filename_stored(&self) -> bool {
        self.msg_params & PARAM_FILENAME != 0
    }
}

/// Pack a header for writing.
///
/// Reserved bytes and unused MSG_PARAMS bits are drawn fresh per call.
///
/// # Errors
/// [`BuryError::HeaderOverflow`] if `payload_size` does not fit in 32 bits.
pub fn pack_header(version: u16, msg_params: u8, payload_size: u64) -> Result<[u8; HEADER_LEN]> {
    let size = u32::try_from(payload_size).map_err(|_| BuryError::HeaderOverflow)?;
    let mut rng = rand::thread_rng();
    let mut header = [0u8; HEADER_LEN];
    header[..2].copy_from_slice(&version.to_le_bytes());
    header[2] = rng.gen();
    header[3] = msg_params | (rng.gen::<u8>() & PARAM_RESERVED_MASK);
    header[4] = rng.gen();
    header[5..9].copy_from_slice(&size.to_be_bytes());
    Ok(header)
}

/// Parse a demodulated header.
///
/// # Errors
/// [`BuryError::ShortHeader`] on fewer than 9 bytes,
/// [`BuryError::BadVersion`] on anything but version 0x0002.
pub fn parse_header(bytes: &[u8]) -> Result<Header> {
    if bytes.len() < HEADER_LEN {
        return Err(BuryError::ShortHeader);
    }
    let version = u16::from_le_bytes([bytes[0], bytes[1]]);
    if version != VERSION {
        return Err(BuryError::BadVersion(version));
    }
    let msg_params = bytes[3];
    let payload_size = u32::from_be_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]);
    Ok(Header { version, msg_params, payload_size })
}

/// Record the enabled channels in the LSBs of the offset pixel.
/// The upper seven bits of each channel are preserved.
pub fn write_channel_spec(raster: &mut Raster, offset: u8, channels: &Channels) -> Result<()> {
    let index = u64::from(offset);
    let mut px = raster.get(index)?;
    px[0] = (px[0] & 0xFE) | u8::from(channels.red);
    px[1] = (px[1] & 0xFE) | u8::from(channels.green);
    px[2] = (px[2] & 0xFE) | u8::from(channels.blue);
    raster.set(index, px)
}

/// Recover the channel set from the offset pixel.
///
/// # Errors
/// [`BuryError::NoChannels`] if all three LSBs are clear: nothing could
/// have been buried through an empty channel set.
pub fn read_channel_spec(raster: &Raster, offset: u8) -> Result<Channels> {
    let px = raster.get(u64::from(offset))?;
    let channels = Channels {
        red: px[0] & 1 == 1,
        green: px[1] & 1 == 1,
        blue: px[2] & 1 == 1,
    };
    channels.validate()?;
    Ok(channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn pack_parse_roundtrip() {
        let packed = pack_header(VERSION, PARAM_COMPRESSED | PARAM_ENCRYPTED, 4242).unwrap();
        let h = parse_header(&packed).unwrap();
        assert_eq!(h.version, VERSION);
        assert_eq!(h.payload_size, 4242);
        assert!(h.compressed());
        assert!(!h.filename_stored());
    }

    #[test]
    fn fixed_byte_layout() {
        let packed = pack_header(VERSION, PARAM_ENCRYPTED, 0x0102_0304).unwrap();
        // Version little-endian.
        assert_eq!(&packed[..2], &[0x02, 0x00]);
        // Declared flag bits present regardless of the random upper bits.
        assert_eq!(packed[3] & 0b111, PARAM_ENCRYPTED);
        // Payload size big-endian.
        assert_eq!(&packed[5..9], &[0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn oversized_payload_rejected() {
        let err = pack_header(VERSION, 0, u64::from(u32::MAX) + 1).unwrap_err();
        assert_eq!(err, BuryError::HeaderOverflow);
        assert!(pack_header(VERSION, 0, u64::from(u32::MAX)).is_ok());
    }

    #[test]
    fn wrong_version_rejected() {
        let mut packed = pack_header(VERSION, 0, 10).unwrap();
        packed[0] = 0x03;
        assert_eq!(parse_header(&packed).unwrap_err(), BuryError::BadVersion(0x0003));
    }

    #[test]
    fn short_input_rejected() {
        assert_eq!(parse_header(&[0x02, 0x00, 0, 0]).unwrap_err(), BuryError::ShortHeader);
        assert_eq!(parse_header(&[]).unwrap_err(), BuryError::ShortHeader);
    }

    #[test]
    fn channel_spec_roundtrip() {
        let mut r = Raster::new(RgbImage::from_pixel(8, 8, Rgb([201, 202, 203]))).unwrap();
        let ch = Channels { red: true, green: false, blue: true };
        write_channel_spec(&mut r, 11, &ch).unwrap();
        assert_eq!(read_channel_spec(&r, 11).unwrap(), ch);
        // Upper bits untouched.
        let px = r.get(11).unwrap();
        assert_eq!(px[0] >> 1, 201 >> 1);
        assert_eq!(px[1] >> 1, 202 >> 1);
        assert_eq!(px[2] >> 1, 203 >> 1);
    }

    #[test]
    fn empty_channel_spec_rejected_on_read() {
        // All LSBs clear at the offset pixel read back as an empty set.
        let mut r = Raster::new(RgbImage::from_pixel(8, 8, Rgb([200, 202, 204]))).unwrap();
        assert_eq!(read_channel_spec(&r, 3).unwrap_err(), BuryError::NoChannels);
        write_channel_spec(&mut r, 3, &Channels::ALL).unwrap();
        assert!(read_channel_spec(&r, 3).is_ok());
    }
}
