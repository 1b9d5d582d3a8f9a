// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/bury

//! LSB modulation and demodulation along the pixel walk.
//!
//! Within one pixel, enabled channels are visited in the wire order
//! **red, blue, green**. Within one byte, bits travel LSB-first: bit `k` of
//! the stream lives in byte `k / 8` at position `k % 8` counted from the
//! least-significant end. Both orders are part of the wire format.
//!
//! After the stream is exhausted, remaining enabled-channel LSBs along the
//! walk are filled with uniform random bits so the used and unused parts of
//! the walk are statistically indistinguishable. In visible debug mode the
//! walked pixels are painted solid red (payload) or green (filler) instead.

use rand::Rng;

use crate::codec::error::{BuryError, Result};
use crate::codec::options::Channels;
use crate::raster::Raster;

/// Solid color for payload-carrying pixels in visible debug mode.
const VISIBLE_DATA: [u8; 3] = [255, 0, 0];
/// Solid color for filler pixels in visible debug mode.
const VISIBLE_FILL: [u8; 3] = [0, 255, 0];

/// Wire order of channels within one pixel: red, blue, green.
/// Index into an `[r, g, b]` triple.
const WIRE_ORDER: [usize; 3] = [0, 2, 1];

fn enabled(channels: &Channels, slot: usize) -> bool {
    match slot {
        0 => channels.red,
        1 => channels.green,
        _ => channels.blue,
    }
}

/// LSB-first bit reader over a byte stream.
///
/// `next_bit` yields a definite `0` or `1`, or `None` once the stream is
/// exhausted. Exhaustion is never conflated with a zero bit.
struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn next_bit(&mut self) -> Option<u8> {
        let byte = *self.data.get(self.pos / 8)?;
        let bit = (byte >> (self.pos % 8)) & 1;
        self.pos += 1;
        Some(bit)
    }
}

/// LSB-first bit collector, mirror of [`BitReader`].
struct BitWriter {
    out: Vec<u8>,
    pos: usize,
}

impl BitWriter {
    fn with_capacity(bits: usize) -> Self {
        Self { out: Vec::with_capacity(bits.div_ceil(8)), pos: 0 }
    }

    fn push(&mut self, bit: u8) {
        if self.pos % 8 == 0 {
            self.out.push(0);
        }
        let last = self.out.len() - 1;
        self.out[last] |= (bit & 1) << (self.pos % 8);
        self.pos += 1;
    }

    fn finish(self) -> Vec<u8> {
        self.out
    }
}

fn set_lsb(channel: &mut u8, bit: u8) {
    *channel = (*channel & 0xFE) | (bit & 1);
}

/// Write `data` into the enabled-channel LSBs of the walk pixels.
///
/// The walk excludes the offset pixel, which holds the channel spec. Pixels
/// past the end of the stream get random LSBs. Only LSBs change; the upper
/// seven bits of every channel are preserved (except in visible mode).
///
/// # Errors
/// [`BuryError::PayloadTooLarge`] if `data` does not fit the walk, and
/// [`BuryError::BadGeometry`] if a walk index is out of range.
pub fn modulate(
    raster: &mut Raster,
    walk: &[u64],
    channels: &Channels,
    data: &[u8],
    visible: bool,
) -> Result<()> {
    let capacity_bits = walk.len() as u64 * u64::from(channels.bits_per_pixel());
    let needed_bits = data.len() as u64 * 8;
    if needed_bits > capacity_bits {
        return Err(BuryError::PayloadTooLarge {
            needed: data.len(),
            capacity: (capacity_bits / 8) as usize,
        });
    }

    let mut reader = BitReader::new(data);
    let mut rng = rand::thread_rng();
    for &index in walk {
        let mut px = raster.get(index)?;
        let mut carried_payload = false;
        for slot in WIRE_ORDER {
            if !enabled(channels, slot) {
                continue;
            }
            match reader.next_bit() {
                Some(bit) => {
                    set_lsb(&mut px[slot], bit);
                    carried_payload = true;
                }
                None => set_lsb(&mut px[slot], rng.gen::<u8>() & 1),
            }
        }
        if visible {
            px = if carried_payload { VISIBLE_DATA } else { VISIBLE_FILL };
        }
        raster.set(index, px)?;
    }
    Ok(())
}

/// Read the enabled-channel LSBs of every walk pixel back into bytes.
///
/// Output length is `⌈bits_per_pixel · walk.len() / 8⌉`; bytes past the
/// buried payload are unspecified filler.
pub fn demodulate(raster: &Raster, walk: &[u64], channels: &Channels) -> Result<Vec<u8>> {
    let total_bits = walk.len() * channels.bits_per_pixel() as usize;
    let mut writer = BitWriter::with_capacity(total_bits);
    for &index in walk {
        let px = raster.get(index)?;
        for slot in WIRE_ORDER {
            if enabled(channels, slot) {
                writer.push(px[slot] & 1);
            }
        }
    }
    Ok(writer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn gray(w: u32, h: u32) -> Raster {
        Raster::new(RgbImage::from_pixel(w, h, Rgb([100, 150, 200]))).unwrap()
    }

    fn walk(len: u64) -> Vec<u64> {
        // Synthetic fixed-stride walk starting at pixel 1.
        (1..=len).collect()
    }

    #[test]
    fn roundtrip_all_channels() {
        let mut r = gray(32, 32);
        let data = b"The quick brown fox jumps over the lazy dog";
        let w = walk(200);
        modulate(&mut r, &w, &Channels::ALL, data, false).unwrap();
        let back = demodulate(&r, &w, &Channels::ALL).unwrap();
        assert_eq!(&back[..data.len()], &data[..]);
    }

    #[test]
    fn roundtrip_single_channel() {
        let ch = Channels { red: false, green: true, blue: false };
        let mut r = gray(32, 32);
        let data = [0xA5u8, 0x00, 0xFF, 0x3C];
        let w = walk(100);
        modulate(&mut r, &w, &ch, &data, false).unwrap();
        let back = demodulate(&r, &w, &ch).unwrap();
        assert_eq!(&back[..4], &data);
    }

    #[test]
    fn demodulated_length_is_ceil() {
        let r = gray(16, 16);
        let w = walk(10);
        // 10 pixels * 3 bits = 30 bits -> 4 bytes.
        assert_eq!(demodulate(&r, &w, &Channels::ALL).unwrap().len(), 4);
        let one = Channels { red: true, green: false, blue: false };
        // 10 bits -> 2 bytes.
        assert_eq!(demodulate(&r, &w, &one).unwrap().len(), 2);
    }

    #[test]
    fn upper_seven_bits_preserved() {
        let mut r = gray(32, 32);
        let w = walk(300);
        modulate(&mut r, &w, &Channels::ALL, &[0xFF; 100], false).unwrap();
        for i in 0..r.pixel_count() {
            let px = r.get(i).unwrap();
            assert_eq!(px[0] >> 1, 100 >> 1);
            assert_eq!(px[1] >> 1, 150 >> 1);
            assert_eq!(px[2] >> 1, 200 >> 1);
        }
    }

    #[test]
    fn untouched_pixels_unchanged() {
        let mut r = gray(8, 8);
        let w = vec![3, 9, 20];
        modulate(&mut r, &w, &Channels::ALL, &[0b101], false).unwrap();
        for i in 0..64 {
            if !w.contains(&i) {
                assert_eq!(r.get(i).unwrap(), [100, 150, 200], "pixel {i} changed");
            }
        }
    }

    #[test]
    fn modulation_is_idempotent_in_the_lsb() {
        let mut r = gray(32, 32);
        let data = b"idempotent";
        // Walk sized exactly to the payload so no random fill is appended.
        let bits = data.len() * 8;
        let w = walk(bits.div_ceil(3) as u64);
        modulate(&mut r, &w, &Channels::ALL, data, false).unwrap();
        let first = r.as_image().clone();
        modulate(&mut r, &w, &Channels::ALL, data, false).unwrap();
        // Only the final pixel's trailing channels may differ (random fill
        // for the slots past the end of the stream).
        let total_slots = w.len() * 3;
        if total_slots == bits {
            assert_eq!(r.as_image().as_raw(), first.as_raw());
        } else {
            let mut diff = 0;
            for (a, b) in r.as_image().as_raw().iter().zip(first.as_raw()) {
                if a != b {
                    diff += 1;
                }
            }
            assert!(diff <= total_slots - bits, "{diff} channels changed");
        }
    }

    #[test]
    fn channel_order_is_red_blue_green() {
        let mut r = gray(4, 4);
        let w = vec![1u64];
        // One pixel, three channels: bits 1,0,1 land in R, B, G.
        modulate(&mut r, &w, &Channels::ALL, &[0b101], false).unwrap();
        let px = r.get(1).unwrap();
        assert_eq!(px[0] & 1, 1, "red carries bit 0");
        assert_eq!(px[2] & 1, 0, "blue carries bit 1");
        assert_eq!(px[1] & 1, 1, "green carries bit 2");
    }

    #[test]
    fn oversized_payload_rejected() {
        let mut r = gray(8, 8);
        let w = walk(4); // 12 bits
        let err = modulate(&mut r, &w, &Channels::ALL, &[0u8; 2], false).unwrap_err();
        assert!(matches!(err, BuryError::PayloadTooLarge { .. }));
    }

    #[test]
    fn visible_mode_paints_coverage() {
        let mut r = gray(8, 8);
        let w = walk(20);
        modulate(&mut r, &w, &Channels::ALL, &[0xFF; 2], true).unwrap();
        // 16 bits over 3 bpp: pixels 1..=6 carry payload, the rest filler.
        assert_eq!(r.get(1).unwrap(), VISIBLE_DATA);
        assert_eq!(r.get(20).unwrap(), VISIBLE_FILL);
    }

    #[test]
    fn bit_reader_sentinel_after_end() {
        let mut br = BitReader::new(&[0b0000_0001]);
        assert_eq!(br.next_bit(), Some(1));
        for _ in 0..7 {
            assert_eq!(br.next_bit(), Some(0));
        }
        assert_eq!(br.next_bit(), None);
    }
}
