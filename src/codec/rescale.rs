// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/bury

//! Minimum-fit carrier shrinking.
//!
//! A carrier much larger than the payload needs is a liability: past the end
//! of the stream the walk is filled with random LSBs, and the larger that
//! filled region, the more material a steganalyst has. Shrinking the carrier
//! to the smallest aspect-preserving size that still fits the payload keeps
//! the fill region minimal. The carrier is never enlarged.

use log::debug;

use crate::codec::keys::DerivedParams;
use crate::codec::options::Channels;
use crate::codec::stride::{self, StrideGenerator};
use crate::raster::Raster;

/// Number of pixels the walk must be able to address to carry `framed_len`
/// bytes: the offset pixel, then enough strides to cover the bit stream.
fn required_pixels(framed_len: usize, channels: &Channels, params: &DerivedParams) -> u64 {
    let bits = framed_len as u64 * 8;
    let bpp = u64::from(channels.bits_per_pixel());
    let steps = bits.div_ceil(bpp);

    let mut strides = StrideGenerator::new(params.stride_seed, params.max_stride);
    let mut cursor = u64::from(params.offset);
    for _ in 0..steps {
        cursor += strides.next_stride();
    }
    // The last walk index must itself be addressable.
    cursor + 1
}

/// Aspect-preserving dimensions with at least `pixels` total pixels.
fn fit_dimensions(width: u32, height: u32, pixels: u64) -> (u32, u32) {
    let ratio = f64::from(width.max(height)) / f64::from(width.min(height));
    let n = (pixels as f64 / ratio).sqrt().ceil() as u32;
    let long = (f64::from(n) * ratio).ceil() as u32;
    if width >= height {
        (long, n)
    } else {
        (n, long)
    }
}

/// Try to shrink the carrier to the minimum size that fits `framed_len`
/// bytes under this password's walk.
///
/// Returns the resized raster together with its regenerated walk, or `None`
/// when no strict shrink is possible (the caller keeps the original). The
/// regenerated walk is re-checked against the payload, so a `Some` result
/// always fits.
pub fn attempt(
    raster: &Raster,
    params: &DerivedParams,
    channels: &Channels,
    framed_len: usize,
) -> Option<(Raster, Vec<u64>)> {
    let required = required_pixels(framed_len, channels, params);
    let (new_w, new_h) = fit_dimensions(raster.width(), raster.height(), required);
    let new_area = u64::from(new_w) * u64::from(new_h);

    if new_area < required || new_area >= raster.pixel_count() {
        debug!(
            "rescale rejected: {}x{} -> {new_w}x{new_h} (required {required} px)",
            raster.width(),
            raster.height()
        );
        return None;
    }

    let resized = raster.resized(new_w, new_h).ok()?;
    let walk = stride::demarcate(new_w, new_h, params);
    let capacity = walk.len() as u64 * u64::from(channels.bits_per_pixel()) / 8;
    if capacity < framed_len as u64 {
        debug!("rescale rejected: regenerated walk holds {capacity} of {framed_len} bytes");
        return None;
    }

    debug!(
        "rescale accepted: {}x{} -> {new_w}x{new_h} for {framed_len} framed bytes",
        raster.width(),
        raster.height()
    );
    Some((resized, walk))
}
