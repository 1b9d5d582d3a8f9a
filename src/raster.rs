// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/bury

//! 24-bit RGB carrier view.
//!
//! [`Raster`] wraps an [`image::RgbImage`] and exposes the linear row-major
//! pixel addressing the codec works in: index `i` maps to
//! `(x, y) = (i % width, i / width)`. Decoding the carrier from a file
//! format and serializing the result (losslessly, as PNG, never JPEG) is the
//! caller's job.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};

use crate::codec::error::{BuryError, Result};

/// A mutable true-color RGB raster owned by one burial operation.
#[derive(Debug, Clone)]
pub struct Raster {
    img: RgbImage,
}

impl Raster {
    /// Wrap a decoded RGB image. Rejects zero-area rasters.
    pub fn new(img: RgbImage) -> Result<Self> {
        if img.width() == 0 || img.height() == 0 {
            return Err(BuryError::UnsupportedCarrier);
        }
        Ok(Self { img })
    }

    /// Wrap any decoded image, upgrading palette/indexed/gray inputs to
    /// true-color RGB first.
    pub fn from_dynamic(img: DynamicImage) -> Result<Self> {
        Self::new(img.to_rgb8())
    }

    /// Build a raster from raw interleaved RGB bytes (`3 * width * height`).
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let img = RgbImage::from_raw(width, height, data).ok_or(BuryError::UnsupportedCarrier)?;
        Self::new(img)
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn height(&self) -> u32 {
        self.img.height()
    }

    /// Total pixel count, the exclusive upper bound for linear indices.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.img.width()) * u64::from(self.img.height())
    }

    fn locate(&self, index: u64) -> Result<(u32, u32)> {
        if index >= self.pixel_count() {
            return Err(BuryError::BadGeometry { index, pixels: self.pixel_count() });
        }
        let w = u64::from(self.img.width());
        Ok(((index % w) as u32, (index / w) as u32))
    }

    /// Read the RGB triple at a linear pixel index.
    pub fn get(&self, index: u64) -> Result<[u8; 3]> {
        let (x, y) = self.locate(index)?;
        Ok(self.img.get_pixel(x, y).0)
    }

    /// Write the RGB triple at a linear pixel index.
    pub fn set(&mut self, index: u64, rgb: [u8; 3]) -> Result<()> {
        let (x, y) = self.locate(index)?;
        self.img.put_pixel(x, y, Rgb(rgb));
        Ok(())
    }

    /// Resample to new dimensions. The caller is responsible for picking
    /// dimensions that preserve the aspect ratio.
    pub fn resized(&self, new_width: u32, new_height: u32) -> Result<Self> {
        if new_width == 0 || new_height == 0 {
            return Err(BuryError::UnsupportedCarrier);
        }
        Ok(Self { img: imageops::resize(&self.img, new_width, new_height, FilterType::Triangle) })
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.img
    }

    pub fn into_image(self) -> RgbImage {
        self.img
    }
}
