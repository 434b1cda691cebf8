// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Owned image snapshots.

use alloc::boxed::Box;
use alloc::vec::Vec;

use peniko::{Blob, ImageAlphaType, ImageData, ImageFormat};

use crate::{CaptureError, IRect};

/// Bytes per pixel of every format a snapshot accepts.
const BYTES_PER_PIXEL: usize = 4;

/// A fully owned copy of an image's pixels.
///
/// Pixels are tightly packed, row-major, four bytes per pixel, in the layout
/// named by [`ImageSnapshot::format`]. The pixel buffer is never shared with the
/// caller that supplied it.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageSnapshot {
    width: u32,
    height: u32,
    format: ImageFormat,
    alpha_type: ImageAlphaType,
    pixels: Box<[u8]>,
}

impl ImageSnapshot {
    /// Copy `pixels` into a new snapshot.
    ///
    /// Fails if `pixels` does not hold exactly `width * height` pixels.
    pub fn new(
        width: u32,
        height: u32,
        format: ImageFormat,
        alpha_type: ImageAlphaType,
        pixels: &[u8],
    ) -> Result<Self, CaptureError> {
        let expected = usize::try_from(u64::from(width) * u64::from(height))
            .ok()
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .ok_or(CaptureError::ImageTooLarge { width, height })?;
        if pixels.len() != expected {
            return Err(CaptureError::PixelBuffer {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            alpha_type,
            pixels: pixels.into(),
        })
    }

    /// Create an RGBA8 snapshot filled with a single straight-alpha color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, CaptureError> {
        let count = usize::try_from(u64::from(width) * u64::from(height))
            .map_err(|_| CaptureError::ImageTooLarge { width, height })?;
        let pixels: Vec<u8> = rgba.iter().copied().cycle().take(count * 4).collect();
        Self::new(
            width,
            height,
            ImageFormat::Rgba8,
            ImageAlphaType::Alpha,
            &pixels,
        )
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel layout.
    #[inline]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Alpha encoding of the pixels.
    #[inline]
    pub fn alpha_type(&self) -> ImageAlphaType {
        self.alpha_type
    }

    /// Raw pixel bytes.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Bounds of the image in pixel coordinates.
    pub fn bounds(&self) -> IRect {
        IRect::new(
            0,
            0,
            i32::try_from(self.width).unwrap_or(i32::MAX),
            i32::try_from(self.height).unwrap_or(i32::MAX),
        )
    }

    /// Four bytes of the pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let px = self.pixels.get(offset..offset + BYTES_PER_PIXEL)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Copy of the pixels inside `rect`, clamped to the image bounds.
    pub fn crop(&self, rect: IRect) -> Self {
        let r = rect.intersect(self.bounds());
        #[allow(
            clippy::cast_sign_loss,
            reason = "intersection with the image bounds keeps every edge non-negative"
        )]
        let (x0, y0, w, h) = (
            r.left as u32,
            r.top as u32,
            r.width() as u32,
            r.height() as u32,
        );
        let mut pixels = Vec::with_capacity(w as usize * h as usize * BYTES_PER_PIXEL);
        let stride = self.width as usize * BYTES_PER_PIXEL;
        for y in y0..y0 + h {
            let start = y as usize * stride + x0 as usize * BYTES_PER_PIXEL;
            pixels.extend_from_slice(&self.pixels[start..start + w as usize * BYTES_PER_PIXEL]);
        }
        Self {
            width: w,
            height: h,
            format: self.format,
            alpha_type: self.alpha_type,
            pixels: pixels.into(),
        }
    }

    /// Copy scaled down to fit within `max_edge` on both axes.
    ///
    /// Aspect ratio is preserved and sampling is nearest-neighbour. Images that
    /// already fit are copied unchanged; nothing is ever scaled up.
    pub fn fit_within(&self, max_edge: u32) -> Self {
        let longest = self.width.max(self.height);
        if longest <= max_edge || longest == 0 {
            return self.clone();
        }
        let scale = |v: u32| -> u32 {
            let scaled = u64::from(v) * u64::from(max_edge) / u64::from(longest);
            u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
        };
        let (w, h) = (scale(self.width), scale(self.height));
        let mut pixels = Vec::with_capacity(w as usize * h as usize * BYTES_PER_PIXEL);
        for y in 0..h {
            let sy = u64::from(y) * u64::from(self.height) / u64::from(h);
            for x in 0..w {
                let sx = u64::from(x) * u64::from(self.width) / u64::from(w);
                let offset = (sy as usize * self.width as usize + sx as usize) * BYTES_PER_PIXEL;
                pixels.extend_from_slice(&self.pixels[offset..offset + BYTES_PER_PIXEL]);
            }
        }
        Self {
            width: w,
            height: h,
            format: self.format,
            alpha_type: self.alpha_type,
            pixels: pixels.into(),
        }
    }

    /// Convert into a [`peniko::ImageData`] for handing to a renderer.
    pub fn to_image_data(&self) -> ImageData {
        ImageData {
            data: Blob::from(self.pixels.to_vec()),
            format: self.format,
            alpha_type: self.alpha_type,
            width: self.width,
            height: self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn gradient(width: u32, height: u32) -> ImageSnapshot {
        let mut pixels = Vec::new();
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[x as u8, y as u8, 0, 255]);
            }
        }
        ImageSnapshot::new(
            width,
            height,
            ImageFormat::Rgba8,
            ImageAlphaType::Alpha,
            &pixels,
        )
        .unwrap()
    }

    #[test]
    fn rejects_mismatched_buffer() {
        let err = ImageSnapshot::new(2, 2, ImageFormat::Rgba8, ImageAlphaType::Alpha, &[0; 15])
            .unwrap_err();
        assert_eq!(
            err,
            CaptureError::PixelBuffer {
                width: 2,
                height: 2,
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn owns_its_pixels() {
        let mut source = vec![1_u8; 4];
        let image =
            ImageSnapshot::new(1, 1, ImageFormat::Rgba8, ImageAlphaType::Alpha, &source).unwrap();
        source[0] = 9;
        assert_eq!(image.pixel(0, 0), Some([1, 1, 1, 1]));
    }

    #[test]
    fn empty_image_is_legal() {
        let image = ImageSnapshot::new(0, 0, ImageFormat::Rgba8, ImageAlphaType::Alpha, &[])
            .unwrap();
        assert!(image.pixels().is_empty());
        assert_eq!(image.fit_within(16), image);
    }

    #[test]
    fn fit_within_preserves_aspect() {
        let image = gradient(64, 32);
        let preview = image.fit_within(16);
        assert_eq!((preview.width(), preview.height()), (16, 8));
        assert_eq!(preview.pixel(1, 1), Some([4, 4, 0, 255]));

        let small = gradient(4, 4);
        assert_eq!(small.fit_within(16), small);
    }

    #[test]
    fn crop_clamps_to_bounds() {
        let image = gradient(8, 8);
        let cropped = image.crop(IRect::new(6, 5, 20, 20));
        assert_eq!((cropped.width(), cropped.height()), (2, 3));
        assert_eq!(cropped.pixel(0, 0), Some([6, 5, 0, 255]));
        assert_eq!(cropped.pixel(2, 0), None);
    }
}
