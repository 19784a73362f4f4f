// src/stream/image.rs

//! Displayable RGBA images and the handles the UI role reads.

use std::sync::Arc;

use crate::stream::staging::BYTES_PER_PIXEL;

/// Shared handle to a published image.
///
/// The handle returned by `FrameView::front_image` stays readable for as
/// long as the caller holds it; the copy worker clones-on-write if it
/// needs to reuse a buffer the UI still references.
pub type ImageHandle = Arc<ImageBuffer>;

/// A CPU-resident RGBA8 image, row-major, no row padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl ImageBuffer {
    /// A zeroed (transparent black) image.
    pub fn new(width: u32, height: u32) -> Self {
        ImageBuffer {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * BYTES_PER_PIXEL],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixel data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// The RGBA value at (x, y), or None if out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.pixels[offset..offset + BYTES_PER_PIXEL]);
        Some(rgba)
    }

    /// Overwrite this image from staged BGRA bytes, recreating the
    /// backing store if the geometry changed.
    ///
    /// The caller guarantees `bgra.len() == width * height * 4`; the
    /// staging layer validated it before the bytes reached this point.
    pub(crate) fn write_bgra(&mut self, width: u32, height: u32, bgra: &[u8]) {
        if self.width != width || self.height != height {
            *self = ImageBuffer::new(width, height);
        }
        for (dst, src) in self
            .pixels
            .chunks_exact_mut(BYTES_PER_PIXEL)
            .zip(bgra.chunks_exact(BYTES_PER_PIXEL))
        {
            dst[0] = src[2]; // R
            dst[1] = src[1]; // G
            dst[2] = src[0]; // B
            dst[3] = src[3]; // A
        }
    }
}
