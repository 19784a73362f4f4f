// src/stream/staging.rs

//! Reusable CPU-side staging buffer for one frame's raw pixels.

use crate::stream::messages::CopyError;

/// Bytes per pixel for both staged (BGRA) and published (RGBA) data.
pub const BYTES_PER_PIXEL: usize = 4;

/// A fixed-capacity byte region holding one frame of BGRA pixels.
///
/// The buffer is the unit of ownership transfer between the render and
/// copy roles: exactly one role holds it at any time, so its contents
/// are never aliased across threads. The allocation is reused across
/// frames and replaced only when the frame's byte size changes.
#[derive(Debug, Default)]
pub struct StagingBuffer {
    bytes: Box<[u8]>,
    width: u32,
    height: u32,
}

impl StagingBuffer {
    pub fn empty() -> Self {
        Self::default()
    }

    fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * BYTES_PER_PIXEL
    }

    /// Copy one frame's pixels in, growing or shrinking the allocation
    /// only if the byte size changed.
    pub fn stage(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<(), CopyError> {
        if width == 0 || height == 0 {
            return Err(CopyError::DegenerateDimensions { width, height });
        }
        let expected = Self::byte_len(width, height);
        if pixels.len() != expected {
            return Err(CopyError::PixelSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        if self.bytes.len() != expected {
            self.bytes = vec![0u8; expected].into_boxed_slice();
        }
        self.bytes.copy_from_slice(pixels);
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The staged BGRA bytes for the valid region.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
