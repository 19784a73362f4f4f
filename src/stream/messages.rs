// src/stream/messages.rs

//! Error type for recoverable copy-job failures.
//!
//! These never propagate to the render role; they are logged and the
//! offending frame is dropped, so the next frame gets a clean retry.

use std::fmt;

/// A frame could not be staged or copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyError {
    /// Frame dimensions were zero in at least one axis.
    DegenerateDimensions { width: u32, height: u32 },
    /// The pixel slice length did not match `width * height * 4`.
    PixelSizeMismatch { expected: usize, actual: usize },
}

impl fmt::Display for CopyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyError::DegenerateDimensions { width, height } => {
                write!(f, "degenerate frame dimensions {}x{}", width, height)
            }
            CopyError::PixelSizeMismatch { expected, actual } => {
                write!(
                    f,
                    "pixel data length {} does not match expected {}",
                    actual, expected
                )
            }
        }
    }
}

impl std::error::Error for CopyError {}
