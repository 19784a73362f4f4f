// src/stream/mod.rs

//! Framebuffer streaming pipeline.
//!
//! Pixels come off the render target as BGRA bytes, are staged through a
//! reusable [`StagingBuffer`], transcoded by a background copy worker
//! into the back [`ImageBuffer`] of a front/back pair, and published to
//! the UI role by an atomic handle swap.
//!
//! ## Threading Model
//! - The render role calls [`FrameSender::frame_ready`]; it never blocks
//!   on the UI role.
//! - A single persistent copy worker performs the transcode; a frame
//!   staged while it is busy replaces any not-yet-claimed frame
//!   (latest wins, at most one pending behind the running copy).
//! - The UI role reads [`FrameView::front_image`] each tick; consuming a
//!   pending publication releases the worker's backpressure wait.

pub mod image;
pub mod messages;
pub mod scheduler;
pub mod staging;

pub use image::{ImageBuffer, ImageHandle};
pub use messages::CopyError;
pub use scheduler::{CopyScheduler, FrameSender, FrameView};
pub use staging::StagingBuffer;
