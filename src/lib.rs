// src/lib.rs

//! frame-relay: the cross-thread handoff core of an interactive GPU
//! viewer.
//!
//! Two independent pipelines, joined at the [`CanvasBridge`]:
//!
//! - **Frame streaming** ([`stream`]): the render role notifies a
//!   persistent copy worker that a frame's pixels are ready; the worker
//!   coalesces bursts (at most one copy running, at most one pending),
//!   transcodes BGRA staging bytes into an RGBA image, and publishes by
//!   swapping the front/back handles. The UI role polls for the front
//!   image each tick and never observes a half-written frame.
//! - **Event collection** ([`events`]): native callbacks enqueue
//!   categorized events through a thread-safe [`EventSink`]; the
//!   designated event thread drains them with
//!   [`EventCollector::poll_events`], delivering to registered listeners
//!   in per-category FIFO order with per-invocation panic isolation.
//!
//! Neither pipeline renders, lays out, or talks to a windowing toolkit;
//! the native layer is a collaborator reached only through the bridge's
//! callback entry points.

pub mod bridge;
pub mod config;
pub mod events;
pub mod input;
pub mod stream;

pub use bridge::CanvasBridge;
pub use config::{Config, RefreshConfig, StreamConfig, CONFIG};
pub use events::{EventCollector, EventSink, ListenerId};
pub use input::{Key, KeyState, Modifiers, MouseButton, MouseButtonState};
pub use stream::{CopyScheduler, FrameSender, FrameView, ImageBuffer, ImageHandle};
