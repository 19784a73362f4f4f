// src/events/mod.rs

//! Event collection and dispatch.
//!
//! Native callbacks enqueue categorized events through an [`EventSink`]
//! (thread-safe, fire-and-forget); the designated event thread later
//! drains every category with [`EventCollector::poll_events`], invoking
//! registered listeners in submission order. Ordering is FIFO within a
//! category only; listeners must not assume any ordering across
//! categories.

use serde::{Deserialize, Serialize};

use crate::input::{Key, Modifiers, MouseButton};

pub mod collector;
pub mod registry;

pub use collector::{EventCollector, EventSink};
pub use registry::{ListenerId, ListenerSet};


/// The window moved to a new position (screen coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowMoved {
    pub x: i32,
    pub y: i32,
}

/// The window's client area was resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowResized {
    pub width: u32,
    pub height: u32,
}

/// The framebuffer backing the window was resized. Reported separately
/// from [`WindowResized`] because the two can differ on HiDPI displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FramebufferResized {
    pub width: u32,
    pub height: u32,
}

/// The user requested the window be closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseRequested;

/// The canvas contents were invalidated (window damaged or exposed) and
/// should be redrawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequested;

/// The window gained or lost input focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusChange {
    Gained,
    Lost,
}

/// The window was iconified (minimized) or restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IconifyChange {
    Iconified,
    Restored,
}

/// What happened to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAction {
    Press,
    Release,
    /// Auto-repeat while held. Delivered on the same category as press
    /// and release so a listener sees the full key timeline in order.
    Repeat,
}

/// A keyboard key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput {
    pub key: Key,
    pub action: KeyAction,
    pub modifiers: Modifiers,
}

/// A translated character was typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharInput {
    pub character: char,
    pub modifiers: Modifiers,
}

/// What happened to a mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonAction {
    Press,
    Release,
}

/// A mouse button event, with the cursor position at the time of the
/// event in window-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MouseInput {
    pub button: MouseButton,
    pub action: ButtonAction,
    pub x: f64,
    pub y: f64,
    pub modifiers: Modifiers,
}

/// The cursor moved within the window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorMoved {
    pub x: f64,
    pub y: f64,
}

/// The cursor crossed the window boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CursorBoundary {
    Entered,
    Exited,
}

/// A scroll wheel or trackpad scroll event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scroll {
    pub dx: f64,
    pub dy: f64,
}
