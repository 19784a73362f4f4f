// src/input.rs

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Modifier keys held during an input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2; // Option on macOS
        const SUPER = 1 << 3; // Windows key or Command key
    }
}

/// Represents a key on the keyboard, independent of the native toolkit's
/// key codes. Covers the keys the native layers can report; anything a
/// backend cannot translate maps to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Key {
    Char(char),

    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    Shift,
    Control,
    Alt,
    Super,
    CapsLock,

    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Insert,
    Delete,

    Enter,
    Backspace,
    Tab,
    Escape,
    Space,

    #[default]
    Unknown,
}

impl Key {
    /// Returns true if this key is itself a modifier key.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            Key::Shift | Key::Control | Key::Alt | Key::Super | Key::CapsLock
        )
    }
}

/// Mouse buttons reported by the native layer.
///
/// Only the first three buttons carry tracked press/release state; other
/// buttons are delivered to listeners but not tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u8),
}

impl MouseButton {
    /// Index into the tracked-state table, if this button is tracked.
    pub(crate) fn tracked_index(&self) -> Option<usize> {
        match self {
            MouseButton::Left => Some(0),
            MouseButton::Right => Some(1),
            MouseButton::Middle => Some(2),
            MouseButton::Other(_) => None,
        }
    }
}

/// Whether a key is currently held down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyState {
    Pressed,
    #[default]
    Released,
}

/// Whether a mouse button is currently held down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButtonState {
    Pressed,
    #[default]
    Released,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_classify_modifier_keys() {
        assert!(Key::Shift.is_modifier());
        assert!(Key::Super.is_modifier());
        assert!(!Key::Char('a').is_modifier());
        assert!(!Key::Enter.is_modifier());
    }

    #[test]
    fn it_should_track_only_the_first_three_mouse_buttons() {
        assert_eq!(MouseButton::Left.tracked_index(), Some(0));
        assert_eq!(MouseButton::Right.tracked_index(), Some(1));
        assert_eq!(MouseButton::Middle.tracked_index(), Some(2));
        assert_eq!(MouseButton::Other(7).tracked_index(), None);
    }
}
