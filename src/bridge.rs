// src/bridge.rs

//! The canvas bridge: the single object the windowing layer talks to.
//!
//! A `CanvasBridge` owns one [`CopyScheduler`] and one [`EventCollector`]
//! and translates native window callbacks into sink enqueues, keeping a
//! small amount of tracked input state (cursor position, held keys and
//! buttons, current modifiers) that the event thread can read at any
//! time without waiting for a poll.

use anyhow::Result;
use log::{debug, trace};
use std::collections::HashMap;
use std::time::Duration;

use crate::config::{Config, CONFIG};
use crate::events::collector::{EventCollector, EventSink};
use crate::input::{Key, KeyState, Modifiers, MouseButton, MouseButtonState};
use crate::stream::scheduler::{CopyScheduler, FrameSender, FrameView};
use crate::stream::ImageHandle;

/// Input state mirrored from the callbacks as they arrive.
#[derive(Debug, Default)]
struct InputState {
    cursor: (f64, f64),
    keys: HashMap<Key, KeyState>,
    buttons: [MouseButtonState; 3],
    modifiers: Modifiers,
}

/// Owns the frame pipeline and the event pipeline for one canvas.
///
/// The native callback layer calls the `notify_*` methods (or enqueues
/// through a cloned [`EventSink`] directly, bypassing state tracking);
/// the event thread calls [`poll_events`](Self::poll_events) and the
/// state readers; the UI tick reads frames through
/// [`front_image`](Self::front_image).
pub struct CanvasBridge {
    scheduler: CopyScheduler,
    collector: EventCollector,
    sink: EventSink,
    sender: FrameSender,
    view: FrameView,
    input: InputState,
    last_position: Option<(i32, i32)>,
    terminate_requested: bool,
    tick_interval: Duration,
}

impl CanvasBridge {
    /// Build a bridge from the global [`CONFIG`].
    pub fn new() -> Result<Self> {
        Self::with_config(&CONFIG)
    }

    pub fn with_config(config: &Config) -> Result<Self> {
        let scheduler = CopyScheduler::spawn(&config.stream)?;
        let collector = EventCollector::new();
        let sink = collector.sink();
        let sender = scheduler.sender();
        let view = scheduler.view();
        Ok(CanvasBridge {
            scheduler,
            collector,
            sink,
            sender,
            view,
            input: InputState::default(),
            last_position: None,
            terminate_requested: false,
            tick_interval: config.refresh.tick_interval(),
        })
    }

    /// How often the embedding UI loop should check for a new frame.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    // --- frame pipeline ---

    /// Notify the copy worker that the render target finished a frame.
    pub fn frame_ready(&self, width: u32, height: u32, pixels: &[u8]) {
        self.sender.frame_ready(width, height, pixels);
    }

    /// A cloneable sender for the render thread.
    pub fn sender(&self) -> FrameSender {
        self.sender.clone()
    }

    /// A cloneable view for the UI tick.
    pub fn view(&self) -> FrameView {
        self.view.clone()
    }

    pub fn has_pending_frame(&self) -> bool {
        self.view.has_pending_frame()
    }

    pub fn front_image(&self) -> ImageHandle {
        self.view.front_image()
    }

    // --- event pipeline ---

    /// A cloneable sink for callback layers that manage their own state.
    pub fn sink(&self) -> EventSink {
        self.sink.clone()
    }

    /// Listener registration and removal live on the collector.
    pub fn events_mut(&mut self) -> &mut EventCollector {
        &mut self.collector
    }

    /// Drain the queues and dispatch to listeners. Event-thread only.
    pub fn poll_events(&mut self) {
        self.collector.poll_events();
    }

    // --- native callback entry points (tracked) ---

    pub fn notify_key_pressed(&mut self, key: Key, modifiers: Modifiers) {
        self.input.keys.insert(key, KeyState::Pressed);
        self.input.modifiers = modifiers;
        self.sink.press_key(key, modifiers);
    }

    pub fn notify_key_released(&mut self, key: Key, modifiers: Modifiers) {
        self.input.keys.insert(key, KeyState::Released);
        self.input.modifiers = modifiers;
        self.sink.release_key(key, modifiers);
    }

    // A repeat does not change the held state; the key is already down.
    pub fn notify_key_repeated(&mut self, key: Key, modifiers: Modifiers) {
        self.input.modifiers = modifiers;
        self.sink.repeat_key(key, modifiers);
    }

    pub fn notify_character_typed(&mut self, character: char, modifiers: Modifiers) {
        self.input.modifiers = modifiers;
        self.sink.type_character(character, modifiers);
    }

    pub fn notify_mouse_pressed(&mut self, button: MouseButton, modifiers: Modifiers) {
        if let Some(index) = button.tracked_index() {
            self.input.buttons[index] = MouseButtonState::Pressed;
        }
        self.input.modifiers = modifiers;
        let (x, y) = self.input.cursor;
        self.sink.press_mouse_button(button, x, y, modifiers);
    }

    pub fn notify_mouse_released(&mut self, button: MouseButton, modifiers: Modifiers) {
        if let Some(index) = button.tracked_index() {
            self.input.buttons[index] = MouseButtonState::Released;
        }
        self.input.modifiers = modifiers;
        let (x, y) = self.input.cursor;
        self.sink.release_mouse_button(button, x, y, modifiers);
    }

    pub fn notify_cursor_moved(&mut self, x: f64, y: f64) {
        self.input.cursor = (x, y);
        self.sink.move_cursor(x, y);
    }

    pub fn notify_cursor_entered(&mut self) {
        self.sink.cursor_entered();
    }

    pub fn notify_cursor_exited(&mut self) {
        self.sink.cursor_exited();
    }

    pub fn notify_scroll(&mut self, dx: f64, dy: f64) {
        self.sink.scroll(dx, dy);
    }

    pub fn notify_focus_changed(&mut self, focused: bool) {
        if focused {
            self.sink.focus_gained();
        } else {
            self.sink.focus_lost();
        }
    }

    pub fn notify_iconify_changed(&mut self, iconified: bool) {
        if iconified {
            self.sink.iconified();
        } else {
            self.sink.restored();
        }
    }

    pub fn notify_close_requested(&mut self) {
        self.sink.close_requested();
    }

    pub fn notify_refresh_requested(&mut self) {
        self.sink.refresh_requested();
    }

    /// Record a new window geometry.
    ///
    /// Emits a window-moved event only when the position actually
    /// changed, then a window-resized and a framebuffer-resized event.
    pub fn change_bounds(&mut self, x: i32, y: i32, width: u32, height: u32) {
        if self.last_position != Some((x, y)) {
            self.last_position = Some((x, y));
            self.sink.window_moved(x, y);
        }
        self.sink.window_resized(width, height);
        self.sink.framebuffer_resized(width, height);
        trace!("CanvasBridge: bounds now ({}, {}) {}x{}", x, y, width, height);
    }

    // --- tracked state readers ---

    pub fn cursor_position(&self) -> (f64, f64) {
        self.input.cursor
    }

    pub fn key_state(&self, key: Key) -> KeyState {
        self.input.keys.get(&key).copied().unwrap_or_default()
    }

    pub fn mouse_button_state(&self, button: MouseButton) -> MouseButtonState {
        button
            .tracked_index()
            .map(|index| self.input.buttons[index])
            .unwrap_or_default()
    }

    pub fn modifiers(&self) -> Modifiers {
        self.input.modifiers
    }

    // --- lifecycle ---

    /// Latch a pending shutdown. The owning loop decides when to act on
    /// it; until then it can be cancelled.
    pub fn request_terminate(&mut self) {
        self.terminate_requested = true;
    }

    pub fn cancel_terminate(&mut self) {
        self.terminate_requested = false;
    }

    pub fn should_terminate(&self) -> bool {
        self.terminate_requested
    }

    /// Close both pipelines. Idempotent; further frames and events are
    /// silently dropped.
    pub fn close(&mut self) {
        debug!("CanvasBridge: closing");
        self.collector.close();
        self.scheduler.close();
    }

    pub fn is_closed(&self) -> bool {
        self.scheduler.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RefreshConfig, StreamConfig};
    use crate::events::{KeyAction, WindowMoved};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn test_bridge() -> CanvasBridge {
        CanvasBridge::with_config(&Config {
            stream: StreamConfig {
                initial_width: 4,
                initial_height: 4,
                worker_thread_name: "frame-copy-test".to_string(),
            },
            refresh: RefreshConfig::default(),
        })
        .unwrap()
    }

    #[test]
    fn it_should_build_from_the_global_config() {
        let bridge = CanvasBridge::new().unwrap();
        assert_eq!(bridge.tick_interval(), CONFIG.refresh.tick_interval());
        assert!(bridge.tick_interval() > Duration::ZERO);
    }

    #[test]
    fn it_should_track_key_state_across_press_and_release() {
        let mut bridge = test_bridge();
        assert_eq!(bridge.key_state(Key::Char('w')), KeyState::Released);

        bridge.notify_key_pressed(Key::Char('w'), Modifiers::empty());
        assert_eq!(bridge.key_state(Key::Char('w')), KeyState::Pressed);
        bridge.notify_key_repeated(Key::Char('w'), Modifiers::empty());
        assert_eq!(bridge.key_state(Key::Char('w')), KeyState::Pressed);

        bridge.notify_key_released(Key::Char('w'), Modifiers::empty());
        assert_eq!(bridge.key_state(Key::Char('w')), KeyState::Released);
    }

    #[test]
    fn it_should_track_cursor_and_tracked_buttons() {
        let mut bridge = test_bridge();
        bridge.notify_cursor_moved(12.5, 34.0);
        assert_eq!(bridge.cursor_position(), (12.5, 34.0));

        bridge.notify_mouse_pressed(MouseButton::Left, Modifiers::SHIFT);
        assert_eq!(
            bridge.mouse_button_state(MouseButton::Left),
            MouseButtonState::Pressed
        );
        assert_eq!(bridge.modifiers(), Modifiers::SHIFT);

        // Untracked buttons never report as pressed.
        bridge.notify_mouse_pressed(MouseButton::Other(4), Modifiers::empty());
        assert_eq!(
            bridge.mouse_button_state(MouseButton::Other(4)),
            MouseButtonState::Released
        );

        bridge.notify_mouse_released(MouseButton::Left, Modifiers::empty());
        assert_eq!(
            bridge.mouse_button_state(MouseButton::Left),
            MouseButtonState::Released
        );
    }

    #[test]
    fn it_should_deduplicate_unchanged_positions_in_change_bounds() {
        let mut bridge = test_bridge();
        let moves: Arc<Mutex<Vec<WindowMoved>>> = Arc::new(Mutex::new(Vec::new()));
        let resizes = Arc::new(AtomicUsize::new(0));

        let moves_seen = moves.clone();
        bridge.events_mut().add_window_moved_listener(move |event| {
            moves_seen.lock().unwrap().push(*event);
        });
        let resizes_seen = resizes.clone();
        bridge.events_mut().add_window_resized_listener(move |_| {
            resizes_seen.fetch_add(1, Ordering::SeqCst);
        });

        bridge.change_bounds(10, 20, 640, 480);
        bridge.change_bounds(10, 20, 800, 600); // same position, new size
        bridge.change_bounds(30, 20, 800, 600);
        bridge.poll_events();

        let moves = moves.lock().unwrap();
        assert_eq!(
            moves.as_slice(),
            &[WindowMoved { x: 10, y: 20 }, WindowMoved { x: 30, y: 20 }]
        );
        assert_eq!(resizes.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn it_should_deliver_key_events_through_the_collector() {
        let mut bridge = test_bridge();
        let actions: Arc<Mutex<Vec<KeyAction>>> = Arc::new(Mutex::new(Vec::new()));
        let seen = actions.clone();
        bridge.events_mut().add_key_listener(move |event| {
            seen.lock().unwrap().push(event.action);
        });

        bridge.notify_key_pressed(Key::Escape, Modifiers::empty());
        bridge.notify_key_repeated(Key::Escape, Modifiers::empty());
        bridge.notify_key_released(Key::Escape, Modifiers::empty());
        bridge.poll_events();

        assert_eq!(
            actions.lock().unwrap().as_slice(),
            &[KeyAction::Press, KeyAction::Repeat, KeyAction::Release]
        );
    }

    #[test]
    fn it_should_latch_and_cancel_termination() {
        let mut bridge = test_bridge();
        assert!(!bridge.should_terminate());
        bridge.request_terminate();
        assert!(bridge.should_terminate());
        bridge.cancel_terminate();
        assert!(!bridge.should_terminate());
    }

    #[test]
    fn it_should_drop_events_and_frames_after_close() {
        let mut bridge = test_bridge();
        let deliveries = Arc::new(AtomicUsize::new(0));
        let seen = deliveries.clone();
        bridge.events_mut().add_cursor_listener(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        bridge.close();
        assert!(bridge.is_closed());
        bridge.notify_cursor_moved(1.0, 2.0);
        bridge.poll_events();
        assert_eq!(deliveries.load(Ordering::SeqCst), 0);

        bridge.frame_ready(4, 4, &[0u8; 64]);
        assert!(!bridge.has_pending_frame());

        // Second close is a no-op.
        bridge.close();
    }
}
