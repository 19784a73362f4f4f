// src/events/collector.rs

//! The event collector and its thread-safe sink.
//!
//! `EventSink` is the producer half handed to the native callback layer:
//! every method is a short-critical-section FIFO append that never
//! blocks on listener code and never panics outward. `EventCollector`
//! is the consumer half owned by the designated event thread; its
//! `poll_events` detaches each category's pending queue in a single
//! swap and only then invokes listeners, so an enqueue arriving from a
//! listener (or any other thread) mid-dispatch simply lands in the next
//! cycle.

use log::trace;
use std::collections::VecDeque;
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::events::registry::{ListenerId, ListenerSet};
use crate::events::{
    ButtonAction, CharInput, CloseRequested, CursorBoundary, CursorMoved, FocusChange,
    FramebufferResized, IconifyChange, KeyAction, KeyInput, MouseInput, RefreshRequested, Scroll,
    WindowMoved, WindowResized,
};
use crate::input::{Key, Modifiers, MouseButton};

/// A thread-safe FIFO for one event category.
struct EventQueue<E> {
    pending: Mutex<VecDeque<E>>,
}

impl<E> EventQueue<E> {
    fn new() -> Self {
        EventQueue {
            pending: Mutex::new(VecDeque::new()),
        }
    }

    // Enqueue must never panic; a poisoned lock still guards a usable
    // queue, so recover it rather than unwind into the native callback.
    fn push(&self, event: E) {
        match self.pending.lock() {
            Ok(mut queue) => queue.push_back(event),
            Err(poisoned) => poisoned.into_inner().push_back(event),
        }
    }

    /// Detach the entire pending queue in one swap. The lock is not held
    /// while the returned events are dispatched.
    fn detach(&self) -> VecDeque<E> {
        match self.pending.lock() {
            Ok(mut queue) => mem::take(&mut *queue),
            Err(poisoned) => mem::take(&mut *poisoned.into_inner()),
        }
    }
}

/// One queue per event category, shared between the sink and collector.
struct SharedQueues {
    closed: AtomicBool,
    window_moved: EventQueue<WindowMoved>,
    window_resized: EventQueue<WindowResized>,
    framebuffer_resized: EventQueue<FramebufferResized>,
    close_requested: EventQueue<CloseRequested>,
    refresh_requested: EventQueue<RefreshRequested>,
    focus: EventQueue<FocusChange>,
    iconify: EventQueue<IconifyChange>,
    key: EventQueue<KeyInput>,
    character: EventQueue<CharInput>,
    mouse: EventQueue<MouseInput>,
    cursor: EventQueue<CursorMoved>,
    cursor_boundary: EventQueue<CursorBoundary>,
    scroll: EventQueue<Scroll>,
}

impl SharedQueues {
    fn new() -> Self {
        SharedQueues {
            closed: AtomicBool::new(false),
            window_moved: EventQueue::new(),
            window_resized: EventQueue::new(),
            framebuffer_resized: EventQueue::new(),
            close_requested: EventQueue::new(),
            refresh_requested: EventQueue::new(),
            focus: EventQueue::new(),
            iconify: EventQueue::new(),
            key: EventQueue::new(),
            character: EventQueue::new(),
            mouse: EventQueue::new(),
            cursor: EventQueue::new(),
            cursor_boundary: EventQueue::new(),
            scroll: EventQueue::new(),
        }
    }
}

/// Thread-safe producer handle for the native callback layer.
///
/// Cloning is cheap; all clones feed the same collector. After the
/// collector is closed every enqueue is silently dropped.
#[derive(Clone)]
pub struct EventSink {
    shared: Arc<SharedQueues>,
}

impl EventSink {
    fn accepting(&self) -> bool {
        if self.shared.closed.load(Ordering::Acquire) {
            trace!("EventSink: dropping event enqueued after close");
            false
        } else {
            true
        }
    }

    pub fn window_moved(&self, x: i32, y: i32) {
        if self.accepting() {
            self.shared.window_moved.push(WindowMoved { x, y });
        }
    }

    pub fn window_resized(&self, width: u32, height: u32) {
        if self.accepting() {
            self.shared.window_resized.push(WindowResized { width, height });
        }
    }

    pub fn framebuffer_resized(&self, width: u32, height: u32) {
        if self.accepting() {
            self.shared
                .framebuffer_resized
                .push(FramebufferResized { width, height });
        }
    }

    pub fn close_requested(&self) {
        if self.accepting() {
            self.shared.close_requested.push(CloseRequested);
        }
    }

    pub fn refresh_requested(&self) {
        if self.accepting() {
            self.shared.refresh_requested.push(RefreshRequested);
        }
    }

    pub fn focus_gained(&self) {
        if self.accepting() {
            self.shared.focus.push(FocusChange::Gained);
        }
    }

    pub fn focus_lost(&self) {
        if self.accepting() {
            self.shared.focus.push(FocusChange::Lost);
        }
    }

    pub fn iconified(&self) {
        if self.accepting() {
            self.shared.iconify.push(IconifyChange::Iconified);
        }
    }

    pub fn restored(&self) {
        if self.accepting() {
            self.shared.iconify.push(IconifyChange::Restored);
        }
    }

    pub fn press_key(&self, key: Key, modifiers: Modifiers) {
        if self.accepting() {
            self.shared.key.push(KeyInput {
                key,
                action: KeyAction::Press,
                modifiers,
            });
        }
    }

    pub fn release_key(&self, key: Key, modifiers: Modifiers) {
        if self.accepting() {
            self.shared.key.push(KeyInput {
                key,
                action: KeyAction::Release,
                modifiers,
            });
        }
    }

    pub fn repeat_key(&self, key: Key, modifiers: Modifiers) {
        if self.accepting() {
            self.shared.key.push(KeyInput {
                key,
                action: KeyAction::Repeat,
                modifiers,
            });
        }
    }

    pub fn type_character(&self, character: char, modifiers: Modifiers) {
        if self.accepting() {
            self.shared.character.push(CharInput {
                character,
                modifiers,
            });
        }
    }

    pub fn press_mouse_button(&self, button: MouseButton, x: f64, y: f64, modifiers: Modifiers) {
        if self.accepting() {
            self.shared.mouse.push(MouseInput {
                button,
                action: ButtonAction::Press,
                x,
                y,
                modifiers,
            });
        }
    }

    pub fn release_mouse_button(&self, button: MouseButton, x: f64, y: f64, modifiers: Modifiers) {
        if self.accepting() {
            self.shared.mouse.push(MouseInput {
                button,
                action: ButtonAction::Release,
                x,
                y,
                modifiers,
            });
        }
    }

    pub fn move_cursor(&self, x: f64, y: f64) {
        if self.accepting() {
            self.shared.cursor.push(CursorMoved { x, y });
        }
    }

    pub fn cursor_entered(&self) {
        if self.accepting() {
            self.shared.cursor_boundary.push(CursorBoundary::Entered);
        }
    }

    pub fn cursor_exited(&self) {
        if self.accepting() {
            self.shared.cursor_boundary.push(CursorBoundary::Exited);
        }
    }

    pub fn scroll(&self, dx: f64, dy: f64) {
        if self.accepting() {
            self.shared.scroll.push(Scroll { dx, dy });
        }
    }
}

// Generates the add/remove registration pair for one category.
macro_rules! listener_accessors {
    ($($add:ident / $remove:ident => $field:ident : $payload:ty;)*) => {
        $(
            pub fn $add(
                &mut self,
                listener: impl FnMut(&$payload) + Send + 'static,
            ) -> ListenerId {
                self.$field.add(listener)
            }

            pub fn $remove(&mut self, id: ListenerId) -> bool {
                self.$field.remove(id)
            }
        )*
    };
}

/// Consumer half: owns the listener registries and drains the queues.
///
/// `poll_events` must be called from a single designated thread (the
/// thread driving the UI/render loop). Registration takes `&mut self`,
/// so a listener cannot mutate the registries of the collector that is
/// currently dispatching to it.
pub struct EventCollector {
    shared: Arc<SharedQueues>,
    window_moved: ListenerSet<WindowMoved>,
    window_resized: ListenerSet<WindowResized>,
    framebuffer_resized: ListenerSet<FramebufferResized>,
    close_requested: ListenerSet<CloseRequested>,
    refresh_requested: ListenerSet<RefreshRequested>,
    focus: ListenerSet<FocusChange>,
    iconify: ListenerSet<IconifyChange>,
    key: ListenerSet<KeyInput>,
    character: ListenerSet<CharInput>,
    mouse: ListenerSet<MouseInput>,
    cursor: ListenerSet<CursorMoved>,
    cursor_boundary: ListenerSet<CursorBoundary>,
    scroll: ListenerSet<Scroll>,
}

impl EventCollector {
    pub fn new() -> Self {
        EventCollector {
            shared: Arc::new(SharedQueues::new()),
            window_moved: ListenerSet::new(),
            window_resized: ListenerSet::new(),
            framebuffer_resized: ListenerSet::new(),
            close_requested: ListenerSet::new(),
            refresh_requested: ListenerSet::new(),
            focus: ListenerSet::new(),
            iconify: ListenerSet::new(),
            key: ListenerSet::new(),
            character: ListenerSet::new(),
            mouse: ListenerSet::new(),
            cursor: ListenerSet::new(),
            cursor_boundary: ListenerSet::new(),
            scroll: ListenerSet::new(),
        }
    }

    /// A producer handle for the native callback layer.
    pub fn sink(&self) -> EventSink {
        EventSink {
            shared: self.shared.clone(),
        }
    }

    /// Stop accepting events. Already-pending queues are discarded
    /// without dispatch on the next `poll_events` call.
    pub fn close(&self) {
        self.shared.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Drain every category and deliver the detached events, in
    /// submission order per category, to the registered listeners.
    pub fn poll_events(&mut self) {
        if self.is_closed() {
            self.discard_pending();
            return;
        }

        Self::poll_lane(&self.shared.window_moved, &mut self.window_moved);
        Self::poll_lane(&self.shared.window_resized, &mut self.window_resized);
        Self::poll_lane(
            &self.shared.framebuffer_resized,
            &mut self.framebuffer_resized,
        );
        Self::poll_lane(&self.shared.close_requested, &mut self.close_requested);
        Self::poll_lane(&self.shared.refresh_requested, &mut self.refresh_requested);
        Self::poll_lane(&self.shared.focus, &mut self.focus);
        Self::poll_lane(&self.shared.iconify, &mut self.iconify);
        Self::poll_lane(&self.shared.key, &mut self.key);
        Self::poll_lane(&self.shared.character, &mut self.character);
        Self::poll_lane(&self.shared.mouse, &mut self.mouse);
        Self::poll_lane(&self.shared.cursor, &mut self.cursor);
        Self::poll_lane(&self.shared.cursor_boundary, &mut self.cursor_boundary);
        Self::poll_lane(&self.shared.scroll, &mut self.scroll);
    }

    fn poll_lane<E>(queue: &EventQueue<E>, listeners: &mut ListenerSet<E>) {
        // Queue lock is released before any listener runs.
        let batch = queue.detach();
        for event in &batch {
            listeners.dispatch(event);
        }
    }

    fn discard_pending(&self) {
        let shared = &self.shared;
        shared.window_moved.detach();
        shared.window_resized.detach();
        shared.framebuffer_resized.detach();
        shared.close_requested.detach();
        shared.refresh_requested.detach();
        shared.focus.detach();
        shared.iconify.detach();
        shared.key.detach();
        shared.character.detach();
        shared.mouse.detach();
        shared.cursor.detach();
        shared.cursor_boundary.detach();
        shared.scroll.detach();
    }

    listener_accessors! {
        add_window_moved_listener / remove_window_moved_listener => window_moved: WindowMoved;
        add_window_resized_listener / remove_window_resized_listener => window_resized: WindowResized;
        add_framebuffer_resized_listener / remove_framebuffer_resized_listener => framebuffer_resized: FramebufferResized;
        add_close_requested_listener / remove_close_requested_listener => close_requested: CloseRequested;
        add_refresh_listener / remove_refresh_listener => refresh_requested: RefreshRequested;
        add_focus_listener / remove_focus_listener => focus: FocusChange;
        add_iconify_listener / remove_iconify_listener => iconify: IconifyChange;
        add_key_listener / remove_key_listener => key: KeyInput;
        add_character_listener / remove_character_listener => character: CharInput;
        add_mouse_listener / remove_mouse_listener => mouse: MouseInput;
        add_cursor_listener / remove_cursor_listener => cursor: CursorMoved;
        add_cursor_boundary_listener / remove_cursor_boundary_listener => cursor_boundary: CursorBoundary;
        add_scroll_listener / remove_scroll_listener => scroll: Scroll;
    }
}

impl Default for EventCollector {
    fn default() -> Self {
        Self::new()
    }
}
