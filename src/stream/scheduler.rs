// src/stream/scheduler.rs

//! The copy scheduler: a persistent background worker that turns
//! "a frame is ready" notifications into exactly the right number of
//! copy operations.
//!
//! The three-thread coordination problem: the render role must
//! never block on the UI role, the UI role must never observe a
//! half-written image, and a burst of frames must never spawn a burst
//! of threads. The scheduler solves it with a depth-1 coalescing slot
//! (`staged`) consumed by one long-lived worker:
//!
//! - `FrameSender::frame_ready` stages pixels into the slot under a
//!   short lock, replacing any frame that was staged but not yet
//!   claimed. The two endpoints of a burst are therefore never lost,
//!   while intermediate frames may be.
//! - The worker waits (condvar, not spin) until the UI has consumed the
//!   previous publication, claims the slot, transcodes into the back
//!   image, and swaps front/back handles under the publish lock. The
//!   swap is the sole publication point.
//! - Because the worker loops back to the slot immediately, a frame
//!   staged mid-copy chains into the next copy with no new thread.

use anyhow::{Context, Result};
use log::{debug, info, trace, warn};
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use crate::config::StreamConfig;
use crate::stream::image::{ImageBuffer, ImageHandle};
use crate::stream::staging::StagingBuffer;

/// Staging slots shared by the render role and the worker.
///
/// `staged` occupied means a copy job is pending; `spare` holds the
/// previously copied buffer for reuse. Because a buffer is always in
/// exactly one slot (or owned by exactly one role), resizing can never
/// race an in-flight copy.
#[derive(Default)]
struct StagingSlots {
    staged: Option<StagingBuffer>,
    spare: Option<StagingBuffer>,
}

struct PublishState {
    front: ImageHandle,
    front_pending: bool,
    frames_published: u64,
}

struct Shared {
    closed: AtomicBool,
    staging: Mutex<StagingSlots>,
    /// Signaled when a frame is staged or the scheduler closes.
    staged_cv: Condvar,
    publish: Mutex<PublishState>,
    /// Signaled when the UI consumes a publication or the scheduler closes.
    consumed_cv: Condvar,
}

impl Shared {
    fn lock_staging(&self) -> MutexGuard<'_, StagingSlots> {
        self.staging.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn lock_publish(&self) -> MutexGuard<'_, PublishState> {
        self.publish.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Render-role handle: notifies the scheduler that a frame is ready.
#[derive(Clone)]
pub struct FrameSender {
    shared: Arc<Shared>,
}

impl FrameSender {
    /// Stage one completed frame (BGRA8, `width * height * 4` bytes).
    ///
    /// Runs on the render thread; the only blocking is the staging
    /// lock, which the worker holds just long enough to take or return
    /// a slot. Invalid frames are logged and dropped; nothing
    /// propagates to the caller. After close, frames are silently
    /// discarded.
    pub fn frame_ready(&self, width: u32, height: u32, pixels: &[u8]) {
        if self.shared.is_closed() {
            trace!("FrameSender: dropping frame staged after close");
            return;
        }

        let staged = {
            let mut slots = self.shared.lock_staging();
            // Prefer overwriting an unclaimed frame (latest wins), then
            // the spare from the last completed copy.
            let from_staged = slots.staged.is_some();
            let mut buffer = slots
                .staged
                .take()
                .or_else(|| slots.spare.take())
                .unwrap_or_else(StagingBuffer::empty);

            match buffer.stage(width, height, pixels) {
                Ok(()) => {
                    slots.staged = Some(buffer);
                    true
                }
                Err(e) => {
                    warn!("FrameSender: dropping frame: {}", e);
                    // `stage` validates before it touches the buffer, so
                    // a frame taken from the staged slot is intact; put
                    // it back rather than losing it to the bad frame.
                    if from_staged {
                        slots.staged = Some(buffer);
                    } else {
                        slots.spare = Some(buffer);
                    }
                    from_staged
                }
            }
        };

        if staged {
            self.shared.staged_cv.notify_one();
        }
    }
}

/// UI-role handle: checks for and reads the published front image.
#[derive(Clone)]
pub struct FrameView {
    shared: Arc<Shared>,
}

impl FrameView {
    /// True if a publication happened since the last `front_image` call.
    pub fn has_pending_frame(&self) -> bool {
        self.shared.lock_publish().front_pending
    }

    /// The currently published front image.
    ///
    /// Consuming a pending publication releases the worker's
    /// backpressure wait, allowing the next copy to publish. The
    /// returned handle remains readable after later swaps.
    pub fn front_image(&self) -> ImageHandle {
        let mut publish = self.shared.lock_publish();
        if publish.front_pending {
            publish.front_pending = false;
            self.shared.consumed_cv.notify_one();
        }
        publish.front.clone()
    }

    /// Total number of completed publications.
    pub fn frames_published(&self) -> u64 {
        self.shared.lock_publish().frames_published
    }
}

/// Owns the staging slots, the publish state, and the copy worker.
pub struct CopyScheduler {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl CopyScheduler {
    /// Spawn the scheduler with its persistent copy worker.
    pub fn spawn(config: &StreamConfig) -> Result<Self> {
        let initial = ImageBuffer::new(config.initial_width, config.initial_height);
        let shared = Arc::new(Shared {
            closed: AtomicBool::new(false),
            staging: Mutex::new(StagingSlots::default()),
            staged_cv: Condvar::new(),
            publish: Mutex::new(PublishState {
                front: Arc::new(initial.clone()),
                front_pending: false,
                frames_published: 0,
            }),
            consumed_cv: Condvar::new(),
        });

        let worker_shared = shared.clone();
        let back = Arc::new(initial);
        let worker = thread::Builder::new()
            .name(config.worker_thread_name.clone())
            .spawn(move || Self::worker_main(worker_shared, back))
            .context("Failed to spawn copy worker thread")?;

        debug!("CopyScheduler: worker spawned");
        Ok(CopyScheduler {
            shared,
            worker: Some(worker),
        })
    }

    pub fn sender(&self) -> FrameSender {
        FrameSender {
            shared: self.shared.clone(),
        }
    }

    pub fn view(&self) -> FrameView {
        FrameView {
            shared: self.shared.clone(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Stop accepting frames and join the worker.
    ///
    /// An in-flight copy finishes (its publication may still land) but
    /// no new copy starts after this returns. Idempotent.
    pub fn close(&mut self) {
        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        // Lock-then-notify so a worker mid-wait cannot miss the flag.
        drop(self.shared.lock_staging());
        self.shared.staged_cv.notify_all();
        drop(self.shared.lock_publish());
        self.shared.consumed_cv.notify_all();

        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("CopyScheduler: worker thread panicked");
            }
        }
        info!("CopyScheduler: closed");
    }

    fn worker_main(shared: Arc<Shared>, mut back: ImageHandle) {
        debug!("CopyScheduler worker: starting");
        loop {
            // Wait for a staged frame.
            {
                let mut slots = shared.lock_staging();
                while slots.staged.is_none() {
                    if shared.is_closed() {
                        debug!("CopyScheduler worker: closed while idle, exiting");
                        return;
                    }
                    slots = shared
                        .staged_cv
                        .wait(slots)
                        .unwrap_or_else(|p| p.into_inner());
                }
            }

            // Backpressure: do not overwrite a publication the UI has
            // not consumed yet.
            {
                let mut publish = shared.lock_publish();
                while publish.front_pending {
                    if shared.is_closed() {
                        debug!("CopyScheduler worker: closed while waiting, exiting");
                        return;
                    }
                    publish = shared
                        .consumed_cv
                        .wait(publish)
                        .unwrap_or_else(|p| p.into_inner());
                }
            }

            // Claim the staged bytes. A newer frame may have replaced
            // the one that woke us; we always copy the latest.
            let Some(buffer) = shared.lock_staging().staged.take() else {
                continue;
            };

            if shared.is_closed() {
                debug!("CopyScheduler worker: closed before copy, discarding frame");
                return;
            }

            let (width, height) = (buffer.width(), buffer.height());
            trace!("CopyScheduler worker: copying {}x{} frame", width, height);

            // The back handle is unique unless the UI still holds it
            // from before the last swap; then make_mut clones rather
            // than write under a live reader.
            Arc::make_mut(&mut back).write_bgra(width, height, buffer.bytes());

            {
                let mut publish = shared.lock_publish();
                mem::swap(&mut publish.front, &mut back);
                publish.front_pending = true;
                publish.frames_published += 1;
            }

            // Return the staging buffer for reuse.
            let mut slots = shared.lock_staging();
            if slots.spare.is_none() {
                slots.spare = Some(buffer);
            }
        }
    }
}

impl Drop for CopyScheduler {
    fn drop(&mut self) {
        self.close();
    }
}
