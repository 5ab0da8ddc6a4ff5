// Cancellable per-frame callback. The host owns the actual scheduling
// (requestAnimationFrame in the browser); the loop decides when to ask and when to stop.

use serde::{Deserialize, Serialize};

/// Identifies one pending frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameHandle(u32);

impl FrameHandle {
    pub fn new(id: u32) -> Self {
        FrameHandle(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Host side of the frame loop.
pub trait FrameScheduler {
    /// Ask for a single callback on the next frame, delivering `handle`.
    fn request_frame(&mut self, handle: FrameHandle);

    /// Drop a pending request. Must be harmless for handles that already fired.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Repeating frame callback built from one-shot requests.
#[derive(Debug, Default)]
pub struct FrameLoop {
    next_id: u32,
    pending: Option<FrameHandle>,
    last_timestamp_ms: Option<f64>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Start requesting frames. No-op when already running.
    pub fn start<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if self.pending.is_some() {
            return;
        }
        self.last_timestamp_ms = None;
        self.request(scheduler);
    }

    /// Cancel the pending request, if any.
    pub fn stop<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
        self.last_timestamp_ms = None;
    }

    /// Handle a fired frame. Returns the elapsed milliseconds since the previous frame
    /// (0 for the first), or `None` for stale or cancelled handles. Requests the next frame.
    pub fn fire<S: FrameScheduler + ?Sized>(
        &mut self,
        handle: FrameHandle,
        now_ms: f64,
        scheduler: &mut S,
    ) -> Option<f64> {
        if self.pending != Some(handle) {
            return None;
        }
        let delta = match self.last_timestamp_ms {
            Some(last) if now_ms.is_finite() => (now_ms - last).max(0.0),
            _ => 0.0,
        };
        if now_ms.is_finite() {
            self.last_timestamp_ms = Some(now_ms);
        }
        self.pending = None;
        self.request(scheduler);
        Some(delta)
    }

    fn request<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        self.next_id = self.next_id.wrapping_add(1);
        let handle = FrameHandle::new(self.next_id);
        self.pending = Some(handle);
        scheduler.request_frame(handle);
    }
}

/// Scheduler that records requests; the caller fires frames by hand.
/// Used for deterministic stepping outside a browser.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pending: Vec<FrameHandle>,
    requested: u32,
    cancelled: u32,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent request still outstanding.
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending.last().copied()
    }

    /// Take the outstanding request, as a host would when the frame arrives.
    pub fn take_pending(&mut self) -> Option<FrameHandle> {
        self.pending.pop()
    }

    pub fn requested(&self) -> u32 {
        self.requested
    }

    pub fn cancelled(&self) -> u32 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self, handle: FrameHandle) {
        self.requested += 1;
        self.pending.push(handle);
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.pending.len();
        self.pending.retain(|h| *h != handle);
        if self.pending.len() != before {
            self.cancelled += 1;
        }
    }
}
