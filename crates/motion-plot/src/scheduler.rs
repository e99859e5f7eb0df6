//! Display-refresh scheduling.
//!
//! A scheduler hands out one `FrameHandle` per requested tick. The host
//! delivers the handle back to the plot when the tick fires; cancelled or
//! superseded handles are ignored by the receiver.

use std::sync::Arc;
use winit::window::Window;

/// Identifies one requested display tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

pub trait FrameScheduler {
    /// Ask for a callback on the next display refresh.
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a request. Unknown or already fired handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Scheduler driven by hand. Used headless and in tests.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Vec<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the next display refresh: returns every handle due on it.
    pub fn tick(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[FrameHandle] {
        &self.pending
    }

    /// Total requests made.
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Total requests withdrawn.
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.pending.len();
        self.pending.retain(|&h| h != handle);
        if self.pending.len() != before {
            self.cancelled += 1;
        }
    }
}

/// Scheduler backed by winit redraw requests.
///
/// `request_frame` asks the window for a redraw; the host calls `take_due`
/// from `WindowEvent::RedrawRequested` to get the handle for that tick.
pub struct WindowScheduler {
    window: Arc<Window>,
    next_id: u64,
    pending: Option<FrameHandle>,
}

impl WindowScheduler {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            next_id: 0,
            pending: None,
        }
    }

    /// Handle due on the redraw being processed, if any plot asked for one.
    pub fn take_due(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }
}

impl FrameScheduler for WindowScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending = Some(handle);
        self.window.request_redraw();
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_scheduler_hands_out_unique_handles() {
        let mut scheduler = ManualScheduler::new();
        let a = scheduler.request_frame();
        let b = scheduler.request_frame();
        assert_ne!(a, b);
        assert_eq!(scheduler.tick(), vec![a, b]);
        assert!(scheduler.tick().is_empty());
    }

    #[test]
    fn manual_scheduler_cancel() {
        let mut scheduler = ManualScheduler::new();
        let a = scheduler.request_frame();
        scheduler.cancel_frame(a);
        scheduler.cancel_frame(a);
        assert!(scheduler.pending().is_empty());
        assert_eq!(scheduler.cancelled(), 1);
        assert_eq!(scheduler.requested(), 1);
    }
}
