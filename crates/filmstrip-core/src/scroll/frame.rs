//! Frame scheduling capability
//!
//! The engine never sleeps or reads a clock. It asks a [`FrameScheduler`] for a
//! callback on the next rendering frame and the host calls back into
//! `ScrollEngine::run_frame` with the frame timestamp. Browsers back this with
//! `requestAnimationFrame`; tests use [`ManualFrames`] and advance frames by hand.

use crate::surface::SurfaceRole;

/// Work a scheduled frame performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FrameTask {
    /// Advance the animator of one surface
    Animate(SurfaceRole),
    /// Recompute every eased dependent of one authoritative surface
    Coalesce(SurfaceRole),
}

/// Identifies one scheduled callback so it can be cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

pub trait FrameScheduler {
    /// Schedule `task` for the next frame. Returns None when the host cannot
    /// schedule frames.
    fn request_frame(&mut self, task: FrameTask) -> Option<FrameHandle>;

    /// Cancel a callback that has not run yet
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Deterministic scheduler: frames only run when the caller drains them
#[derive(Debug, Default)]
pub struct ManualFrames {
    next_handle: u64,
    queue: Vec<(FrameHandle, FrameTask)>,
    requested: usize,
    cancelled: usize,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every callback due on the next frame, in request order
    pub fn take_due(&mut self) -> Vec<(FrameHandle, FrameTask)> {
        std::mem::take(&mut self.queue)
    }

    /// Callbacks waiting for the next frame
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_scheduled(&self, task: FrameTask) -> bool {
        self.queue.iter().any(|(_, t)| *t == task)
    }

    /// Total callbacks ever requested
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Total callbacks cancelled before running
    pub fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl FrameScheduler for ManualFrames {
    fn request_frame(&mut self, task: FrameTask) -> Option<FrameHandle> {
        self.next_handle += 1;
        let handle = FrameHandle(self.next_handle);
        self.queue.push((handle, task));
        self.requested += 1;
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.queue.len();
        self.queue.retain(|(h, _)| *h != handle);
        if self.queue.len() != before {
            self.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_and_drain() {
        let mut frames = ManualFrames::new();
        let a = frames.request_frame(FrameTask::Animate(SurfaceRole::Primary)).unwrap();
        let b = frames.request_frame(FrameTask::Coalesce(SurfaceRole::Primary)).unwrap();
        assert_ne!(a, b);
        assert_eq!(frames.pending(), 2);

        let due = frames.take_due();
        assert_eq!(due.len(), 2);
        assert_eq!(due[0], (a, FrameTask::Animate(SurfaceRole::Primary)));
        assert!(frames.is_idle());
    }

    #[test]
    fn test_cancel_removes_only_pending() {
        let mut frames = ManualFrames::new();
        let a = frames.request_frame(FrameTask::Coalesce(SurfaceRole::Primary)).unwrap();
        frames.cancel_frame(a);
        frames.cancel_frame(a);
        assert!(frames.is_idle());
        assert_eq!(frames.cancelled(), 1);
        assert_eq!(frames.requested(), 1);
    }
}
