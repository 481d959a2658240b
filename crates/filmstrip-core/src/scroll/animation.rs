//! Scroll animation controller
//!
//! Combines easing functions and timing utilities to drive one surface's
//! offset over successive frames. Two motions are supported:
//!
//! - momentum: the target accumulates input and the rendered offset chases it
//!   with exponential smoothing, snapping once it is within `snap_epsilon`
//! - tween: a fixed-duration eased scroll-by from a start offset
//!
//! The animator only computes offsets. The engine owns the surface, writes the
//! returned offset and schedules the next frame while [`ScrollAnimator::is_animating`].

use super::config::{ScrollConfig, ScrollConfigExt, ScrollMode};
use super::easing::{approach, EasingType, EasingTypeExt};
use super::timing::{lerp, TweenClock};
use crate::surface::clamp_offset;

/// Inertial tracking state of one surface
///
/// `target` is clamped into the surface range whenever it changes, before any
/// frame renders from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentumState {
    target: f64,
    current: f64,
    active: bool,
}

impl MomentumState {
    pub fn new(offset: f64) -> Self {
        Self {
            target: offset,
            current: offset,
            active: false,
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Accumulate `delta` into the target. Returns true on the Idle → Active transition.
    pub fn add(&mut self, delta: f64, max: f64) -> bool {
        self.target = clamp_offset(self.target + delta, max);
        self.activate()
    }

    /// Move the target in place. Returns true on the Idle → Active transition.
    pub fn retarget(&mut self, target: f64, max: f64) -> bool {
        self.target = clamp_offset(target, max);
        self.activate()
    }

    /// Advance one frame and return the offset to render
    pub fn step(&mut self, ease_factor: f64, snap_epsilon: f64, max: f64) -> f64 {
        // The layout may have shrunk since the target was set
        self.target = clamp_offset(self.target, max);

        let gap = self.target - self.current;
        if gap.abs() < snap_epsilon {
            self.current = self.target;
            self.active = false;
        } else {
            self.current = approach(self.current, self.target, ease_factor);
        }
        clamp_offset(self.current, max)
    }

    fn activate(&mut self) -> bool {
        let started = !self.active;
        self.active = true;
        started
    }

    fn settle(&mut self, offset: f64) {
        self.target = offset;
        self.current = offset;
        self.active = false;
    }
}

/// Active fixed-duration scroll-by
#[derive(Debug, Clone)]
struct ActiveTween {
    clock: TweenClock,
    from: f64,
    /// Total displacement
    delta: f64,
    easing: EasingType,
}

impl ActiveTween {
    fn end(&self) -> f64 {
        self.from + self.delta
    }
}

/// Per-surface scroll animation controller
#[derive(Debug, Clone)]
pub struct ScrollAnimator {
    config: ScrollConfig,
    /// Created lazily on the first momentum input
    momentum: Option<MomentumState>,
    tween: Option<ActiveTween>,
}

impl Default for ScrollAnimator {
    fn default() -> Self {
        Self::new(ScrollConfig::default())
    }
}

impl ScrollAnimator {
    /// Create a new scroll animator with configuration
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            momentum: None,
            tween: None,
        }
    }

    /// Check if a frame is needed to make progress
    #[inline]
    pub fn is_animating(&self) -> bool {
        self.tween.is_some() || self.momentum.is_some_and(|m| m.is_active())
    }

    pub fn momentum(&self) -> Option<&MomentumState> {
        self.momentum.as_ref()
    }

    /// Final offset of the running motion, if any
    pub fn target_offset(&self) -> Option<f64> {
        if let Some(tween) = &self.tween {
            return Some(tween.end());
        }
        self.momentum.filter(|m| m.is_active()).map(|m| m.target())
    }

    /// Accumulate momentum. `offset` is the surface's current offset, used to
    /// seed a fresh burst. Returns true when a new loop starts.
    pub fn add_momentum(&mut self, delta: f64, offset: f64, max: f64) -> bool {
        self.tween = None;
        let state = self.momentum_seeded(offset);
        state.add(delta, max)
    }

    /// Chase `target` with momentum, retargeting a running loop in place.
    /// Returns true when a new loop starts.
    pub fn advance_toward(&mut self, target: f64, offset: f64, max: f64) -> bool {
        self.tween = None;
        let state = self.momentum_seeded(offset);
        state.retarget(target, max)
    }

    /// Start an eased scroll-by of `delta` from `offset`.
    ///
    /// A tween that is still running is restarted from `offset` toward its old
    /// end plus `delta`, so repeated ticks compound. Returns true when no tween
    /// was running.
    pub fn animate_by(&mut self, delta: f64, offset: f64) -> bool {
        if let Some(momentum) = self.momentum.as_mut() {
            momentum.settle(offset);
        }

        let (remaining, started) = match self.tween.take() {
            Some(running) => (running.end() - offset, false),
            None => (0.0, true),
        };

        self.tween = Some(ActiveTween {
            clock: TweenClock::new(self.config.tween_duration()),
            from: offset,
            delta: remaining + delta,
            easing: self.config.easing,
        });
        started
    }

    /// Apply a scroll delta using the configured motion.
    ///
    /// Returns the offset to write immediately when smooth scrolling is off;
    /// otherwise None and the motion runs on subsequent frames.
    pub fn scroll_by(&mut self, delta: f64, offset: f64, max: f64) -> Option<f64> {
        if !self.config.is_smooth() {
            self.cancel(offset);
            return Some(clamp_offset(offset + delta, max));
        }

        match self.config.mode {
            ScrollMode::Momentum => {
                self.add_momentum(delta, offset, max);
            }
            ScrollMode::Tween => {
                self.animate_by(delta, offset);
            }
        }
        None
    }

    /// Advance one frame. Returns the offset to write, or None when idle.
    pub fn tick(&mut self, now_ms: f64, max: f64) -> Option<f64> {
        if let Some(tween) = self.tween.as_mut() {
            let (t, done) = tween.clock.sample(now_ms);
            let offset = clamp_offset(lerp(tween.from, tween.end(), tween.easing.sample(t)), max);
            if done {
                self.tween = None;
            }
            return Some(offset);
        }

        let ease_factor = self.config.ease_factor;
        let snap_epsilon = self.config.snap_epsilon;
        match self.momentum.as_mut() {
            Some(state) if state.is_active() => Some(state.step(ease_factor, snap_epsilon, max)),
            _ => None,
        }
    }

    /// Stop every motion and record `offset` as the resting position. Used when
    /// another writer takes over the surface.
    pub fn cancel(&mut self, offset: f64) {
        self.tween = None;
        if let Some(momentum) = self.momentum.as_mut() {
            momentum.settle(offset);
        }
    }

    /// Momentum state, reseeded from the surface when no burst is running
    fn momentum_seeded(&mut self, offset: f64) -> &mut MomentumState {
        let state = self.momentum.get_or_insert_with(|| MomentumState::new(offset));
        if !state.is_active() {
            state.settle(offset);
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn run_to_rest(animator: &mut ScrollAnimator, max: f64, limit: usize) -> (f64, usize) {
        let mut now = 0.0;
        let mut last = f64::NAN;
        let mut frames = 0;
        while animator.is_animating() {
            assert!(frames < limit, "animation did not terminate within {} frames", limit);
            now += FRAME_MS;
            if let Some(offset) = animator.tick(now, max) {
                last = offset;
            }
            frames += 1;
        }
        (last, frames)
    }

    #[test]
    fn test_momentum_converges_and_snaps() {
        let mut animator = ScrollAnimator::default();
        assert!(animator.advance_toward(500.0, 0.0, 2000.0));
        assert!(animator.is_animating());

        let (last, frames) = run_to_rest(&mut animator, 2000.0, 200);
        assert_eq!(last, 500.0);
        assert!(frames > 1);
        let state = animator.momentum().unwrap();
        assert_eq!(state.current(), 500.0);
        assert!(!state.is_active());
        assert_eq!(animator.tick(10_000.0, 2000.0), None);
    }

    #[test]
    fn test_momentum_step_is_exponential() {
        let mut state = MomentumState::new(0.0);
        state.retarget(100.0, 1000.0);
        let first = state.step(0.15, 0.1, 1000.0);
        assert!((first - 15.0).abs() < 1e-9);
        let second = state.step(0.15, 0.1, 1000.0);
        assert!((second - (15.0 + 85.0 * 0.15)).abs() < 1e-9);
    }

    #[test]
    fn test_advance_toward_retargets_in_place() {
        let mut animator = ScrollAnimator::default();
        assert!(animator.advance_toward(300.0, 0.0, 1000.0));
        animator.tick(FRAME_MS, 1000.0);
        // Second call while active must not start another loop
        assert!(!animator.advance_toward(600.0, 45.0, 1000.0));
        assert_eq!(animator.target_offset(), Some(600.0));
        let current = animator.momentum().unwrap().current();
        assert!((current - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_momentum_accumulates_and_clamps() {
        let mut animator = ScrollAnimator::default();
        assert!(animator.add_momentum(100.0, 0.0, 1000.0));
        assert!(!animator.add_momentum(100.0, 0.0, 1000.0));
        assert_eq!(animator.target_offset(), Some(200.0));

        animator.add_momentum(1_000_000.0, 0.0, 1000.0);
        assert_eq!(animator.target_offset(), Some(1000.0));

        animator.add_momentum(-5_000_000.0, 0.0, 1000.0);
        assert_eq!(animator.target_offset(), Some(0.0));
    }

    #[test]
    fn test_fresh_burst_seeds_from_surface() {
        let mut animator = ScrollAnimator::default();
        animator.add_momentum(100.0, 0.0, 1000.0);
        run_to_rest(&mut animator, 1000.0, 200);

        // The user dragged the surface to 700 in between
        animator.add_momentum(50.0, 700.0, 1000.0);
        assert_eq!(animator.target_offset(), Some(750.0));
    }

    #[test]
    fn test_tween_follows_ease_in_out_quad() {
        let config = ScrollConfig {
            mode: ScrollMode::Tween,
            tween_duration_ms: 200,
            ..Default::default()
        };
        let mut animator = ScrollAnimator::new(config);
        assert!(animator.animate_by(400.0, 100.0));

        // First frame establishes the clock
        assert_eq!(animator.tick(1000.0, 5000.0), Some(100.0));
        // p = 0.25 -> 2p^2 = 0.125
        assert_eq!(animator.tick(1050.0, 5000.0), Some(150.0));
        // p = 0.75 -> -1 + (4 - 1.5) * 0.75 = 0.875
        assert_eq!(animator.tick(1150.0, 5000.0), Some(450.0));
        assert_eq!(animator.tick(1200.0, 5000.0), Some(500.0));
        assert!(!animator.is_animating());
    }

    #[test]
    fn test_tween_restart_compounds() {
        let config = ScrollConfig {
            mode: ScrollMode::Tween,
            ..Default::default()
        };
        let mut animator = ScrollAnimator::new(config);
        animator.animate_by(100.0, 0.0);
        animator.tick(0.0, 1000.0);
        let mid = animator.tick(100.0, 1000.0).unwrap();
        assert!(!animator.animate_by(100.0, mid));
        assert_eq!(animator.target_offset(), Some(200.0));
    }

    #[test]
    fn test_tween_clamps_written_offset() {
        let config = ScrollConfig {
            mode: ScrollMode::Tween,
            ..Default::default()
        };
        let mut animator = ScrollAnimator::new(config);
        animator.scroll_by(-10_000.0, 50.0, 300.0);
        animator.tick(0.0, 300.0);
        for step in 1..=20 {
            let offset = animator.tick(step as f64 * FRAME_MS, 300.0).unwrap_or(0.0);
            assert!((0.0..=300.0).contains(&offset));
        }
        assert!(!animator.is_animating());
    }

    #[test]
    fn test_instant_scroll_when_disabled() {
        let config = ScrollConfig {
            smooth_enabled: false,
            ..Default::default()
        };
        let mut animator = ScrollAnimator::new(config);
        assert_eq!(animator.scroll_by(150.0, 100.0, 200.0), Some(200.0));
        assert!(!animator.is_animating());
    }

    #[test]
    fn test_cancel_hands_over_position() {
        let mut animator = ScrollAnimator::default();
        animator.add_momentum(500.0, 0.0, 1000.0);
        animator.tick(FRAME_MS, 1000.0);
        animator.cancel(320.0);
        assert!(!animator.is_animating());
        assert_eq!(animator.momentum().unwrap().current(), 320.0);
    }

    #[test]
    fn test_target_reclamped_after_layout_shrinks() {
        let mut animator = ScrollAnimator::default();
        animator.advance_toward(900.0, 0.0, 1000.0);
        let (last, _) = run_to_rest(&mut animator, 400.0, 200);
        assert_eq!(last, 400.0);
    }
}
