//! Scroll tuning, re-exported from `crate::config`, plus values derived from it

pub use crate::config::{EasingType, ScrollConfig, ScrollMode};

use super::easing::frames_to_settle;

pub trait ScrollConfigExt {
    fn tween_duration(&self) -> f64;

    /// Interval between frames of the simulated clock, in milliseconds
    fn frame_interval_ms(&self) -> f64;

    /// Whether wheel input animates at all
    fn is_smooth(&self) -> bool;

    /// Milliseconds the configured motion needs to cover `distance` pixels.
    /// None when scrolling is instant.
    fn settle_time_ms(&self, distance: f64) -> Option<f64>;
}

impl ScrollConfigExt for ScrollConfig {
    #[inline]
    fn tween_duration(&self) -> f64 {
        self.tween_duration_ms as f64
    }

    #[inline]
    fn frame_interval_ms(&self) -> f64 {
        match self.animation_fps {
            0 => 1000.0 / 60.0,
            fps => 1000.0 / fps as f64,
        }
    }

    #[inline]
    fn is_smooth(&self) -> bool {
        match self.mode {
            ScrollMode::Momentum => self.smooth_enabled,
            ScrollMode::Tween => self.smooth_enabled && self.tween_duration_ms > 0,
        }
    }

    fn settle_time_ms(&self, distance: f64) -> Option<f64> {
        if !self.is_smooth() {
            return None;
        }
        match self.mode {
            ScrollMode::Tween => Some(self.tween_duration()),
            ScrollMode::Momentum => frames_to_settle(distance, self.ease_factor, self.snap_epsilon)
                // one more frame snaps onto the target
                .map(|frames| (frames + 1) as f64 * self.frame_interval_ms()),
        }
    }
}
