//! Frame-clock timing for tweens
//!
//! Timestamps are milliseconds on the host's frame clock (`requestAnimationFrame`
//! timestamps in the browser, the simulated clock headless). A tween's clock
//! starts on the first frame that samples it, not when it is created, so input
//! arriving between frames never skips the first part of the curve.

/// Elapsed-time tracker for one fixed-duration motion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenClock {
    start_ms: Option<f64>,
    duration_ms: f64,
}

impl TweenClock {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            start_ms: None,
            duration_ms: duration_ms.max(0.0),
        }
    }

    pub fn has_started(&self) -> bool {
        self.start_ms.is_some()
    }

    /// Linear progress in [0, 1] at `now_ms`, and whether the duration has elapsed
    pub fn sample(&mut self, now_ms: f64) -> (f64, bool) {
        let start = *self.start_ms.get_or_insert(now_ms);
        let elapsed = now_ms - start;
        if self.duration_ms <= 0.0 || elapsed >= self.duration_ms {
            return (1.0, true);
        }
        ((elapsed / self.duration_ms).clamp(0.0, 1.0), false)
    }
}

#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_starts_on_first_sample() {
        let mut clock = TweenClock::new(200.0);
        assert!(!clock.has_started());
        assert_eq!(clock.sample(1000.0), (0.0, false));
        assert!(clock.has_started());
        assert_eq!(clock.sample(1050.0), (0.25, false));
        assert_eq!(clock.sample(1200.0), (1.0, true));
        assert_eq!(clock.sample(1500.0), (1.0, true));
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let mut clock = TweenClock::new(0.0);
        assert_eq!(clock.sample(5.0), (1.0, true));
        let mut negative = TweenClock::new(-10.0);
        assert_eq!(negative.sample(5.0), (1.0, true));
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(100.0, 300.0, 0.0), 100.0);
        assert_eq!(lerp(100.0, 300.0, 0.5), 200.0);
        assert_eq!(lerp(300.0, 100.0, 1.0), 100.0);
    }
}
