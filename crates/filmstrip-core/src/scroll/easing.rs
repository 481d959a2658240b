//! Easing curves
//!
//! Tweens sample an [`EasingType`] over normalized progress. Momentum uses
//! exponential smoothing instead: each frame closes a fixed fraction of the gap.

pub use crate::config::EasingType;

/// Sampling for the configured tween curve
pub trait EasingTypeExt {
    /// Eased progress in [0, 1] for progress `t` (clamped into [0, 1])
    fn sample(&self, t: f64) -> f64;
}

impl EasingTypeExt for EasingType {
    #[inline]
    fn sample(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingType::None => {
                if t < 1.0 {
                    0.0
                } else {
                    1.0
                }
            }
            EasingType::Linear => t,
            EasingType::EaseOutCubic => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            EasingType::EaseInOutQuad => ease_in_out_quad(t),
        }
    }
}

/// Quadratic ease-in-out: 2t² for the first half, -1 + (4 - 2t)t after
#[inline]
pub fn ease_in_out_quad(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

/// One exponential-smoothing step from `current` toward `target`
#[inline]
pub fn approach(current: f64, target: f64, factor: f64) -> f64 {
    current + (target - current) * factor
}

/// Frames momentum needs to close `gap` to within `epsilon` at `factor`.
/// None when the factor can never converge.
pub fn frames_to_settle(gap: f64, factor: f64, epsilon: f64) -> Option<u32> {
    if !(factor > 0.0 && factor < 1.0) || epsilon <= 0.0 {
        return None;
    }
    let gap = gap.abs();
    if gap < epsilon {
        return Some(0);
    }
    // gap * (1 - factor)^n < epsilon
    let n = ((epsilon / gap).ln() / (1.0 - factor).ln()).floor() as u32 + 1;
    Some(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVES: [EasingType; 3] = [
        EasingType::Linear,
        EasingType::EaseOutCubic,
        EasingType::EaseInOutQuad,
    ];

    #[test]
    fn test_curve_endpoints_and_order() {
        for easing in CURVES {
            assert!(easing.sample(0.0).abs() < 1e-9, "{:?} at t=0", easing);
            assert!((easing.sample(1.0) - 1.0).abs() < 1e-9, "{:?} at t=1", easing);
            let mut prev = 0.0;
            for i in 0..=10 {
                let v = easing.sample(i as f64 / 10.0);
                assert!(v >= prev, "{:?} not monotonic", easing);
                prev = v;
            }
        }
        assert_eq!(EasingType::None.sample(0.99), 0.0);
        assert_eq!(EasingType::None.sample(1.0), 1.0);
        assert_eq!(EasingType::Linear.sample(1.5), 1.0);
    }

    #[test]
    fn test_ease_in_out_quad_is_symmetric() {
        assert!((ease_in_out_quad(0.25) - 0.125).abs() < 1e-12);
        assert!((ease_in_out_quad(0.5) - 0.5).abs() < 1e-12);
        assert!((ease_in_out_quad(0.75) - 0.875).abs() < 1e-12);
        for i in 0..=20 {
            let t = i as f64 / 20.0;
            let mirrored = 1.0 - ease_in_out_quad(1.0 - t);
            assert!((ease_in_out_quad(t) - mirrored).abs() < 1e-9);
        }
    }

    #[test]
    fn test_frames_to_settle_matches_stepping() {
        let (target, factor, epsilon): (f64, f64, f64) = (500.0, 0.15, 0.1);
        let mut current = 0.0;
        let mut frames = 0;
        while (target - current).abs() >= epsilon {
            current = approach(current, target, factor);
            frames += 1;
        }
        assert_eq!(frames_to_settle(target, factor, epsilon), Some(frames));
        assert_eq!(frames_to_settle(0.05, factor, epsilon), Some(0));
        assert_eq!(frames_to_settle(500.0, 1.0, epsilon), None);
        assert_eq!(frames_to_settle(500.0, 0.0, epsilon), None);
    }
}
