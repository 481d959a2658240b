//! Offset transfer functions between an authoritative and a dependent surface

use crate::surface::clamp_offset;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransferFn {
    /// `dependent = authoritative`; both surfaces share one maximum offset
    Identity,
    /// Same position ratio on both surfaces, end-to-end lockstep
    RatioRescale,
    /// Position ratio scaled by `speed`, clamped to the dependent's range
    Parallax { speed: f64 },
}

impl TransferFn {
    /// Dependent offset for the given authoritative offset.
    ///
    /// Ratios normalize by the authoritative surface's own maximum. Returns
    /// None when that maximum is 0 (nothing overflows, nothing to map).
    pub fn apply(&self, auth_offset: f64, auth_max: f64, dep_max: f64) -> Option<f64> {
        match *self {
            TransferFn::Identity => Some(clamp_offset(auth_offset, dep_max)),
            TransferFn::RatioRescale => {
                scroll_ratio(auth_offset, auth_max).map(|ratio| clamp_offset(ratio * dep_max, dep_max))
            }
            TransferFn::Parallax { speed } => scroll_ratio(auth_offset, auth_max)
                .map(|ratio| clamp_offset(ratio * dep_max * speed, dep_max)),
        }
    }
}

/// Position of `offset` within `[0, max]` as a fraction
#[inline]
pub fn scroll_ratio(offset: f64, max: f64) -> Option<f64> {
    if max <= 0.0 {
        return None;
    }
    Some((offset / max).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_rescale() {
        assert_eq!(TransferFn::RatioRescale.apply(50.0, 100.0, 200.0), Some(100.0));
        assert_eq!(TransferFn::RatioRescale.apply(100.0, 100.0, 37.0), Some(37.0));
    }

    #[test]
    fn test_parallax_clamps_overshoot() {
        let front = TransferFn::Parallax { speed: 1.3 };
        // ratio 0.9 -> 117 before clamping
        assert_eq!(front.apply(90.0, 100.0, 100.0), Some(100.0));

        let back = TransferFn::Parallax { speed: 0.3 };
        let slow = back.apply(50.0, 100.0, 200.0).unwrap();
        assert!((slow - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_authoritative_max_is_noop() {
        assert_eq!(TransferFn::RatioRescale.apply(0.0, 0.0, 500.0), None);
        assert_eq!(TransferFn::Parallax { speed: 0.3 }.apply(10.0, 0.0, 500.0), None);
    }

    #[test]
    fn test_identity_clamps_to_dependent() {
        assert_eq!(TransferFn::Identity.apply(250.0, 300.0, 300.0), Some(250.0));
        assert_eq!(TransferFn::Identity.apply(250.0, 300.0, 200.0), Some(200.0));
        assert_eq!(TransferFn::Identity.apply(0.0, 0.0, 0.0), Some(0.0));
    }
}
