//! Horizontally scrollable regions
//!
//! A surface exposes its offset and extents; hosts implement [`ScrollSurface`]
//! for real elements and tests use [`VirtualSurface`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// What a surface is for on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurfaceRole {
    /// The main image row, authoritative for every link
    Primary,
    /// Fixed scrollbar mirroring the primary row 1:1
    Proxy,
    /// Row above the primary, kept in lockstep end-to-end
    Top,
    /// Second row, kept in lockstep end-to-end
    Secondary,
    /// Scrollbar shared by the primary and secondary rows
    SecondaryProxy,
    /// Background layer moving slower than the primary
    ParallaxBack,
    /// Foreground layer moving faster than the primary
    ParallaxFront,
}

impl SurfaceRole {
    pub const ALL: [SurfaceRole; 7] = [
        SurfaceRole::Primary,
        SurfaceRole::Proxy,
        SurfaceRole::Top,
        SurfaceRole::Secondary,
        SurfaceRole::SecondaryProxy,
        SurfaceRole::ParallaxBack,
        SurfaceRole::ParallaxFront,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceRole::Primary => "primary",
            SurfaceRole::Proxy => "proxy",
            SurfaceRole::Top => "top",
            SurfaceRole::Secondary => "secondary",
            SurfaceRole::SecondaryProxy => "secondary-proxy",
            SurfaceRole::ParallaxBack => "parallax-back",
            SurfaceRole::ParallaxFront => "parallax-front",
        }
    }

    /// Scrollbar stand-ins rather than content rows
    pub fn is_proxy(&self) -> bool {
        matches!(self, SurfaceRole::Proxy | SurfaceRole::SecondaryProxy)
    }
}

impl fmt::Display for SurfaceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A horizontally scrollable region
pub trait ScrollSurface {
    /// Current offset
    fn offset(&self) -> f64;

    /// Write the offset. Callers go through [`write_clamped`].
    fn set_offset(&mut self, offset: f64);

    /// Full scrollable content width
    fn content_extent(&self) -> f64;

    /// Width of the visible viewport
    fn visible_extent(&self) -> f64;

    /// Largest valid offset (0 when the content does not overflow)
    fn max_offset(&self) -> f64 {
        (self.content_extent() - self.visible_extent()).max(0.0)
    }

    /// Resize the virtual content of a proxy. Returns false when the surface
    /// has no sizer to resize.
    fn resize_content(&mut self, _extent: f64) -> bool {
        false
    }
}

/// Clamp `offset` into `[0, max]`, treating NaN as 0
#[inline]
pub fn clamp_offset(offset: f64, max: f64) -> f64 {
    if offset.is_nan() {
        return 0.0;
    }
    offset.clamp(0.0, max.max(0.0))
}

/// Clamp and write an offset, returning the value written
pub fn write_clamped<S: ScrollSurface + ?Sized>(surface: &mut S, offset: f64) -> f64 {
    let value = clamp_offset(offset, surface.max_offset());
    surface.set_offset(value);
    value
}

/// In-memory surface used by the headless simulation and tests
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualSurface {
    offset: f64,
    content: f64,
    visible: f64,
    writes: usize,
}

impl VirtualSurface {
    pub fn new(content: f64, visible: f64) -> Self {
        Self {
            offset: 0.0,
            content: content.max(0.0),
            visible: visible.max(0.0),
            writes: 0,
        }
    }

    /// Change the layout, re-clamping the offset like a browser does
    pub fn set_layout(&mut self, content: f64, visible: f64) {
        self.content = content.max(0.0);
        self.visible = visible.max(0.0);
        self.offset = clamp_offset(self.offset, self.max_offset());
    }

    /// Number of offset writes observed
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl ScrollSurface for VirtualSurface {
    fn offset(&self) -> f64 {
        self.offset
    }

    fn set_offset(&mut self, offset: f64) {
        self.writes += 1;
        self.offset = clamp_offset(offset, self.max_offset());
    }

    fn content_extent(&self) -> f64 {
        self.content
    }

    fn visible_extent(&self) -> f64 {
        self.visible
    }

    fn resize_content(&mut self, extent: f64) -> bool {
        self.set_layout(extent, self.visible);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_offset() {
        assert_eq!(VirtualSurface::new(3000.0, 1000.0).max_offset(), 2000.0);
        assert_eq!(VirtualSurface::new(800.0, 1000.0).max_offset(), 0.0);
    }

    #[test]
    fn test_write_clamped_both_directions() {
        let mut surface = VirtualSurface::new(3000.0, 1000.0);
        assert_eq!(write_clamped(&mut surface, 1_000_000.0), 2000.0);
        assert_eq!(surface.offset(), 2000.0);
        assert_eq!(write_clamped(&mut surface, -1_000_000.0), 0.0);
        assert_eq!(surface.offset(), 0.0);
        assert_eq!(write_clamped(&mut surface, f64::NAN), 0.0);
    }

    #[test]
    fn test_layout_change_reclamps() {
        let mut surface = VirtualSurface::new(3000.0, 1000.0);
        write_clamped(&mut surface, 1500.0);
        surface.set_layout(2000.0, 1000.0);
        assert_eq!(surface.offset(), 1000.0);
    }

    #[test]
    fn test_role_names() {
        assert_eq!(SurfaceRole::SecondaryProxy.to_string(), "secondary-proxy");
        assert!(SurfaceRole::Proxy.is_proxy());
        assert!(!SurfaceRole::Top.is_proxy());
    }
}
