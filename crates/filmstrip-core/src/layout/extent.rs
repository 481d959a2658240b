//! Proxy extent tracking
//!
//! A proxy scrollbar only scrolls as far as its virtual content is wide. That
//! width has to follow the rows it stands in for, which change size as images
//! load and the viewport resizes.

use crate::surface::SurfaceRole;

/// Keeps one proxy's content width equal to the widest of its source rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtentTracker {
    proxy: SurfaceRole,
    sources: Vec<SurfaceRole>,
}

impl ExtentTracker {
    pub fn new(proxy: SurfaceRole, sources: Vec<SurfaceRole>) -> Self {
        Self { proxy, sources }
    }

    /// The primary scrollbar tracks the primary row; the shared scrollbar
    /// tracks the wider of the primary and secondary rows
    pub fn standard() -> Vec<Self> {
        vec![
            Self::new(SurfaceRole::Proxy, vec![SurfaceRole::Primary]),
            Self::new(
                SurfaceRole::SecondaryProxy,
                vec![SurfaceRole::Primary, SurfaceRole::Secondary],
            ),
        ]
    }

    pub fn proxy(&self) -> SurfaceRole {
        self.proxy
    }

    pub fn sources(&self) -> &[SurfaceRole] {
        &self.sources
    }

    /// Drop absent sources. Returns None when the proxy or every source is missing.
    pub fn retain_present(mut self, present: impl Fn(SurfaceRole) -> bool) -> Option<Self> {
        if !present(self.proxy) {
            tracing::debug!("Skipping extent tracking for {}: proxy missing", self.proxy);
            return None;
        }
        self.sources.retain(|role| present(*role));
        if self.sources.is_empty() {
            tracing::debug!("Skipping extent tracking for {}: no source rows", self.proxy);
            return None;
        }
        Some(self)
    }

    /// Widest content extent among the sources that can be measured
    pub fn measure(&self, content_of: impl Fn(SurfaceRole) -> Option<f64>) -> Option<f64> {
        self.sources
            .iter()
            .filter_map(|role| content_of(*role))
            .fold(None, |widest: Option<f64>, width| {
                Some(widest.map_or(width, |w| w.max(width)))
            })
    }
}
