//! Wheel routing
//!
//! Vertical wheel input is redirected into horizontal motion. Surfaces with
//! their own listener handle input over them; a document-level listener covers
//! the rest of the page and redirects into the primary row.

use std::collections::BTreeSet;

use crate::surface::SurfaceRole;

/// Where the listener that received the event is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelListener {
    /// A surface's own listener
    Surface(SurfaceRole),
    /// The document-level fallback
    Document,
}

/// A wheel event as seen by one listener, deltas in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelInput {
    pub delta_x: f64,
    pub delta_y: f64,
    pub listener: WheelListener,
    /// Nearest known surface container that contains the event target
    pub target: Option<SurfaceRole>,
}

impl WheelInput {
    pub fn new(delta_x: f64, delta_y: f64, listener: WheelListener, target: Option<SurfaceRole>) -> Self {
        Self {
            delta_x,
            delta_y,
            listener,
            target,
        }
    }

    /// Vertical-dominant input is the only kind ever redirected
    pub fn is_vertical(&self) -> bool {
        self.delta_y.abs() > self.delta_x.abs()
    }
}

/// Unit of a wheel event's deltas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaMode {
    Pixel,
    Line,
    Page,
}

impl DeltaMode {
    /// Map a DOM `WheelEvent.deltaMode` value; unknown values are pixels
    pub fn from_dom(mode: u32) -> Self {
        match mode {
            1 => DeltaMode::Line,
            2 => DeltaMode::Page,
            _ => DeltaMode::Pixel,
        }
    }

    pub fn to_pixels(self, delta: f64, line_height: f64, page: f64) -> f64 {
        match self {
            DeltaMode::Pixel => delta,
            DeltaMode::Line => delta * line_height,
            DeltaMode::Page => delta * page,
        }
    }
}

/// What a listener does with an event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelAction {
    /// Leave the event alone; the platform's default applies
    PassThrough,
    /// Suppress the default and scroll `role` by `delta`
    Redirect { role: SurfaceRole, delta: f64 },
}

impl WheelAction {
    pub fn prevents_default(&self) -> bool {
        matches!(self, WheelAction::Redirect { .. })
    }
}

#[derive(Debug, Clone)]
pub struct WheelRouter {
    /// Surfaces with their own wheel listener
    local: BTreeSet<SurfaceRole>,
    /// Surfaces the document listener defers to
    containers: BTreeSet<SurfaceRole>,
    /// Surface the document listener scrolls
    fallback: SurfaceRole,
}

impl WheelRouter {
    pub fn new(
        local: impl IntoIterator<Item = SurfaceRole>,
        containers: impl IntoIterator<Item = SurfaceRole>,
        fallback: SurfaceRole,
    ) -> Self {
        Self {
            local: local.into_iter().collect(),
            containers: containers.into_iter().collect(),
            fallback,
        }
    }

    /// Content rows get their own listener. The document listener defers to
    /// them and to the proxy scrollbars, which scroll natively; wheel input over
    /// the top row or the parallax layers drives the primary row.
    pub fn standard(present: impl Fn(SurfaceRole) -> bool) -> Self {
        let local: Vec<_> = [SurfaceRole::Primary, SurfaceRole::Secondary]
            .into_iter()
            .filter(|role| present(*role))
            .collect();
        let containers: Vec<_> = local
            .iter()
            .copied()
            .chain(
                [SurfaceRole::Proxy, SurfaceRole::SecondaryProxy]
                    .into_iter()
                    .filter(|role| present(*role)),
            )
            .collect();
        Self::new(local, containers, SurfaceRole::Primary)
    }

    pub fn has_local_handler(&self, role: SurfaceRole) -> bool {
        self.local.contains(&role)
    }

    pub fn local_handlers(&self) -> impl Iterator<Item = SurfaceRole> + '_ {
        self.local.iter().copied()
    }

    pub fn fallback(&self) -> SurfaceRole {
        self.fallback
    }

    /// Decide what the listener that received `input` does.
    ///
    /// `fallback_max` is the maximum offset of the fallback surface; the
    /// document listener only redirects when it overflows.
    pub fn route(&self, input: &WheelInput, overlay_open: bool, fallback_max: f64) -> WheelAction {
        if !input.is_vertical() {
            return WheelAction::PassThrough;
        }
        if overlay_open {
            tracing::trace!("Wheel ignored: overlay open");
            return WheelAction::PassThrough;
        }

        match input.listener {
            WheelListener::Surface(role) if self.has_local_handler(role) => WheelAction::Redirect {
                role,
                delta: input.delta_y,
            },
            WheelListener::Surface(_) => WheelAction::PassThrough,
            WheelListener::Document => {
                if let Some(target) = input.target {
                    if self.containers.contains(&target) {
                        // The surface's own listener (or its native scrolling) handles it
                        return WheelAction::PassThrough;
                    }
                }
                if fallback_max <= 0.0 {
                    return WheelAction::PassThrough;
                }
                WheelAction::Redirect {
                    role: self.fallback,
                    delta: input.delta_y,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SurfaceRole::*;

    fn router() -> WheelRouter {
        WheelRouter::standard(|role| matches!(role, Primary | Proxy | Secondary | SecondaryProxy))
    }

    #[test]
    fn test_horizontal_input_passes_through() {
        let router = router();
        for listener in [WheelListener::Surface(Primary), WheelListener::Document] {
            let input = WheelInput::new(40.0, 40.0, listener, None);
            assert_eq!(router.route(&input, false, 1000.0), WheelAction::PassThrough);
            let input = WheelInput::new(-80.0, 10.0, listener, None);
            assert_eq!(router.route(&input, false, 1000.0), WheelAction::PassThrough);
        }
    }

    #[test]
    fn test_local_handler_redirects() {
        let input = WheelInput::new(0.0, 120.0, WheelListener::Surface(Secondary), Some(Secondary));
        assert_eq!(
            router().route(&input, false, 0.0),
            WheelAction::Redirect {
                role: Secondary,
                delta: 120.0
            }
        );
    }

    #[test]
    fn test_document_defers_to_surfaces() {
        let router = router();
        for target in [Primary, Proxy, Secondary, SecondaryProxy] {
            let input = WheelInput::new(0.0, 100.0, WheelListener::Document, Some(target));
            assert_eq!(router.route(&input, false, 1000.0), WheelAction::PassThrough);
        }
    }

    #[test]
    fn test_document_scrolls_primary_over_rows_without_handler() {
        let router = WheelRouter::standard(|_| true);
        for target in [Top, ParallaxBack, ParallaxFront] {
            let input = WheelInput::new(0.0, 100.0, WheelListener::Document, Some(target));
            assert_eq!(
                router.route(&input, false, 1000.0),
                WheelAction::Redirect {
                    role: Primary,
                    delta: 100.0
                },
                "wheel over {}",
                target
            );
        }
    }

    #[test]
    fn test_document_fallback_needs_overflow() {
        let router = router();
        let input = WheelInput::new(0.0, -60.0, WheelListener::Document, None);
        assert_eq!(router.route(&input, false, 0.0), WheelAction::PassThrough);
        assert_eq!(
            router.route(&input, false, 500.0),
            WheelAction::Redirect {
                role: Primary,
                delta: -60.0
            }
        );
    }

    #[test]
    fn test_overlay_suppresses_everything() {
        let router = router();
        for listener in [WheelListener::Surface(Primary), WheelListener::Document] {
            let input = WheelInput::new(0.0, 100.0, listener, None);
            assert_eq!(router.route(&input, true, 1000.0), WheelAction::PassThrough);
        }
    }

    #[test]
    fn test_delta_modes() {
        assert_eq!(DeltaMode::from_dom(0), DeltaMode::Pixel);
        assert_eq!(DeltaMode::from_dom(7), DeltaMode::Pixel);
        assert_eq!(DeltaMode::from_dom(1).to_pixels(3.0, 16.0, 900.0), 48.0);
        assert_eq!(DeltaMode::from_dom(2).to_pixels(-1.0, 16.0, 900.0), -900.0);
        assert_eq!(DeltaMode::Pixel.to_pixels(53.5, 16.0, 900.0), 53.5);
    }

    #[test]
    fn test_surface_without_listener_passes_through() {
        let input = WheelInput::new(0.0, 100.0, WheelListener::Surface(Proxy), Some(Proxy));
        assert!(!router().route(&input, false, 1000.0).prevents_default());
    }
}
