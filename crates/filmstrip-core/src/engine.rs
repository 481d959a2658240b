//! Scroll synchronization engine
//!
//! Owns every surface on the page, the links between them, one animator per
//! surface and the frame scheduler. Hosts feed it notifications
//! (`on_scroll`, `handle_wheel`, `on_layout_change`, `on_image_loaded`) and
//! frame callbacks (`run_frame`); everything runs on one thread.
//!
//! Propagation rules:
//! - a scroll of surface A fans out along every link `A → B`, all computed from
//!   one snapshot of A's offset and maximum
//! - `Direct` links write B immediately under the feedback guard, then deliver
//!   B's own notification synchronously inside the guard window
//! - `Eased` links are coalesced into one frame per source: a newer scroll of
//!   the source cancels the pending frame, and the frame retargets each
//!   dependent's momentum. The guard chain active when the frame was scheduled
//!   travels with it, so the dependent's animation frames still cannot write
//!   back into any surface upstream of it
//! - any write the engine did not derive itself, or a link write into a
//!   surface, stops that surface's own animation (one writer at a time)

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use tracing::{debug, info, trace, warn};

use crate::config::{AppConfig, WheelConfig};
use crate::layout::ExtentTracker;
use crate::overlay::OverlayProbe;
use crate::scroll::{FrameHandle, FrameScheduler, FrameTask, ScrollAnimator, ScrollConfig, ScrollConfigExt, ScrollMode};
use crate::surface::{write_clamped, ScrollSurface, SurfaceRole};
use crate::sync::{chain_blocks, Delivery, Direction, EchoFilter, GuardFlags, SyncLink, Topology};
use crate::wheel::{WheelAction, WheelInput, WheelRouter};

struct SurfaceSlot<S> {
    surface: S,
    animator: ScrollAnimator,
    /// Write chain ending in the link whose eased target the animator is
    /// chasing; empty when the animation is the surface's own
    driven_by: Vec<Direction>,
}

pub struct ScrollEngine<S, F> {
    scroll: ScrollConfig,
    wheel: WheelConfig,
    surfaces: BTreeMap<SurfaceRole, SurfaceSlot<S>>,
    topology: Topology,
    extents: Vec<ExtentTracker>,
    router: WheelRouter,
    guard: GuardFlags,
    echo: EchoFilter,
    scheduler: F,
    pending: HashMap<FrameTask, FrameHandle>,
    /// Guard chain recorded with each pending coalesced frame
    coalesce_chains: HashMap<SurfaceRole, Vec<Direction>>,
    overlay: Option<Rc<dyn OverlayProbe>>,
}

impl<S: ScrollSurface, F: FrameScheduler> ScrollEngine<S, F> {
    /// Wire an engine for the surfaces present on the page. Links, extent
    /// trackers and wheel listeners whose surfaces are missing are skipped.
    pub fn new(
        config: &AppConfig,
        surfaces: impl IntoIterator<Item = (SurfaceRole, S)>,
        scheduler: F,
    ) -> Self {
        let surfaces: BTreeMap<_, _> = surfaces
            .into_iter()
            .map(|(role, surface)| {
                let slot = SurfaceSlot {
                    surface,
                    animator: ScrollAnimator::new(config.scroll.clone()),
                    driven_by: Vec::new(),
                };
                (role, slot)
            })
            .collect();

        let present = |role: SurfaceRole| surfaces.contains_key(&role);
        let topology = Topology::standard(&config.parallax).retain_present(present);
        let extents: Vec<_> = ExtentTracker::standard()
            .into_iter()
            .filter_map(|tracker| tracker.retain_present(present))
            .collect();
        let router = WheelRouter::standard(present);

        info!(
            "Scroll engine wired: {} surfaces, {} links, {} extent trackers",
            surfaces.len(),
            topology.len(),
            extents.len()
        );

        Self {
            scroll: config.scroll.clone(),
            wheel: config.wheel.clone(),
            surfaces,
            topology,
            extents,
            router,
            guard: GuardFlags::new(),
            echo: EchoFilter::new(),
            scheduler,
            pending: HashMap::new(),
            coalesce_chains: HashMap::new(),
            overlay: None,
        }
    }

    /// Attach the overlay whose open state suppresses wheel redirection
    pub fn with_overlay(mut self, overlay: Rc<dyn OverlayProbe>) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn has_surface(&self, role: SurfaceRole) -> bool {
        self.surfaces.contains_key(&role)
    }

    pub fn roles(&self) -> impl Iterator<Item = SurfaceRole> + '_ {
        self.surfaces.keys().copied()
    }

    pub fn surface(&self, role: SurfaceRole) -> Option<&S> {
        self.surfaces.get(&role).map(|slot| &slot.surface)
    }

    /// Mutable access for hosts that change a surface's layout; follow up with
    /// [`ScrollEngine::on_layout_change`]
    pub fn surface_mut(&mut self, role: SurfaceRole) -> Option<&mut S> {
        self.surfaces.get_mut(&role).map(|slot| &mut slot.surface)
    }

    pub fn offset(&self, role: SurfaceRole) -> Option<f64> {
        self.surface(role).map(|s| s.offset())
    }

    pub fn animator(&self, role: SurfaceRole) -> Option<&ScrollAnimator> {
        self.surfaces.get(&role).map(|slot| &slot.animator)
    }

    pub fn links(&self) -> &[SyncLink] {
        self.topology.links()
    }

    pub fn router(&self) -> &WheelRouter {
        &self.router
    }

    pub fn extent_trackers(&self) -> &[ExtentTracker] {
        &self.extents
    }

    pub fn guard(&self) -> &GuardFlags {
        &self.guard
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }

    /// True while any frame callback is outstanding
    pub fn has_pending_frames(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_scheduled(&self, task: FrameTask) -> bool {
        self.pending.contains_key(&task)
    }

    // ------------------------------------------------------------------
    // Host notifications
    // ------------------------------------------------------------------

    /// A surface reported a scroll. Echoes of the engine's own writes are
    /// dropped; anything else came from another writer (user drag, native
    /// input) and is propagated.
    pub fn on_scroll(&mut self, role: SurfaceRole) {
        let Some(slot) = self.surfaces.get_mut(&role) else {
            return;
        };
        let offset = slot.surface.offset();

        if self.echo.consume(role, offset) {
            trace!(%role, offset, "Dropping scroll echo");
            return;
        }

        if slot.animator.is_animating() {
            debug!(%role, offset, "External scroll took over an animated surface");
            slot.animator.cancel(offset);
            slot.driven_by.clear();
        }

        self.propagate(role);
    }

    /// Route a wheel event and apply it. The returned action tells the host
    /// whether to prevent the platform default.
    pub fn handle_wheel(&mut self, input: WheelInput) -> WheelAction {
        let overlay_open = self.overlay.as_ref().is_some_and(|o| o.is_open());
        let fallback_max = self
            .surface(self.router.fallback())
            .map(|s| s.max_offset())
            .unwrap_or(0.0);

        let action = self.router.route(&input, overlay_open, fallback_max);
        if let WheelAction::Redirect { role, delta } = action {
            self.scroll_by(role, delta);
        }
        action
    }

    /// Scroll a surface by a raw input delta using the configured motion
    pub fn scroll_by(&mut self, role: SurfaceRole, delta: f64) {
        let delta = if self.scroll.is_smooth() && self.scroll.mode == ScrollMode::Momentum {
            delta * self.wheel.momentum_sensitivity
        } else {
            delta
        };

        let Some(slot) = self.surfaces.get_mut(&role) else {
            return;
        };
        slot.driven_by.clear();
        let offset = slot.surface.offset();
        let max = slot.surface.max_offset();

        match slot.animator.scroll_by(delta, offset, max) {
            Some(instant) => {
                let written = write_clamped(&mut slot.surface, instant);
                trace!(%role, written, "Instant scroll");
                self.echo.expect(role, written);
                self.propagate(role);
            }
            None => self.schedule_animation(role),
        }
    }

    /// Viewport resized or the page finished loading: recompute proxy extents
    /// and re-sync every dependent from the primary row
    pub fn on_layout_change(&mut self) {
        self.recompute_proxy_extents();
        self.resync(SurfaceRole::Primary);
    }

    /// Push `role`'s current offset out to its dependents again
    pub fn resync(&mut self, role: SurfaceRole) {
        if self.has_surface(role) {
            self.propagate(role);
        }
    }

    /// One image finished loading: its row may have grown
    pub fn on_image_loaded(&mut self) {
        self.recompute_proxy_extents();
    }

    /// Set each proxy's content width to the widest of its source rows.
    /// Idempotent: with no layout change in between, repeated calls write the
    /// same extents. Returns the extents applied.
    pub fn recompute_proxy_extents(&mut self) -> Vec<(SurfaceRole, f64)> {
        let mut applied = Vec::with_capacity(self.extents.len());
        for tracker in &self.extents {
            let surfaces = &self.surfaces;
            let Some(extent) =
                tracker.measure(|role| surfaces.get(&role).map(|slot| slot.surface.content_extent()))
            else {
                continue;
            };

            let Some(slot) = self.surfaces.get_mut(&tracker.proxy()) else {
                continue;
            };
            if slot.surface.resize_content(extent) {
                trace!(proxy = %tracker.proxy(), extent, "Proxy extent updated");
                applied.push((tracker.proxy(), extent));
            } else {
                warn!("Proxy {} has no content sizer", tracker.proxy());
            }
        }
        applied
    }

    // ------------------------------------------------------------------
    // Frames
    // ------------------------------------------------------------------

    /// Run a frame callback previously requested from the scheduler.
    /// Callbacks that were superseded or cancelled are ignored.
    pub fn run_frame(&mut self, handle: FrameHandle, task: FrameTask, now_ms: f64) {
        if self.pending.get(&task) != Some(&handle) {
            trace!(?task, "Ignoring stale frame");
            return;
        }
        self.pending.remove(&task);

        match task {
            FrameTask::Animate(role) => self.animate_frame(role, now_ms),
            FrameTask::Coalesce(source) => self.coalesce_frame(source),
        }
    }

    fn animate_frame(&mut self, role: SurfaceRole, now_ms: f64) {
        let Some(slot) = self.surfaces.get_mut(&role) else {
            return;
        };
        let max = slot.surface.max_offset();
        let Some(offset) = slot.animator.tick(now_ms, max) else {
            slot.driven_by.clear();
            return;
        };

        let written = write_clamped(&mut slot.surface, offset);
        let still_animating = slot.animator.is_animating();
        let driven_by = if still_animating {
            slot.driven_by.clone()
        } else {
            std::mem::take(&mut slot.driven_by)
        };
        trace!(%role, written, "Animation frame");

        self.echo.expect(role, written);
        self.with_guard(&driven_by, |engine| engine.propagate(role));

        if still_animating {
            self.schedule_animation(role);
        }
    }

    /// Retarget every eased dependent of `source` from one snapshot
    fn coalesce_frame(&mut self, source: SurfaceRole) {
        let chain = self.coalesce_chains.remove(&source).unwrap_or_default();
        let Some((auth_offset, auth_max)) = self
            .surface(source)
            .map(|s| (s.offset(), s.max_offset()))
        else {
            return;
        };

        let eased: Vec<SyncLink> = self
            .topology
            .from_source(source)
            .filter(|link| link.delivery == Delivery::Eased)
            .copied()
            .collect();

        for link in eased {
            if chain_blocks(&chain, link.direction()) {
                trace!(from = %link.from, to = %link.to, "Guarded, not easing back");
                continue;
            }
            let Some(slot) = self.surfaces.get_mut(&link.to) else {
                continue;
            };
            let dep_max = slot.surface.max_offset();
            let Some(target) = link.transfer.apply(auth_offset, auth_max, dep_max) else {
                trace!(from = %link.from, to = %link.to, "Source does not overflow, skipping");
                continue;
            };

            let offset = slot.surface.offset();
            slot.animator.advance_toward(target, offset, dep_max);
            slot.driven_by = chain.iter().copied().chain([link.direction()]).collect();
            trace!(from = %link.from, to = %link.to, target, "Eased target");
            self.schedule_animation(link.to);
        }
    }

    // ------------------------------------------------------------------
    // Propagation
    // ------------------------------------------------------------------

    /// Fan a surface's current offset out along its links
    fn propagate(&mut self, source: SurfaceRole) {
        let Some((auth_offset, auth_max)) = self
            .surface(source)
            .map(|s| (s.offset(), s.max_offset()))
        else {
            return;
        };

        let links: Vec<SyncLink> = self.topology.from_source(source).copied().collect();
        let mut eased = false;
        for link in links {
            if self.guard.blocks(link.direction()) {
                trace!(from = %link.from, to = %link.to, "Guarded, not propagating back");
                continue;
            }
            match link.delivery {
                Delivery::Direct => self.write_derived(&link, auth_offset, auth_max),
                Delivery::Eased => eased = true,
            }
        }
        if eased {
            let chain = self.guard.held().to_vec();
            self.schedule_coalesced(source, chain);
        }
    }

    fn write_derived(&mut self, link: &SyncLink, auth_offset: f64, auth_max: f64) {
        let Some(slot) = self.surfaces.get_mut(&link.to) else {
            return;
        };
        let dep_max = slot.surface.max_offset();
        let Some(target) = link.transfer.apply(auth_offset, auth_max, dep_max) else {
            trace!(from = %link.from, to = %link.to, "Source does not overflow, skipping");
            return;
        };

        // Writing the current offset again would not move anything
        if (target - slot.surface.offset()).abs() <= f64::EPSILON {
            return;
        }

        let written = write_clamped(&mut slot.surface, target);
        if slot.animator.is_animating() {
            slot.animator.cancel(written);
            slot.driven_by.clear();
        }
        trace!(from = %link.from, to = %link.to, written, "Derived write");
        self.echo.expect(link.to, written);

        let to = link.to;
        self.with_guard(&[link.direction()], |engine| engine.propagate(to));
    }

    /// Hold `chain` while `f` runs. Every flag is released before this
    /// returns, so the guard never outlives one synchronous propagation.
    fn with_guard<R>(&mut self, chain: &[Direction], f: impl FnOnce(&mut Self) -> R) -> R {
        for direction in chain {
            self.guard.hold(*direction);
        }
        let result = f(self);
        for direction in chain.iter().rev() {
            self.guard.release(*direction);
        }
        result
    }

    fn schedule_animation(&mut self, role: SurfaceRole) {
        let task = FrameTask::Animate(role);
        if self.pending.contains_key(&task) {
            return;
        }
        self.request(task);
    }

    /// Replace any pending coalesced frame for `source` with a fresh one.
    /// The latest notification's guard chain replaces the stale one too.
    fn schedule_coalesced(&mut self, source: SurfaceRole, chain: Vec<Direction>) {
        let task = FrameTask::Coalesce(source);
        if let Some(stale) = self.pending.remove(&task) {
            self.scheduler.cancel_frame(stale);
        }
        self.coalesce_chains.insert(source, chain);
        self.request(task);
    }

    fn request(&mut self, task: FrameTask) {
        match self.scheduler.request_frame(task) {
            Some(handle) => {
                self.pending.insert(task, handle);
            }
            None => warn!(?task, "Host could not schedule a frame"),
        }
    }
}
