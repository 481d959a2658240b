//! Headless simulation
//!
//! Replays a recorded interaction trace against virtual surfaces on a fixed
//! frame clock. Each step delivers the events that are due, runs the frame
//! callbacks the engine requested, then reports changed offsets back as scroll
//! notifications the way a browser does after layout.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::engine::ScrollEngine;
use crate::overlay::Lightbox;
use crate::scroll::{ManualFrames, ScrollConfigExt};
use crate::surface::{write_clamped, ScrollSurface, SurfaceRole, VirtualSurface};
use crate::wheel::{WheelInput, WheelListener};
use crate::{Error, Result};

/// Upper bound on frames for traces without an explicit duration
pub const MAX_FRAMES: usize = 100_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceSpec {
    pub role: SurfaceRole,
    /// Content width in pixels
    pub content: f64,
    /// Viewport width in pixels
    pub visible: f64,
    /// Starting offset
    #[serde(default)]
    pub offset: f64,
}

/// Something that happens to the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceAction {
    /// Wheel over `target`, or over no surface at all
    Wheel {
        #[serde(default)]
        delta_x: f64,
        delta_y: f64,
        #[serde(default)]
        target: Option<SurfaceRole>,
    },
    /// User dragged a surface (scrollbar thumb, touch) to `offset`
    Drag { role: SurfaceRole, offset: f64 },
    /// A surface's layout changed
    Resize {
        role: SurfaceRole,
        content: f64,
        visible: f64,
    },
    /// Lightbox opened or closed
    Overlay {
        open: bool,
        #[serde(default)]
        src: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub at_ms: f64,
    #[serde(flatten)]
    pub action: TraceAction,
}

/// A recorded page layout and interaction sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    pub surfaces: Vec<SurfaceSpec>,
    #[serde(default)]
    pub events: Vec<TraceEvent>,
    /// Stop after this long. Without it the run ends once every event was
    /// delivered and all motion settled.
    #[serde(default)]
    pub duration_ms: Option<f64>,
}

impl Trace {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let trace: Self = toml::from_str(content)?;
        trace.validate()?;
        Ok(trace)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.surfaces.is_empty() {
            return Err(Error::InvalidTrace("no surfaces declared".to_string()));
        }

        let mut roles = BTreeSet::new();
        for spec in &self.surfaces {
            if !roles.insert(spec.role) {
                return Err(Error::InvalidTrace(format!("surface '{}' declared twice", spec.role)));
            }
            check_extent(spec.role, "content", spec.content)?;
            check_extent(spec.role, "visible", spec.visible)?;
        }

        if let Some(duration) = self.duration_ms {
            if !(duration.is_finite() && duration >= 0.0) {
                return Err(Error::InvalidTrace(format!("invalid duration_ms {}", duration)));
            }
        }

        for (index, event) in self.events.iter().enumerate() {
            if !(event.at_ms.is_finite() && event.at_ms >= 0.0) {
                return Err(Error::InvalidTrace(format!(
                    "event {} has invalid at_ms {}",
                    index, event.at_ms
                )));
            }
            match &event.action {
                TraceAction::Drag { role, offset } => {
                    require_role(&roles, *role, index)?;
                    if !offset.is_finite() {
                        return Err(Error::InvalidTrace(format!("event {} drags to {}", index, offset)));
                    }
                }
                TraceAction::Resize { role, content, visible } => {
                    require_role(&roles, *role, index)?;
                    check_extent(*role, "content", *content)?;
                    check_extent(*role, "visible", *visible)?;
                }
                TraceAction::Wheel { delta_x, delta_y, .. } => {
                    if !(delta_x.is_finite() && delta_y.is_finite()) {
                        return Err(Error::InvalidTrace(format!("event {} has a non-finite delta", index)));
                    }
                }
                TraceAction::Overlay { .. } => {}
            }
        }
        Ok(())
    }
}

fn check_extent(role: SurfaceRole, name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidTrace(format!("surface '{}' has invalid {} {}", role, name, value)))
    }
}

fn require_role(roles: &BTreeSet<SurfaceRole>, role: SurfaceRole, index: usize) -> Result<()> {
    if roles.contains(&role) {
        Ok(())
    } else {
        Err(Error::InvalidTrace(format!(
            "event {} refers to undeclared surface '{}'",
            index, role
        )))
    }
}

/// Offsets of every surface after one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub at_ms: f64,
    pub offsets: BTreeMap<SurfaceRole, f64>,
}

/// Counters collected over a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimStats {
    pub frames: usize,
    pub events: usize,
    /// Wheel events some listener redirected
    pub wheel_redirected: usize,
    /// Wheel events left to the platform
    pub wheel_passed: usize,
}

pub struct Simulation {
    engine: ScrollEngine<VirtualSurface, ManualFrames>,
    lightbox: Rc<Lightbox>,
    events: VecDeque<TraceEvent>,
    duration_ms: Option<f64>,
    frame_ms: f64,
    now_ms: f64,
    /// Offset each surface last reported through a scroll notification
    reported: BTreeMap<SurfaceRole, f64>,
    stats: SimStats,
}

impl Simulation {
    pub fn new(config: &AppConfig, trace: Trace) -> Result<Self> {
        trace.validate()?;

        let surfaces: Vec<_> = trace
            .surfaces
            .iter()
            .map(|spec| {
                let mut surface = VirtualSurface::new(spec.content, spec.visible);
                if spec.offset != 0.0 {
                    write_clamped(&mut surface, spec.offset);
                }
                (spec.role, surface)
            })
            .collect();
        let reported = surfaces
            .iter()
            .map(|(role, surface)| (*role, surface.offset()))
            .collect();

        let lightbox = Rc::new(Lightbox::new());
        let mut engine =
            ScrollEngine::new(config, surfaces, ManualFrames::new()).with_overlay(lightbox.clone());
        // Page load
        engine.on_layout_change();

        let mut events = trace.events;
        events.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));

        info!(
            "Simulating {} surfaces, {} events at {:.1}ms per frame",
            trace.surfaces.len(),
            events.len(),
            config.scroll.frame_interval_ms()
        );

        let mut sim = Self {
            engine,
            lightbox,
            events: events.into(),
            duration_ms: trace.duration_ms,
            frame_ms: config.scroll.frame_interval_ms(),
            now_ms: 0.0,
            reported,
            stats: SimStats::default(),
        };
        sim.report_scrolls();
        Ok(sim)
    }

    pub fn engine(&self) -> &ScrollEngine<VirtualSurface, ManualFrames> {
        &self.engine
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            at_ms: self.now_ms,
            offsets: self
                .engine
                .roles()
                .filter_map(|role| self.engine.offset(role).map(|offset| (role, offset)))
                .collect(),
        }
    }

    pub fn is_finished(&self) -> bool {
        match self.duration_ms {
            Some(duration) => self.now_ms >= duration,
            None => self.events.is_empty() && !self.engine.has_pending_frames(),
        }
    }

    /// Advance the clock by one frame
    pub fn step(&mut self) -> FrameSnapshot {
        self.now_ms += self.frame_ms;
        self.stats.frames += 1;

        while self.events.front().is_some_and(|event| event.at_ms <= self.now_ms) {
            if let Some(event) = self.events.pop_front() {
                self.apply(event.action);
            }
        }

        for (handle, task) in self.engine.scheduler_mut().take_due() {
            self.engine.run_frame(handle, task, self.now_ms);
        }

        self.report_scrolls();
        self.snapshot()
    }

    /// Step until the trace is finished, calling `on_frame` after every frame
    pub fn run_with(&mut self, mut on_frame: impl FnMut(&FrameSnapshot)) -> FrameSnapshot {
        while !self.is_finished() {
            if self.duration_ms.is_none() && self.stats.frames >= MAX_FRAMES {
                warn!("Stopping after {} frames without settling", MAX_FRAMES);
                break;
            }
            let snapshot = self.step();
            on_frame(&snapshot);
        }
        self.snapshot()
    }

    pub fn run(&mut self) -> FrameSnapshot {
        self.run_with(|_| {})
    }

    fn apply(&mut self, action: TraceAction) {
        self.stats.events += 1;
        debug!(at_ms = self.now_ms, ?action, "Trace event");

        match action {
            TraceAction::Wheel { delta_x, delta_y, target } => self.dispatch_wheel(delta_x, delta_y, target),
            TraceAction::Drag { role, offset } => {
                if let Some(surface) = self.engine.surface_mut(role) {
                    write_clamped(surface, offset);
                }
                self.report_scrolls();
            }
            TraceAction::Resize { role, content, visible } => {
                if let Some(surface) = self.engine.surface_mut(role) {
                    surface.set_layout(content, visible);
                }
                self.engine.on_layout_change();
            }
            TraceAction::Overlay { open, src } => {
                if open {
                    self.lightbox.open(src.unwrap_or_default());
                } else {
                    self.lightbox.close();
                }
            }
        }
    }

    /// Deliver one wheel event the way it bubbles: the target surface's own
    /// listener first, if it has one, then the document listener
    fn dispatch_wheel(&mut self, delta_x: f64, delta_y: f64, target: Option<SurfaceRole>) {
        let mut listeners = Vec::with_capacity(2);
        if let Some(role) = target.filter(|role| self.engine.router().has_local_handler(*role)) {
            listeners.push(WheelListener::Surface(role));
        }
        listeners.push(WheelListener::Document);

        let mut redirected = false;
        for listener in listeners {
            let action = self
                .engine
                .handle_wheel(WheelInput::new(delta_x, delta_y, listener, target));
            redirected |= action.prevents_default();
        }

        if redirected {
            self.stats.wheel_redirected += 1;
        } else {
            self.stats.wheel_passed += 1;
        }
    }

    /// Notify the engine of every surface whose offset moved since it last
    /// reported, like the browser's asynchronous scroll events
    fn report_scrolls(&mut self) {
        let roles: Vec<_> = self.engine.roles().collect();
        for role in roles {
            let Some(offset) = self.engine.offset(role) else {
                continue;
            };
            let moved = self
                .reported
                .get(&role)
                .map_or(true, |last| (last - offset).abs() > f64::EPSILON);
            if moved {
                self.reported.insert(role, offset);
                self.engine.on_scroll(role);
            }
        }
    }
}
