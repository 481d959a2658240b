//! Page wiring: DOM listeners in, engine calls and DOM writes out

use std::cell::RefCell;
use std::rc::Rc;

use filmstrip_core::config::ElementsConfig;
use filmstrip_core::layout::row_gap;
use filmstrip_core::scroll::{FrameHandle, FrameTask};
use filmstrip_core::{
    AppConfig, DeltaMode, GalleryMap, ImageAction, Lightbox, OverlayProbe, ScrollEngine,
    ScrollSurface, SurfaceRole, WheelInput, WheelListener,
};
use tracing::{debug, info, trace, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, Document, Event, EventTarget, HtmlElement, HtmlImageElement,
    KeyboardEvent, Node, WheelEvent, Window,
};

use crate::console;
use crate::dom::{self, DomSurface};
use crate::frames::{FrameSink, RafScheduler};

const HOVER_CLASS: &str = "hovered-group";
/// Page size for wheel deltas when there is no primary row to measure
const DEFAULT_PAGE_PX: f64 = 800.0;

type Shared = Rc<RefCell<Option<Page>>>;

struct Page {
    engine: ScrollEngine<DomSurface, RafScheduler>,
    lightbox: Rc<Lightbox>,
    lightbox_view: Option<LightboxView>,
    line_height: f64,
}

impl Page {
    fn wheel_input(&self, event: &WheelEvent, listener: WheelListener, target: Option<SurfaceRole>) -> WheelInput {
        let page = self
            .engine
            .surface(SurfaceRole::Primary)
            .map(|s| s.visible_extent())
            .filter(|width| *width > 0.0)
            .unwrap_or(DEFAULT_PAGE_PX);
        let mode = DeltaMode::from_dom(event.delta_mode());
        WheelInput::new(
            mode.to_pixels(event.delta_x(), self.line_height, page),
            mode.to_pixels(event.delta_y(), self.line_height, page),
            listener,
            target,
        )
    }

    fn render_lightbox(&self) {
        if let Some(view) = self.lightbox_view.as_ref() {
            view.render(&self.lightbox);
        }
    }
}

/// Run `f` against the mounted page. Callbacks that arrive while the page is
/// already borrowed are dropped.
fn with_page<R>(shared: &Shared, f: impl FnOnce(&mut Page) -> R) -> Option<R> {
    let Ok(mut guard) = shared.try_borrow_mut() else {
        trace!("Page busy, dropping re-entrant callback");
        return None;
    };
    guard.as_mut().map(f)
}

/// A DOM listener removed again when dropped
struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        target: &EventTarget,
        kind: &'static str,
        passive: bool,
        handler: impl FnMut(Event) + 'static,
    ) -> Option<Self> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        if let Err(err) = target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            callback.as_ref().unchecked_ref(),
            &options,
        ) {
            warn!("Failed to add {} listener: {:?}", kind, err);
            return None;
        }
        Some(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

/// Lightbox chrome mirrored from [`Lightbox`] state
struct LightboxView {
    root: HtmlElement,
    image: Option<HtmlImageElement>,
    body: Option<HtmlElement>,
}

impl LightboxView {
    fn find(document: &Document, elements: &ElementsConfig) -> Option<Self> {
        let root = dom::html_element(document, &elements.lightbox)?;
        let image = document
            .get_element_by_id(&elements.lightbox_img)
            .and_then(|element| element.dyn_into::<HtmlImageElement>().ok());
        Some(Self {
            root,
            image,
            body: document.body(),
        })
    }

    fn render(&self, lightbox: &Lightbox) {
        let open = lightbox.is_open();
        let classes = self.root.class_list();
        let _ = if open {
            classes.add_1("open")
        } else {
            classes.remove_1("open")
        };
        let _ = self
            .root
            .set_attribute("aria-hidden", if open { "false" } else { "true" });

        if let Some(image) = self.image.as_ref() {
            image.set_src(lightbox.source().as_deref().unwrap_or(""));
        }
        if let Some(body) = self.body.as_ref() {
            let style = body.style();
            let _ = if open {
                style.set_property("overflow", "hidden")
            } else {
                style.remove_property("overflow").map(|_| ())
            };
        }
    }
}

/// Handle returned by [`mount`]. Dropping it detaches every listener.
#[wasm_bindgen]
pub struct FilmstripPage {
    shared: Shared,
    document: Document,
    elements: ElementsConfig,
    listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl FilmstripPage {
    /// Recompute proxy widths and re-sync every surface from the primary row
    pub fn resync(&self) {
        with_page(&self.shared, |page| page.engine.on_layout_change());
        align_rows(&self.document, &self.elements);
    }

    #[wasm_bindgen(js_name = openLightbox)]
    pub fn open_lightbox(&self, src: String) {
        with_page(&self.shared, |page| {
            page.lightbox.open(src);
            page.render_lightbox();
        });
    }

    #[wasm_bindgen(js_name = closeLightbox)]
    pub fn close_lightbox(&self) {
        with_page(&self.shared, |page| {
            page.lightbox.close();
            page.render_lightbox();
        });
    }

    #[wasm_bindgen(js_name = isLightboxOpen)]
    pub fn is_lightbox_open(&self) -> bool {
        with_page(&self.shared, |page| page.lightbox.is_open()).unwrap_or(false)
    }

    #[wasm_bindgen(js_name = listenerCount)]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

/// Wire the page. `config_toml` overrides the defaults (element ids, motion
/// tuning, gallery entries).
#[wasm_bindgen]
pub fn mount(config_toml: Option<String>) -> Result<FilmstripPage, JsValue> {
    let config = match config_toml.as_deref() {
        Some(toml) => AppConfig::from_toml_str(toml).map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => AppConfig::default(),
    };
    console::init(&config.general.log_level);

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let surfaces = dom::find_surfaces(&document, &config.elements);
    let elements: Vec<(SurfaceRole, HtmlElement)> = surfaces
        .iter()
        .map(|(role, surface)| (*role, surface.element().clone()))
        .collect();

    let shared: Shared = Rc::new(RefCell::new(None));
    let sink: FrameSink = {
        let weak = Rc::downgrade(&shared);
        Rc::new(move |handle: FrameHandle, task: FrameTask, timestamp: f64| {
            if let Some(shared) = weak.upgrade() {
                with_page(&shared, |page| page.engine.run_frame(handle, task, timestamp));
            }
        })
    };

    let lightbox = Rc::new(Lightbox::new());
    let engine = ScrollEngine::new(&config, surfaces, RafScheduler::new(window.clone(), sink))
        .with_overlay(lightbox.clone());
    let local_wheel: Vec<SurfaceRole> = engine.router().local_handlers().collect();

    *shared.borrow_mut() = Some(Page {
        engine,
        lightbox,
        lightbox_view: LightboxView::find(&document, &config.elements),
        line_height: config.wheel.line_height_px,
    });

    let mut listeners = Vec::new();
    wire_scroll(&shared, &elements, &mut listeners);
    wire_wheel(&shared, &document, &elements, &local_wheel, &mut listeners);
    wire_layout(&shared, &window, &document, &config.elements, &elements, &mut listeners);
    wire_lightbox(&shared, &document, &config.elements, &mut listeners);
    wire_gallery(&shared, &window, &document, &config, &mut listeners);

    with_page(&shared, |page| page.engine.on_layout_change());
    align_rows(&document, &config.elements);

    info!(
        "Filmstrip mounted: {} surfaces, {} listeners",
        elements.len(),
        listeners.len()
    );

    Ok(FilmstripPage {
        shared,
        document,
        elements: config.elements,
        listeners,
    })
}

fn wire_scroll(shared: &Shared, elements: &[(SurfaceRole, HtmlElement)], listeners: &mut Vec<Listener>) {
    for (role, element) in elements {
        let role = *role;
        let shared = Rc::clone(shared);
        listeners.extend(Listener::attach(element, "scroll", true, move |_event| {
            with_page(&shared, |page| page.engine.on_scroll(role));
        }));
    }
}

/// Surface (if any) whose element contains the event's target
fn container_of(elements: &[(SurfaceRole, HtmlElement)], event: &Event) -> Option<SurfaceRole> {
    let node = event.target()?.dyn_into::<Node>().ok()?;
    elements
        .iter()
        .find(|(_, element)| element.contains(Some(&node)))
        .map(|(role, _)| *role)
}

fn wire_wheel(
    shared: &Shared,
    document: &Document,
    elements: &[(SurfaceRole, HtmlElement)],
    local: &[SurfaceRole],
    listeners: &mut Vec<Listener>,
) {
    // Non-passive: redirected events must be able to cancel the page scroll
    for (role, element) in elements.iter().filter(|(role, _)| local.contains(role)) {
        let role = *role;
        let shared = Rc::clone(shared);
        listeners.extend(Listener::attach(element, "wheel", false, move |event| {
            let Some(wheel) = event.dyn_ref::<WheelEvent>() else {
                return;
            };
            let redirected = with_page(&shared, |page| {
                let input = page.wheel_input(wheel, WheelListener::Surface(role), Some(role));
                page.engine.handle_wheel(input).prevents_default()
            });
            if redirected == Some(true) {
                event.prevent_default();
            }
        }));
    }

    let shared = Rc::clone(shared);
    let elements = elements.to_vec();
    listeners.extend(Listener::attach(document, "wheel", false, move |event| {
        let Some(wheel) = event.dyn_ref::<WheelEvent>() else {
            return;
        };
        let target = container_of(&elements, &event);
        let redirected = with_page(&shared, |page| {
            let input = page.wheel_input(wheel, WheelListener::Document, target);
            page.engine.handle_wheel(input).prevents_default()
        });
        if redirected == Some(true) {
            event.prevent_default();
        }
    }));
}

fn wire_layout(
    shared: &Shared,
    window: &Window,
    document: &Document,
    ids: &ElementsConfig,
    elements: &[(SurfaceRole, HtmlElement)],
    listeners: &mut Vec<Listener>,
) {
    for kind in ["resize", "load"] {
        let shared = Rc::clone(shared);
        let document = document.clone();
        let ids = ids.clone();
        listeners.extend(Listener::attach(window, kind, true, move |_event| {
            with_page(&shared, |page| page.engine.on_layout_change());
            align_rows(&document, &ids);
        }));
    }

    let rows = elements
        .iter()
        .filter(|(role, _)| !role.is_proxy())
        .flat_map(|(_, element)| dom::images_in(element));
    for image in rows {
        let shared = Rc::clone(shared);
        let document = document.clone();
        let ids = ids.clone();
        listeners.extend(Listener::attach(&image, "load", true, move |_event| {
            with_page(&shared, |page| page.engine.on_image_loaded());
            align_rows(&document, &ids);
        }));
    }
}

/// Space the top row's images so its first and last image line up with the
/// primary row's. Waits until every image in both rows has loaded.
fn align_rows(document: &Document, ids: &ElementsConfig) {
    let (Some(main), Some(top)) = (
        dom::html_element(document, &ids.primary),
        dom::html_element(document, &ids.top),
    ) else {
        return;
    };
    let main_images = dom::images_in(&main);
    let top_images = dom::images_in(&top);
    if main_images.iter().chain(&top_images).any(|image| !image.complete()) {
        return;
    }
    let (Some(first), Some(last)) = (main_images.first(), main_images.last()) else {
        return;
    };

    let span = last.get_bounding_client_rect().right() - first.get_bounding_client_rect().left();
    let widths: Vec<f64> = top_images.iter().map(|image| image.offset_width() as f64).collect();
    if let Some(gap) = row_gap(span, &widths) {
        trace!(span, gap, "Aligning top row");
        let _ = top.style().set_property("gap", &format!("{}px", gap));
    }
}

fn wire_lightbox(shared: &Shared, document: &Document, ids: &ElementsConfig, listeners: &mut Vec<Listener>) {
    for id in [&ids.lightbox_close, &ids.lightbox_backdrop] {
        let Some(element) = dom::html_element(document, id) else {
            continue;
        };
        let shared = Rc::clone(shared);
        listeners.extend(Listener::attach(&element, "click", true, move |_event| {
            with_page(&shared, |page| {
                if page.lightbox.close() {
                    page.render_lightbox();
                }
            });
        }));
    }

    let shared = Rc::clone(shared);
    listeners.extend(Listener::attach(document, "keydown", true, move |event| {
        let Some(key) = event.dyn_ref::<KeyboardEvent>().map(|k| k.key()) else {
            return;
        };
        with_page(&shared, |page| {
            if page.lightbox.is_open() && page.lightbox.handle_key(&key) {
                page.render_lightbox();
            }
        });
    }));
}

fn wire_gallery(
    shared: &Shared,
    window: &Window,
    document: &Document,
    config: &AppConfig,
    listeners: &mut Vec<Listener>,
) {
    let gallery = GalleryMap::new(config.gallery.entries.clone());
    if gallery.is_empty() {
        return;
    }

    for entry in gallery.entries() {
        let Some(image) = dom::image_by_alt(document, &entry.alt) else {
            debug!("Gallery image '{}' not on the page", entry.alt);
            continue;
        };
        let _ = image.style().set_property("cursor", "pointer");

        let action = entry.action.clone();
        let shared = Rc::clone(shared);
        let window = window.clone();
        listeners.extend(Listener::attach(&image, "click", true, move |_event| match &action {
            ImageAction::Lightbox { src } => {
                with_page(&shared, |page| {
                    page.lightbox.open(src.clone());
                    page.render_lightbox();
                });
            }
            ImageAction::Navigate { url } => {
                if let Err(err) = window.open_with_url_and_target(url, "_blank") {
                    warn!("Failed to open {}: {:?}", url, err);
                }
            }
        }));

        if entry.hover_group.is_none() {
            continue;
        }
        let partners: Vec<HtmlImageElement> = gallery
            .hover_partners(&entry.alt)
            .into_iter()
            .filter_map(|alt| dom::image_by_alt(document, alt))
            .collect();
        for (kind, highlight) in [("mouseenter", true), ("mouseleave", false)] {
            let partners = partners.clone();
            listeners.extend(Listener::attach(&image, kind, true, move |_event| {
                for partner in &partners {
                    let classes = partner.class_list();
                    let _ = if highlight {
                        classes.add_1(HOVER_CLASS)
                    } else {
                        classes.remove_1(HOVER_CLASS)
                    };
                }
            }));
        }
    }
}
