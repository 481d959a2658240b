//! DOM element lookups and the element-backed scroll surface

use filmstrip_core::config::ElementsConfig;
use filmstrip_core::{ScrollSurface, SurfaceRole};
use js_sys::Reflect;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlImageElement};

/// A scrollable element, plus the inner element that sets a proxy's width
#[derive(Debug, Clone)]
pub struct DomSurface {
    element: HtmlElement,
    sizer: Option<HtmlElement>,
}

impl DomSurface {
    pub fn new(element: HtmlElement, sizer: Option<HtmlElement>) -> Self {
        Self { element, sizer }
    }

    pub fn element(&self) -> &HtmlElement {
        &self.element
    }
}

impl ScrollSurface for DomSurface {
    // `scrollLeft` is fractional on high-DPI displays; the typed getter truncates
    fn offset(&self) -> f64 {
        Reflect::get(self.element.as_ref(), &JsValue::from_str("scrollLeft"))
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(self.element.scroll_left() as f64)
    }

    fn set_offset(&mut self, offset: f64) {
        let _ = Reflect::set(
            self.element.as_ref(),
            &JsValue::from_str("scrollLeft"),
            &JsValue::from_f64(offset),
        );
    }

    fn content_extent(&self) -> f64 {
        self.element.scroll_width() as f64
    }

    fn visible_extent(&self) -> f64 {
        self.element.client_width() as f64
    }

    fn resize_content(&mut self, extent: f64) -> bool {
        let Some(sizer) = self.sizer.as_ref() else {
            return false;
        };
        sizer
            .style()
            .set_property("width", &format!("{}px", extent))
            .is_ok()
    }
}

pub fn html_element(document: &Document, id: &str) -> Option<HtmlElement> {
    document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
}

/// Element ids of a surface and of its sizer, if it has one
pub fn surface_ids(elements: &ElementsConfig, role: SurfaceRole) -> (&str, Option<&str>) {
    match role {
        SurfaceRole::Primary => (elements.primary.as_str(), None),
        SurfaceRole::Proxy => (elements.proxy.as_str(), Some(elements.proxy_sizer.as_str())),
        SurfaceRole::Top => (elements.top.as_str(), None),
        SurfaceRole::Secondary => (elements.secondary.as_str(), None),
        SurfaceRole::SecondaryProxy => (
            elements.secondary_proxy.as_str(),
            Some(elements.secondary_proxy_sizer.as_str()),
        ),
        SurfaceRole::ParallaxBack => (elements.parallax_back.as_str(), None),
        SurfaceRole::ParallaxFront => (elements.parallax_front.as_str(), None),
    }
}

/// Every surface present on the page. Missing elements are logged and skipped.
pub fn find_surfaces(document: &Document, elements: &ElementsConfig) -> Vec<(SurfaceRole, DomSurface)> {
    SurfaceRole::ALL
        .into_iter()
        .filter_map(|role| {
            let (id, sizer_id) = surface_ids(elements, role);
            let Some(element) = html_element(document, id) else {
                tracing::debug!("No #{} on the page, {} disabled", id, role);
                return None;
            };
            let sizer = sizer_id.and_then(|sizer_id| html_element(document, sizer_id));
            if sizer_id.is_some() && sizer.is_none() {
                tracing::warn!("Proxy #{} has no sizer, its extent will not track the rows", id);
            }
            Some((role, DomSurface::new(element, sizer)))
        })
        .collect()
}

/// `<img>` descendants of `root`, in document order
pub fn images_in(root: &Element) -> Vec<HtmlImageElement> {
    let Ok(list) = root.query_selector_all("img") else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<HtmlImageElement>().ok())
        .collect()
}

/// First `<img>` in the document with the given alt text
pub fn image_by_alt(document: &Document, alt: &str) -> Option<HtmlImageElement> {
    let selector = format!("img[alt=\"{}\"]", alt.replace('\\', "\\\\").replace('"', "\\\""));
    document
        .query_selector(&selector)
        .ok()
        .flatten()
        .and_then(|element| element.dyn_into::<HtmlImageElement>().ok())
}
