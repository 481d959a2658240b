//! Lightbox overlay state
//!
//! The engine only needs to know whether an overlay is open; the web binding
//! owns the chrome and mirrors this state into the DOM.

use std::cell::{Cell, RefCell};

/// Synchronous "is an overlay open" query
pub trait OverlayProbe {
    fn is_open(&self) -> bool;
}

/// Open/closed state and the image currently shown
#[derive(Debug, Default)]
pub struct Lightbox {
    open: Cell<bool>,
    source: RefCell<Option<String>>,
}

impl Lightbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, source: impl Into<String>) {
        let source = source.into();
        tracing::debug!("Opening lightbox: {}", source);
        *self.source.borrow_mut() = Some(source);
        self.open.set(true);
    }

    /// Close and forget the image. Returns whether it was open.
    pub fn close(&self) -> bool {
        let was_open = self.open.replace(false);
        self.source.borrow_mut().take();
        if was_open {
            tracing::debug!("Closed lightbox");
        }
        was_open
    }

    pub fn source(&self) -> Option<String> {
        self.source.borrow().clone()
    }

    /// Handle a keyboard key name. Escape closes; returns whether the key was handled.
    pub fn handle_key(&self, key: &str) -> bool {
        if key == "Escape" {
            self.close();
            true
        } else {
            false
        }
    }
}

impl OverlayProbe for Lightbox {
    fn is_open(&self) -> bool {
        self.open.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_close() {
        let lightbox = Lightbox::new();
        assert!(!lightbox.is_open());

        lightbox.open("img/img2-1.png");
        assert!(lightbox.is_open());
        assert_eq!(lightbox.source().as_deref(), Some("img/img2-1.png"));

        assert!(lightbox.close());
        assert!(!lightbox.is_open());
        assert!(lightbox.source().is_none());
        assert!(!lightbox.close());
    }

    #[test]
    fn test_escape_closes() {
        let lightbox = Lightbox::new();
        lightbox.open("img/img3-1.png");
        assert!(!lightbox.handle_key("Enter"));
        assert!(lightbox.is_open());
        assert!(lightbox.handle_key("Escape"));
        assert!(!lightbox.is_open());
    }
}
