//! Declarative per-image behavior
//!
//! Maps an image (identified by its alt text) to what a click does and to the
//! hover group whose members highlight together.

use serde::{Deserialize, Serialize};

/// What clicking an image does
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageAction {
    /// Show `src` in the lightbox overlay
    Lightbox { src: String },
    /// Open `url` in a new browsing context
    Navigate { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryEntry {
    /// Alt text of the image element
    pub alt: String,
    pub action: ImageAction,
    /// Images sharing a group name highlight together on hover
    #[serde(default)]
    pub hover_group: Option<String>,
}

/// Lookup table built from the configured entries
#[derive(Debug, Clone, Default)]
pub struct GalleryMap {
    entries: Vec<GalleryEntry>,
}

impl GalleryMap {
    pub fn new(entries: Vec<GalleryEntry>) -> Self {
        let mut deduped: Vec<GalleryEntry> = Vec::with_capacity(entries.len());
        for entry in entries {
            if deduped.iter().any(|e| e.alt == entry.alt) {
                tracing::warn!("Duplicate gallery entry for '{}', keeping the first", entry.alt);
                continue;
            }
            deduped.push(entry);
        }
        Self { entries: deduped }
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn action_for(&self, alt: &str) -> Option<&ImageAction> {
        self.entries.iter().find(|e| e.alt == alt).map(|e| &e.action)
    }

    /// All alts that highlight together with `alt`, itself included.
    /// Images outside any group only highlight themselves.
    pub fn hover_partners<'a>(&'a self, alt: &'a str) -> Vec<&'a str> {
        let group = self
            .entries
            .iter()
            .find(|e| e.alt == alt)
            .and_then(|e| e.hover_group.as_deref());

        match group {
            Some(group) => self
                .entries
                .iter()
                .filter(|e| e.hover_group.as_deref() == Some(group))
                .map(|e| e.alt.as_str())
                .collect(),
            None => vec![alt],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lightbox(alt: &str, src: &str, group: Option<&str>) -> GalleryEntry {
        GalleryEntry {
            alt: alt.to_string(),
            action: ImageAction::Lightbox { src: src.to_string() },
            hover_group: group.map(str::to_string),
        }
    }

    #[test]
    fn test_action_lookup() {
        let map = GalleryMap::new(vec![
            GalleryEntry {
                alt: "img1".to_string(),
                action: ImageAction::Navigate {
                    url: "https://example.com/watch".to_string(),
                },
                hover_group: None,
            },
            lightbox("img2", "img/img2-1.png", None),
        ]);

        assert_eq!(
            map.action_for("img2"),
            Some(&ImageAction::Lightbox {
                src: "img/img2-1.png".to_string()
            })
        );
        assert!(matches!(map.action_for("img1"), Some(ImageAction::Navigate { .. })));
        assert!(map.action_for("img99").is_none());
    }

    #[test]
    fn test_hover_group_members() {
        let map = GalleryMap::new(vec![
            lightbox("img22", "img/img22-1.png", None),
            lightbox("img23", "img/img23-1.png", Some("pair")),
            lightbox("img24", "img/img23-1.png", Some("pair")),
        ]);

        assert_eq!(map.hover_partners("img24"), vec!["img23", "img24"]);
        assert_eq!(map.hover_partners("img22"), vec!["img22"]);
        assert_eq!(map.hover_partners("unknown"), vec!["unknown"]);
    }

    #[test]
    fn test_duplicates_keep_first() {
        let map = GalleryMap::new(vec![
            lightbox("img5", "first.png", None),
            lightbox("img5", "second.png", None),
        ]);
        assert_eq!(map.entries().len(), 1);
        assert_eq!(
            map.action_for("img5"),
            Some(&ImageAction::Lightbox {
                src: "first.png".to_string()
            })
        );
    }
}
