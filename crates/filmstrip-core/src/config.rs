use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::gallery::GalleryEntry;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub wheel: WheelConfig,
    #[serde(default)]
    pub parallax: ParallaxConfig,
    #[serde(default)]
    pub elements: ElementsConfig,
    #[serde(default)]
    pub gallery: GalleryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Easing curve used by fixed-duration scroll animations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EasingType {
    /// Jump straight to the end on the last frame
    None,
    Linear,
    /// Fast start, gentle landing
    EaseOutCubic,
    /// Symmetric quadratic ease-in-ease-out
    #[default]
    EaseInOutQuad,
}

/// How wheel input is turned into motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScrollMode {
    /// Accumulate into a target and chase it with exponential smoothing
    #[default]
    Momentum,
    /// Fixed-duration eased scroll-by per wheel tick
    Tween,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Animate scroll changes (false = apply wheel deltas instantly)
    #[serde(default = "default_true")]
    pub smooth_enabled: bool,
    /// Animator used for wheel input
    #[serde(default)]
    pub mode: ScrollMode,
    /// Fraction of the remaining distance covered per frame in momentum mode
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f64,
    /// Distance below which momentum snaps to its target
    #[serde(default = "default_snap_epsilon")]
    pub snap_epsilon: f64,
    /// Duration of one tween in milliseconds
    #[serde(default = "default_tween_duration")]
    pub tween_duration_ms: u64,
    /// Easing curve for tweens
    #[serde(default)]
    pub easing: EasingType,
    /// Frame rate of the headless simulation clock
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            smooth_enabled: default_true(),
            mode: ScrollMode::default(),
            ease_factor: default_ease_factor(),
            snap_epsilon: default_snap_epsilon(),
            tween_duration_ms: default_tween_duration(),
            easing: EasingType::default(),
            animation_fps: default_animation_fps(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WheelConfig {
    /// Multiplier applied to vertical wheel deltas in momentum mode
    #[serde(default = "default_momentum_sensitivity")]
    pub momentum_sensitivity: f64,
    /// Pixels per line for line-mode wheel deltas
    #[serde(default = "default_line_height")]
    pub line_height_px: f64,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            momentum_sensitivity: default_momentum_sensitivity(),
            line_height_px: default_line_height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallaxConfig {
    /// Speed factor of the background layer (< 1 moves slower)
    #[serde(default = "default_back_speed")]
    pub back_speed: f64,
    /// Speed factor of the foreground layer (> 1 moves faster)
    #[serde(default = "default_front_speed")]
    pub front_speed: f64,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            back_speed: default_back_speed(),
            front_speed: default_front_speed(),
        }
    }
}

/// DOM element ids the web binding looks up at mount
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementsConfig {
    #[serde(default = "default_id_primary")]
    pub primary: String,
    #[serde(default = "default_id_proxy")]
    pub proxy: String,
    #[serde(default = "default_id_proxy_sizer")]
    pub proxy_sizer: String,
    #[serde(default = "default_id_top")]
    pub top: String,
    #[serde(default = "default_id_secondary")]
    pub secondary: String,
    #[serde(default = "default_id_secondary_proxy")]
    pub secondary_proxy: String,
    #[serde(default = "default_id_secondary_proxy_sizer")]
    pub secondary_proxy_sizer: String,
    #[serde(default = "default_id_parallax_back")]
    pub parallax_back: String,
    #[serde(default = "default_id_parallax_front")]
    pub parallax_front: String,
    #[serde(default = "default_id_lightbox")]
    pub lightbox: String,
    #[serde(default = "default_id_lightbox_img")]
    pub lightbox_img: String,
    #[serde(default = "default_id_lightbox_close")]
    pub lightbox_close: String,
    #[serde(default = "default_id_lightbox_backdrop")]
    pub lightbox_backdrop: String,
}

impl Default for ElementsConfig {
    fn default() -> Self {
        Self {
            primary: default_id_primary(),
            proxy: default_id_proxy(),
            proxy_sizer: default_id_proxy_sizer(),
            top: default_id_top(),
            secondary: default_id_secondary(),
            secondary_proxy: default_id_secondary_proxy(),
            secondary_proxy_sizer: default_id_secondary_proxy_sizer(),
            parallax_back: default_id_parallax_back(),
            parallax_front: default_id_parallax_front(),
            lightbox: default_id_lightbox(),
            lightbox_img: default_id_lightbox_img(),
            lightbox_close: default_id_lightbox_close(),
            lightbox_backdrop: default_id_lightbox_backdrop(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GalleryConfig {
    /// Per-image click and hover behavior, keyed by the image's alt text
    #[serde(default)]
    pub entries: Vec<GalleryEntry>,
}

fn default_id_primary() -> String { "image-row".to_string() }
fn default_id_proxy() -> String { "scrollbar-proxy".to_string() }
fn default_id_proxy_sizer() -> String { "scrollbar-inner".to_string() }
fn default_id_top() -> String { "image-row-top".to_string() }
fn default_id_secondary() -> String { "image-row-second".to_string() }
fn default_id_secondary_proxy() -> String { "scrollbar-proxy-second".to_string() }
fn default_id_secondary_proxy_sizer() -> String { "scrollbar-inner-second".to_string() }
fn default_id_parallax_back() -> String { "parallax-back".to_string() }
fn default_id_parallax_front() -> String { "parallax-front".to_string() }
fn default_id_lightbox() -> String { "lightbox".to_string() }
fn default_id_lightbox_img() -> String { "lightbox-img".to_string() }
fn default_id_lightbox_close() -> String { "lightbox-close".to_string() }
fn default_id_lightbox_backdrop() -> String { "lightbox-backdrop".to_string() }

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_ease_factor() -> f64 {
    0.15
}

fn default_snap_epsilon() -> f64 {
    0.1
}

fn default_tween_duration() -> u64 {
    200
}

fn default_animation_fps() -> u32 {
    60
}

fn default_momentum_sensitivity() -> f64 {
    1.8
}

fn default_line_height() -> f64 {
    16.0
}

fn default_back_speed() -> f64 {
    0.3
}

fn default_front_speed() -> f64 {
    1.3
}

impl AppConfig {
    /// Parse configuration from a TOML document
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config.sanitized())
    }

    /// Parse configuration from a JSON document
    pub fn from_json_str(content: &str) -> crate::Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        Ok(config.sanitized())
    }

    /// Load configuration from a file, picking the format from its extension
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") | None => Self::from_toml_str(&content),
            Some(other) => Err(crate::Error::Config(format!(
                "unsupported config format '{}' ({})",
                other,
                path.display()
            ))),
        }
    }

    /// Render the configuration as pretty TOML
    pub fn to_toml_string(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Replace out-of-range tuning values with their defaults
    pub fn sanitized(mut self) -> Self {
        let scroll = &mut self.scroll;
        if !(scroll.ease_factor > 0.0 && scroll.ease_factor < 1.0) {
            tracing::warn!(
                "scroll.ease_factor {} outside (0, 1), using {}",
                scroll.ease_factor,
                default_ease_factor()
            );
            scroll.ease_factor = default_ease_factor();
        }
        if !(scroll.snap_epsilon > 0.0) {
            tracing::warn!(
                "scroll.snap_epsilon {} must be positive, using {}",
                scroll.snap_epsilon,
                default_snap_epsilon()
            );
            scroll.snap_epsilon = default_snap_epsilon();
        }
        if !self.wheel.momentum_sensitivity.is_finite() {
            tracing::warn!("wheel.momentum_sensitivity is not finite, using default");
            self.wheel.momentum_sensitivity = default_momentum_sensitivity();
        }
        for (name, speed, fallback) in [
            ("back_speed", &mut self.parallax.back_speed, default_back_speed()),
            ("front_speed", &mut self.parallax.front_speed, default_front_speed()),
        ] {
            if !(speed.is_finite() && *speed >= 0.0) {
                tracing::warn!("parallax.{} {} is invalid, using {}", name, speed, fallback);
                *speed = fallback;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::ImageAction;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.scroll.smooth_enabled);
        assert_eq!(config.scroll.mode, ScrollMode::Momentum);
        assert!((config.scroll.ease_factor - 0.15).abs() < f64::EPSILON);
        assert_eq!(config.scroll.tween_duration_ms, 200);
        assert_eq!(config.scroll.easing, EasingType::EaseInOutQuad);
        assert!((config.wheel.momentum_sensitivity - 1.8).abs() < f64::EPSILON);
        assert_eq!(config.elements.primary, "image-row");
        assert_eq!(config.elements.secondary_proxy_sizer, "scrollbar-inner-second");
        assert!(config.gallery.entries.is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [scroll]
            mode = "tween"
            tween_duration_ms = 300

            [parallax]
            back_speed = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.scroll.mode, ScrollMode::Tween);
        assert_eq!(config.scroll.tween_duration_ms, 300);
        assert!((config.parallax.back_speed - 0.5).abs() < f64::EPSILON);
        assert!((config.parallax.front_speed - 1.3).abs() < f64::EPSILON);
        assert_eq!(config.elements.proxy, "scrollbar-proxy");
    }

    #[test]
    fn test_gallery_entries_from_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            [[gallery.entries]]
            alt = "img1"
            action = { navigate = { url = "https://example.com" } }

            [[gallery.entries]]
            alt = "img23"
            action = { lightbox = { src = "img/img23-1.png" } }
            hover_group = "pair"
            "#,
        )
        .unwrap();
        assert_eq!(config.gallery.entries.len(), 2);
        assert_eq!(
            config.gallery.entries[1].action,
            ImageAction::Lightbox {
                src: "img/img23-1.png".to_string()
            }
        );
        assert_eq!(config.gallery.entries[1].hover_group.as_deref(), Some("pair"));
    }

    #[test]
    fn test_json_config() {
        let config = AppConfig::from_json_str(r#"{"wheel": {"momentum_sensitivity": 2.5}}"#).unwrap();
        assert!((config.wheel.momentum_sensitivity - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_out_of_range_values_are_replaced() {
        let config = AppConfig::from_toml_str(
            r#"
            [scroll]
            ease_factor = 1.5
            snap_epsilon = 0.0

            [parallax]
            front_speed = -2.0
            "#,
        )
        .unwrap();
        assert!((config.scroll.ease_factor - 0.15).abs() < f64::EPSILON);
        assert!((config.scroll.snap_epsilon - 0.1).abs() < f64::EPSILON);
        assert!((config.parallax.front_speed - 1.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_demo_config() {
        let config = AppConfig::from_toml_str(include_str!("../../../demos/filmstrip.toml")).unwrap();
        assert_eq!(config.gallery.entries.len(), 4);
        assert_eq!(
            config.gallery.entries[0].action,
            ImageAction::Navigate {
                url: "https://youtu.be/8HgRa3zzOAE".to_string()
            }
        );
        assert_eq!(config.gallery.entries[3].hover_group.as_deref(), Some("pair-23-24"));
        assert_eq!(config.elements.primary, "image-row");
    }

    #[test]
    fn test_toml_roundtrip_of_defaults() {
        let rendered = AppConfig::default().to_toml_string().unwrap();
        let parsed = AppConfig::from_toml_str(&rendered).unwrap();
        assert_eq!(parsed.elements.lightbox_backdrop, "lightbox-backdrop");
        assert_eq!(parsed.scroll.mode, ScrollMode::Momentum);
    }
}
