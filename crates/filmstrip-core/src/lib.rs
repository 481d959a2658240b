pub mod config;
pub mod error;
pub mod gallery;
pub mod surface;
pub mod scroll;
pub mod sync;
pub mod wheel;
pub mod layout;
pub mod overlay;
pub mod engine;
pub mod sim;

pub use config::{AppConfig, EasingType, ScrollConfig};
pub use engine::ScrollEngine;
pub use error::{Error, Result};
pub use gallery::{GalleryEntry, GalleryMap, ImageAction};
pub use overlay::{Lightbox, OverlayProbe};
pub use surface::{ScrollSurface, SurfaceRole, VirtualSurface};
pub use wheel::{DeltaMode, WheelAction, WheelInput, WheelListener};
