//! Layout-derived values
//!
//! - `extent` - proxy content width tracking
//! - `align` - gap that aligns a row's images with the primary row's span

pub mod align;
pub mod extent;

pub use align::row_gap;
pub use extent::ExtentTracker;
