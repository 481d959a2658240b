//! Smooth scrolling system
//!
//! Frame-driven animation of a single surface's offset.
//!
//! # Architecture
//!
//! ## Atomic layer
//! - `easing` - Tween curves and the momentum smoothing step
//! - `timing` - Frame-clock progress and interpolation
//! - `config` - Configuration types and derived values (re-exported from `crate::config`)
//! - `frame` - Frame scheduling capability and the manual test scheduler
//!
//! ## Molecular layer
//! - `animation` - Momentum and tween controller combining the atoms
//!
//! # Usage
//!
//! ```ignore
//! use filmstrip_core::scroll::{ScrollAnimator, ScrollConfig};
//!
//! let mut animator = ScrollAnimator::new(ScrollConfig::default());
//!
//! // Wheel tick: accumulate momentum from the surface's current offset
//! animator.add_momentum(120.0, surface.offset(), surface.max_offset());
//!
//! // In each frame callback, write the returned offset
//! if let Some(offset) = animator.tick(now_ms, surface.max_offset()) {
//!     surface.set_offset(offset);
//! }
//! ```

// Atomic layer
pub mod config;
pub mod easing;
pub mod frame;
pub mod timing;

// Molecular layer
pub mod animation;

// Re-exports for convenient access
pub use animation::{MomentumState, ScrollAnimator};
pub use config::{ScrollConfig, ScrollConfigExt, ScrollMode};
pub use easing::{EasingType, EasingTypeExt};
pub use frame::{FrameHandle, FrameScheduler, FrameTask, ManualFrames};
