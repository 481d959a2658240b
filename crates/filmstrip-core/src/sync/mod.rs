//! Scroll synchronization between surfaces
//!
//! - `transfer` - offset mapping functions (identity, ratio, parallax)
//! - `link` - directed links and the standard page topology
//! - `guard` - feedback suppression for mirrored writes

pub mod guard;
pub mod link;
pub mod transfer;

pub use guard::{chain_blocks, Direction, EchoFilter, GuardFlags, ECHO_TOLERANCE};
pub use link::{Delivery, SyncLink, Topology};
pub use transfer::{scroll_ratio, TransferFn};
