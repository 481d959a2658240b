//! Feedback guard
//!
//! Two mechanisms keep mirrored surfaces from re-propagating their own writes:
//!
//! - [`GuardFlags`] marks a link direction as writing for exactly the span of
//!   one derived write and the synchronous notification it produces. While
//!   `A → B` is held, nothing downstream may write back into `A`.
//! - [`EchoFilter`] remembers the offset last written into each surface, so a
//!   host that reports scroll events asynchronously (browsers do) can drop the
//!   late notification for a write that was already propagated.

use std::collections::HashMap;

use crate::surface::SurfaceRole;

/// Maximum difference, in pixels, between a written offset and the offset a
/// later notification reports for the two to count as the same write.
/// Browsers round `scrollLeft` to device pixels.
pub const ECHO_TOLERANCE: f64 = 1.0;

/// One direction of a sync link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Direction {
    pub from: SurfaceRole,
    pub to: SurfaceRole,
}

impl Direction {
    pub fn new(from: SurfaceRole, to: SurfaceRole) -> Self {
        Self { from, to }
    }

    pub fn reverse(self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }
}

/// Link directions currently performing a derived write
#[derive(Debug, Default)]
pub struct GuardFlags {
    held: Vec<Direction>,
}

impl GuardFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag for `direction` immediately before a derived write
    pub fn hold(&mut self, direction: Direction) {
        self.held.push(direction);
    }

    /// Clear the flag for `direction` immediately after the write
    pub fn release(&mut self, direction: Direction) {
        if let Some(pos) = self.held.iter().rposition(|d| *d == direction) {
            self.held.remove(pos);
        }
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        self.held.contains(&direction)
    }

    /// True when propagating along `direction` would write into a surface that
    /// is itself driving a write in progress. With two surfaces this is the
    /// opposite direction's flag.
    pub fn blocks(&self, direction: Direction) -> bool {
        chain_blocks(&self.held, direction)
    }

    /// Directions held right now, outermost first
    pub fn held(&self) -> &[Direction] {
        &self.held
    }

    pub fn is_clear(&self) -> bool {
        self.held.is_empty()
    }
}

/// Whether a write chain forbids `direction`: its destination already
/// drives a write somewhere in the chain
pub fn chain_blocks(chain: &[Direction], direction: Direction) -> bool {
    chain.iter().any(|d| d.from == direction.to)
}

/// Pending echoes of programmatic writes, one per surface
#[derive(Debug, Default)]
pub struct EchoFilter {
    expected: HashMap<SurfaceRole, f64>,
}

impl EchoFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `offset` was just written into `role`
    pub fn expect(&mut self, role: SurfaceRole, offset: f64) {
        self.expected.insert(role, offset);
    }

    /// Consume the pending echo for `role`. Returns true when `offset` is the
    /// value last written, meaning the notification is an echo.
    pub fn consume(&mut self, role: SurfaceRole, offset: f64) -> bool {
        match self.expected.remove(&role) {
            Some(written) => (written - offset).abs() <= ECHO_TOLERANCE,
            None => false,
        }
    }

    pub fn is_pending(&self, role: SurfaceRole) -> bool {
        self.expected.contains_key(&role)
    }
}
