//! Process-wide consensus group identifiers.

use std::sync::atomic::{AtomicU32, Ordering};

/// Largest identifier issued before wrapping back to 1.
pub const MAX_GROUP_ID: u32 = 999_999;

/// Issues zero-padded six-digit group identifiers: `000001`, `000002`, ...
///
/// After [`MAX_GROUP_ID`] the sequence wraps to `000001`, so identifiers are only unique
/// within a window of 999,999 groups. Safe to share between threads (e.g. behind an `Arc`).
#[derive(Debug, Default)]
pub struct GroupIdAllocator {
    /// Last identifier issued; zero before the first call
    last: AtomicU32,
}

#[inline]
fn successor(id: u32) -> u32 {
    if id >= MAX_GROUP_ID { 1 } else { id + 1 }
}

impl GroupIdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocator whose next identifier follows `last`.
    #[must_use]
    pub fn starting_after(last: u32) -> Self {
        Self { last: AtomicU32::new(last.min(MAX_GROUP_ID)) }
    }

    /// Returns the next numeric identifier.
    pub fn next_value(&self) -> u32 {
        let previous = match self.last.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |id| {
            Some(successor(id))
        }) {
            Ok(id) | Err(id) => id,
        };
        successor(previous)
    }

    /// Returns the next identifier formatted as six zero-padded digits.
    pub fn next(&self) -> String {
        format!("{:06}", self.next_value())
    }
}
