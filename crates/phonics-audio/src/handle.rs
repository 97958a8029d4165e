//! Playback handles.
//!
//! Every started sound gets a unique `AudioHandle`. Handles are never reused,
//! so a completion that arrives for an old handle can always be recognized as
//! stale.

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a playing sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AudioHandle {
    id: u64,
}

impl AudioHandle {
    /// Create a handle with the given ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self { id }
    }

    /// Get the raw ID.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }
}

impl std::fmt::Display for AudioHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.id)
    }
}

/// Audio handle generator for unique IDs.
#[derive(Debug)]
pub struct HandleGenerator {
    next_id: AtomicU64,
}

impl Default for HandleGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleGenerator {
    /// Create a new handle generator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
        }
    }

    /// Generate a new unique handle.
    pub fn next(&self) -> AudioHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        AudioHandle::new(id)
    }
}
