//! Process-wide generation counter for coordinate selections.

use std::sync::atomic::{AtomicU64, Ordering};

use fieldscope_types::Generation;

/// Monotonic counter incremented exactly once per coordinate-selection
/// event. Results stamped with an older generation are stale.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    value: AtomicU64,
}

impl GenerationCounter {
    /// Counter starting at generation zero (nothing selected yet).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    /// Advance to and return the next generation.
    pub fn advance(&self) -> Generation {
        // Wrapping at u64::MAX is unreachable in practice; fetch_add keeps
        // the increment atomic across tasks.
        Generation(self.value.fetch_add(1, Ordering::SeqCst).wrapping_add(1))
    }

    /// The current generation without advancing.
    pub fn current(&self) -> Generation {
        Generation(self.value.load(Ordering::SeqCst))
    }
}
