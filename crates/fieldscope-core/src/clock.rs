//! Injectable time source.
//!
//! The reminder scan compares entry dates against "now"; routing that
//! through [`SessionClock`] lets tests drive the scan with a manually
//! advanced clock instead of the wall clock.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

/// A time source: the system clock or a manually advanced one.
#[derive(Debug, Clone)]
pub enum SessionClock {
    /// Wall-clock time.
    System,
    /// Manually controlled time for tests.
    Manual(Arc<Mutex<DateTime<Utc>>>),
}

impl SessionClock {
    /// A manual clock starting at `start`.
    #[must_use]
    pub fn manual(start: DateTime<Utc>) -> Self {
        Self::Manual(Arc::new(Mutex::new(start)))
    }

    /// The current time according to this clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Manual(t) => *t.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Advance a manual clock by `delta`. No-op on the system clock.
    pub fn advance(&self, delta: Duration) {
        if let Self::Manual(t) = self {
            let mut guard = t.lock().unwrap_or_else(PoisonError::into_inner);
            *guard = guard
                .checked_add_signed(delta)
                .unwrap_or(*guard);
        }
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::System
    }
}
