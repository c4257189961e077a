//! Session orchestration for the Fieldscope map core.
//!
//! One user action -- a map click, a search pick, a layer toggle -- fans
//! out into independent provider lookups, and every result that comes
//! back is reconciled against a generation counter so a slow response to
//! an old coordinate can never overwrite a newer one. The pieces:
//!
//! - [`LayerSelector`]: single-active-layer state machine.
//! - [`PopupManager`]: panel visibility under layer-group mutual exclusion.
//! - [`MapSession`]: the fan-out/fan-in engine itself.
//! - [`ReminderScheduler`]: periodic scan of the activity log emitting
//!   at-most-once reminders.
//! - [`SessionClock`]: injectable time source so reminder scans run under
//!   simulated clocks in tests.
//!
//! [`LayerSelector`]: layers::LayerSelector
//! [`PopupManager`]: popup::PopupManager
//! [`MapSession`]: session::MapSession
//! [`ReminderScheduler`]: reminder::ReminderScheduler
//! [`SessionClock`]: clock::SessionClock

pub mod clock;
pub mod config;
pub mod error;
pub mod generation;
pub mod layers;
pub mod popup;
pub mod reminder;
pub mod session;

pub use clock::SessionClock;
pub use config::AppConfig;
pub use error::{ConfigError, SchedulerError, SessionError};
pub use layers::LayerSelector;
pub use popup::PopupManager;
pub use reminder::{ReminderEvent, ReminderScheduler};
pub use session::{
    MapSession, MarkerState, ProviderQuery, QueryStatus, SelectionSource, SessionSnapshot, UiEvent,
};
