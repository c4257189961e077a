//! Scoped persistent storage and the durable activity log.
//!
//! The storage collaborator is a scoped string key-value store whose
//! values survive process restart. [`ActivityStore`] keeps the activity
//! collection in memory behind a mutex and synchronously persists the whole
//! collection on every mutation, so readers never observe a partial write.
//!
//! [`ActivityStore`]: activity::ActivityStore

pub mod activity;
pub mod error;
pub mod storage;

pub use activity::{ActivityLists, ActivityStore};
pub use error::StoreError;
pub use storage::{FileStorage, MemoryStorage, ScopedStorage};
