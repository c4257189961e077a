//! The durable farm-activity log.
//!
//! [`ActivityStore`] owns the activity collection. Every mutating call
//! persists the complete collection to the storage collaborator before it
//! returns, under a single key, so a reload always sees the last fully
//! committed state. Access is serialized through an internal mutex: a
//! multi-threaded host gets single-writer semantics for free, and two
//! concurrent updates to the same id can never interleave partially.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use fieldscope_types::{ActivityDraft, ActivityEntry, ActivityId, ActivityPatch};
use tracing::debug;

use crate::error::StoreError;
use crate::storage::ScopedStorage;

/// Storage key for the persisted activity collection.
const STORAGE_KEY: &str = "farm_activities";

/// The user-facing past/upcoming grouping of activities.
///
/// Both views preserve the original insertion order; they are filtered,
/// never re-sorted by date. The calendar UI depends on that ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityLists {
    /// Entries scheduled strictly before the split instant.
    pub past: Vec<ActivityEntry>,
    /// Entries scheduled at or after the split instant.
    pub upcoming: Vec<ActivityEntry>,
}

/// Mutable state behind the store mutex.
#[derive(Debug, Default)]
struct Inner {
    /// The collection in insertion order.
    entries: Vec<ActivityEntry>,
    /// Highest id handed out so far; the next id is always greater.
    last_id: i64,
}

impl std::fmt::Debug for ActivityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityStore")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

/// Durable append/update/delete log of farm activities.
pub struct ActivityStore {
    storage: Arc<dyn ScopedStorage>,
    inner: Mutex<Inner>,
}

impl ActivityStore {
    /// Open the store, replaying any previously persisted collection.
    ///
    /// The id watermark is re-seeded from the replayed entries so ids keep
    /// ascending across restarts.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend read fails or the persisted
    /// document cannot be decoded.
    pub fn load(storage: Arc<dyn ScopedStorage>) -> Result<Self, StoreError> {
        let entries: Vec<ActivityEntry> = match storage.read(STORAGE_KEY)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };
        let last_id = entries.iter().map(|e| e.id.0).max().unwrap_or(0);
        debug!(count = entries.len(), last_id, "Activity log loaded");
        Ok(Self {
            storage,
            inner: Mutex::new(Inner { entries, last_id }),
        })
    }

    /// Create a new entry from `draft` and return its fresh id.
    ///
    /// The id is the current epoch-millisecond timestamp, bumped past the
    /// previous id when two creations collide in one millisecond, so it is
    /// strictly monotonic for the process lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if persisting the collection fails; the
    /// in-memory collection is not modified in that case.
    pub fn create(&self, draft: ActivityDraft) -> Result<ActivityId, StoreError> {
        let mut inner = self.lock();
        let id = ActivityId(Utc::now().timestamp_millis().max(inner.last_id.saturating_add(1)));
        let entry = ActivityEntry::from_draft(id, draft);

        inner.entries.push(entry);
        if let Err(err) = self.persist(&inner) {
            inner.entries.pop();
            return Err(err);
        }
        inner.last_id = id.0;
        debug!(%id, "Activity created");
        Ok(id)
    }

    /// Replace the fields named by `patch` on the entry with id `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no entry has that id, or a
    /// backend error if persisting fails; the entry is left unchanged in
    /// that case.
    pub fn update(&self, id: ActivityId, patch: ActivityPatch) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let entry = inner
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let prior = entry.clone();
        entry.apply(patch);
        if let Err(err) = self.persist(&inner) {
            if let Some(entry) = inner.entries.iter_mut().find(|e| e.id == id) {
                *entry = prior;
            }
            return Err(err);
        }
        debug!(%id, "Activity updated");
        Ok(())
    }

    /// Remove the entry with id `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no entry has that id, or a
    /// backend error if persisting fails.
    pub fn delete(&self, id: ActivityId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let position = inner
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let removed = inner.entries.remove(position);
        if let Err(err) = self.persist(&inner) {
            inner.entries.insert(position, removed);
            return Err(err);
        }
        debug!(%id, "Activity deleted");
        Ok(())
    }

    /// Mark the entry as reminded-about. Called only by the reminder
    /// scheduler; there is no path that resets the flag short of deleting
    /// and re-creating the entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no entry has that id, or a
    /// backend error if persisting fails.
    pub fn mark_notified(&self, id: ActivityId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let entry = inner
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let prior = entry.notified;
        entry.notified = true;
        if let Err(err) = self.persist(&inner) {
            if let Some(entry) = inner.entries.iter_mut().find(|e| e.id == id) {
                entry.notified = prior;
            }
            return Err(err);
        }
        Ok(())
    }

    /// Snapshot of the full collection in insertion order.
    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.lock().entries.clone()
    }

    /// Split the collection into past and upcoming views relative to `now`,
    /// preserving insertion order within each view.
    pub fn list(&self, now: DateTime<Utc>) -> ActivityLists {
        let inner = self.lock();
        let mut lists = ActivityLists::default();
        for entry in &inner.entries {
            if entry.date < now {
                lists.past.push(entry.clone());
            } else {
                lists.upcoming.push(entry.clone());
            }
        }
        lists
    }

    /// Persist the full collection synchronously under the storage key.
    fn persist(&self, inner: &Inner) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&inner.entries)?;
        self.storage.write(STORAGE_KEY, &raw)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::Duration;
    use fieldscope_types::Coordinate;

    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> ActivityStore {
        ActivityStore::load(Arc::new(MemoryStorage::new())).unwrap()
    }

    fn draft(date: DateTime<Utc>, description: &str) -> ActivityDraft {
        ActivityDraft {
            date,
            coordinate: Coordinate::new(20.5937, 78.9629).unwrap(),
            location_name: "Test field".to_owned(),
            description: description.to_owned(),
        }
    }

    #[test]
    fn create_then_list_upcoming_contains_entry_once() {
        let store = store();
        let now = Utc::now();
        let id = store.create(draft(now + Duration::minutes(10), "sowing")).unwrap();

        let lists = store.list(now);
        assert!(lists.past.is_empty());
        assert_eq!(lists.upcoming.len(), 1);
        assert_eq!(lists.upcoming.first().unwrap().id, id);
    }

    #[test]
    fn list_splits_past_and_upcoming_preserving_insertion_order() {
        let store = store();
        let now = Utc::now();
        // Insert out of date order; the views must not re-sort.
        store.create(draft(now + Duration::days(2), "late upcoming")).unwrap();
        store.create(draft(now - Duration::days(1), "recent past")).unwrap();
        store.create(draft(now + Duration::hours(1), "soon upcoming")).unwrap();
        store.create(draft(now - Duration::days(3), "old past")).unwrap();

        let lists = store.list(now);
        let past: Vec<_> = lists.past.iter().map(|e| e.description.as_str()).collect();
        let upcoming: Vec<_> = lists.upcoming.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(past, ["recent past", "old past"]);
        assert_eq!(upcoming, ["late upcoming", "soon upcoming"]);
    }

    #[test]
    fn ids_are_strictly_monotonic() {
        let store = store();
        let now = Utc::now();
        let a = store.create(draft(now, "a")).unwrap();
        let b = store.create(draft(now, "b")).unwrap();
        let c = store.create(draft(now, "c")).unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn update_replaces_only_named_fields() {
        let store = store();
        let now = Utc::now();
        let id = store.create(draft(now + Duration::minutes(5), "sowing")).unwrap();

        store
            .update(
                id,
                ActivityPatch {
                    description: Some("irrigating".to_owned()),
                    ..ActivityPatch::default()
                },
            )
            .unwrap();

        let entry = store.entries().into_iter().find(|e| e.id == id).unwrap();
        assert_eq!(entry.description, "irrigating");
        assert_eq!(entry.date, now + Duration::minutes(5));
        assert_eq!(entry.location_name, "Test field");
        assert!(!entry.notified);
    }

    #[test]
    fn delete_removes_entry() {
        let store = store();
        let id = store.create(draft(Utc::now(), "sowing")).unwrap();
        store.delete(id).unwrap();
        assert!(store.entries().is_empty());
    }

    #[test]
    fn operations_on_unknown_ids_fail_with_not_found() {
        let store = store();
        let missing = ActivityId(42);
        assert!(matches!(
            store.delete(missing),
            Err(StoreError::NotFound(id)) if id == missing
        ));
        assert!(matches!(
            store.update(missing, ActivityPatch::default()),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.mark_notified(missing),
            Err(StoreError::NotFound(_))
        ));
    }

    /// Storage that can be switched into a write-failure mode.
    #[derive(Default)]
    struct FlakyStorage {
        backing: MemoryStorage,
        fail_writes: std::sync::atomic::AtomicBool,
    }

    impl FlakyStorage {
        fn set_failing(&self, failing: bool) {
            self.fail_writes
                .store(failing, std::sync::atomic::Ordering::SeqCst);
        }
    }

    impl ScopedStorage for FlakyStorage {
        fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.backing.read(key)
        }

        fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.fail_writes.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(StoreError::Backend(std::io::Error::other("disk full")));
            }
            self.backing.write(key, value)
        }
    }

    #[test]
    fn failed_persist_rolls_back_the_in_memory_mutation() {
        let storage = Arc::new(FlakyStorage::default());
        let store = ActivityStore::load(Arc::clone(&storage) as Arc<dyn ScopedStorage>).unwrap();
        let now = Utc::now();
        let id = store.create(draft(now + Duration::minutes(5), "sowing")).unwrap();

        storage.set_failing(true);
        assert!(store.create(draft(now, "doomed")).is_err());
        assert!(store
            .update(
                id,
                ActivityPatch {
                    description: Some("irrigating".to_owned()),
                    ..ActivityPatch::default()
                },
            )
            .is_err());
        assert!(store.delete(id).is_err());
        assert!(store.mark_notified(id).is_err());

        // Memory must still mirror the last committed state exactly.
        let entries = store.entries();
        assert_eq!(entries.len(), 1);
        let entry = entries.first().unwrap();
        assert_eq!(entry.id, id);
        assert_eq!(entry.description, "sowing");
        assert!(!entry.notified);

        storage.set_failing(false);
        store.mark_notified(id).unwrap();
        assert!(store.entries().first().unwrap().notified);
    }

    #[test]
    fn collection_survives_reload() {
        let storage: Arc<dyn ScopedStorage> = Arc::new(MemoryStorage::new());
        let now = Utc::now();

        let first = ActivityStore::load(Arc::clone(&storage)).unwrap();
        let id = first.create(draft(now + Duration::minutes(30), "harvest")).unwrap();
        first.mark_notified(id).unwrap();
        drop(first);

        let second = ActivityStore::load(storage).unwrap();
        let entries = second.entries();
        assert_eq!(entries.len(), 1);
        let entry = entries.first().unwrap();
        assert_eq!(entry.id, id);
        assert!(entry.notified, "notified flag must persist with the entry");

        // The replayed watermark keeps new ids ascending.
        let next = second.create(draft(now, "next")).unwrap();
        assert!(next > id);
    }
}
