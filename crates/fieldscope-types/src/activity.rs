//! The persisted farm-activity model.
//!
//! An [`ActivityEntry`] records a planned or past farm activity at a
//! location. Entries are created from an [`ActivityDraft`], edited through
//! an [`ActivityPatch`] (which deliberately cannot touch the `notified`
//! flag), and reminded about exactly once by the reminder scheduler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Unique, process-monotonic identifier for an activity entry.
///
/// Values are milliseconds-since-epoch at creation, bumped past the
/// previous id when two creations land in the same millisecond, so ids
/// never repeat for the process lifetime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ActivityId(pub i64);

impl core::fmt::Display for ActivityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A logged farm activity tied to a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Unique entry id.
    pub id: ActivityId,
    /// When the activity is scheduled (full timestamp; reminders compare
    /// against it minute-precise).
    pub date: DateTime<Utc>,
    /// Where the activity takes place.
    pub coordinate: Coordinate,
    /// Reverse-geocoded or user-supplied place name.
    pub location_name: String,
    /// What the activity is.
    pub description: String,
    /// Set to `true` exactly once when a reminder has fired for this entry.
    /// Persisted with the entry so the at-most-once guarantee survives as
    /// far as the storage collaborator does.
    pub notified: bool,
}

/// Fields required to create a new activity entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDraft {
    /// When the activity is scheduled.
    pub date: DateTime<Utc>,
    /// Where the activity takes place.
    pub coordinate: Coordinate,
    /// Place name shown in the calendar.
    pub location_name: String,
    /// What the activity is.
    pub description: String,
}

/// A partial update to an existing entry.
///
/// `None` fields are left untouched. There is intentionally no way to
/// patch `notified`; only the reminder scheduler flips it, exactly once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityPatch {
    /// New scheduled time, if changing.
    pub date: Option<DateTime<Utc>>,
    /// New coordinate, if changing.
    pub coordinate: Option<Coordinate>,
    /// New place name, if changing.
    pub location_name: Option<String>,
    /// New description, if changing.
    pub description: Option<String>,
}

impl ActivityEntry {
    /// Build the entry created from `draft` under `id`.
    ///
    /// `notified` always starts `false`; it is never carried over from
    /// anywhere else.
    pub fn from_draft(id: ActivityId, draft: ActivityDraft) -> Self {
        Self {
            id,
            date: draft.date,
            coordinate: draft.coordinate,
            location_name: draft.location_name,
            description: draft.description,
            notified: false,
        }
    }

    /// Apply `patch` in place, replacing only the named fields.
    pub fn apply(&mut self, patch: ActivityPatch) {
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(coordinate) = patch.coordinate {
            self.coordinate = coordinate;
        }
        if let Some(location_name) = patch.location_name {
            self.location_name = location_name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
    }
}
