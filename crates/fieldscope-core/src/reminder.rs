//! At-most-once reminder engine over the activity log.
//!
//! A repeating timer scans the store; an entry qualifies when it has not
//! been notified and its date lies strictly ahead of now by at most the
//! lookahead window. Qualifying entries are marked notified through the
//! store before the event goes out, so each entry reminds at most once
//! for the life of the log -- `notified` persists with the entry, which
//! is the only restart protection this engine specifies.
//!
//! Ticks never overlap: one loop task owns the timer, and missed ticks
//! are skipped rather than queued. Scan errors are logged and the loop
//! continues on the next interval.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use fieldscope_store::ActivityStore;
use fieldscope_types::{ActivityEntry, ActivityId};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::clock::SessionClock;
use crate::error::SchedulerError;

/// Capacity of the reminder broadcast channel.
const EVENT_CAPACITY: usize = 64;

/// A reminder that an activity is coming due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderEvent {
    /// The entry coming due.
    pub id: ActivityId,
    /// Its description, for display.
    pub description: String,
    /// When the activity is scheduled.
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug)]
struct Inner {
    phase: Phase,
    shutdown: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<()>>,
}

/// Periodic reminder scanner: `Idle -> Running -> Stopped`.
///
/// `start` is idempotent while running and `Stopped` is terminal. After
/// `stop` returns, no further [`ReminderEvent`] is emitted.
#[derive(Debug)]
pub struct ReminderScheduler {
    store: Arc<ActivityStore>,
    clock: SessionClock,
    events: broadcast::Sender<ReminderEvent>,
    inner: Mutex<Inner>,
}

impl ReminderScheduler {
    /// New idle scheduler over `store`.
    #[must_use]
    pub fn new(store: Arc<ActivityStore>, clock: SessionClock) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            clock,
            events,
            inner: Mutex::new(Inner {
                phase: Phase::Idle,
                shutdown: None,
                handle: None,
            }),
        }
    }

    /// Subscribe to reminder events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ReminderEvent> {
        self.events.subscribe()
    }

    /// Whether the tick loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lock().phase == Phase::Running
    }

    /// Start the tick loop. A second call while running (or after stop)
    /// is a no-op.
    pub fn start(&self, interval: Duration, lookahead: Duration) {
        let mut inner = self.lock();
        if inner.phase != Phase::Idle {
            debug!(phase = ?inner.phase, "start ignored");
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let store = Arc::clone(&self.store);
        let clock = self.clock.clone();
        let events = self.events.clone();
        let lookahead = TimeDelta::from_std(lookahead).unwrap_or(TimeDelta::MAX);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The interval's first tick fires immediately; the scan
            // schedule begins one full interval in.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {
                        run_tick(&store, &clock, lookahead, &events);
                    }
                }
            }
            debug!("reminder loop terminated");
        });

        inner.phase = Phase::Running;
        inner.shutdown = Some(shutdown_tx);
        inner.handle = Some(handle);
        info!(interval = ?interval, "reminder scheduler started");
    }

    /// Stop the tick loop and wait for it to terminate. No reminder is
    /// emitted after this returns.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::NotRunning`] if the loop is not running.
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        let (shutdown, handle) = {
            let mut inner = self.lock();
            if inner.phase != Phase::Running {
                return Err(SchedulerError::NotRunning);
            }
            inner.phase = Phase::Stopped;
            (inner.shutdown.take(), inner.handle.take())
        };

        if let Some(tx) = shutdown {
            let _ = tx.send(true);
        }
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(error = %e, "reminder loop join failed");
            }
        }
        info!("reminder scheduler stopped");
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One tick: scan, mark, emit. Errors are caught here so the loop never
/// dies to a bad entry.
fn run_tick(
    store: &ActivityStore,
    clock: &SessionClock,
    lookahead: TimeDelta,
    events: &broadcast::Sender<ReminderEvent>,
) {
    let now = clock.now();
    let entries = store.entries();
    for id in run_scan(&entries, now, lookahead) {
        // Mark before emitting: a mark failure must not produce an
        // event that could repeat on the next tick.
        if let Err(e) = store.mark_notified(id) {
            error!(id = id.0, error = %e, "failed to mark entry notified");
            continue;
        }
        if let Some(entry) = entries.iter().find(|e| e.id == id) {
            debug!(id = id.0, "reminder due");
            let _ = events.send(ReminderEvent {
                id,
                description: entry.description.clone(),
                date: entry.date,
            });
        }
    }
}

/// The entries due for a reminder at `now`: not yet notified, and due
/// strictly in the future by at most `lookahead`. Pure so tick behavior
/// is testable without a timer.
#[must_use]
pub fn run_scan(entries: &[ActivityEntry], now: DateTime<Utc>, lookahead: TimeDelta) -> Vec<ActivityId> {
    entries
        .iter()
        .filter(|entry| !entry.notified)
        .filter(|entry| {
            let delta = entry.date.signed_duration_since(now);
            delta > TimeDelta::zero() && delta <= lookahead
        })
        .map(|entry| entry.id)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use fieldscope_store::{MemoryStorage, ScopedStorage};
    use fieldscope_types::{ActivityDraft, Coordinate};

    fn store() -> Arc<ActivityStore> {
        let storage: Arc<dyn ScopedStorage> = Arc::new(MemoryStorage::new());
        Arc::new(ActivityStore::load(storage).unwrap())
    }

    fn draft(date: DateTime<Utc>, description: &str) -> ActivityDraft {
        ActivityDraft {
            date,
            coordinate: Coordinate::new(20.0, 78.0).unwrap(),
            location_name: "field".to_owned(),
            description: description.to_owned(),
        }
    }

    const LOOKAHEAD: TimeDelta = TimeDelta::minutes(15);

    #[test]
    fn entry_ten_minutes_out_reminds_exactly_once_over_sixteen_ticks() {
        let store = store();
        let now = Utc::now();
        let id = store.create(draft(now + TimeDelta::minutes(10), "sow")).unwrap();

        let mut fired = 0_u32;
        for _ in 0..16 {
            let due = run_scan(&store.entries(), now, LOOKAHEAD);
            for due_id in &due {
                store.mark_notified(*due_id).unwrap();
                fired += 1;
            }
        }

        assert_eq!(fired, 1);
        let entry = store.entries().into_iter().find(|e| e.id == id).unwrap();
        assert!(entry.notified);
    }

    #[test]
    fn entry_beyond_the_lookahead_stays_silent() {
        let store = store();
        let now = Utc::now();
        store.create(draft(now + TimeDelta::minutes(20), "irrigate")).unwrap();

        for _ in 0..15 {
            assert!(run_scan(&store.entries(), now, LOOKAHEAD).is_empty());
        }
    }

    #[test]
    fn past_due_entries_are_never_reminded() {
        let store = store();
        let now = Utc::now();
        store.create(draft(now - TimeDelta::minutes(5), "harvest")).unwrap();

        assert!(run_scan(&store.entries(), now, LOOKAHEAD).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn loop_emits_once_and_marks_notified() {
        let store = store();
        let id = store
            .create(draft(Utc::now() + TimeDelta::minutes(10), "weed"))
            .unwrap();

        let scheduler = ReminderScheduler::new(Arc::clone(&store), SessionClock::System);
        let mut events = scheduler.subscribe();
        scheduler.start(Duration::from_secs(60), Duration::from_secs(900));
        assert!(scheduler.is_running());
        // Idempotent while running.
        scheduler.start(Duration::from_secs(1), Duration::from_secs(1));

        let event = events.recv().await.unwrap();
        assert_eq!(event.id, id);
        assert_eq!(event.description, "weed");

        // Plenty of further ticks; nothing else fires.
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert!(events.try_recv().is_err());

        let entry = store.entries().into_iter().find(|e| e.id == id).unwrap();
        assert!(entry.notified);

        scheduler.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_fires_after_stop_even_when_entries_come_due() {
        let store = store();
        let start = Utc::now();
        let clock = SessionClock::manual(start);
        store
            .create(draft(start + TimeDelta::minutes(30), "spray"))
            .unwrap();

        let scheduler = ReminderScheduler::new(Arc::clone(&store), clock.clone());
        let mut events = scheduler.subscribe();
        scheduler.start(Duration::from_secs(60), Duration::from_secs(900));

        // 3 ticks while the entry is still beyond the lookahead.
        tokio::time::sleep(Duration::from_secs(200)).await;
        assert!(events.try_recv().is_err());

        scheduler.stop().await.unwrap();
        assert!(!scheduler.is_running());

        // Bring the entry inside the lookahead after the stop.
        clock.advance(chrono::Duration::minutes(20));
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert!(events.try_recv().is_err());

        // Stopped is terminal.
        assert!(matches!(
            scheduler.stop().await,
            Err(SchedulerError::NotRunning)
        ));
    }
}
