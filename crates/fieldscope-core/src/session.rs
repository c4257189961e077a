//! The map session: fan-out/fan-in engine for coordinate selections.
//!
//! One coordinate-selection event (click, search pick, "use my location")
//! advances the generation counter once and fans out independent provider
//! lookups, each in its own task with its own timeout. Every arrival is
//! checked against the current generation: stale results are discarded
//! silently, current ones publish to marker/overlay/panel state and emit
//! a [`UiEvent`] on the broadcast channel.
//!
//! Generation stamping orders results by *intent* rather than arrival
//! time: without it, a fast response to an old coordinate can arrive
//! after a slow response to a new one and overwrite it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use fieldscope_providers::{ProviderError, ProviderHub};
use fieldscope_providers::geocode::UNKNOWN_PLACE;
use fieldscope_types::{
    ActivityDraft, ArmKind, Coordinate, CurrentConditions, Generation, Layer, PanelBody,
    PanelCategory, PanelContent, ProviderKind, DEFAULT_CENTER,
};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::clock::SessionClock;
use crate::error::SessionError;
use crate::generation::GenerationCounter;
use crate::layers::LayerSelector;
use crate::popup::{PanelState, PopupManager};

/// Capacity of the UI event broadcast channel.
const EVENT_CAPACITY: usize = 256;

/// Default per-lookup timeout.
const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// What triggered a coordinate selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    /// Direct map click.
    MapClick,
    /// Search result pick.
    SearchPick,
    /// Device-supplied location.
    MyLocation,
}

/// Events published to UI subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// A coordinate selection was accepted and its lookups issued.
    CoordinateSelected {
        /// The selected coordinate.
        coordinate: Coordinate,
        /// The generation stamped on the fan-out.
        generation: Generation,
    },
    /// The marker's location code resolved.
    MarkerCode {
        /// Generation the code belongs to.
        generation: Generation,
        /// The opaque location code.
        code: String,
    },
    /// The weather overlay symbol changed.
    Overlay {
        /// Generation the conditions belong to.
        generation: Generation,
        /// Condition keyword, e.g. `Rain`.
        condition: String,
    },
    /// A panel's body changed (ready or failed).
    Panel {
        /// The panel that changed.
        category: PanelCategory,
        /// Generation the update belongs to.
        generation: Generation,
    },
}

/// Outcome of one provider lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Issued, no result yet.
    Pending,
    /// Completed successfully.
    Success,
    /// Failed (network, upstream, decode, or timeout).
    Failure,
}

/// Record of one provider lookup within one coordinate selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderQuery {
    /// Which provider was called.
    pub kind: ProviderKind,
    /// Generation the call was stamped with.
    pub generation: Generation,
    /// Current status.
    pub status: QueryStatus,
    /// When the call was issued.
    pub issued_at: DateTime<Utc>,
}

/// The map marker: the selected coordinate plus its resolved code.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerState {
    /// Where the marker sits.
    pub coordinate: Coordinate,
    /// Location code once the encode lookup resolves.
    pub location_code: Option<String>,
}

/// Read-only view of the session state.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Latest accepted generation.
    pub generation: Generation,
    /// Current map center.
    pub center: Coordinate,
    /// Active layer.
    pub layer: Layer,
    /// Marker state, if a coordinate has been selected.
    pub marker: Option<MarkerState>,
    /// Current-conditions overlay, if resolved.
    pub overlay: Option<CurrentConditions>,
    /// Panel visibility and bodies.
    pub panels: std::collections::BTreeMap<PanelCategory, PanelState>,
    /// Lookup records, oldest first.
    pub queries: Vec<ProviderQuery>,
    /// How many stale results have been discarded.
    pub stale_discards: u64,
}

#[derive(Debug)]
struct SessionState {
    center: Coordinate,
    layers: LayerSelector,
    popups: PopupManager,
    marker: Option<MarkerState>,
    overlay: Option<CurrentConditions>,
    queries: Vec<ProviderQuery>,
    stale_discards: u64,
}

impl SessionState {
    fn new() -> Self {
        Self {
            center: DEFAULT_CENTER,
            layers: LayerSelector::new(),
            popups: PopupManager::new(),
            marker: None,
            overlay: None,
            queries: Vec::new(),
            stale_discards: 0,
        }
    }
}

/// Orchestrates coordinate selections, layer toggles, and result
/// reconciliation. Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct MapSession {
    hub: ProviderHub,
    clock: SessionClock,
    query_timeout: Duration,
    generations: Arc<GenerationCounter>,
    state: Arc<Mutex<SessionState>>,
    events: broadcast::Sender<UiEvent>,
}

impl MapSession {
    /// New session over `hub` with the system clock and default timeout.
    #[must_use]
    pub fn new(hub: ProviderHub) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            hub,
            clock: SessionClock::System,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            generations: Arc::new(GenerationCounter::new()),
            state: Arc::new(Mutex::new(SessionState::new())),
            events,
        }
    }

    /// Replace the clock (tests use a manual clock).
    #[must_use]
    pub fn with_clock(mut self, clock: SessionClock) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the per-lookup timeout.
    #[must_use]
    pub const fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Subscribe to UI events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.events.subscribe()
    }

    /// Select a coordinate and fan out its lookups.
    ///
    /// Validation failure leaves the generation counter untouched and
    /// issues nothing. On success the generation advances exactly once
    /// and three-or-more independent lookups go out: the location-code
    /// encode, the current-conditions overlay lookup, and the active
    /// layer's panel fetch.
    ///
    /// # Errors
    ///
    /// [`SessionError::Validation`] for an out-of-range or non-finite
    /// coordinate.
    pub fn select_coordinate(
        &self,
        lat: f64,
        lon: f64,
        source: SelectionSource,
    ) -> Result<Generation, SessionError> {
        let coord = Coordinate::new(lat, lon)?;
        let generation = self.generations.advance();
        debug!(%coord, %generation, ?source, "coordinate selected");

        let layer_fetch = {
            let mut state = self.lock();
            state.center = coord;
            state.marker = Some(MarkerState {
                coordinate: coord,
                location_code: None,
            });

            // Records from earlier fan-outs are superseded the moment a
            // new generation is stamped; a stale arrival is discarded by
            // the generation check whether or not its record survives.
            state.queries.clear();

            self.record_query(&mut state, ProviderKind::LocationCode, generation);
            self.record_query(&mut state, ProviderKind::CurrentConditions, generation);

            // The active layer's panel refreshes on every coordinate
            // event, armed and instant layers alike.
            let layer_provider = state.layers.current().provider();
            if let Some(kind) = layer_provider {
                if let Some(category) = panel_category(kind) {
                    state.popups.open(category, PanelBody::Loading);
                }
                self.record_query(&mut state, kind, generation);
            }
            layer_provider
        };

        self.spawn_query(ProviderKind::LocationCode, coord, generation);
        self.spawn_query(ProviderKind::CurrentConditions, coord, generation);
        if let Some(kind) = layer_fetch {
            self.spawn_query(kind, coord, generation);
        }

        self.emit(UiEvent::CoordinateSelected {
            coordinate: coord,
            generation,
        });
        Ok(generation)
    }

    /// Activate `layer`, closing the outgoing layer's panel.
    ///
    /// An instant layer fires its panel fetch immediately at the current
    /// center, stamped with the *existing* generation -- the center has
    /// not changed, so no new generation is minted. An armed layer waits
    /// for the next coordinate event.
    pub fn toggle_layer(&self, layer: Layer) {
        let generation = self.generations.current();
        let fetch = {
            let mut state = self.lock();
            let previous = state.layers.toggle(layer);

            let outgoing = previous.provider().and_then(panel_category);
            let incoming = layer.provider().and_then(panel_category);
            if let Some(category) = outgoing {
                // Same panel category does not imply the same feed: the
                // two soil layers share one panel but different
                // providers, and the old payload must not linger.
                if previous.provider() != layer.provider() {
                    state.popups.close(category);
                }
            }

            match (layer.arm_kind(), layer.provider(), incoming) {
                (Some(ArmKind::Instant), Some(kind), Some(category)) => {
                    state.popups.open(category, PanelBody::Loading);
                    self.record_query(&mut state, kind, generation);
                    Some((kind, state.center))
                }
                _ => None,
            }
        };

        if let Some((kind, center)) = fetch {
            self.spawn_query(kind, center, generation);
        }
    }

    /// Resolve a free-text place query and select the resulting
    /// coordinate.
    ///
    /// # Errors
    ///
    /// [`SessionError::PlaceNotFound`] when the query has no match,
    /// [`SessionError::SearchFailed`] on upstream failure, and
    /// [`SessionError::Validation`] if the upstream returns an
    /// out-of-range coordinate.
    pub async fn search(&self, query: &str) -> Result<Generation, SessionError> {
        let place = self.hub.forward_geocode(query).await.map_err(|e| match e {
            ProviderError::NotFound { query } => SessionError::PlaceNotFound { query },
            other => SessionError::SearchFailed {
                message: other.to_string(),
            },
        })?;
        debug!(place = %place.formatted, "search resolved");
        self.select_coordinate(
            place.coordinate.lat(),
            place.coordinate.lon(),
            SelectionSource::SearchPick,
        )
    }

    /// Select a device-supplied location.
    ///
    /// # Errors
    ///
    /// [`SessionError::Validation`] for an out-of-range coordinate.
    pub fn use_my_location(&self, lat: f64, lon: f64) -> Result<Generation, SessionError> {
        self.select_coordinate(lat, lon, SelectionSource::MyLocation)
    }

    /// Build an activity draft anchored at the current map center, naming
    /// the location through reverse geocoding. A geocoder failure falls
    /// back to the placeholder name rather than blocking the draft.
    pub async fn draft_activity(&self, date: DateTime<Utc>, description: String) -> ActivityDraft {
        let coordinate = self.lock().center;
        let location_name = match self.hub.reverse_geocode(coordinate).await {
            Ok(name) => name,
            Err(err) => {
                warn!(%err, "reverse geocode failed, drafting with placeholder name");
                UNKNOWN_PLACE.to_owned()
            }
        };
        ActivityDraft {
            date,
            coordinate,
            location_name,
            description,
        }
    }

    /// Toggle an activity panel (logger or calendar). Layer-group panels
    /// are driven by [`MapSession::toggle_layer`] instead.
    pub fn toggle_activity_panel(&self, category: PanelCategory) {
        self.lock().popups.toggle_independent(category);
    }

    /// Read-only snapshot of the session.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock();
        SessionSnapshot {
            generation: self.generations.current(),
            center: state.center,
            layer: state.layers.current(),
            marker: state.marker.clone(),
            overlay: state.overlay.clone(),
            panels: state.popups.snapshot(),
            queries: state.queries.clone(),
            stale_discards: state.stale_discards,
        }
    }

    // --- fan-out internals ---

    fn record_query(&self, state: &mut SessionState, kind: ProviderKind, generation: Generation) {
        state.queries.push(ProviderQuery {
            kind,
            generation,
            status: QueryStatus::Pending,
            issued_at: self.clock.now(),
        });
    }

    fn spawn_query(&self, kind: ProviderKind, coord: Coordinate, generation: Generation) {
        let session = self.clone();
        tokio::spawn(async move {
            let outcome = session.run_query(kind, coord).await;
            session.apply_result(kind, generation, outcome);
        });
    }

    async fn run_query(
        &self,
        kind: ProviderKind,
        coord: Coordinate,
    ) -> Result<QueryPayload, String> {
        let call = async {
            match kind {
                ProviderKind::LocationCode => self
                    .hub
                    .location_code(coord)
                    .await
                    .map(|code| QueryPayload::Code(code.code)),
                ProviderKind::CurrentConditions => self
                    .hub
                    .current_conditions(coord)
                    .await
                    .map(QueryPayload::Conditions),
                panel => self.hub.panel_fetch(panel, coord).await.map(QueryPayload::Panel),
            }
        };
        match tokio::time::timeout(self.query_timeout, call).await {
            Ok(Ok(payload)) => Ok(payload),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("{kind} lookup timed out")),
        }
    }

    /// Reconcile one arrival against the current generation.
    ///
    /// The query record's status updates either way; only results for
    /// the current generation publish to the visible state.
    fn apply_result(
        &self,
        kind: ProviderKind,
        generation: Generation,
        outcome: Result<QueryPayload, String>,
    ) {
        let current = self.generations.current();
        let mut state = self.lock();

        let status = if outcome.is_ok() {
            QueryStatus::Success
        } else {
            QueryStatus::Failure
        };
        if let Some(record) = state
            .queries
            .iter_mut()
            .find(|q| q.kind == kind && q.generation == generation)
        {
            record.status = status;
        }

        if generation != current {
            state.stale_discards = state.stale_discards.saturating_add(1);
            debug!(%kind, stale = %generation, %current, "stale result discarded");
            return;
        }

        match outcome {
            Ok(QueryPayload::Code(code)) => {
                if let Some(marker) = state.marker.as_mut() {
                    marker.location_code = Some(code.clone());
                }
                drop(state);
                self.emit(UiEvent::MarkerCode { generation, code });
            }
            Ok(QueryPayload::Conditions(conditions)) => {
                let condition = conditions.condition.clone();
                state.overlay = Some(conditions);
                drop(state);
                self.emit(UiEvent::Overlay {
                    generation,
                    condition,
                });
            }
            Ok(QueryPayload::Panel(content)) => {
                if let Some(category) = panel_category(kind) {
                    state.popups.set_body(category, PanelBody::Ready(content));
                    drop(state);
                    self.emit(UiEvent::Panel {
                        category,
                        generation,
                    });
                }
            }
            Err(message) => {
                warn!(%kind, %message, "provider lookup failed");
                if let Some(category) = panel_category(kind) {
                    state.popups.set_body(category, PanelBody::Failed(message));
                    drop(state);
                    self.emit(UiEvent::Panel {
                        category,
                        generation,
                    });
                }
                // Marker-code and overlay failures leave the previous
                // visible state untouched.
            }
        }
    }

    fn emit(&self, event: UiEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone)]
enum QueryPayload {
    Code(String),
    Conditions(CurrentConditions),
    Panel(PanelContent),
}

/// The panel a provider feeds, `None` for the non-panel providers.
const fn panel_category(kind: ProviderKind) -> Option<PanelCategory> {
    match kind {
        ProviderKind::Forecast => Some(PanelCategory::Weather),
        ProviderKind::Flood => Some(PanelCategory::Flood),
        ProviderKind::Ndvi => Some(PanelCategory::Ndvi),
        ProviderKind::SoilPoint | ProviderKind::SoilMoisture => Some(PanelCategory::Soil),
        ProviderKind::LocationCode | ProviderKind::CurrentConditions | ProviderKind::Geocode => {
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fieldscope_providers::StubHub;
    use fieldscope_types::{NdviPoint, NdviSeries, SoilSample};

    fn session_with_stub() -> (MapSession, StubHub) {
        let stub = StubHub::new();
        let session = MapSession::new(ProviderHub::Stub(stub.clone()));
        (session, stub)
    }

    /// Let spawned lookup tasks run to completion under paused time.
    async fn settle(duration: Duration) {
        tokio::time::sleep(duration).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    fn ndvi_series(value: f64) -> PanelContent {
        PanelContent::Ndvi(NdviSeries {
            points: vec![NdviPoint {
                date: chrono::NaiveDate::default(),
                ndvi: Some(value),
            }],
        })
    }

    #[tokio::test]
    async fn invalid_coordinate_rejected_without_generation_advance() {
        let (session, stub) = session_with_stub();

        let err = session
            .select_coordinate(91.0, 0.0, SelectionSource::MapClick)
            .unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));

        let err = session
            .select_coordinate(0.0, f64::NAN, SelectionSource::MapClick)
            .unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.generation, Generation(0));
        assert!(snapshot.queries.is_empty());
        assert_eq!(stub.calls(ProviderKind::LocationCode), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn selection_fans_out_unconditional_lookups() {
        let (session, stub) = session_with_stub();

        let generation = session
            .select_coordinate(20.0, 78.0, SelectionSource::MapClick)
            .unwrap();
        assert_eq!(generation, Generation(1));
        settle(Duration::from_secs(1)).await;

        assert_eq!(stub.calls(ProviderKind::LocationCode), 1);
        assert_eq!(stub.calls(ProviderKind::CurrentConditions), 1);

        let snapshot = session.snapshot();
        let marker = snapshot.marker.unwrap();
        assert!(marker.location_code.is_some());
        assert!(snapshot.overlay.is_some());
        assert!(snapshot
            .queries
            .iter()
            .all(|q| q.status == QueryStatus::Success));
    }

    #[tokio::test(start_paused = true)]
    async fn armed_layer_fetches_on_next_selection_not_on_toggle() {
        let (session, stub) = session_with_stub();

        session.toggle_layer(Layer::SoilMoisture);
        settle(Duration::from_secs(1)).await;
        assert_eq!(stub.calls(ProviderKind::SoilMoisture), 0);
        assert!(!session.snapshot().panels.contains_key(&PanelCategory::Soil));

        session
            .select_coordinate(20.0, 78.0, SelectionSource::MapClick)
            .unwrap();
        settle(Duration::from_secs(1)).await;
        assert_eq!(stub.calls(ProviderKind::SoilMoisture), 1);
        let snapshot = session.snapshot();
        assert!(matches!(
            snapshot.panels.get(&PanelCategory::Soil).unwrap().body,
            PanelBody::Ready(PanelContent::SoilMoisture(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn instant_layer_fires_at_current_center_without_new_generation() {
        let (session, stub) = session_with_stub();
        session
            .select_coordinate(20.0, 78.0, SelectionSource::MapClick)
            .unwrap();
        settle(Duration::from_secs(1)).await;

        session.toggle_layer(Layer::Flood);
        settle(Duration::from_secs(1)).await;

        assert_eq!(stub.calls(ProviderKind::Flood), 1);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.generation, Generation(1));
        assert!(matches!(
            snapshot.panels.get(&PanelCategory::Flood).unwrap().body,
            PanelBody::Ready(PanelContent::Flood(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn toggling_layers_closes_the_previous_panel() {
        let (session, _stub) = session_with_stub();
        session
            .select_coordinate(20.0, 78.0, SelectionSource::MapClick)
            .unwrap();
        settle(Duration::from_secs(1)).await;

        session.toggle_layer(Layer::Weather);
        settle(Duration::from_secs(1)).await;
        assert!(session.snapshot().panels.contains_key(&PanelCategory::Weather));

        session.toggle_layer(Layer::Ndvi);
        settle(Duration::from_secs(1)).await;

        let snapshot = session.snapshot();
        assert_eq!(snapshot.layer, Layer::Ndvi);
        assert!(!snapshot.panels.contains_key(&PanelCategory::Weather));
        assert!(snapshot.panels.contains_key(&PanelCategory::Ndvi));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_result_is_discarded_in_favor_of_the_newer_generation() {
        let (session, stub) = session_with_stub();
        session.toggle_layer(Layer::Ndvi);
        settle(Duration::from_secs(1)).await;
        let calls_after_toggle = stub.calls(ProviderKind::Ndvi);

        // First selection's NDVI fetch is slow; second selection's is
        // fast and lands first.
        stub.script_panel(
            ProviderKind::Ndvi,
            Duration::from_secs(8),
            Ok(ndvi_series(0.2)),
        );
        stub.script_panel(
            ProviderKind::Ndvi,
            Duration::from_secs(1),
            Ok(ndvi_series(0.9)),
        );

        session
            .select_coordinate(10.0, 76.0, SelectionSource::MapClick)
            .unwrap();
        session
            .select_coordinate(26.0, 92.0, SelectionSource::MapClick)
            .unwrap();
        settle(Duration::from_secs(12)).await;

        assert_eq!(
            stub.calls(ProviderKind::Ndvi).saturating_sub(calls_after_toggle),
            2
        );
        let snapshot = session.snapshot();
        assert_eq!(snapshot.generation, Generation(2));
        assert_eq!(
            snapshot.panels.get(&PanelCategory::Ndvi).unwrap().body,
            PanelBody::Ready(ndvi_series(0.9))
        );
        assert!(snapshot.stale_discards >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn provider_failure_shows_inline_and_spares_siblings() {
        let (session, stub) = session_with_stub();
        session.toggle_layer(Layer::Flood);
        settle(Duration::from_secs(1)).await;

        stub.script_panel(
            ProviderKind::Flood,
            Duration::ZERO,
            Err(ProviderError::Status {
                provider: ProviderKind::Flood,
                status: 502,
            }),
        );

        session
            .select_coordinate(20.0, 78.0, SelectionSource::MapClick)
            .unwrap();
        settle(Duration::from_secs(1)).await;

        let snapshot = session.snapshot();
        assert!(matches!(
            snapshot.panels.get(&PanelCategory::Flood).unwrap().body,
            PanelBody::Failed(_)
        ));
        // Siblings of the failed lookup still landed.
        assert!(snapshot.marker.unwrap().location_code.is_some());
        assert!(snapshot.overlay.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_timeout_is_a_panel_failure() {
        let (session, stub) = session_with_stub();
        let session = session.with_query_timeout(Duration::from_secs(2));
        session.toggle_layer(Layer::Ndvi);
        settle(Duration::from_secs(1)).await;

        stub.script_panel(
            ProviderKind::Ndvi,
            Duration::from_secs(30),
            Ok(ndvi_series(0.5)),
        );
        session
            .select_coordinate(20.0, 78.0, SelectionSource::MapClick)
            .unwrap();
        settle(Duration::from_secs(40)).await;

        let snapshot = session.snapshot();
        assert!(matches!(
            snapshot.panels.get(&PanelCategory::Ndvi).unwrap().body,
            PanelBody::Failed(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn search_selects_the_geocoded_place() {
        let (session, stub) = session_with_stub();
        stub.script_forward(
            Duration::ZERO,
            Ok(fieldscope_types::GeocodePlace {
                coordinate: Coordinate::new(23.2599, 77.4126).unwrap(),
                formatted: "Bhopal".to_owned(),
            }),
        );

        let generation = session.search("bhopal").await.unwrap();
        assert_eq!(generation, Generation(1));
        settle(Duration::from_secs(1)).await;
        let snapshot = session.snapshot();
        assert!((snapshot.center.lat() - 23.2599).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn search_miss_maps_to_place_not_found() {
        let (session, stub) = session_with_stub();
        stub.script_forward(
            Duration::ZERO,
            Err(ProviderError::NotFound {
                query: "atlantis".to_owned(),
            }),
        );
        let err = session.search("atlantis").await.unwrap_err();
        assert!(matches!(err, SessionError::PlaceNotFound { .. }));
        assert_eq!(session.snapshot().generation, Generation(0));
    }

    #[tokio::test(start_paused = true)]
    async fn events_are_broadcast_for_current_results() {
        let (session, _stub) = session_with_stub();
        let mut events = session.subscribe();

        session
            .select_coordinate(20.0, 78.0, SelectionSource::MapClick)
            .unwrap();
        settle(Duration::from_secs(1)).await;

        let mut saw_selected = false;
        let mut saw_marker = false;
        let mut saw_overlay = false;
        while let Ok(event) = events.try_recv() {
            match event {
                UiEvent::CoordinateSelected { .. } => saw_selected = true,
                UiEvent::MarkerCode { .. } => saw_marker = true,
                UiEvent::Overlay { .. } => saw_overlay = true,
                UiEvent::Panel { .. } => {}
            }
        }
        assert!(saw_selected && saw_marker && saw_overlay);
    }

    #[tokio::test(start_paused = true)]
    async fn activity_draft_names_the_selected_center() {
        let (session, stub) = session_with_stub();
        stub.script_reverse(Duration::ZERO, Ok("Nashik, Maharashtra, India".to_owned()));
        session
            .select_coordinate(19.9975, 73.7898, SelectionSource::MapClick)
            .unwrap();
        settle(Duration::from_millis(10)).await;

        let draft = session.draft_activity(Utc::now(), "sowing".to_owned()).await;
        assert_eq!(draft.location_name, "Nashik, Maharashtra, India");
        assert_eq!(draft.description, "sowing");
        assert!((draft.coordinate.lat() - 19.9975).abs() < f64::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn activity_draft_falls_back_when_the_geocoder_fails() {
        let (session, stub) = session_with_stub();
        stub.script_reverse(
            Duration::ZERO,
            Err(ProviderError::Status {
                provider: ProviderKind::Geocode,
                status: 502,
            }),
        );

        let draft = session.draft_activity(Utc::now(), "sowing".to_owned()).await;
        assert_eq!(draft.location_name, UNKNOWN_PLACE);
    }

    #[tokio::test(start_paused = true)]
    async fn query_records_do_not_accumulate_across_selections() {
        let (session, _stub) = session_with_stub();
        session.toggle_layer(Layer::Ndvi);
        for step in 0..20_u8 {
            session
                .select_coordinate(10.0 + f64::from(step), 77.0, SelectionSource::MapClick)
                .unwrap();
        }
        settle(Duration::from_secs(1)).await;

        // Each fan-out supersedes the previous one's records entirely.
        let snapshot = session.snapshot();
        assert_eq!(snapshot.queries.len(), 3);
        assert!(snapshot
            .queries
            .iter()
            .all(|q| q.generation == snapshot.generation));
    }

    #[tokio::test(start_paused = true)]
    async fn switching_between_soil_layers_does_not_keep_the_old_payload() {
        let (session, stub) = session_with_stub();
        session.toggle_layer(Layer::SoilData);
        stub.script_panel(
            ProviderKind::SoilPoint,
            Duration::ZERO,
            Ok(PanelContent::SoilSample(SoilSample {
                ph: Some(6.5),
                organic_carbon_density: Some(40.0),
                clay_percent: Some(22.0),
            })),
        );
        session
            .select_coordinate(20.0, 78.0, SelectionSource::MapClick)
            .unwrap();
        settle(Duration::from_secs(1)).await;
        assert!(matches!(
            session
                .snapshot()
                .panels
                .get(&PanelCategory::Soil)
                .unwrap()
                .body,
            PanelBody::Ready(PanelContent::SoilSample(_))
        ));

        // Both soil layers feed the same panel; the chemistry payload
        // must not survive the switch to the moisture layer.
        session.toggle_layer(Layer::SoilMoisture);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.layer, Layer::SoilMoisture);
        assert!(!snapshot.panels.contains_key(&PanelCategory::Soil));
    }
}
