//! Backend dispatch for provider calls.
//!
//! Async methods keep [`ProviderHub`] out of trait-object territory, so
//! dispatch is an enum over the live clients and a scripted stub. The
//! session core only ever sees the hub.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use fieldscope_types::{
    Coordinate, CurrentConditions, FloodReport, ForecastSummary, GeocodePlace, IrrigationAdvice,
    LocationCode, NdviPoint, NdviSeries, PanelContent, ProviderKind, SoilMoistureSeries,
    SoilSample,
};

use crate::config::ProvidersConfig;
use crate::error::ProviderError;
use crate::flood::FloodClient;
use crate::geocode::GeocodeClient;
use crate::location_code::LocationCodeClient;
use crate::ndvi::NdviClient;
use crate::soil::SoilClient;
use crate::weather::WeatherClient;

// --- live backend ---

/// The full set of live provider clients.
#[derive(Debug, Clone)]
pub struct LiveProviders {
    weather: WeatherClient,
    soil: SoilClient,
    ndvi: NdviClient,
    geocode: GeocodeClient,
    location_code: LocationCodeClient,
    flood: FloodClient,
}

impl LiveProviders {
    /// Build every client from configuration.
    #[must_use]
    pub fn new(config: ProvidersConfig) -> Self {
        Self {
            weather: WeatherClient::new(config.weather),
            soil: SoilClient::new(config.soil),
            ndvi: NdviClient::new(config.ndvi),
            geocode: GeocodeClient::new(config.geocode),
            location_code: LocationCodeClient::new(config.location_code),
            flood: FloodClient::new(config.flood),
        }
    }
}

// --- hub ---

/// A provider backend: live upstreams or a scripted stub.
#[derive(Debug, Clone)]
pub enum ProviderHub {
    /// Real upstream clients.
    Live(LiveProviders),
    /// Scripted responses for orchestration tests.
    Stub(StubHub),
}

impl ProviderHub {
    /// Encode the coordinate's location code.
    ///
    /// # Errors
    ///
    /// Propagates the backend's [`ProviderError`].
    pub async fn location_code(&self, coord: Coordinate) -> Result<LocationCode, ProviderError> {
        match self {
            Self::Live(live) => live.location_code.encode(coord).await,
            Self::Stub(stub) => stub.location_code(coord).await,
        }
    }

    /// Fetch current weather conditions at the coordinate.
    ///
    /// # Errors
    ///
    /// Propagates the backend's [`ProviderError`].
    pub async fn current_conditions(
        &self,
        coord: Coordinate,
    ) -> Result<CurrentConditions, ProviderError> {
        match self {
            Self::Live(live) => live.weather.current_conditions(coord).await,
            Self::Stub(stub) => stub.current_conditions(coord).await,
        }
    }

    /// Fetch the panel payload for a panel-feeding provider.
    ///
    /// # Errors
    ///
    /// [`ProviderError::Unsupported`] for the non-panel kinds
    /// ([`ProviderKind::LocationCode`], [`ProviderKind::CurrentConditions`],
    /// [`ProviderKind::Geocode`]); otherwise the backend's failure.
    pub async fn panel_fetch(
        &self,
        kind: ProviderKind,
        coord: Coordinate,
    ) -> Result<PanelContent, ProviderError> {
        if !is_panel_kind(kind) {
            return Err(ProviderError::Unsupported { provider: kind });
        }
        match self {
            Self::Live(live) => live_panel_fetch(live, kind, coord).await,
            Self::Stub(stub) => stub.panel_fetch(kind).await,
        }
    }

    /// Resolve a free-text place query.
    ///
    /// # Errors
    ///
    /// Propagates the backend's [`ProviderError`], including
    /// [`ProviderError::NotFound`] on no match.
    pub async fn forward_geocode(&self, query: &str) -> Result<GeocodePlace, ProviderError> {
        match self {
            Self::Live(live) => live.geocode.forward(query).await,
            Self::Stub(stub) => stub.forward_geocode(query).await,
        }
    }

    /// Resolve a coordinate to a place name.
    ///
    /// # Errors
    ///
    /// Propagates the backend's [`ProviderError`].
    pub async fn reverse_geocode(&self, coord: Coordinate) -> Result<String, ProviderError> {
        match self {
            Self::Live(live) => live.geocode.reverse(coord).await,
            Self::Stub(stub) => stub.reverse_geocode(coord).await,
        }
    }
}

const fn is_panel_kind(kind: ProviderKind) -> bool {
    !matches!(
        kind,
        ProviderKind::LocationCode | ProviderKind::CurrentConditions | ProviderKind::Geocode
    )
}

async fn live_panel_fetch(
    live: &LiveProviders,
    kind: ProviderKind,
    coord: Coordinate,
) -> Result<PanelContent, ProviderError> {
    match kind {
        ProviderKind::Forecast => live.weather.forecast(coord).await.map(PanelContent::Forecast),
        ProviderKind::SoilPoint => live.soil.point_sample(coord).await.map(PanelContent::SoilSample),
        ProviderKind::SoilMoisture => live
            .soil
            .moisture_history(coord)
            .await
            .map(PanelContent::SoilMoisture),
        ProviderKind::Ndvi => live
            .ndvi
            .history(coord, Utc::now().date_naive())
            .await
            .map(PanelContent::Ndvi),
        ProviderKind::Flood => live.flood.report(coord).await.map(PanelContent::Flood),
        ProviderKind::LocationCode | ProviderKind::CurrentConditions | ProviderKind::Geocode => {
            Err(ProviderError::Unsupported { provider: kind })
        }
    }
}

// --- stub backend ---

/// One scripted stub response.
#[derive(Debug, Clone)]
struct Scripted<T> {
    delay: Duration,
    result: Result<T, ProviderError>,
}

#[derive(Debug, Default)]
struct StubInner {
    location_codes: VecDeque<Scripted<LocationCode>>,
    conditions: VecDeque<Scripted<CurrentConditions>>,
    panels: BTreeMap<ProviderKind, VecDeque<Scripted<PanelContent>>>,
    forward: VecDeque<Scripted<GeocodePlace>>,
    reverse: VecDeque<Scripted<String>>,
    calls: BTreeMap<ProviderKind, u64>,
}

/// Scripted provider backend for orchestration tests.
///
/// Each call pops the next scripted response for its kind (or a benign
/// default when none is queued), sleeps through the scripted delay
/// outside the lock, then returns the result. Delays combine with
/// `tokio::time::pause` to order results deterministically.
#[derive(Debug, Clone, Default)]
pub struct StubHub {
    inner: Arc<Mutex<StubInner>>,
}

impl StubHub {
    /// New stub with empty scripts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a panel response for `kind`.
    pub fn script_panel(
        &self,
        kind: ProviderKind,
        delay: Duration,
        result: Result<PanelContent, ProviderError>,
    ) {
        self.lock()
            .panels
            .entry(kind)
            .or_default()
            .push_back(Scripted { delay, result });
    }

    /// Queue a location-code response.
    pub fn script_location_code(
        &self,
        delay: Duration,
        result: Result<LocationCode, ProviderError>,
    ) {
        self.lock()
            .location_codes
            .push_back(Scripted { delay, result });
    }

    /// Queue a current-conditions response.
    pub fn script_conditions(
        &self,
        delay: Duration,
        result: Result<CurrentConditions, ProviderError>,
    ) {
        self.lock().conditions.push_back(Scripted { delay, result });
    }

    /// Queue a forward-geocode response.
    pub fn script_forward(&self, delay: Duration, result: Result<GeocodePlace, ProviderError>) {
        self.lock().forward.push_back(Scripted { delay, result });
    }

    /// Queue a reverse-geocode response.
    pub fn script_reverse(&self, delay: Duration, result: Result<String, ProviderError>) {
        self.lock().reverse.push_back(Scripted { delay, result });
    }

    /// How many calls have been issued for `kind` so far.
    #[must_use]
    pub fn calls(&self, kind: ProviderKind) -> u64 {
        self.lock().calls.get(&kind).copied().unwrap_or(0)
    }

    async fn location_code(&self, coord: Coordinate) -> Result<LocationCode, ProviderError> {
        let scripted = {
            let mut inner = self.lock();
            record_call(&mut inner, ProviderKind::LocationCode);
            inner.location_codes.pop_front()
        };
        let scripted = scripted.unwrap_or_else(|| Scripted {
            delay: Duration::ZERO,
            result: Ok(LocationCode {
                coordinate: coord,
                code: format!("STUB-{coord}"),
            }),
        });
        tokio::time::sleep(scripted.delay).await;
        scripted.result
    }

    async fn current_conditions(
        &self,
        _coord: Coordinate,
    ) -> Result<CurrentConditions, ProviderError> {
        let scripted = {
            let mut inner = self.lock();
            record_call(&mut inner, ProviderKind::CurrentConditions);
            inner.conditions.pop_front()
        };
        let scripted = scripted.unwrap_or_else(|| Scripted {
            delay: Duration::ZERO,
            result: Ok(CurrentConditions {
                condition: "Clear".to_owned(),
                summary: "clear sky".to_owned(),
            }),
        });
        tokio::time::sleep(scripted.delay).await;
        scripted.result
    }

    async fn panel_fetch(&self, kind: ProviderKind) -> Result<PanelContent, ProviderError> {
        let scripted = {
            let mut inner = self.lock();
            record_call(&mut inner, kind);
            inner.panels.entry(kind).or_default().pop_front()
        };
        let scripted = scripted.unwrap_or_else(|| Scripted {
            delay: Duration::ZERO,
            result: Ok(default_panel_content(kind)),
        });
        tokio::time::sleep(scripted.delay).await;
        scripted.result
    }

    async fn forward_geocode(&self, query: &str) -> Result<GeocodePlace, ProviderError> {
        let scripted = {
            let mut inner = self.lock();
            record_call(&mut inner, ProviderKind::Geocode);
            inner.forward.pop_front()
        };
        let scripted = scripted.unwrap_or_else(|| Scripted {
            delay: Duration::ZERO,
            result: Ok(GeocodePlace {
                coordinate: fieldscope_types::DEFAULT_CENTER,
                formatted: format!("Stub match for {query}"),
            }),
        });
        tokio::time::sleep(scripted.delay).await;
        scripted.result
    }

    async fn reverse_geocode(&self, _coord: Coordinate) -> Result<String, ProviderError> {
        let scripted = {
            let mut inner = self.lock();
            record_call(&mut inner, ProviderKind::Geocode);
            inner.reverse.pop_front()
        };
        let scripted = scripted.unwrap_or_else(|| Scripted {
            delay: Duration::ZERO,
            result: Ok("Stub location".to_owned()),
        });
        tokio::time::sleep(scripted.delay).await;
        scripted.result
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StubInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn record_call(inner: &mut StubInner, kind: ProviderKind) {
    let count = inner.calls.entry(kind).or_insert(0);
    *count = count.saturating_add(1);
}

/// Benign payload for an unscripted panel call.
fn default_panel_content(kind: ProviderKind) -> PanelContent {
    match kind {
        ProviderKind::SoilPoint => PanelContent::SoilSample(SoilSample {
            ph: Some(6.5),
            organic_carbon_density: Some(40.0),
            clay_percent: Some(25.0),
        }),
        ProviderKind::SoilMoisture => PanelContent::SoilMoisture(SoilMoistureSeries {
            dates: Vec::new(),
            values: Vec::new(),
            advice: IrrigationAdvice::Adequate,
        }),
        ProviderKind::Ndvi => PanelContent::Ndvi(NdviSeries {
            points: vec![NdviPoint {
                date: chrono::NaiveDate::default(),
                ndvi: Some(0.5),
            }],
        }),
        ProviderKind::Flood => PanelContent::Flood(FloodReport {
            warning: "No flood risk detected".to_owned(),
        }),
        _ => PanelContent::Forecast(ForecastSummary { days: Vec::new() }),
    }
}
