//! Panel categories and the visible panel state.
//!
//! The source UI tracked panel visibility through a dozen independent
//! boolean flags scattered across components. Here the fixed category set
//! and the per-panel body are explicit types; visibility transitions happen
//! only through the popup manager's contract.

use serde::{Deserialize, Serialize};

use crate::provider::{
    FloodReport, ForecastSummary, NdviSeries, SoilMoistureSeries, SoilSample,
};

/// The fixed set of panels the UI can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PanelCategory {
    /// Weather forecast panel (layer group).
    Weather,
    /// Flood-risk panel (layer group).
    Flood,
    /// NDVI panel (layer group).
    Ndvi,
    /// Soil panel -- chemistry or moisture (layer group).
    Soil,
    /// Activity entry form (independent).
    ActivityLogger,
    /// Activity calendar listing (independent).
    ActivityCalendar,
}

impl PanelCategory {
    /// Whether this category belongs to the mutually-exclusive layer group.
    ///
    /// At most one layer-group panel is visible at a time; the activity
    /// panels are independent of the group and of each other.
    pub const fn in_layer_group(self) -> bool {
        matches!(self, Self::Weather | Self::Flood | Self::Ndvi | Self::Soil)
    }
}

/// Typed payload shown inside a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PanelContent {
    /// Forecast summary for the weather panel.
    Forecast(ForecastSummary),
    /// Flood report for the flood panel.
    Flood(FloodReport),
    /// NDVI series for the NDVI panel.
    Ndvi(NdviSeries),
    /// Soil chemistry sample for the soil panel.
    SoilSample(SoilSample),
    /// Soil moisture history for the soil panel.
    SoilMoisture(SoilMoistureSeries),
}

/// What a panel currently displays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum PanelBody {
    /// Nothing to show yet.
    #[default]
    Empty,
    /// A lookup for this panel is in flight.
    Loading,
    /// Provider data ready for display.
    Ready(PanelContent),
    /// The provider lookup failed; shown inline in the panel.
    Failed(String),
}
