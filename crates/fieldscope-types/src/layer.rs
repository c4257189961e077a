//! Visualization layer variants and their activation semantics.
//!
//! Exactly one layer is active at any instant; [`Layer::None`] is the valid
//! "nothing armed" state. Each data-bearing layer is either *instant* (its
//! panel fetch fires the moment it is activated, using the current map
//! center) or *armed* (the fetch waits for the next coordinate-selection
//! event). Either way, a coordinate-selection event always refreshes the
//! active layer's panel.

use serde::{Deserialize, Serialize};

use crate::provider::ProviderKind;

/// When a layer's data fetch fires relative to its activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmKind {
    /// Fetch immediately on activation at the current map center.
    Instant,
    /// Fetch only on the next coordinate-selection event.
    Armed,
}

/// The single-active visualization layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layer {
    /// Nothing armed.
    #[default]
    None,
    /// 7-day soil moisture history with irrigation advice.
    SoilMoisture,
    /// Soil chemistry point sample (pH, organic carbon, clay).
    SoilData,
    /// 4-day weather forecast with agronomy advice.
    Weather,
    /// Point flood-risk report.
    Flood,
    /// Trailing-year NDVI vegetation index series.
    Ndvi,
}

impl Layer {
    /// Activation semantics for this layer, or `None` for [`Layer::None`].
    pub const fn arm_kind(self) -> Option<ArmKind> {
        match self {
            Self::None => None,
            Self::SoilMoisture | Self::SoilData => Some(ArmKind::Armed),
            Self::Weather | Self::Flood | Self::Ndvi => Some(ArmKind::Instant),
        }
    }

    /// The provider that feeds this layer's panel, or `None` for
    /// [`Layer::None`].
    pub const fn provider(self) -> Option<ProviderKind> {
        match self {
            Self::None => None,
            Self::SoilMoisture => Some(ProviderKind::SoilMoisture),
            Self::SoilData => Some(ProviderKind::SoilPoint),
            Self::Weather => Some(ProviderKind::Forecast),
            Self::Flood => Some(ProviderKind::Flood),
            Self::Ndvi => Some(ProviderKind::Ndvi),
        }
    }
}
