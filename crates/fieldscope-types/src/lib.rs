//! Shared type definitions for the Fieldscope map core.
//!
//! Every crate in the workspace speaks the vocabulary defined here: the
//! canonical [`Coordinate`], the single-active [`Layer`] variant, panel
//! categories and bodies, the persisted activity model, and the typed
//! payloads produced by the external data providers.
//!
//! The types deliberately live in a leaf crate with no I/O dependencies
//! so that the store, providers, and session core can share them without
//! dragging in each other's stacks.
//!
//! [`Coordinate`]: geo::Coordinate
//! [`Layer`]: layer::Layer

pub mod activity;
pub mod geo;
pub mod layer;
pub mod panel;
pub mod provider;

pub use activity::{ActivityDraft, ActivityEntry, ActivityId, ActivityPatch};
pub use geo::{Coordinate, CoordinateError, DEFAULT_CENTER};
pub use layer::{ArmKind, Layer};
pub use panel::{PanelBody, PanelCategory, PanelContent};
pub use provider::{
    CurrentConditions, FloodReport, ForecastDay, ForecastSummary, Generation, GeocodePlace,
    IrrigationAdvice, LocationCode, NdviPoint, NdviSeries, ProviderKind, SoilMoistureSeries,
    SoilSample,
};
