//! External data-provider clients for the Fieldscope map core.
//!
//! Each provider gets a small `reqwest`-backed client that owns the
//! transport and the minimal response shape consumed, and converts every
//! network, status, and decode problem into a [`ProviderError`]. Nothing
//! here throws past the client boundary -- the session core records
//! failures per provider and carries on.
//!
//! Dispatch to a concrete backend goes through the enum-based
//! [`ProviderHub`] rather than a trait object, because async trait methods
//! are not dyn-compatible. The [`StubHub`] variant drives the orchestration
//! tests with scripted outcomes and artificial delays.
//!
//! [`ProviderHub`]: hub::ProviderHub
//! [`StubHub`]: hub::StubHub

pub mod config;
pub mod error;
pub mod flood;
pub mod geocode;
pub mod hub;
pub mod location_code;
pub mod ndvi;
pub mod soil;
pub mod weather;

mod util;

pub use config::ProvidersConfig;
pub use error::ProviderError;
pub use hub::{LiveProviders, ProviderHub, StubHub};
