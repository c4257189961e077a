//! Gateway server for the Fieldscope map frontend.
//!
//! Serves the location-code encode/decode endpoints the provider layer
//! calls, plus the farming-assistant chat proxy. The grid-code format is
//! owned entirely by this crate; everything else treats codes as opaque
//! strings.

pub mod chat;
pub mod digipin;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
