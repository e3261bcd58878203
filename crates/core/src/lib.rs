//! Shared building blocks for the pixel relay: error taxonomy, relay
//! settings, event/outcome types and the dispatch outcome bus.

pub mod config;
pub mod error;
pub mod event_bus;
pub mod types;

pub use config::RelayConfig;
pub use error::{RelayError, RelayResult};
pub use event_bus::{capture_sink, noop_sink, CaptureSink, DispatchSink};
pub use types::{DispatchOutcome, DispatchRecord, EventName, Platform, SkipReason, TrackingEvent};
