//! Browser-side pixel relay — reads tracking ids from its own script tag,
//! waits for third-party pixel SDKs, then forwards scroll-depth and click
//! events to Facebook, Google Ads, GA4 and TikTok.
//!
//! # Modules
//!
//! - [`relay`] — [`TrackingRelay`], the lifecycle driving everything else
//! - [`tracking_config`] — Platform ids parsed from the script query string
//! - [`readiness`] — Startup gate polling for loaded pixel SDKs
//! - [`scroll`] / [`click`] — DOM observers producing relayed events
//! - [`dispatcher`] — Fan-out of one event to every platform
//! - [`adaptors`] — Per-platform call construction
//! - [`pixels`] — Optional global pixel functions as capabilities
//! - [`host`] / [`events`] — Seams to the hosting page
//! - [`sim`] — Deterministic simulated page for tests and embedding trials

pub mod adaptors;
pub mod click;
pub mod dispatcher;
pub mod events;
pub mod host;
pub mod pixels;
pub mod readiness;
pub mod relay;
pub mod scroll;
pub mod sim;
pub mod tracking_config;

pub use adaptors::PlatformAdaptor;
pub use dispatcher::Dispatcher;
pub use events::{ClickTarget, HostEvent, ReadyState, ScrollMetrics};
pub use host::{Page, RelayHost, Scheduler, TimerHandle};
pub use pixels::{GlobalScope, PixelCall, PixelFunction, PixelGlobal, PixelRegistry};
pub use relay::{RelayPhase, TrackingRelay};
pub use tracking_config::TrackingConfig;
