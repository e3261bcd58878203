//! Adaptors translating relayed events into third-party pixel calls.
//!
//! Each adaptor implements [`PlatformAdaptor`] to name the global function it
//! needs and to turn a [`TrackingEvent`] into the [`PixelCall`] that platform
//! expects, or to say why the platform should be skipped.

pub mod facebook;
pub mod ga;
pub mod google_ads;
pub mod tiktok;

use pixel_relay_core::{Platform, SkipReason, TrackingEvent};

use crate::pixels::{PixelCall, PixelGlobal};
use crate::tracking_config::TrackingConfig;

/// Adaptor trait — maps a relayed event onto one platform's pixel call.
pub trait PlatformAdaptor: Send + Sync {
    fn platform(&self) -> Platform;

    /// Global function the platform's SDK exposes.
    fn global(&self) -> PixelGlobal;

    /// Build the call for `event`, or report why this platform is skipped.
    fn prepare(
        &self,
        config: &TrackingConfig,
        event: &TrackingEvent,
    ) -> Result<PixelCall, SkipReason>;
}

/// All four platforms in dispatch order.
pub fn default_adaptors() -> Vec<Box<dyn PlatformAdaptor>> {
    vec![
        Box::new(facebook::FacebookAdaptor),
        Box::new(google_ads::GoogleAdsAdaptor),
        Box::new(ga::GaAdaptor),
        Box::new(tiktok::TikTokAdaptor),
    ]
}

/// Platform id from `config`, or [`SkipReason::MissingId`].
fn require_id(config: &TrackingConfig, platform: Platform) -> Result<&str, SkipReason> {
    config.platform_id(platform).ok_or(SkipReason::MissingId)
}
