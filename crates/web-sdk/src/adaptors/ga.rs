//! Google Analytics 4 adaptor — forwards the event name and data as a
//! generic `gtag('event', ...)` hit. The measurement id itself is bound by
//! the `gtag('config', ...)` call the relay makes at startup.

use tracing::debug;

use pixel_relay_core::{Platform, SkipReason, TrackingEvent};

use super::{require_id, PlatformAdaptor};
use crate::pixels::{PixelCall, PixelGlobal};
use crate::tracking_config::TrackingConfig;

/// Google Analytics 4 adaptor.
pub struct GaAdaptor;

impl PlatformAdaptor for GaAdaptor {
    fn platform(&self) -> Platform {
        Platform::Ga4
    }

    fn global(&self) -> PixelGlobal {
        PixelGlobal::Gtag
    }

    fn prepare(
        &self,
        config: &TrackingConfig,
        event: &TrackingEvent,
    ) -> Result<PixelCall, SkipReason> {
        let measurement_id = require_id(config, Platform::Ga4)?;
        debug!(
            event_name = %event.name,
            measurement_id,
            "GA4 event prepared"
        );
        Ok(PixelCall::Event {
            name: event.name.to_string(),
            params: event.data_value(),
        })
    }
}
