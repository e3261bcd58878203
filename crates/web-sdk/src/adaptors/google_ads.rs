//! Google Ads adaptor — reports a conversion for events that have a
//! configured conversion slot:
//! `gtag('event', 'conversion', { send_to: '<ads id>/<conversion id>' })`.

use pixel_relay_core::{Platform, SkipReason, TrackingEvent};

use super::{require_id, PlatformAdaptor};
use crate::pixels::{PixelCall, PixelGlobal};
use crate::tracking_config::TrackingConfig;

pub struct GoogleAdsAdaptor;

impl PlatformAdaptor for GoogleAdsAdaptor {
    fn platform(&self) -> Platform {
        Platform::GoogleAds
    }

    fn global(&self) -> PixelGlobal {
        PixelGlobal::Gtag
    }

    fn prepare(
        &self,
        config: &TrackingConfig,
        event: &TrackingEvent,
    ) -> Result<PixelCall, SkipReason> {
        let ads_id = require_id(config, Platform::GoogleAds)?;
        let conversion_id = config
            .conversion_id(&event.name)
            .ok_or(SkipReason::NoConversionId)?;

        Ok(PixelCall::Event {
            name: "conversion".into(),
            params: serde_json::json!({
                "send_to": format!("{ads_id}/{conversion_id}"),
            }),
        })
    }
}
