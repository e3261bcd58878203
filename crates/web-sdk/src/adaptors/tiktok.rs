//! TikTok pixel adaptor — `ttq.track(name, data)`.

use pixel_relay_core::{Platform, SkipReason, TrackingEvent};

use super::{require_id, PlatformAdaptor};
use crate::pixels::{PixelCall, PixelGlobal};
use crate::tracking_config::TrackingConfig;

pub struct TikTokAdaptor;

impl PlatformAdaptor for TikTokAdaptor {
    fn platform(&self) -> Platform {
        Platform::TikTok
    }

    fn global(&self) -> PixelGlobal {
        PixelGlobal::Ttq
    }

    fn prepare(
        &self,
        config: &TrackingConfig,
        event: &TrackingEvent,
    ) -> Result<PixelCall, SkipReason> {
        require_id(config, Platform::TikTok)?;
        Ok(PixelCall::Track {
            name: event.name.to_string(),
            data: event.data_value(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pixel_relay_core::EventName;

    #[test]
    fn test_track() {
        let config = TrackingConfig::from_query("tiktokPixelId=TT");
        let event = TrackingEvent::new(EventName::Scroll20).with("percent", 22);
        match TikTokAdaptor.prepare(&config, &event).unwrap() {
            PixelCall::Track { name, data } => {
                assert_eq!(name, "scroll_20");
                assert_eq!(data["percent"], 22);
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[test]
    fn test_missing_pixel_id() {
        let event = TrackingEvent::new(EventName::Scroll20);
        assert_eq!(
            TikTokAdaptor.prepare(&TrackingConfig::default(), &event),
            Err(SkipReason::MissingId)
        );
    }
}
