//! Meta pixel adaptor — `fbq('trackCustom', name, data)`.

use pixel_relay_core::{Platform, SkipReason, TrackingEvent};

use super::{require_id, PlatformAdaptor};
use crate::pixels::{PixelCall, PixelGlobal};
use crate::tracking_config::TrackingConfig;

pub struct FacebookAdaptor;

impl PlatformAdaptor for FacebookAdaptor {
    fn platform(&self) -> Platform {
        Platform::Facebook
    }

    fn global(&self) -> PixelGlobal {
        PixelGlobal::Fbq
    }

    fn prepare(
        &self,
        config: &TrackingConfig,
        event: &TrackingEvent,
    ) -> Result<PixelCall, SkipReason> {
        require_id(config, Platform::Facebook)?;
        Ok(PixelCall::TrackCustom {
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
    fn test_track_custom() {
        let config = TrackingConfig::from_query("facebookPixelId=123");
        let event = TrackingEvent::new(EventName::AnyClick).with("text", "Buy");
        let call = FacebookAdaptor.prepare(&config, &event).unwrap();
        assert_eq!(
            call,
            PixelCall::TrackCustom {
                name: "any_click".into(),
                data: serde_json::json!({"text": "Buy"}),
            }
        );
    }

    #[test]
    fn test_missing_pixel_id() {
        let event = TrackingEvent::new(EventName::AnyClick);
        assert_eq!(
            FacebookAdaptor.prepare(&TrackingConfig::default(), &event),
            Err(SkipReason::MissingId)
        );
    }
}
