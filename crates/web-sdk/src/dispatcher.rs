//! Multi-platform dispatcher — fans one event out to every platform.
//!
//! Each platform is attempted independently: a missing SDK, a missing id or
//! a failing call on one platform never affects the others. Nothing is
//! retried and nothing is returned; outcomes go to the [`DispatchSink`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use pixel_relay_core::event_bus::{make_record, noop_sink};
use pixel_relay_core::{DispatchOutcome, DispatchSink, SkipReason, TrackingEvent};

use crate::adaptors::{default_adaptors, PlatformAdaptor};
use crate::pixels::{self, GlobalScope};
use crate::tracking_config::TrackingConfig;

pub struct Dispatcher {
    config: Arc<TrackingConfig>,
    globals: Arc<dyn GlobalScope>,
    adaptors: Vec<Box<dyn PlatformAdaptor>>,
    sink: Arc<dyn DispatchSink>,
}

impl Dispatcher {
    pub fn new(config: Arc<TrackingConfig>, globals: Arc<dyn GlobalScope>) -> Self {
        Self {
            config,
            globals,
            adaptors: default_adaptors(),
            sink: noop_sink(),
        }
    }

    /// Attach a sink for dispatch outcomes.
    pub fn with_sink(mut self, sink: Arc<dyn DispatchSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Send `event` to every platform.
    pub fn dispatch(&self, event: &TrackingEvent) {
        info!(event_name = %event.name, data = ?event.data, "sending event");

        for adaptor in &self.adaptors {
            let outcome = self.attempt(adaptor.as_ref(), event);
            match &outcome {
                DispatchOutcome::Sent => {
                    debug!(platform = %adaptor.platform(), event_name = %event.name, "sent");
                }
                DispatchOutcome::Skipped { reason } => {
                    debug!(
                        platform = %adaptor.platform(),
                        event_name = %event.name,
                        ?reason,
                        "skipped"
                    );
                }
                DispatchOutcome::Failed { error } => {
                    warn!(
                        platform = %adaptor.platform(),
                        event_name = %event.name,
                        error = %error,
                        "pixel call failed"
                    );
                }
            }
            self.sink
                .record(make_record(event, adaptor.platform(), outcome));
        }
    }

    fn attempt(&self, adaptor: &dyn PlatformAdaptor, event: &TrackingEvent) -> DispatchOutcome {
        let Some(function) = pixels::callable(self.globals.as_ref(), adaptor.global()) else {
            return DispatchOutcome::Skipped {
                reason: SkipReason::Unavailable,
            };
        };

        let call = match adaptor.prepare(&self.config, event) {
            Ok(call) => call,
            Err(reason) => return DispatchOutcome::Skipped { reason },
        };

        match function.call(&call) {
            Ok(()) => DispatchOutcome::Sent,
            Err(e) => DispatchOutcome::Failed {
                error: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pixels::{PixelCall, PixelGlobal, PixelRegistry};
    use crate::sim::RecordingPixel;
    use pixel_relay_core::{capture_sink, EventName, Platform};

    const FULL_QUERY: &str = "facebookPixelId=FB&googleAdsId=AW-1&anyClickConversionId=clk\
        &ga4Id=G-1&tiktokPixelId=TT";

    struct Fixture {
        registry: Arc<PixelRegistry>,
        gtag: Arc<RecordingPixel>,
        fbq: Arc<RecordingPixel>,
        ttq: Arc<RecordingPixel>,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(PixelRegistry::new());
        let gtag = Arc::new(RecordingPixel::new());
        let fbq = Arc::new(RecordingPixel::new());
        let ttq = Arc::new(RecordingPixel::new());
        registry.install(PixelGlobal::Gtag, gtag.clone());
        registry.install(PixelGlobal::Fbq, fbq.clone());
        registry.install(PixelGlobal::Ttq, ttq.clone());
        Fixture {
            registry,
            gtag,
            fbq,
            ttq,
        }
    }

    #[test]
    fn test_dispatch_to_all_platforms() {
        let fx = fixture();
        let sink = capture_sink();
        let dispatcher = Dispatcher::new(
            Arc::new(TrackingConfig::from_query(FULL_QUERY)),
            fx.registry.clone(),
        )
        .with_sink(sink.clone());

        let event = TrackingEvent::new(EventName::AnyClick)
            .with("url", "https://example.com/")
            .with("text", "Buy");
        dispatcher.dispatch(&event);

        assert_eq!(sink.count(), 4);
        assert!(sink
            .records()
            .iter()
            .all(|r| r.outcome == DispatchOutcome::Sent));

        // Ads conversion then GA4 event, both through gtag
        let gtag_calls = fx.gtag.calls();
        assert_eq!(gtag_calls.len(), 2);
        assert_eq!(
            gtag_calls[0],
            PixelCall::Event {
                name: "conversion".into(),
                params: serde_json::json!({"send_to": "AW-1/clk"}),
            }
        );
        assert_eq!(
            gtag_calls[1],
            PixelCall::Event {
                name: "any_click".into(),
                params: serde_json::json!({"url": "https://example.com/", "text": "Buy"}),
            }
        );
        assert_eq!(fx.fbq.calls().len(), 1);
        assert_eq!(fx.ttq.calls().len(), 1);
    }

    #[test]
    fn test_missing_ids_never_dispatch() {
        let fx = fixture();
        let sink = capture_sink();
        let dispatcher = Dispatcher::new(Arc::new(TrackingConfig::default()), fx.registry.clone())
            .with_sink(sink.clone());

        for name in ["scroll_20", "scroll_50", "any_click", "any_cta", "other"] {
            dispatcher.dispatch(&TrackingEvent::new(name));
        }

        assert!(fx.gtag.calls().is_empty());
        assert!(fx.fbq.calls().is_empty());
        assert!(fx.ttq.calls().is_empty());
        assert!(sink.records().iter().all(|r| r.outcome
            == DispatchOutcome::Skipped {
                reason: SkipReason::MissingId
            }));
    }

    #[test]
    fn test_unavailable_platform_skipped() {
        let registry = Arc::new(PixelRegistry::new());
        let fbq = Arc::new(RecordingPixel::new());
        registry.install(PixelGlobal::Fbq, fbq.clone());
        let sink = capture_sink();
        let dispatcher = Dispatcher::new(
            Arc::new(TrackingConfig::from_query(FULL_QUERY)),
            registry,
        )
        .with_sink(sink.clone());

        dispatcher.dispatch(&TrackingEvent::new(EventName::Scroll20));

        assert_eq!(fbq.calls().len(), 1);
        let tiktok = sink.for_platform(Platform::TikTok);
        assert_eq!(
            tiktok[0].outcome,
            DispatchOutcome::Skipped {
                reason: SkipReason::Unavailable
            }
        );
    }

    #[test]
    fn test_failing_platform_does_not_stop_others() {
        let fx = fixture();
        fx.registry
            .install(PixelGlobal::Fbq, Arc::new(RecordingPixel::failing("fbq exploded")));
        let sink = capture_sink();
        let dispatcher = Dispatcher::new(
            Arc::new(TrackingConfig::from_query(FULL_QUERY)),
            fx.registry.clone(),
        )
        .with_sink(sink.clone());

        dispatcher.dispatch(&TrackingEvent::new(EventName::AnyClick));

        let facebook = sink.for_platform(Platform::Facebook);
        assert!(matches!(
            facebook[0].outcome,
            DispatchOutcome::Failed { ref error } if error.contains("fbq exploded")
        ));
        assert_eq!(fx.gtag.calls().len(), 2);
        assert_eq!(fx.ttq.calls().len(), 1);
    }
}
