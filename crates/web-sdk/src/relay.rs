//! Tracking relay — wires configuration, the startup gate, the observers and
//! the dispatcher to a host page.
//!
//! Lifecycle: `WaitingForPixels` (readiness polling) → `WaitingForDocument`
//! (only if the DOM is still loading) → `Active` (scroll and click observers
//! registered, exactly once).

use std::sync::Arc;

use tracing::{debug, info, warn};

use pixel_relay_core::{DispatchSink, RelayConfig, TrackingEvent};

use crate::click::ClickObserver;
use crate::dispatcher::Dispatcher;
use crate::events::HostEvent;
use crate::host::{Listener, ListenerOptions, RelayHost};
use crate::pixels::{self, PixelCall, PixelGlobal};
use crate::readiness::{ReadinessPoller, ReadyCause};
use crate::scroll::{ScrollObserver, ScrollState};
use crate::tracking_config::TrackingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayPhase {
    /// Constructed, [`TrackingRelay::start`] not called yet.
    Created,
    WaitingForPixels,
    WaitingForDocument,
    Active,
}

pub struct TrackingRelay {
    host: RelayHost,
    config: Arc<TrackingConfig>,
    dispatcher: Dispatcher,
    poller: ReadinessPoller,
    scroll: ScrollObserver,
    click: ClickObserver,
    phase: RelayPhase,
    ready_cause: Option<ReadyCause>,
}

impl TrackingRelay {
    /// Resolve the tracking configuration from the page, make sure a `gtag`
    /// exists and send the GA4 `config` command.
    pub fn new(settings: RelayConfig, host: RelayHost) -> Self {
        let config = Arc::new(TrackingConfig::resolve(
            host.page.as_ref(),
            &settings.script_marker,
        ));

        pixels::ensure_gtag(host.globals.as_ref());
        send_ga4_config(&host, &config);

        Self {
            dispatcher: Dispatcher::new(config.clone(), host.globals.clone()),
            poller: ReadinessPoller::new(&settings.readiness),
            scroll: ScrollObserver::new(settings.scroll),
            click: ClickObserver::new(settings.click, &config.cta_text),
            config,
            host,
            phase: RelayPhase::Created,
            ready_cause: None,
        }
    }

    /// Attach a sink for per-platform dispatch outcomes.
    pub fn with_dispatch_sink(mut self, sink: Arc<dyn DispatchSink>) -> Self {
        self.dispatcher = self.dispatcher.with_sink(sink);
        self
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    pub fn phase(&self) -> RelayPhase {
        self.phase
    }

    /// How the startup gate opened, once it has.
    pub fn ready_cause(&self) -> Option<ReadyCause> {
        self.ready_cause
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.scroll.state()
    }

    pub fn scroll_evaluations(&self) -> u64 {
        self.scroll.evaluations()
    }

    /// Begin waiting for pixel SDKs.
    pub fn start(&mut self) {
        if self.phase != RelayPhase::Created {
            return;
        }
        self.poller.start(self.host.scheduler.as_ref());
        self.phase = RelayPhase::WaitingForPixels;
    }

    /// Feed one host notification to the relay.
    pub fn handle(&mut self, event: HostEvent) {
        match event {
            HostEvent::Timer(handle) if self.poller.owns(handle) => {
                if let Some(cause) = self
                    .poller
                    .on_tick(self.host.scheduler.as_ref(), self.host.globals.as_ref())
                {
                    self.on_ready(cause);
                }
            }
            HostEvent::Timer(handle) => {
                match self.scroll.on_timer(
                    handle,
                    self.host.page.as_ref(),
                    self.host.scheduler.as_ref(),
                ) {
                    Some(events) => self.dispatch_all(&events),
                    None => debug!(?handle, "ignoring unknown timer"),
                }
            }
            HostEvent::Scroll => self.scroll.on_scroll(self.host.scheduler.as_ref()),
            HostEvent::Click(target) => {
                let url = self.host.page.location_href();
                let events = self.click.on_click(&target, &url);
                self.dispatch_all(&events);
            }
            HostEvent::DomContentLoaded => {
                if self.phase == RelayPhase::WaitingForDocument {
                    self.host.page.remove_listener(Listener::DomContentLoaded);
                    self.register_observers();
                }
            }
        }
    }

    /// Send an arbitrary event through the dispatcher.
    pub fn track(&self, event: &TrackingEvent) {
        self.dispatcher.dispatch(event);
    }

    fn on_ready(&mut self, cause: ReadyCause) {
        self.ready_cause = Some(cause);
        if self.host.page.ready_state().is_ready() {
            self.register_observers();
        } else {
            debug!("document still loading, deferring observers to DOMContentLoaded");
            self.host
                .page
                .add_listener(Listener::DomContentLoaded, ListenerOptions::default());
            self.phase = RelayPhase::WaitingForDocument;
        }
    }

    fn register_observers(&mut self) {
        if self.phase == RelayPhase::Active {
            return;
        }
        self.scroll
            .attach(self.host.page.as_ref(), self.host.scheduler.as_ref());
        self.click.attach(self.host.page.as_ref());
        self.phase = RelayPhase::Active;
        info!("scroll and click tracking registered");
    }

    fn dispatch_all(&self, events: &[TrackingEvent]) {
        for event in events {
            self.dispatcher.dispatch(event);
        }
    }
}

fn send_ga4_config(host: &RelayHost, config: &TrackingConfig) {
    let Some(measurement_id) = config.ga4_measurement_id.as_deref() else {
        return;
    };
    let Some(gtag) = pixels::callable(host.globals.as_ref(), PixelGlobal::Gtag) else {
        return;
    };
    let call = PixelCall::Config {
        target: measurement_id.to_string(),
    };
    if let Err(e) = gtag.call(&call) {
        warn!(error = %e, "gtag config failed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::events::{ClickTarget, ReadyState};
    use crate::pixels::GlobalScope;
    use crate::sim::{RecordingPixel, SimulatedPage};
    use pixel_relay_core::capture_sink;
    use std::time::Duration;

    #[test]
    fn test_new_installs_stand_in_and_configures_ga4() {
        let page = SimulatedPage::new("https://example.com/");
        page.add_script("/tracking-script7.js?ga4Id=G-XYZ");
        let relay = TrackingRelay::new(RelayConfig::default(), page.host());

        assert_eq!(relay.config().ga4_measurement_id.as_deref(), Some("G-XYZ"));
        assert!(page.globals().lookup(PixelGlobal::Gtag).unwrap().is_stand_in());
        assert_eq!(relay.phase(), RelayPhase::Created);
    }

    #[test]
    fn test_ga4_config_sent_to_loaded_gtag() {
        let page = SimulatedPage::new("https://example.com/");
        page.add_script("/tracking-script7.js?ga4Id=G-XYZ");
        let gtag = Arc::new(RecordingPixel::new());
        page.globals().install(PixelGlobal::Gtag, gtag.clone());

        let _relay = TrackingRelay::new(RelayConfig::default(), page.host());
        assert_eq!(
            gtag.calls(),
            vec![PixelCall::Config {
                target: "G-XYZ".into()
            }]
        );
    }

    #[test]
    fn test_failing_ga4_config_is_swallowed() {
        let page = SimulatedPage::new("https://example.com/");
        page.add_script("/tracking-script7.js?ga4Id=G-XYZ");
        page.globals()
            .install(PixelGlobal::Gtag, Arc::new(RecordingPixel::failing("boom")));
        let relay = TrackingRelay::new(RelayConfig::default(), page.host());
        assert_eq!(relay.phase(), RelayPhase::Created);
    }

    #[test]
    fn test_deferred_until_dom_content_loaded() {
        let page = SimulatedPage::new("https://example.com/");
        page.set_ready_state(ReadyState::Loading);
        page.globals()
            .install(PixelGlobal::Fbq, Arc::new(RecordingPixel::new()));

        let mut relay = TrackingRelay::new(RelayConfig::default(), page.host());
        relay.start();
        page.advance(&mut relay, Duration::from_millis(500));

        assert_eq!(relay.phase(), RelayPhase::WaitingForDocument);
        assert_eq!(relay.ready_cause(), Some(ReadyCause::Detected));
        assert!(!page.has_listener(Listener::Click));

        page.finish_loading(&mut relay);
        assert_eq!(relay.phase(), RelayPhase::Active);
        assert!(page.has_listener(Listener::Click));
        assert!(page.has_listener(Listener::Scroll));
        assert!(!page.has_listener(Listener::DomContentLoaded));

        // A stray second notification does not register twice
        relay.handle(HostEvent::DomContentLoaded);
        assert_eq!(relay.phase(), RelayPhase::Active);
    }

    #[test]
    fn test_clicks_before_activation_are_ignored() {
        let page = SimulatedPage::new("https://example.com/");
        page.add_script("/tracking-script7.js?facebookPixelId=FB");
        let fbq = Arc::new(RecordingPixel::new());
        page.globals().install(PixelGlobal::Fbq, fbq.clone());
        let sink = capture_sink();

        let mut relay =
            TrackingRelay::new(RelayConfig::default(), page.host()).with_dispatch_sink(sink.clone());
        relay.start();
        relay.handle(HostEvent::Click(ClickTarget::with_text("early")));
        assert_eq!(sink.count(), 0);

        page.advance(&mut relay, Duration::from_millis(500));
        page.click(&mut relay, "later");
        assert_eq!(fbq.calls().len(), 1);
        assert_eq!(sink.count(), 4);
    }

    #[test]
    fn test_track_custom_event() {
        let page = SimulatedPage::new("https://example.com/");
        page.add_script("/tracking-script7.js?googleAdsId=AW-1&ga4Id=G-1");
        let gtag = Arc::new(RecordingPixel::new());
        page.globals().install(PixelGlobal::Gtag, gtag.clone());
        let sink = capture_sink();
        let relay =
            TrackingRelay::new(RelayConfig::default(), page.host()).with_dispatch_sink(sink.clone());

        relay.track(&TrackingEvent::new("newsletter_signup").with("url", "https://example.com/"));

        // config at startup + GA4 event; Ads has no slot for custom events
        assert_eq!(gtag.calls().len(), 2);
        assert_eq!(sink.count(), 4);
    }
}
