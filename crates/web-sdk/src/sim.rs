//! Deterministic simulated page for driving a [`TrackingRelay`] without a
//! browser.
//!
//! [`SimulatedPage`] implements [`Page`] and [`Scheduler`] on a virtual clock
//! and owns a [`PixelRegistry`] as its global scope. Time only moves when
//! [`SimulatedPage::advance`] is called; due timers fire in deadline order
//! (ties broken by creation order) and notifications are only delivered for
//! listeners the relay has registered.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use pixel_relay_core::{RelayError, RelayResult};

use crate::events::{ClickTarget, HostEvent, ReadyState, ScrollMetrics};
use crate::host::{Listener, ListenerOptions, Page, RelayHost, Scheduler, TimerHandle};
use crate::pixels::{PixelCall, PixelFunction, PixelRegistry};
use crate::relay::TrackingRelay;

/// Intervals shorter than this are clamped so a zero period cannot spin.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy)]
struct Timer {
    due: Duration,
    period: Option<Duration>,
}

struct SimState {
    now: Duration,
    next_timer: u64,
    timers: BTreeMap<TimerHandle, Timer>,
    listeners: HashMap<Listener, ListenerOptions>,
    ready_state: ReadyState,
    metrics: ScrollMetrics,
    scripts: Vec<String>,
    href: String,
}

pub struct SimulatedPage {
    state: Mutex<SimState>,
    globals: Arc<PixelRegistry>,
}

impl SimulatedPage {
    /// A fully loaded, unscrolled page at `href` with no scripts and no pixels.
    pub fn new(href: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SimState {
                now: Duration::ZERO,
                next_timer: 1,
                timers: BTreeMap::new(),
                listeners: HashMap::new(),
                ready_state: ReadyState::Complete,
                metrics: ScrollMetrics::new(0.0, 2000.0, 1000.0),
                scripts: Vec::new(),
                href: href.into(),
            }),
            globals: Arc::new(PixelRegistry::new()),
        })
    }

    /// Host bundle for constructing a relay against this page.
    pub fn host(self: &Arc<Self>) -> RelayHost {
        RelayHost::new(self.clone(), self.clone(), self.globals.clone())
    }

    pub fn globals(&self) -> Arc<PixelRegistry> {
        self.globals.clone()
    }

    pub fn add_script(&self, src: impl Into<String>) {
        self.state.lock().scripts.push(src.into());
    }

    pub fn set_ready_state(&self, ready_state: ReadyState) {
        self.state.lock().ready_state = ready_state;
    }

    pub fn set_scroll_metrics(&self, metrics: ScrollMetrics) {
        self.state.lock().metrics = metrics;
    }

    /// Elapsed virtual time.
    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    pub fn active_timers(&self) -> usize {
        self.state.lock().timers.len()
    }

    pub fn has_listener(&self, listener: Listener) -> bool {
        self.state.lock().listeners.contains_key(&listener)
    }

    pub fn listener_options(&self, listener: Listener) -> Option<ListenerOptions> {
        self.state.lock().listeners.get(&listener).copied()
    }

    /// Move the clock forward by `by`, firing every timer that comes due.
    pub fn advance(&self, relay: &mut TrackingRelay, by: Duration) {
        let target = self.now() + by;
        while let Some(handle) = self.pop_due(target) {
            relay.handle(HostEvent::Timer(handle));
        }
        self.state.lock().now = target;
    }

    /// Scroll to `scroll_top` and notify the relay if it listens for scroll.
    pub fn scroll_to(&self, relay: &mut TrackingRelay, scroll_top: f64) {
        let listening = {
            let mut state = self.state.lock();
            state.metrics.scroll_top = scroll_top;
            state.listeners.contains_key(&Listener::Scroll)
        };
        if listening {
            relay.handle(HostEvent::Scroll);
        }
    }

    /// Click an element with the given text content.
    pub fn click(&self, relay: &mut TrackingRelay, text: &str) {
        if self.has_listener(Listener::Click) {
            relay.handle(HostEvent::Click(ClickTarget::with_text(text)));
        }
    }

    /// Move the document to `interactive` and fire `DOMContentLoaded`.
    pub fn finish_loading(&self, relay: &mut TrackingRelay) {
        self.set_ready_state(ReadyState::Interactive);
        if self.has_listener(Listener::DomContentLoaded) {
            relay.handle(HostEvent::DomContentLoaded);
        }
    }

    /// Take the earliest timer due at or before `target`, advancing the
    /// clock to its deadline and rescheduling it if it repeats.
    fn pop_due(&self, target: Duration) -> Option<TimerHandle> {
        let mut state = self.state.lock();
        let (handle, timer) = state
            .timers
            .iter()
            .filter(|(_, t)| t.due <= target)
            .min_by_key(|(handle, t)| (t.due, **handle))
            .map(|(h, t)| (*h, *t))?;

        state.now = timer.due;
        match timer.period {
            Some(period) => {
                if let Some(t) = state.timers.get_mut(&handle) {
                    t.due += period;
                }
            }
            None => {
                state.timers.remove(&handle);
            }
        }
        Some(handle)
    }

    fn schedule(&self, delay: Duration, period: Option<Duration>) -> TimerHandle {
        let mut state = self.state.lock();
        let handle = TimerHandle(state.next_timer);
        state.next_timer += 1;
        let due = state.now + delay;
        state.timers.insert(handle, Timer { due, period });
        handle
    }
}

impl Page for SimulatedPage {
    fn script_sources(&self) -> Vec<String> {
        self.state.lock().scripts.clone()
    }

    fn location_href(&self) -> String {
        self.state.lock().href.clone()
    }

    fn ready_state(&self) -> ReadyState {
        self.state.lock().ready_state
    }

    fn scroll_metrics(&self) -> ScrollMetrics {
        self.state.lock().metrics
    }

    fn add_listener(&self, listener: Listener, options: ListenerOptions) {
        self.state.lock().listeners.insert(listener, options);
    }

    fn remove_listener(&self, listener: Listener) {
        self.state.lock().listeners.remove(&listener);
    }
}

impl Scheduler for SimulatedPage {
    fn set_timeout(&self, delay: Duration) -> TimerHandle {
        self.schedule(delay, None)
    }

    fn set_interval(&self, period: Duration) -> TimerHandle {
        let period = period.max(MIN_INTERVAL);
        self.schedule(period, Some(period))
    }

    fn clear(&self, handle: TimerHandle) {
        self.state.lock().timers.remove(&handle);
    }
}

/// Pixel function that records every call, optionally failing each one.
#[derive(Default)]
pub struct RecordingPixel {
    calls: Mutex<Vec<PixelCall>>,
    failure: Option<String>,
}

impl RecordingPixel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pixel whose every call fails with `message` (after being recorded).
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(message.into()),
        }
    }

    pub fn calls(&self) -> Vec<PixelCall> {
        self.calls.lock().clone()
    }
}

impl PixelFunction for RecordingPixel {
    fn call(&self, call: &PixelCall) -> RelayResult<()> {
        self.calls.lock().push(call.clone());
        match &self.failure {
            Some(message) => Err(RelayError::pixel_call("simulated", message.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timers_fire_in_deadline_order() {
        let page = SimulatedPage::new("https://example.com/");
        let late = page.set_timeout(Duration::from_millis(300));
        let early = page.set_timeout(Duration::from_millis(100));
        let tick = page.set_interval(Duration::from_millis(150));

        let mut fired = Vec::new();
        let target = Duration::from_millis(320);
        while let Some(handle) = page.pop_due(target) {
            fired.push((handle, page.now()));
        }

        assert_eq!(
            fired,
            vec![
                (early, Duration::from_millis(100)),
                (tick, Duration::from_millis(150)),
                (late, Duration::from_millis(300)),
                (tick, Duration::from_millis(300)),
            ]
        );
        // Only the interval remains
        assert_eq!(page.active_timers(), 1);
    }

    #[test]
    fn test_clear_cancels() {
        let page = SimulatedPage::new("https://example.com/");
        let handle = page.set_interval(Duration::from_millis(10));
        page.clear(handle);
        assert_eq!(page.active_timers(), 0);
        assert!(page.pop_due(Duration::from_secs(1)).is_none());
        // Clearing twice is fine
        page.clear(handle);
    }

    #[test]
    fn test_listener_registry() {
        let page = SimulatedPage::new("https://example.com/");
        page.add_listener(Listener::Scroll, ListenerOptions::passive());
        assert_eq!(
            page.listener_options(Listener::Scroll),
            Some(ListenerOptions { passive: true })
        );
        page.remove_listener(Listener::Scroll);
        assert!(!page.has_listener(Listener::Scroll));
    }
}
