//! Scroll-depth observer.
//!
//! Scroll notifications go through a trailing-edge debounce
//! (`Idle → Pending → Idle`): the first notification schedules one
//! evaluation, later ones are dropped until it has run. One forced
//! evaluation also runs shortly after attach, for pages opened already
//! scrolled. Each threshold fires once; after both have fired the observer
//! detaches for good.

use tracing::{debug, info};

use pixel_relay_core::config::ScrollConfig;
use pixel_relay_core::{EventName, TrackingEvent};

use crate::host::{Listener, ListenerOptions, Page, Scheduler, TimerHandle};

/// Depth in percent that reports `scroll_20`.
pub const FIRST_THRESHOLD: i64 = 20;
/// Depth in percent that reports `scroll_50`.
pub const SECOND_THRESHOLD: i64 = 50;

/// Threshold flags. Each moves from `false` to `true` at most once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    pub reached_first: bool,
    pub reached_second: bool,
}

impl ScrollState {
    pub fn is_complete(&self) -> bool {
        self.reached_first && self.reached_second
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Debounce {
    Idle,
    Pending(TimerHandle),
}

pub struct ScrollObserver {
    config: ScrollConfig,
    state: ScrollState,
    debounce: Debounce,
    initial_check: Option<TimerHandle>,
    attached: bool,
    evaluations: u64,
}

impl ScrollObserver {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            state: ScrollState::default(),
            debounce: Debounce::Idle,
            initial_check: None,
            attached: false,
            evaluations: 0,
        }
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Number of evaluations run so far.
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Register the passive scroll listener and schedule the forced check.
    pub fn attach(&mut self, page: &dyn Page, scheduler: &dyn Scheduler) {
        if self.attached || self.state.is_complete() {
            return;
        }
        page.add_listener(Listener::Scroll, ListenerOptions::passive());
        self.initial_check = Some(scheduler.set_timeout(self.config.initial_check()));
        self.attached = true;
    }

    /// A scroll notification arrived.
    pub fn on_scroll(&mut self, scheduler: &dyn Scheduler) {
        if !self.attached || self.debounce != Debounce::Idle {
            return;
        }
        self.debounce = Debounce::Pending(scheduler.set_timeout(self.config.debounce()));
    }

    /// Handle a timer expiry. Returns `None` when the timer is not one of
    /// ours, otherwise the events to dispatch (possibly none).
    pub fn on_timer(
        &mut self,
        handle: TimerHandle,
        page: &dyn Page,
        scheduler: &dyn Scheduler,
    ) -> Option<Vec<TrackingEvent>> {
        if self.debounce == Debounce::Pending(handle) {
            self.debounce = Debounce::Idle;
        } else if self.initial_check == Some(handle) {
            self.initial_check = None;
        } else {
            return None;
        }
        Some(self.evaluate(page, scheduler))
    }

    /// Check the current scroll depth against both thresholds.
    pub fn evaluate(&mut self, page: &dyn Page, scheduler: &dyn Scheduler) -> Vec<TrackingEvent> {
        if !self.attached {
            return Vec::new();
        }
        self.evaluations += 1;

        let percent = page.scroll_metrics().percent();
        let mut events = Vec::new();

        if !self.state.reached_first && percent >= FIRST_THRESHOLD {
            events.push(scroll_event(EventName::Scroll20, percent, page));
            self.state.reached_first = true;
        }
        if !self.state.reached_second && percent >= SECOND_THRESHOLD {
            events.push(scroll_event(EventName::Scroll50, percent, page));
            self.state.reached_second = true;
        }
        debug!(percent, fired = events.len(), "scroll evaluated");

        if self.state.is_complete() {
            self.detach(page, scheduler);
        }
        events
    }

    fn detach(&mut self, page: &dyn Page, scheduler: &dyn Scheduler) {
        page.remove_listener(Listener::Scroll);
        if let Debounce::Pending(handle) = self.debounce {
            scheduler.clear(handle);
        }
        if let Some(handle) = self.initial_check.take() {
            scheduler.clear(handle);
        }
        self.debounce = Debounce::Idle;
        self.attached = false;
        info!("both scroll thresholds reached, scroll tracking detached");
    }
}

fn scroll_event(name: EventName, percent: i64, page: &dyn Page) -> TrackingEvent {
    TrackingEvent::new(name)
        .with("percent", percent)
        .with("url", page.location_href())
}
