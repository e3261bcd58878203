//! Seams between the relay and the page hosting it.
//!
//! The relay never touches a DOM or a timer queue directly. A browser
//! binding (or the [`sim`](crate::sim) page used in tests) implements these
//! traits and forwards notifications through
//! [`TrackingRelay::handle`](crate::relay::TrackingRelay::handle).

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::events::{ReadyState, ScrollMetrics};
use crate::pixels::GlobalScope;

/// Cancel handle for a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle(pub u64);

/// Timer primitives (`setTimeout` / `setInterval` / `clearTimeout`).
///
/// Expirations come back as [`HostEvent::Timer`](crate::events::HostEvent::Timer)
/// carrying the handle returned here.
pub trait Scheduler: Send + Sync {
    fn set_timeout(&self, delay: Duration) -> TimerHandle;
    fn set_interval(&self, period: Duration) -> TimerHandle;
    /// Cancel a timer. Clearing an expired or unknown handle is a no-op.
    fn clear(&self, handle: TimerHandle);
}

/// DOM listeners the relay registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Listener {
    /// `window` scroll.
    Scroll,
    /// `document` click, delegated via bubbling.
    Click,
    DomContentLoaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListenerOptions {
    pub passive: bool,
}

impl ListenerOptions {
    pub fn passive() -> Self {
        Self { passive: true }
    }
}

/// The hosting document.
pub trait Page: Send + Sync {
    /// `src` of every `<script>` element, in document order.
    fn script_sources(&self) -> Vec<String>;
    fn location_href(&self) -> String;
    fn ready_state(&self) -> ReadyState;
    fn scroll_metrics(&self) -> ScrollMetrics;
    fn add_listener(&self, listener: Listener, options: ListenerOptions);
    fn remove_listener(&self, listener: Listener);
}

/// The three host capabilities a relay is constructed with.
#[derive(Clone)]
pub struct RelayHost {
    pub page: Arc<dyn Page>,
    pub scheduler: Arc<dyn Scheduler>,
    pub globals: Arc<dyn GlobalScope>,
}

impl RelayHost {
    pub fn new(
        page: Arc<dyn Page>,
        scheduler: Arc<dyn Scheduler>,
        globals: Arc<dyn GlobalScope>,
    ) -> Self {
        Self {
            page,
            scheduler,
            globals,
        }
    }
}
