//! Page-side notifications and the DOM measurements the relay reads.

use serde::{Deserialize, Serialize};

use crate::host::TimerHandle;

/// `document.readyState`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    /// True once the DOM can be observed (`interactive` or `complete`).
    pub fn is_ready(&self) -> bool {
        matches!(self, ReadyState::Interactive | ReadyState::Complete)
    }
}

/// Vertical scroll geometry of the document element, in CSS pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// Scroll depth as a rounded percentage of the scrollable range.
    ///
    /// A page whose content fits in the viewport has no scrollable range and
    /// reports 0.
    pub fn percent(&self) -> i64 {
        let scrollable = self.scroll_height - self.client_height;
        if scrollable.is_nan() || scrollable <= 0.0 || !self.scroll_top.is_finite() {
            return 0;
        }
        (100.0 * self.scroll_top / scrollable).round() as i64
    }
}

/// The element a click landed on, as seen by a document-level listener.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ClickTarget {
    /// `textContent` of the target; `None` for nodes without text.
    pub text_content: Option<String>,
}

impl ClickTarget {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text_content: Some(text.into()),
        }
    }

    /// Text content with surrounding whitespace removed.
    pub fn trimmed_text(&self) -> &str {
        self.text_content.as_deref().unwrap_or("").trim()
    }
}

/// Everything the host delivers to the relay. The relay reacts to one
/// notification at a time and never blocks.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// A timer created through the [`Scheduler`](crate::host::Scheduler) expired.
    Timer(TimerHandle),
    Scroll,
    Click(ClickTarget),
    DomContentLoaded,
}
