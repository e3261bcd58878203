//! Click observer — every click reports `any_click`; clicks whose text
//! matches the configured call-to-action also report `any_cta`.

use tracing::debug;

use pixel_relay_core::config::ClickConfig;
use pixel_relay_core::{EventName, TrackingEvent};

use crate::events::ClickTarget;
use crate::host::{Listener, ListenerOptions, Page};

/// Trim, lowercase and collapse whitespace runs to a single space.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// First `limit` characters of `text`.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

pub struct ClickObserver {
    config: ClickConfig,
    expected_cta: String,
    attached: bool,
}

impl ClickObserver {
    pub fn new(config: ClickConfig, cta_text: &str) -> Self {
        Self {
            config,
            expected_cta: normalize(cta_text),
            attached: false,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Register the document-level click listener.
    pub fn attach(&mut self, page: &dyn Page) {
        if self.attached {
            return;
        }
        page.add_listener(Listener::Click, ListenerOptions::default());
        self.attached = true;
    }

    /// True when `text` matches the configured CTA after normalisation.
    /// With no CTA configured, text-less clicks match.
    pub fn matches_cta(&self, text: &str) -> bool {
        normalize(text) == self.expected_cta
    }

    /// Events for one click, `any_click` first.
    pub fn on_click(&self, target: &ClickTarget, url: &str) -> Vec<TrackingEvent> {
        if !self.attached {
            return Vec::new();
        }
        let text = target.trimmed_text();
        let is_cta = self.matches_cta(text);
        debug!(
            clicked_text = text,
            cta_text = %self.expected_cta,
            matched = is_cta,
            "click observed"
        );

        let mut events = vec![TrackingEvent::new(EventName::AnyClick)
            .with("url", url)
            .with("text", truncate_chars(text, self.config.click_text_limit))];

        if is_cta {
            events.push(
                TrackingEvent::new(EventName::AnyCta)
                    .with("url", url)
                    .with("text", truncate_chars(text, self.config.cta_text_limit)),
            );
        }
        events
    }
}
