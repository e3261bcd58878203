//! Dispatch outcome bus — trait for reporting what happened to each
//! platform call.
//!
//! Dispatch is fire-and-forget, so outcomes are never returned to the
//! caller. Components accept an `Arc<dyn DispatchSink>` instead; the default
//! sink discards everything and tests use [`CaptureSink`].

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;

use crate::types::{DispatchOutcome, DispatchRecord, EventName, Platform, TrackingEvent};

/// Receives one record per platform per dispatched event.
pub trait DispatchSink: Send + Sync {
    fn record(&self, record: DispatchRecord);
}

/// No-op sink for embedders that only want log output.
pub struct NoOpSink;

impl DispatchSink for NoOpSink {
    fn record(&self, _record: DispatchRecord) {}
}

/// In-memory sink that captures records for testing.
#[derive(Default)]
pub struct CaptureSink {
    records: Mutex<Vec<DispatchRecord>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<DispatchRecord> {
        self.records.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.records.lock().len()
    }

    /// Records for one platform, in dispatch order.
    pub fn for_platform(&self, platform: Platform) -> Vec<DispatchRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.platform == platform)
            .cloned()
            .collect()
    }

    /// Distinct event names in the order they were first dispatched.
    pub fn event_names(&self) -> Vec<EventName> {
        let mut names: Vec<EventName> = Vec::new();
        let mut last_id = None;
        for record in self.records.lock().iter() {
            if last_id != Some(record.event_id) {
                names.push(record.event_name.clone());
                last_id = Some(record.event_id);
            }
        }
        names
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl DispatchSink for CaptureSink {
    fn record(&self, record: DispatchRecord) {
        self.records.lock().push(record);
    }
}

/// Convenience builder for a `DispatchRecord`.
pub fn make_record(
    event: &TrackingEvent,
    platform: Platform,
    outcome: DispatchOutcome,
) -> DispatchRecord {
    DispatchRecord {
        event_id: event.id,
        event_name: event.name.clone(),
        platform,
        outcome,
        timestamp: Utc::now(),
    }
}

/// Convenience: create a no-op sink.
pub fn noop_sink() -> Arc<dyn DispatchSink> {
    Arc::new(NoOpSink)
}

/// Convenience: create a capture sink for tests.
pub fn capture_sink() -> Arc<CaptureSink> {
    Arc::new(CaptureSink::new())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::SkipReason;

    #[test]
    fn test_capture_sink() {
        let sink = capture_sink();
        assert_eq!(sink.count(), 0);

        let click = TrackingEvent::new(EventName::AnyClick);
        let cta = TrackingEvent::new(EventName::AnyCta);
        sink.record(make_record(&click, Platform::Facebook, DispatchOutcome::Sent));
        sink.record(make_record(
            &click,
            Platform::GoogleAds,
            DispatchOutcome::Skipped {
                reason: SkipReason::MissingId,
            },
        ));
        sink.record(make_record(&cta, Platform::Facebook, DispatchOutcome::Sent));

        assert_eq!(sink.count(), 3);
        assert_eq!(sink.for_platform(Platform::Facebook).len(), 2);
        assert_eq!(
            sink.event_names(),
            vec![EventName::AnyClick, EventName::AnyCta]
        );

        sink.clear();
        assert_eq!(sink.count(), 0);
    }

    #[test]
    fn test_noop_sink() {
        let sink = noop_sink();
        let event = TrackingEvent::new(EventName::Scroll20);
        // Should not panic
        sink.record(make_record(&event, Platform::TikTok, DispatchOutcome::Sent));
    }
}
