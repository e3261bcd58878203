use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of a relayed event. The four built-in names carry Google Ads
/// conversion slots; anything else travels as [`EventName::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventName {
    Scroll20,
    Scroll50,
    AnyClick,
    AnyCta,
    Custom(String),
}

impl EventName {
    pub fn as_str(&self) -> &str {
        match self {
            EventName::Scroll20 => "scroll_20",
            EventName::Scroll50 => "scroll_50",
            EventName::AnyClick => "any_click",
            EventName::AnyCta => "any_cta",
            EventName::Custom(name) => name,
        }
    }
}

impl From<String> for EventName {
    fn from(name: String) -> Self {
        match name.as_str() {
            "scroll_20" => EventName::Scroll20,
            "scroll_50" => EventName::Scroll50,
            "any_click" => EventName::AnyClick,
            "any_cta" => EventName::AnyCta,
            _ => EventName::Custom(name),
        }
    }
}

impl From<&str> for EventName {
    fn from(name: &str) -> Self {
        EventName::from(name.to_string())
    }
}

impl From<EventName> for String {
    fn from(name: EventName) -> Self {
        name.as_str().to_string()
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user action to report. Created on demand and dropped after dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub id: Uuid,
    pub name: EventName,
    pub data: serde_json::Map<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl TrackingEvent {
    pub fn new(name: impl Into<EventName>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            data: serde_json::Map::new(),
            created_at: Utc::now(),
        }
    }

    /// Attach a data field.
    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn data_value(&self) -> serde_json::Value {
        serde_json::Value::Object(self.data.clone())
    }
}

/// Destination platforms, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Facebook,
    GoogleAds,
    Ga4,
    TikTok,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Facebook,
        Platform::GoogleAds,
        Platform::Ga4,
        Platform::TikTok,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::GoogleAds => "google_ads",
            Platform::Ga4 => "ga4",
            Platform::TikTok => "tiktok",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a platform was not called for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The platform's global function is absent or not callable.
    Unavailable,
    /// The platform's identifier is not configured.
    MissingId,
    /// Google Ads only: no conversion id mapped for this event name.
    NoConversionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Sent,
    Skipped { reason: SkipReason },
    Failed { error: String },
}

/// Result of one dispatch attempt against one platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRecord {
    pub event_id: Uuid,
    pub event_name: EventName,
    pub platform: Platform,
    pub outcome: DispatchOutcome,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_event_name_round_trip_strings() {
        assert_eq!(EventName::from("scroll_20"), EventName::Scroll20);
        assert_eq!(EventName::from("any_cta"), EventName::AnyCta);
        assert_eq!(
            EventName::from("page_view"),
            EventName::Custom("page_view".into())
        );
        assert_eq!(EventName::AnyClick.to_string(), "any_click");
    }

    #[test]
    fn test_event_serializes_name_as_string() {
        let event = TrackingEvent::new(EventName::Scroll50)
            .with("percent", 55)
            .with("url", "https://example.com/");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["name"], "scroll_50");
        assert_eq!(json["data"]["percent"], 55);
        assert_eq!(event.data_value()["url"], "https://example.com/");
    }

    #[test]
    fn test_outcome_serde_tagging() {
        let outcome = DispatchOutcome::Skipped {
            reason: SkipReason::NoConversionId,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "no_conversion_id");
    }
}
