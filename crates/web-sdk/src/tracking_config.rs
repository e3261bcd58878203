//! Platform identifiers read from the relay's own `<script src="...?...">`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::form_urlencoded;

use pixel_relay_core::{EventName, Platform, RelayError, RelayResult};

use crate::host::Page;

/// Per-site tracking identifiers. Immutable once resolved; every id is
/// optional and consumers skip whatever is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingConfig {
    pub facebook_pixel_id: Option<String>,
    pub google_ads_id: Option<String>,
    pub scroll20_conversion_id: Option<String>,
    pub scroll50_conversion_id: Option<String>,
    pub any_click_conversion_id: Option<String>,
    pub cta_click_conversion_id: Option<String>,
    pub ga4_measurement_id: Option<String>,
    pub tiktok_pixel_id: Option<String>,
    /// Expected call-to-action text, trimmed. Empty when not configured.
    pub cta_text: String,
}

impl TrackingConfig {
    /// Parse a form-urlencoded query string (without the leading `?`).
    ///
    /// The first occurrence of a repeated parameter wins and empty values
    /// count as absent.
    pub fn from_query(query: &str) -> Self {
        let mut params: HashMap<String, String> = HashMap::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            params
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }
        let get = |key: &str| params.get(key).filter(|v| !v.is_empty()).cloned();

        Self {
            facebook_pixel_id: get("facebookPixelId"),
            google_ads_id: get("googleAdsId"),
            scroll20_conversion_id: get("scroll20ConversionId"),
            scroll50_conversion_id: get("scroll50ConversionId"),
            any_click_conversion_id: get("anyClickConversionId"),
            cta_click_conversion_id: get("ctaClickConversionId"),
            ga4_measurement_id: get("ga4Id"),
            tiktok_pixel_id: get("tiktokPixelId"),
            cta_text: params
                .get("ctaText")
                .map(|v| v.trim().to_string())
                .unwrap_or_default(),
        }
    }

    /// Find the first script whose `src` contains `marker` and parse its
    /// query string.
    pub fn from_script_sources<I, S>(sources: I, marker: &str) -> RelayResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let src = sources
            .into_iter()
            .find(|src| src.as_ref().contains(marker))
            .ok_or_else(|| RelayError::ScriptNotFound {
                marker: marker.to_string(),
            })?;
        let src = src.as_ref();

        let (_, rest) = src.split_once('?').ok_or_else(|| RelayError::MissingQuery {
            src: src.to_string(),
        })?;
        let query = rest.split('#').next().unwrap_or_default();
        Ok(Self::from_query(query))
    }

    /// Resolve the configuration from the page, degrading to an empty
    /// configuration when the script or its query string is missing.
    pub fn resolve(page: &dyn Page, marker: &str) -> Self {
        match Self::from_script_sources(page.script_sources(), marker) {
            Ok(config) => {
                info!(config = ?config, "tracking config resolved from script query");
                config
            }
            Err(e) => {
                warn!(error = %e, "tracking script not found or missing query params");
                Self::default()
            }
        }
    }

    /// Identifier that gates dispatch to `platform`.
    pub fn platform_id(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::Facebook => self.facebook_pixel_id.as_deref(),
            Platform::GoogleAds => self.google_ads_id.as_deref(),
            Platform::Ga4 => self.ga4_measurement_id.as_deref(),
            Platform::TikTok => self.tiktok_pixel_id.as_deref(),
        }
    }

    /// Google Ads conversion slot for an event. Only the four built-in
    /// events have one.
    pub fn conversion_id(&self, name: &EventName) -> Option<&str> {
        match name {
            EventName::Scroll20 => self.scroll20_conversion_id.as_deref(),
            EventName::Scroll50 => self.scroll50_conversion_id.as_deref(),
            EventName::AnyClick => self.any_click_conversion_id.as_deref(),
            EventName::AnyCta => self.cta_click_conversion_id.as_deref(),
            EventName::Custom(_) => None,
        }
    }
}
