use std::time::Duration;

use serde::Deserialize;

use crate::error::RelayResult;

/// Relay timing and matching settings. Loaded from environment variables
/// with the prefix `PIXEL_RELAY__`; every field falls back to the values the
/// hosted script has always used.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub readiness: ReadinessConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub click: ClickConfig,
    /// Substring identifying the relay's own `<script>` element.
    #[serde(default = "default_script_marker")]
    pub script_marker: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadinessConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScrollConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_initial_check_ms")]
    pub initial_check_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClickConfig {
    #[serde(default = "default_click_text_limit")]
    pub click_text_limit: usize,
    #[serde(default = "default_cta_text_limit")]
    pub cta_text_limit: usize,
}

// Default functions
fn default_script_marker() -> String {
    "tracking-script".to_string()
}
fn default_poll_interval_ms() -> u64 {
    500
}
fn default_max_poll_attempts() -> u32 {
    40
}
fn default_debounce_ms() -> u64 {
    200
}
fn default_initial_check_ms() -> u64 {
    1000
}
fn default_click_text_limit() -> usize {
    100
}
fn default_cta_text_limit() -> usize {
    50
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            initial_check_ms: default_initial_check_ms(),
        }
    }
}

impl Default for ClickConfig {
    fn default() -> Self {
        Self {
            click_text_limit: default_click_text_limit(),
            cta_text_limit: default_cta_text_limit(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            readiness: ReadinessConfig::default(),
            scroll: ScrollConfig::default(),
            click: ClickConfig::default(),
            script_marker: default_script_marker(),
        }
    }
}

impl ReadinessConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl ScrollConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn initial_check(&self) -> Duration {
        Duration::from_millis(self.initial_check_ms)
    }
}

impl RelayConfig {
    /// Load configuration from environment variables.
    pub fn load() -> RelayResult<Self> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("PIXEL_RELAY")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}
