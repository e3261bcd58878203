//! Third-party pixel functions as optional capabilities.
//!
//! Each SDK (`gtag`, `fbq`, `ttq`) may or may not have loaded into the page.
//! The relay looks them up through a [`GlobalScope`] on every use and only
//! calls the ones that are present and callable.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pixel_relay_core::RelayResult;

/// Global function names the relay knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelGlobal {
    /// Google tag (Ads conversions and GA4).
    Gtag,
    /// Meta/Facebook pixel.
    Fbq,
    /// TikTok pixel.
    Ttq,
}

impl PixelGlobal {
    pub const ALL: [PixelGlobal; 3] = [PixelGlobal::Gtag, PixelGlobal::Fbq, PixelGlobal::Ttq];

    pub fn name(&self) -> &'static str {
        match self {
            PixelGlobal::Gtag => "gtag",
            PixelGlobal::Fbq => "fbq",
            PixelGlobal::Ttq => "ttq",
        }
    }
}

impl fmt::Display for PixelGlobal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single invocation of a pixel function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum PixelCall {
    /// `gtag('config', target)`
    Config { target: String },
    /// `gtag('event', name, params)`
    Event {
        name: String,
        params: serde_json::Value,
    },
    /// `fbq('trackCustom', name, data)`
    TrackCustom {
        name: String,
        data: serde_json::Value,
    },
    /// `ttq.track(name, data)`
    Track {
        name: String,
        data: serde_json::Value,
    },
}

/// A global pixel function. An `Err` from [`call`](PixelFunction::call) is
/// the equivalent of the SDK throwing.
pub trait PixelFunction: Send + Sync {
    fn is_callable(&self) -> bool {
        true
    }

    /// True for placeholders installed by the relay itself rather than a
    /// loaded SDK.
    fn is_stand_in(&self) -> bool {
        false
    }

    fn call(&self, call: &PixelCall) -> RelayResult<()>;
}

/// The page's global object, restricted to pixel functions.
pub trait GlobalScope: Send + Sync {
    fn lookup(&self, global: PixelGlobal) -> Option<Arc<dyn PixelFunction>>;
    fn install(&self, global: PixelGlobal, function: Arc<dyn PixelFunction>);
}

/// Look up a global and keep it only if it can be called.
pub fn callable(scope: &dyn GlobalScope, global: PixelGlobal) -> Option<Arc<dyn PixelFunction>> {
    scope.lookup(global).filter(|f| f.is_callable())
}

/// No-op `gtag` installed when the Google tag has not loaded, so that later
/// `gtag` calls never fail.
pub struct GtagStandIn;

impl PixelFunction for GtagStandIn {
    fn is_stand_in(&self) -> bool {
        true
    }

    fn call(&self, call: &PixelCall) -> RelayResult<()> {
        debug!(?call, "gtag function is not available");
        Ok(())
    }
}

/// Install [`GtagStandIn`] unless a callable `gtag` is already present.
/// Returns whether the stand-in was installed.
pub fn ensure_gtag(scope: &dyn GlobalScope) -> bool {
    if callable(scope, PixelGlobal::Gtag).is_some() {
        return false;
    }
    scope.install(PixelGlobal::Gtag, Arc::new(GtagStandIn));
    info!("gtag not present, installed no-op stand-in");
    true
}

/// In-memory [`GlobalScope`].
#[derive(Default)]
pub struct PixelRegistry {
    functions: RwLock<HashMap<PixelGlobal, Arc<dyn PixelFunction>>>,
}

impl PixelRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GlobalScope for PixelRegistry {
    fn lookup(&self, global: PixelGlobal) -> Option<Arc<dyn PixelFunction>> {
        self.functions.read().get(&global).cloned()
    }

    fn install(&self, global: PixelGlobal, function: Arc<dyn PixelFunction>) {
        self.functions.write().insert(global, function);
    }
}
