//! Startup gate — waits for at least one pixel SDK before tracking starts.
//!
//! `Waiting` polls on a repeating timer. The first tick that finds an SDK
//! moves to `Ready(Detected)`; after `max_attempts` fruitless ticks the gate
//! opens anyway as `Ready(TimedOut)`. The interval is cleared on either
//! transition.

use std::time::Duration;

use tracing::{debug, info, warn};

use pixel_relay_core::config::ReadinessConfig;

use crate::host::{Scheduler, TimerHandle};
use crate::pixels::{GlobalScope, PixelGlobal};

/// True when any of `gtag`, `fbq` or `ttq` is a callable, loaded SDK.
pub fn pixels_ready(scope: &dyn GlobalScope) -> bool {
    PixelGlobal::ALL.iter().any(|global| {
        scope
            .lookup(*global)
            .is_some_and(|f| f.is_callable() && !f.is_stand_in())
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyCause {
    Detected,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessState {
    Idle,
    Waiting { attempts: u32 },
    Ready(ReadyCause),
}

pub struct ReadinessPoller {
    interval: Duration,
    max_attempts: u32,
    state: ReadinessState,
    timer: Option<TimerHandle>,
}

impl ReadinessPoller {
    pub fn new(config: &ReadinessConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            max_attempts: config.max_poll_attempts,
            state: ReadinessState::Idle,
            timer: None,
        }
    }

    pub fn state(&self) -> ReadinessState {
        self.state
    }

    /// Start polling. Calling this more than once has no effect.
    pub fn start(&mut self, scheduler: &dyn Scheduler) {
        if self.state != ReadinessState::Idle {
            return;
        }
        self.timer = Some(scheduler.set_interval(self.interval));
        self.state = ReadinessState::Waiting { attempts: 0 };
        debug!(interval_ms = self.interval.as_millis() as u64, "waiting for pixels");
    }

    /// Whether `handle` is this poller's interval.
    pub fn owns(&self, handle: TimerHandle) -> bool {
        self.timer == Some(handle)
    }

    /// Handle one poll tick. Returns the cause when this tick opened the gate.
    pub fn on_tick(
        &mut self,
        scheduler: &dyn Scheduler,
        scope: &dyn GlobalScope,
    ) -> Option<ReadyCause> {
        let ReadinessState::Waiting { attempts } = self.state else {
            return None;
        };

        let cause = if pixels_ready(scope) {
            info!("pixels detected, starting tracking");
            ReadyCause::Detected
        } else if attempts + 1 >= self.max_attempts {
            warn!(
                attempts = attempts + 1,
                "pixels not detected after waiting, starting anyway"
            );
            ReadyCause::TimedOut
        } else {
            self.state = ReadinessState::Waiting {
                attempts: attempts + 1,
            };
            return None;
        };

        if let Some(timer) = self.timer.take() {
            scheduler.clear(timer);
        }
        self.state = ReadinessState::Ready(cause);
        Some(cause)
    }
}
