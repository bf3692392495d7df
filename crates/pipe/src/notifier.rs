//! Throttled status notifications.
//!
//! Non-terminal events are dropped when they arrive less than
//! `emit_interval` after the previous emission. Terminal (`done`) events
//! always go out.

use crate::events::{EventEmitter, PipeEvent, StatusLevel};
use ragpipe_core::PipeConfig;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Rate-limited front end to the host's event emitter.
#[derive(Debug)]
pub struct StatusNotifier {
    enabled: bool,
    interval: Duration,
    /// Instant of the last emission, `None` before the first one.
    last_emit: Mutex<Option<Instant>>,
}

impl StatusNotifier {
    pub fn new(enabled: bool, interval: Duration) -> Self {
        Self {
            enabled,
            interval,
            last_emit: Mutex::new(None),
        }
    }

    pub fn from_config(config: &PipeConfig) -> Self {
        Self::new(config.enable_status_indicator, config.emit_interval())
    }

    /// Send a status event unless disabled, sink-less, or throttled.
    ///
    /// Returns whether the event was handed to the emitter.
    pub async fn notify(
        &self,
        emitter: Option<&dyn EventEmitter>,
        level: StatusLevel,
        message: &str,
        done: bool,
    ) -> bool {
        self.notify_at(Instant::now(), emitter, level, message, done)
            .await
    }

    pub(crate) async fn notify_at(
        &self,
        now: Instant,
        emitter: Option<&dyn EventEmitter>,
        level: StatusLevel,
        message: &str,
        done: bool,
    ) -> bool {
        let Some(emitter) = emitter else {
            return false;
        };

        if !self.enabled || !self.claim(now, done) {
            tracing::trace!(description = message, done, "Status event suppressed");
            return false;
        }

        tracing::debug!(?level, description = message, done, "Emitting status event");
        if let Err(e) = emitter.emit(PipeEvent::status(level, message, done)).await {
            tracing::warn!("Event emitter rejected status event: {}", e);
        }
        true
    }

    /// Check the throttle window and record `now` if the event may go out.
    ///
    /// Check and update happen under one lock; the lock is released before
    /// the emitter is awaited.
    fn claim(&self, now: Instant, done: bool) -> bool {
        let mut last = self
            .last_emit
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let due = match *last {
            None => true,
            Some(prev) => now.saturating_duration_since(prev) >= self.interval,
        };

        if due || done {
            *last = Some(now);
            true
        } else {
            false
        }
    }
}
