//! Trailing-edge debouncing of bounds recomputation.
//!
//! [`Debouncer`] is the clock-injected core used by hosts that drive their
//! own event loop. [`spawn_debounced`] wraps the same rule in a tokio task.

#[cfg(test)]
#[path = "debounce_test.rs"]
mod debounce_test;

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::config::EngineConfig;
use crate::consts::DEBOUNCE_MS;

/// Queue depth for pending triggers. A full queue already guarantees a
/// callback, so extra triggers are dropped.
const TRIGGER_QUEUE: usize = 64;

/// Fires once per burst, `window` after the last trigger.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEBOUNCE_MS))
    }
}

impl Debouncer {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self { window, deadline: None }
    }

    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.debounce())
    }

    /// Push the deadline out to `now + window`.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// Whether the burst ended by `now`. Fires at most once per burst.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

/// Sender side of a debounced task. Dropping every handle flushes a pending
/// callback and stops the task.
#[derive(Debug, Clone)]
pub struct DebounceHandle {
    tx: mpsc::Sender<()>,
}

impl DebounceHandle {
    /// Request a callback. Returns `false` once the task has stopped.
    pub fn trigger(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) | Err(mpsc::error::TrySendError::Full(())) => true,
            Err(mpsc::error::TrySendError::Closed(())) => {
                tracing::warn!("debounce task stopped; trigger dropped");
                false
            }
        }
    }
}

/// Spawn a task that runs `callback` once per quiet `window` after a burst
/// of [`DebounceHandle::trigger`] calls.
#[must_use]
pub fn spawn_debounced<F>(window: Duration, mut callback: F) -> DebounceHandle
where
    F: FnMut() + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<()>(TRIGGER_QUEUE);

    tokio::spawn(async move {
        while rx.recv().await.is_some() {
            loop {
                tokio::select! {
                    maybe_trigger = rx.recv() => {
                        if maybe_trigger.is_none() {
                            callback();
                            return;
                        }
                    }
                    () = tokio::time::sleep(window) => break,
                }
            }
            callback();
        }
    });

    DebounceHandle { tx }
}
