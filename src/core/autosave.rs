//! # Autosave Timer
//!
//! A single-slot debounce. `arm()` starts a timer that delivers
//! `Action::AutosaveDue` after the configured delay; arming again aborts the
//! pending timer first, so at most one is ever outstanding. Dropping the
//! `Autosave` aborts whatever is pending, which keeps a closed composer from
//! writing after it is gone.
//!
//! `expire_status_after()` is the one-shot used to fade the "Saved" indicator.

use std::sync::mpsc;
use std::time::Duration;

use log::{debug, warn};
use tokio::task::AbortHandle;

use crate::core::action::Action;

pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_secs(30);
pub const DEFAULT_SAVED_INDICATOR: Duration = Duration::from_secs(2);

pub struct Autosave {
    delay: Duration,
    pending: Option<AbortHandle>,
}

impl Autosave {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// (Re)starts the countdown. Must be called from within a tokio runtime.
    pub fn arm(&mut self, tx: mpsc::Sender<Action>) {
        self.cancel();
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!("Autosave timer fired");
            if tx.send(Action::AutosaveDue).is_err() {
                warn!("Failed to deliver AutosaveDue: receiver dropped");
            }
        });
        self.pending = Some(handle.abort_handle());
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// True while a countdown is running.
    pub fn is_armed(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Sends `Action::SaveStatusExpired` once `after` has elapsed.
pub fn expire_status_after(after: Duration, tx: mpsc::Sender<Action>) -> AbortHandle {
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        if tx.send(Action::SaveStatusExpired).is_err() {
            warn!("Failed to deliver SaveStatusExpired: receiver dropped");
        }
    })
    .abort_handle()
}
