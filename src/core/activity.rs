//! # Activity
//!
//! Which backend operation the composer is waiting on. Only one runs at a
//! time: an operation may begin only from `Idle`, and only the completion of
//! that same operation returns to `Idle`.
//!
//! ```text
//!            begin(op)                finish(op)
//!   Idle ──────────────▶ Generating ─────────────▶ Idle
//!        ──────────────▶ Saving     ─────────────▶
//!        ──────────────▶ Sending    ─────────────▶
//!        ──────────────▶ Scheduling ─────────────▶
//!        ──────────────▶ Cancelling ─────────────▶
//! ```
//!
//! Autosave is not an activity; it runs beside `Idle` and is tracked by
//! `SaveStatus`.

use std::fmt;

use crate::backend::GenerateOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activity {
    #[default]
    Idle,
    Generating(GenerateOptions),
    Saving,
    Sending,
    Scheduling,
    Cancelling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionError {
    pub from: Activity,
    pub to: Activity,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot move from {:?} to {:?}", self.from, self.to)
    }
}

impl std::error::Error for TransitionError {}

impl Activity {
    pub fn is_idle(&self) -> bool {
        matches!(self, Activity::Idle)
    }

    pub fn is_generating(&self) -> bool {
        matches!(self, Activity::Generating(_))
    }

    /// Starts `next`. Fails unless currently idle.
    pub fn begin(&mut self, next: Activity) -> Result<(), TransitionError> {
        if !self.is_idle() || next.is_idle() {
            return Err(TransitionError { from: *self, to: next });
        }
        *self = next;
        Ok(())
    }

    /// Ends the running operation. Returns false (and changes nothing) if a
    /// different operation is running.
    pub fn finish(&mut self, done: Activity) -> bool {
        let same = match (*self, done) {
            (Activity::Generating(_), Activity::Generating(_)) => true,
            (current, done) => current == done && !current.is_idle(),
        };
        if same {
            *self = Activity::Idle;
        }
        same
    }

    /// Spinner text for the status line.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Activity::Idle => None,
            Activity::Generating(_) => Some("Generating..."),
            Activity::Saving => Some("Saving..."),
            Activity::Sending => Some("Marking as sent..."),
            Activity::Scheduling => Some("Scheduling..."),
            Activity::Cancelling => Some("Cancelling schedule..."),
        }
    }
}

/// Indicator next to the editor showing autosave progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
}

impl SaveStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SaveStatus::Idle => "",
            SaveStatus::Saving => "Saving...",
            SaveStatus::Saved => "Saved",
        }
    }
}
