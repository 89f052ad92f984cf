//! # Composer State
//!
//! Core business state for one composer session. Domain logic only, no
//! TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── backend: Arc<dyn CaseBackend>    // remote collaborators
//! ├── case_id: Option<String>          // case the composer is open for
//! ├── case: Option<CaseRecord>         // cached view of that case
//! ├── open: bool                       // false once closed
//! ├── draft: DraftState                // subject/body/dirty
//! ├── activity: Activity               // operation in flight
//! ├── save_status: SaveStatus          // autosave indicator
//! ├── send_mode: SendMode              // manual or scheduled
//! ├── scheduled_at: Option<DateTime>   // picked send time
//! ├── rules: ScheduleRules             // send time window
//! ├── audit: AuditSettings             // audit category + retries
//! ├── notifications: Vec<Notification> // toasts, newest last
//! └── clipboard: Option<String>        // last copied export
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::backend::{CaseBackend, CaseRecord, EmailStatus};
use crate::core::activity::{Activity, SaveStatus};
use crate::core::config::ResolvedConfig;
use crate::core::draft::DraftState;
use crate::core::effects::AuditSettings;
use crate::core::schedule::{ScheduleRules, SendMode};
use crate::core::stats::DraftStats;

/// Oldest notifications are dropped past this many.
pub const MAX_NOTIFICATIONS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

pub struct App {
    pub backend: Arc<dyn CaseBackend>,
    pub case_id: Option<String>,
    pub case: Option<CaseRecord>,
    pub open: bool,
    pub draft: DraftState,
    pub activity: Activity,
    pub save_status: SaveStatus,
    pub send_mode: SendMode,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub rules: ScheduleRules,
    pub audit: AuditSettings,
    pub notifications: Vec<Notification>,
    pub clipboard: Option<String>,
}

impl App {
    pub fn new(backend: Arc<dyn CaseBackend>) -> Self {
        Self {
            backend,
            case_id: None,
            case: None,
            open: false,
            draft: DraftState::default(),
            activity: Activity::Idle,
            save_status: SaveStatus::Idle,
            send_mode: SendMode::Manual,
            scheduled_at: None,
            rules: ScheduleRules::default(),
            audit: AuditSettings::default(),
            notifications: Vec::new(),
            clipboard: None,
        }
    }

    pub fn from_config(backend: Arc<dyn CaseBackend>, config: &ResolvedConfig) -> Self {
        Self {
            rules: config.schedule_rules(),
            audit: AuditSettings {
                action_category: config.audit_action_category.clone(),
                retries: config.audit_retries,
            },
            ..Self::new(backend)
        }
    }

    /// Drops everything tied to the previous case.
    pub(crate) fn reset_session(&mut self, case_id: &str) {
        self.case_id = Some(case_id.to_string());
        self.case = None;
        self.open = true;
        self.draft = DraftState::default();
        self.activity = Activity::Idle;
        self.save_status = SaveStatus::Idle;
        self.send_mode = SendMode::Manual;
        self.scheduled_at = None;
        self.notifications.clear();
    }

    /// True if a completion for `case_id` still belongs to this session.
    pub fn is_current(&self, case_id: &str) -> bool {
        self.open && self.case_id.as_deref() == Some(case_id)
    }

    /// Case id of the open, loaded case.
    pub fn loaded_case_id(&self) -> Option<&str> {
        if !self.open {
            return None;
        }
        self.case.as_ref().map(|c| c.id.as_str())
    }

    pub fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.notifications.push(Notification {
            kind,
            message: message.into(),
        });
        if self.notifications.len() > MAX_NOTIFICATIONS {
            let excess = self.notifications.len() - MAX_NOTIFICATIONS;
            self.notifications.drain(..excess);
        }
    }

    pub fn latest_notification(&self) -> Option<&Notification> {
        self.notifications.last()
    }

    pub fn stats(&self) -> DraftStats {
        DraftStats::compute(self.draft.subject(), self.draft.body())
    }

    fn ready(&self) -> bool {
        self.loaded_case_id().is_some() && self.activity.is_idle()
    }

    pub fn can_edit(&self) -> bool {
        self.loaded_case_id().is_some() && !self.activity.is_generating()
    }

    pub fn can_generate(&self) -> bool {
        self.ready()
    }

    pub fn can_save(&self) -> bool {
        self.ready() && self.draft.is_dirty()
    }

    pub fn can_mark_sent(&self) -> bool {
        self.ready() && !self.draft.body().trim().is_empty()
    }

    pub fn can_schedule(&self) -> bool {
        self.ready()
            && self.send_mode == SendMode::Scheduled
            && !self.draft.subject().trim().is_empty()
            && !self.draft.body().trim().is_empty()
    }

    /// Only a case the store reports as scheduled can be returned to draft.
    pub fn can_cancel_schedule(&self) -> bool {
        self.ready()
            && self
                .case
                .as_ref()
                .is_some_and(|c| c.email_status == EmailStatus::Scheduled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{loaded_app, scheduled_app, test_app};

    #[test]
    fn test_app_new_defaults() {
        let app = test_app();
        assert!(!app.open);
        assert!(app.activity.is_idle());
        assert!(app.case.is_none());
        assert!(!app.can_edit());
    }

    #[test]
    fn test_mark_sent_requires_body() {
        let mut app = loaded_app("Subject", "");
        assert!(!app.can_mark_sent());
        app.draft.set_body("   ");
        assert!(!app.can_mark_sent());
        app.draft.set_body("Hello");
        assert!(app.can_mark_sent());
    }

    #[test]
    fn test_save_requires_dirty() {
        let mut app = loaded_app("Subject", "Body");
        assert!(!app.can_save());
        app.draft.set_body("Changed");
        assert!(app.can_save());
    }

    #[test]
    fn test_is_current_tracks_open_case() {
        let mut app = loaded_app("Subject", "Body");
        assert!(app.is_current("case-1"));
        assert!(!app.is_current("case-2"));
        app.open = false;
        assert!(!app.is_current("case-1"));
    }

    #[test]
    fn test_cancel_schedule_requires_scheduled_case() {
        assert!(!loaded_app("Subject", "Body").can_cancel_schedule());
        assert!(scheduled_app("Subject", "Body").can_cancel_schedule());

        let mut app = scheduled_app("Subject", "Body");
        if let Some(case) = app.case.as_mut() {
            case.email_status = EmailStatus::Sent;
        }
        assert!(!app.can_cancel_schedule());
    }

    #[test]
    fn test_notifications_keep_most_recent() {
        let mut app = test_app();
        for i in 0..MAX_NOTIFICATIONS + 5 {
            app.notify(NotificationKind::Info, format!("note {i}"));
        }
        assert_eq!(app.notifications.len(), MAX_NOTIFICATIONS);
        assert_eq!(app.notifications[0].message, "note 5");
        assert_eq!(
            app.latest_notification().map(|n| n.message.as_str()),
            Some("note 24")
        );
    }
}
