//! # Actions
//!
//! Everything that can happen in the composer becomes an `Action`.
//! User presses Ctrl+S? That's `Action::Save`.
//! Backend answers? That's `Action::PersistFinished { .. }`.
//!
//! `update()` applies an action to the state and returns the `Effect` the
//! adapter must carry out (a backend call, a timer, closing). No I/O here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! Callers pass `now` into time-sensitive actions so the reducer stays pure.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::backend::{
    BackendError, CaseRecord, CaseUpdate, EmailStatus, GenerateOptions, GeneratedDraft,
};
use crate::core::activity::{Activity, SaveStatus};
use crate::core::draft::{DraftSnapshot, DraftState};
use crate::core::effects::Committed;
use crate::core::schedule::{SendMode, format_send_time};
use crate::core::state::{App, NotificationKind};

/// Who asked for a persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOrigin {
    Manual,
    Autosave,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // Session
    OpenCase(String),
    CaseLoaded {
        case_id: String,
        result: Result<CaseRecord, BackendError>,
    },
    CaseRefreshed {
        case_id: String,
        result: Result<CaseRecord, BackendError>,
    },
    Close,

    // Editing
    EditSubject(String),
    EditBody(String),
    CopyToClipboard,
    DismissNotifications,

    // Generation
    Generate(GenerateOptions),
    GenerationFinished {
        case_id: String,
        options: GenerateOptions,
        result: Result<GeneratedDraft, BackendError>,
    },

    // Persistence
    Save,
    AutosaveDue,
    PersistFinished {
        case_id: String,
        origin: SaveOrigin,
        snapshot: DraftSnapshot,
        result: Result<(), BackendError>,
    },
    SaveStatusExpired,

    // Delivery
    ToggleSendMode { now: DateTime<Utc> },
    PickSendTime { at: DateTime<Utc>, now: DateTime<Utc> },
    NudgeSendTime { steps: i32, now: DateTime<Utc> },
    MarkSent,
    MarkSentFinished {
        case_id: String,
        result: Result<Committed, BackendError>,
    },
    Schedule { now: DateTime<Utc> },
    ScheduleFinished {
        case_id: String,
        at: DateTime<Utc>,
        snapshot: DraftSnapshot,
        result: Result<Committed, BackendError>,
    },
    CancelSchedule,
    CancelScheduleFinished {
        case_id: String,
        result: Result<Committed, BackendError>,
    },
}

/// Side effects requested by `update()`, carried out by the adapter.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Effect {
    #[default]
    None,
    /// The composer closed; cancel timers and leave.
    Close,
    LoadCase { case_id: String },
    RefreshCase { case_id: String },
    Generate {
        case_id: String,
        options: GenerateOptions,
    },
    Persist {
        case_id: String,
        origin: SaveOrigin,
        snapshot: DraftSnapshot,
    },
    MarkSent { case_id: String },
    Schedule {
        case_id: String,
        at: DateTime<Utc>,
        snapshot: DraftSnapshot,
    },
    CancelSchedule { case_id: String },
    /// (Re)start the autosave debounce, replacing any pending timer.
    ArmAutosave,
    CancelAutosave,
    /// Return the save indicator to idle after a short delay.
    ExpireSaveStatus,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    debug!("update: {:?}", action);
    match action {
        Action::OpenCase(case_id) => {
            if app.is_current(&case_id) && app.case.is_some() {
                return Effect::None;
            }
            info!("Opening composer for case {}", case_id);
            app.reset_session(&case_id);
            Effect::LoadCase { case_id }
        }
        Action::CaseLoaded { case_id, result } => {
            if !app.is_current(&case_id) {
                return Effect::None;
            }
            match result {
                Ok(case) => load_case(app, case),
                Err(e) => {
                    warn!("Failed to load case {}: {}", case_id, e);
                    app.notify(NotificationKind::Error, format!("Failed to load case: {e}"));
                    Effect::None
                }
            }
        }
        Action::CaseRefreshed { case_id, result } => {
            if !app.is_current(&case_id) {
                return Effect::None;
            }
            match result {
                Ok(case) => app.case = Some(case),
                Err(e) => warn!("Failed to refresh case {}: {}", case_id, e),
            }
            Effect::None
        }
        Action::Close => {
            if !app.open {
                return Effect::None;
            }
            app.open = false;
            app.draft = DraftState::default();
            Effect::Close
        }

        Action::EditSubject(subject) => {
            if !app.can_edit() || !app.draft.set_subject(&subject) {
                return Effect::None;
            }
            after_edit(app)
        }
        Action::EditBody(body) => {
            if !app.can_edit() || !app.draft.set_body(&body) {
                return Effect::None;
            }
            after_edit(app)
        }
        Action::CopyToClipboard => {
            if app.loaded_case_id().is_none() {
                return Effect::None;
            }
            app.clipboard = Some(app.draft.clipboard_text());
            app.notify(NotificationKind::Success, "Copied to clipboard");
            Effect::None
        }
        Action::DismissNotifications => {
            app.notifications.clear();
            Effect::None
        }

        Action::Generate(options) => {
            let Some(case_id) = app.loaded_case_id().map(str::to_string) else {
                return Effect::None;
            };
            begin_generation(app, case_id, options)
        }
        Action::GenerationFinished {
            case_id,
            options,
            result,
        } => {
            if !app.is_current(&case_id) {
                debug!("Dropping generation result for stale case {}", case_id);
                return Effect::None;
            }
            app.activity.finish(Activity::Generating(options));
            match result {
                Ok(generated) => {
                    app.draft.replace(generated.subject.as_deref(), &generated.body);
                    if let Some(case) = app.case.as_mut() {
                        case.apply(&CaseUpdate {
                            email_subject: Some(app.draft.subject().to_string()),
                            email_draft: Some(generated.body),
                            email_version: generated.version,
                            email_generated_at: Some(generated.generated_at),
                            ..Default::default()
                        });
                        if case.email_status == EmailStatus::NotGenerated {
                            case.email_status = EmailStatus::Draft;
                        }
                    }
                    app.notify(NotificationKind::Success, generation_message(options));
                }
                Err(e) => {
                    warn!("Generation failed for case {}: {}", case_id, e);
                    app.notify(NotificationKind::Error, e.to_string());
                }
            }
            Effect::None
        }

        Action::Save => {
            if !app.can_save() {
                return Effect::None;
            }
            let Some(case_id) = app.loaded_case_id().map(str::to_string) else {
                return Effect::None;
            };
            if app.activity.begin(Activity::Saving).is_err() {
                return Effect::None;
            }
            Effect::Persist {
                case_id,
                origin: SaveOrigin::Manual,
                snapshot: app.draft.snapshot(),
            }
        }
        Action::AutosaveDue => {
            let Some(case_id) = app.loaded_case_id().map(str::to_string) else {
                return Effect::None;
            };
            if !app.draft.is_dirty() || !app.draft.differs_from_persisted() {
                return Effect::None;
            }
            if !app.activity.is_idle() || app.save_status == SaveStatus::Saving {
                debug!("Autosave deferred: {:?} in progress", app.activity);
                return Effect::ArmAutosave;
            }
            app.save_status = SaveStatus::Saving;
            Effect::Persist {
                case_id,
                origin: SaveOrigin::Autosave,
                snapshot: app.draft.snapshot(),
            }
        }
        Action::PersistFinished {
            case_id,
            origin,
            snapshot,
            result,
        } => {
            if !app.is_current(&case_id) {
                return Effect::None;
            }
            match origin {
                SaveOrigin::Manual => {
                    app.activity.finish(Activity::Saving);
                    match result {
                        Ok(()) => {
                            record_persisted(app, snapshot);
                            app.notify(NotificationKind::Success, "Draft saved");
                            Effect::RefreshCase { case_id }
                        }
                        Err(e) => {
                            warn!("Save failed for case {}: {}", case_id, e);
                            app.notify(NotificationKind::Error, format!("Failed to save draft: {e}"));
                            Effect::None
                        }
                    }
                }
                SaveOrigin::Autosave => match result {
                    Ok(()) => {
                        record_persisted(app, snapshot);
                        app.save_status = SaveStatus::Saved;
                        Effect::ExpireSaveStatus
                    }
                    Err(e) => {
                        warn!("Autosave failed for case {}: {}", case_id, e);
                        app.save_status = SaveStatus::Idle;
                        Effect::None
                    }
                },
            }
        }
        Action::SaveStatusExpired => {
            if app.save_status == SaveStatus::Saved {
                app.save_status = SaveStatus::Idle;
            }
            Effect::None
        }

        Action::ToggleSendMode { now } => {
            if app.loaded_case_id().is_none() {
                return Effect::None;
            }
            app.send_mode = app.send_mode.toggled();
            if app.send_mode == SendMode::Scheduled && app.scheduled_at.is_none() {
                app.scheduled_at = Some(app.rules.default_time(now));
            }
            Effect::None
        }
        Action::PickSendTime { at, now } => {
            if app.loaded_case_id().is_none() {
                return Effect::None;
            }
            match app.rules.validate_selection(at, now) {
                Ok(()) => app.scheduled_at = Some(at),
                Err(e) => app.notify(NotificationKind::Error, e.message()),
            }
            Effect::None
        }
        Action::NudgeSendTime { steps, now } => {
            if app.loaded_case_id().is_none() || app.send_mode != SendMode::Scheduled {
                return Effect::None;
            }
            let from = app
                .scheduled_at
                .unwrap_or_else(|| app.rules.default_time(now));
            app.scheduled_at = Some(app.rules.nudge(from, steps, now));
            Effect::None
        }
        Action::MarkSent => {
            if !app.can_mark_sent() {
                return Effect::None;
            }
            let Some(case_id) = app.loaded_case_id().map(str::to_string) else {
                return Effect::None;
            };
            if app.activity.begin(Activity::Sending).is_err() {
                return Effect::None;
            }
            Effect::MarkSent { case_id }
        }
        Action::MarkSentFinished { case_id, result } => {
            if !app.is_current(&case_id) {
                return Effect::None;
            }
            app.activity.finish(Activity::Sending);
            match result {
                Ok(committed) => {
                    apply_committed(app, &committed, "Email marked as sent");
                    app.open = false;
                    Effect::Close
                }
                Err(e) => {
                    warn!("Mark as sent failed for case {}: {}", case_id, e);
                    app.notify(NotificationKind::Error, format!("Failed to mark as sent: {e}"));
                    Effect::None
                }
            }
        }
        Action::Schedule { now } => begin_schedule(app, now),
        Action::ScheduleFinished {
            case_id,
            at,
            snapshot,
            result,
        } => {
            if !app.is_current(&case_id) {
                return Effect::None;
            }
            app.activity.finish(Activity::Scheduling);
            match result {
                Ok(committed) => {
                    app.draft.mark_persisted(snapshot);
                    let message = format!("Email scheduled for {}", format_send_time(at));
                    apply_committed(app, &committed, &message);
                    app.open = false;
                    Effect::Close
                }
                Err(e) => {
                    warn!("Scheduling failed for case {}: {}", case_id, e);
                    app.notify(NotificationKind::Error, format!("Failed to schedule email: {e}"));
                    Effect::None
                }
            }
        }
        Action::CancelSchedule => {
            if !app.can_cancel_schedule() {
                return Effect::None;
            }
            let Some(case_id) = app.loaded_case_id().map(str::to_string) else {
                return Effect::None;
            };
            if app.activity.begin(Activity::Cancelling).is_err() {
                return Effect::None;
            }
            Effect::CancelSchedule { case_id }
        }
        Action::CancelScheduleFinished { case_id, result } => {
            if !app.is_current(&case_id) {
                return Effect::None;
            }
            app.activity.finish(Activity::Cancelling);
            match result {
                Ok(committed) => {
                    apply_committed(app, &committed, "Scheduled send cancelled");
                    app.send_mode = SendMode::Manual;
                    app.scheduled_at = None;
                    Effect::None
                }
                Err(e) => {
                    warn!("Cancel schedule failed for case {}: {}", case_id, e);
                    app.notify(NotificationKind::Error, format!("Failed to cancel schedule: {e}"));
                    Effect::None
                }
            }
        }
    }
}

fn load_case(app: &mut App, case: CaseRecord) -> Effect {
    let case_id = case.id.clone();
    let needs_generation = case.needs_generation();
    if case.email_status == EmailStatus::Scheduled {
        app.send_mode = SendMode::Scheduled;
        app.scheduled_at = case.email_scheduled_send_time;
    }
    app.draft = if needs_generation {
        DraftState::default()
    } else {
        DraftState::from_case(&case)
    };
    app.case = Some(case);

    if needs_generation {
        info!("Case {} has no draft yet, generating", case_id);
        return begin_generation(app, case_id, GenerateOptions::Initial);
    }
    Effect::None
}

fn begin_generation(app: &mut App, case_id: String, options: GenerateOptions) -> Effect {
    if app.activity.begin(Activity::Generating(options)).is_err() {
        debug!("Generation ignored: {:?} in progress", app.activity);
        return Effect::None;
    }
    Effect::Generate { case_id, options }
}

fn begin_schedule(app: &mut App, now: DateTime<Utc>) -> Effect {
    let Some(case_id) = app.loaded_case_id().map(str::to_string) else {
        return Effect::None;
    };
    if !app.activity.is_idle() || app.send_mode != SendMode::Scheduled {
        return Effect::None;
    }
    if app.draft.subject().trim().is_empty() || app.draft.body().trim().is_empty() {
        app.notify(NotificationKind::Error, "Subject and body are required to schedule");
        return Effect::None;
    }
    let Some(at) = app.scheduled_at else {
        app.notify(NotificationKind::Error, "Choose a date and time to schedule");
        return Effect::None;
    };
    if let Err(e) = app.rules.validate_commit(at, now) {
        app.notify(NotificationKind::Error, e.message());
        return Effect::None;
    }
    if app.activity.begin(Activity::Scheduling).is_err() {
        return Effect::None;
    }
    Effect::Schedule {
        case_id,
        at,
        snapshot: app.draft.snapshot(),
    }
}

fn after_edit(app: &mut App) -> Effect {
    if app.draft.differs_from_persisted() {
        Effect::ArmAutosave
    } else {
        Effect::CancelAutosave
    }
}

fn record_persisted(app: &mut App, snapshot: DraftSnapshot) {
    if let Some(case) = app.case.as_mut() {
        case.apply(&CaseUpdate::content(&snapshot.subject, &snapshot.body));
    }
    app.draft.mark_persisted(snapshot);
}

fn apply_committed(app: &mut App, committed: &Committed, message: &str) {
    if let Some(case) = app.case.as_mut() {
        case.apply(&committed.update);
    }
    if committed.audit.is_recorded() {
        app.notify(NotificationKind::Success, message);
    } else {
        app.notify(
            NotificationKind::Warning,
            format!("{message}, but the audit log entry could not be written"),
        );
    }
}

fn generation_message(options: GenerateOptions) -> String {
    match options {
        GenerateOptions::Initial => "Email generated".to_string(),
        GenerateOptions::Adjust(adjustment) => format!("Email adjusted: {}", adjustment.label()),
        GenerateOptions::UseDefault => "Default template applied".to_string(),
    }
}
