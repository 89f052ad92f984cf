//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the composer,
//! translates keyboard events into `core::Action` values and carries out the
//! `Effect`s that `update()` returns.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Loop
//!
//! ```text
//! keyboard ──▶ TuiEvent ──▶ Action ──▶ update() ──▶ Effect ──▶ tokio task
//!                                          ▲                       │
//!                                          └──── mpsc::Receiver ◀──┘
//! ```
//!
//! Backend calls and timers run as tokio tasks and report back through a std
//! mpsc channel that the loop drains between frames.
//!
//! ## Shutdown
//!
//! Closing aborts the timers only. Backend requests already in flight are
//! awaited for a bounded grace period after the terminal is restored, so a
//! committed update still gets its audit entry.
//!
//! ## Redraw Strategy
//!
//! - **Busy** (an operation is running): draws every ~80ms so the status stays live.
//! - **Idle**: sleeps up to 500ms, only redraws on events or background actions.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use chrono::Utc;
use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use tokio::task::{AbortHandle, JoinSet};

use crate::backend::{CaseBackend, GenerateOptions};
use crate::core::action::{Action, Effect, update};
use crate::core::autosave::{Autosave, expire_status_after};
use crate::core::config::ResolvedConfig;
use crate::core::effects::{self, AuditSettings};
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{FieldEvent, TextField};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Which editor receives typed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Subject,
    Body,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Subject => Focus::Body,
            Focus::Body => Focus::Subject,
        }
    }
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub focus: Focus,
    pub subject: TextField,
    pub body: TextField,
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            focus: Focus::Body, // The body is what agents edit most
            subject: TextField::new("Subject", false),
            body: TextField::new("Body", true),
        }
    }
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol is ignored by terminals that don't support it
        execute!(
            stdout(),
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock, // Non-blinking: avoids blink timer reset from continuous redraws
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), PopKeyboardEnhancementFlags, DisableBracketedPaste);
    }
}

/// Timers and backend tasks owned by the adapter.
struct Background {
    autosave: Autosave,
    save_status: Option<AbortHandle>,
    saved_indicator: Duration,
    requests: JoinSet<()>,
}

impl Background {
    fn new(autosave_delay: Duration, saved_indicator: Duration) -> Self {
        Self {
            autosave: Autosave::new(autosave_delay),
            save_status: None,
            saved_indicator,
            requests: JoinSet::new(),
        }
    }

    fn cancel_timers(&mut self) {
        self.autosave.cancel();
        if let Some(handle) = self.save_status.take() {
            handle.abort();
        }
    }

    /// Drops the results of backend tasks that already finished.
    fn reap(&mut self) {
        while self.requests.try_join_next().is_some() {}
    }

    /// Waits up to `grace` for in-flight requests; whatever is left is aborted.
    async fn settle(&mut self, grace: Duration) {
        self.cancel_timers();
        if self.requests.is_empty() {
            return;
        }
        info!("Waiting for {} pending backend request(s)", self.requests.len());
        let requests = &mut self.requests;
        let drained = tokio::time::timeout(grace, async {
            while requests.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            warn!(
                "Abandoning {} backend request(s) still running after {:?}",
                self.requests.len(),
                grace
            );
            self.requests.abort_all();
        }
    }
}

/// How long closing waits for requests: the update, the actor lookup and every
/// audit attempt may each take up to the request timeout.
fn shutdown_grace(config: &ResolvedConfig) -> Duration {
    config.timeout * (3 + u32::from(config.audit_retries))
}

/// Runs the composer for `case_id` until it closes. Returns the last text
/// copied with Ctrl+Y, if any, so the caller can print it after the terminal
/// is restored.
pub async fn run(
    config: ResolvedConfig,
    backend: Arc<dyn CaseBackend>,
    case_id: String,
) -> std::io::Result<Option<String>> {
    let mut app = App::from_config(backend, &config);
    let mut tui = TuiState::new();
    let mut background = Background::new(config.autosave_delay, config.saved_indicator);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    let mut should_quit = dispatch(&mut app, Action::OpenCase(case_id), &mut background, &tx);
    let mut needs_redraw = true; // Force first frame

    while !should_quit {
        let busy = !app.activity.is_idle();
        if busy {
            needs_redraw = true;
        }

        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui))?;
            needs_redraw = false;
        }

        let timeout = if busy {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let Some(action) = action_for_event(&event, &app, &mut tui) else {
                continue;
            };
            if dispatch(&mut app, action, &mut background, &tx) {
                should_quit = true;
                break;
            }
        }

        // Handle background task actions (backend completions, timers)
        while !should_quit && let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            should_quit = dispatch(&mut app, action, &mut background, &tx);
        }
        background.reap();
    }

    background.cancel_timers();
    ratatui::restore();
    background.settle(shutdown_grace(&config)).await;
    Ok(app.clipboard.take())
}

/// Translates a terminal event into a core action. Editing events go to the
/// focused field; everything else is a composer command.
fn action_for_event(event: &TuiEvent, app: &App, tui: &mut TuiState) -> Option<Action> {
    let now = Utc::now();
    match event {
        TuiEvent::Resize => None,
        TuiEvent::Close | TuiEvent::ForceQuit => Some(Action::Close),
        TuiEvent::SwitchField => {
            tui.focus = tui.focus.next();
            None
        }
        TuiEvent::InputChar(_) | TuiEvent::Paste(_) | TuiEvent::Backspace | TuiEvent::Newline => {
            // Keep the field's prop in sync with edits drained in this batch
            tui.subject.text = app.draft.subject().to_string();
            tui.body.text = app.draft.body().to_string();
            tui.subject.disabled = !app.can_edit();
            tui.body.disabled = !app.can_edit();
            match tui.focus {
                Focus::Subject => match tui.subject.handle_event(event)? {
                    FieldEvent::Changed(text) => Some(Action::EditSubject(text)),
                },
                Focus::Body => match tui.body.handle_event(event)? {
                    FieldEvent::Changed(text) => Some(Action::EditBody(text)),
                },
            }
        }
        TuiEvent::Save => Some(Action::Save),
        TuiEvent::Regenerate => Some(Action::Generate(GenerateOptions::Initial)),
        TuiEvent::DefaultTemplate => Some(Action::Generate(GenerateOptions::UseDefault)),
        TuiEvent::Adjust(adjustment) => Some(Action::Generate(GenerateOptions::Adjust(*adjustment))),
        TuiEvent::MarkSent => Some(Action::MarkSent),
        TuiEvent::ToggleSendMode => Some(Action::ToggleSendMode { now }),
        TuiEvent::TimeLater => Some(Action::NudgeSendTime { steps: 1, now }),
        TuiEvent::TimeEarlier => Some(Action::NudgeSendTime { steps: -1, now }),
        TuiEvent::DayLater => Some(Action::NudgeSendTime {
            steps: steps_per_day(app),
            now,
        }),
        TuiEvent::DayEarlier => Some(Action::NudgeSendTime {
            steps: -steps_per_day(app),
            now,
        }),
        TuiEvent::Schedule => Some(Action::Schedule { now }),
        TuiEvent::CancelSchedule => Some(Action::CancelSchedule),
        TuiEvent::Copy => Some(Action::CopyToClipboard),
    }
}

fn steps_per_day(app: &App) -> i32 {
    let step = app.rules.step.num_minutes().max(1);
    i32::try_from(24 * 60 / step).unwrap_or(1).max(1)
}

/// Applies `action` and carries out the resulting effect. Returns true once
/// the composer has closed.
fn dispatch(
    app: &mut App,
    action: Action,
    background: &mut Background,
    tx: &mpsc::Sender<Action>,
) -> bool {
    let effect = update(app, action);
    match effect {
        Effect::None => false,
        Effect::Close => {
            background.cancel_timers();
            true
        }
        Effect::ArmAutosave => {
            background.autosave.arm(tx.clone());
            false
        }
        Effect::CancelAutosave => {
            background.autosave.cancel();
            false
        }
        Effect::ExpireSaveStatus => {
            if let Some(handle) = background.save_status.take() {
                handle.abort();
            }
            background.save_status =
                Some(expire_status_after(background.saved_indicator, tx.clone()));
            false
        }
        Effect::LoadCase { .. } => {
            background.cancel_timers();
            spawn_effect(app, background, effect, tx.clone());
            false
        }
        backend_effect => {
            spawn_effect(app, background, backend_effect, tx.clone());
            false
        }
    }
}

fn spawn_effect(app: &App, background: &mut Background, effect: Effect, tx: mpsc::Sender<Action>) {
    let backend = app.backend.clone();
    let audit: AuditSettings = app.audit.clone();
    info!("Spawning backend call via {}: {:?}", backend.name(), effect);
    background.requests.spawn(async move {
        if let Some(action) = effects::run(backend, &audit, effect).await
            && tx.send(action).is_err()
        {
            warn!("Failed to deliver backend completion: receiver dropped");
        }
    });
}
