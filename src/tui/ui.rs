use crate::core::schedule::format_send_time;
use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::{SendPanel, StatsBar, TitleBar};
use crate::tui::{Focus, TuiState};

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

const SUBJECT_HEIGHT: u16 = 3;
const SEND_PANEL_HEIGHT: u16 = 4;

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min};
    let layout = Layout::vertical([
        Length(1),
        Length(SUBJECT_HEIGHT),
        Min(3),
        Length(1),
        Length(SEND_PANEL_HEIGHT),
        Length(1),
    ]);
    let [title_area, subject_area, body_area, stats_area, send_area, hints_area] =
        layout.areas(frame.area());

    TitleBar::new(case_label(app), email_status(app), status_message(app))
        .render(frame, title_area);

    let editable = app.can_edit();
    tui.subject.text = app.draft.subject().to_string();
    tui.subject.focused = tui.focus == Focus::Subject;
    tui.subject.disabled = !editable;
    tui.subject.render(frame, subject_area);

    tui.body.text = app.draft.body().to_string();
    tui.body.focused = tui.focus == Focus::Body;
    tui.body.disabled = !editable;
    tui.body.render(frame, body_area);

    StatsBar::new(app.stats(), app.draft.subject().chars().count()).render(frame, stats_area);

    SendPanel::new(
        app.send_mode,
        app.scheduled_at,
        app.latest_notification().cloned(),
    )
    .render(frame, send_area);

    frame.render_widget(key_hints(app), hints_area);
}

fn case_label(app: &App) -> String {
    match &app.case {
        Some(case) => match (&case.case_number, &case.customer_name) {
            (Some(number), Some(customer)) => format!("{} · {}", number, customer),
            (Some(number), None) => number.clone(),
            (None, Some(customer)) => format!("{} · {}", case.id, customer),
            (None, None) => case.id.clone(),
        },
        None => match &app.case_id {
            Some(id) => format!("{} (loading)", id),
            None => "no case".to_string(),
        },
    }
}

fn email_status(app: &App) -> String {
    let Some(case) = &app.case else {
        return String::new();
    };
    match case.email_generated_at {
        Some(at) => format!("{}, generated {}", case.email_status.label(), format_send_time(at)),
        None => case.email_status.label().to_string(),
    }
}

fn status_message(app: &App) -> String {
    app.activity
        .label()
        .unwrap_or_else(|| app.save_status.label())
        .to_string()
}

/// Shortcut legend; shortcuts that are unavailable right now are dimmed.
pub(crate) fn key_hints(app: &App) -> Line<'static> {
    let hints = [
        ("^S save", app.can_save()),
        ("^G regen", app.can_generate()),
        ("^D default", app.can_generate()),
        ("F2-F7 adjust", app.can_generate()),
        ("^E sent", app.can_mark_sent()),
        ("^K mode", app.loaded_case_id().is_some()),
        ("^P schedule", app.can_schedule()),
        ("^X unschedule", app.can_cancel_schedule()),
        ("^Y copy", true),
        ("Esc close", true),
    ];
    let spans = hints
        .into_iter()
        .flat_map(|(label, enabled)| {
            let style = if enabled {
                Style::default()
            } else {
                Style::default().add_modifier(Modifier::DIM)
            };
            [Span::styled(label, style), Span::raw("  ")]
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}
