use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

use crate::backend::Adjustment;

/// TUI-specific input events
#[derive(Debug, Clone, PartialEq)]
pub enum TuiEvent {
    // Leaving
    Close,     // Esc
    ForceQuit, // Ctrl+C

    // Field editing (handled by the focused TextField)
    InputChar(char),
    Paste(String), // Bracketed paste - preserves newlines
    Backspace,
    Newline,
    SwitchField,

    // Composer commands (mapped to core actions)
    Save,
    Regenerate,
    DefaultTemplate,
    Adjust(Adjustment),
    MarkSent,
    ToggleSendMode,
    TimeLater,
    TimeEarlier,
    DayLater,
    DayEarlier,
    Schedule,
    CancelSchedule,
    Copy,

    Resize,
}

/// Poll for an event without blocking (returns immediately)
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(std::time::Duration::ZERO)
}

pub fn poll_event_timeout(timeout: std::time::Duration) -> Option<TuiEvent> {
    match event::poll(timeout) {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            log::warn!("Event poll failed: {}", e);
            return None;
        }
    }
    let event = match event::read() {
        Ok(event) => event,
        Err(e) => {
            log::warn!("Event read failed: {}", e);
            return None;
        }
    };
    match event {
        Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
            log::debug!("Key event: {:?} with modifiers {:?}", key_event.code, key_event.modifiers);
            map_key(key_event.modifiers, key_event.code)
        }
        Event::Paste(data) => Some(TuiEvent::Paste(data)),
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        _ => None,
    }
}

fn map_key(modifiers: KeyModifiers, code: KeyCode) -> Option<TuiEvent> {
    match (modifiers, code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(TuiEvent::ForceQuit),
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => Some(TuiEvent::Save),
        (KeyModifiers::CONTROL, KeyCode::Char('g')) => Some(TuiEvent::Regenerate),
        (KeyModifiers::CONTROL, KeyCode::Char('d')) => Some(TuiEvent::DefaultTemplate),
        (KeyModifiers::CONTROL, KeyCode::Char('e')) => Some(TuiEvent::MarkSent),
        (KeyModifiers::CONTROL, KeyCode::Char('k')) => Some(TuiEvent::ToggleSendMode),
        (KeyModifiers::CONTROL, KeyCode::Char('p')) => Some(TuiEvent::Schedule),
        (KeyModifiers::CONTROL, KeyCode::Char('x')) => Some(TuiEvent::CancelSchedule),
        (KeyModifiers::CONTROL, KeyCode::Char('y')) => Some(TuiEvent::Copy),
        // Ctrl+J inserts newline (ASCII LF; Ctrl+Enter sends this in most terminals)
        (KeyModifiers::CONTROL, KeyCode::Char('j')) => Some(TuiEvent::Newline),
        (_, KeyCode::F(n @ 2..=7)) => Some(TuiEvent::Adjust(Adjustment::ALL[usize::from(n - 2)])),
        (_, KeyCode::Char(c)) => Some(TuiEvent::InputChar(c)),
        (_, KeyCode::Backspace) => Some(TuiEvent::Backspace),
        (_, KeyCode::Enter) => Some(TuiEvent::Newline),
        (_, KeyCode::Tab) | (_, KeyCode::BackTab) => Some(TuiEvent::SwitchField),
        (_, KeyCode::Esc) => Some(TuiEvent::Close),
        (_, KeyCode::Up) => Some(TuiEvent::TimeLater),
        (_, KeyCode::Down) => Some(TuiEvent::TimeEarlier),
        (_, KeyCode::PageUp) => Some(TuiEvent::DayLater),
        (_, KeyCode::PageDown) => Some(TuiEvent::DayEarlier),
        _ => None,
    }
}
