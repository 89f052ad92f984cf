//! # TextField Component
//!
//! An append-only editor for the subject line and the body.
//!
//! The text is a prop mirrored from the draft before each frame; edits are
//! reported as `FieldEvent::Changed` with the full new value, and the parent
//! turns that into an `EditSubject`/`EditBody` action. The field never
//! mutates the draft itself.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Border (2) consumed horizontally by the bordered block
const HORIZONTAL_OVERHEAD: u16 = 2;
/// Top + bottom borders consumed vertically
const VERTICAL_OVERHEAD: u16 = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldEvent {
    Changed(String),
}

pub struct TextField {
    pub title: String,
    pub text: String,
    pub focused: bool,
    pub disabled: bool,
    /// Whether Enter inserts a newline.
    pub multiline: bool,
}

impl TextField {
    pub fn new(title: &str, multiline: bool) -> Self {
        Self {
            title: title.to_string(),
            text: String::new(),
            focused: false,
            disabled: false,
            multiline,
        }
    }

    fn edited(&self, mut text: String) -> Option<FieldEvent> {
        if !self.multiline {
            text = text.replace(['\r', '\n'], " ");
        }
        (text != self.text).then_some(FieldEvent::Changed(text))
    }
}

/// Wraps `text` to `width` columns, keeping explicit blank lines and a
/// trailing empty line after a final newline.
pub(crate) fn wrap_lines(text: &str, width: u16) -> Vec<String> {
    if width == 0 {
        return vec![String::new()];
    }
    let options = textwrap::Options::new(width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace);
    let mut lines: Vec<String> = text
        .split('\n')
        .flat_map(|line| {
            if line.is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, &options)
                    .into_iter()
                    .map(|l| l.into_owned())
                    .collect()
            }
        })
        .collect();
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Lines to show so the end of the text (where the cursor is) stays visible.
fn visible_tail(lines: &[String], height: u16) -> &[String] {
    let height = height.max(1) as usize;
    &lines[lines.len().saturating_sub(height)..]
}

impl Component for TextField {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let inner_width = area.width.saturating_sub(HORIZONTAL_OVERHEAD);
        let inner_height = area.height.saturating_sub(VERTICAL_OVERHEAD);
        let lines = wrap_lines(&self.text, inner_width);
        let visible = visible_tail(&lines, inner_height);

        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        let text_style = if self.disabled {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            Style::default()
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(self.title.as_str());
        let paragraph = Paragraph::new(visible.join("\n")).block(block).style(text_style);
        frame.render_widget(paragraph, area);

        if self.focused && !self.disabled {
            let last = visible.last().map(String::as_str).unwrap_or("");
            let col = (last.width() as u16).min(inner_width.saturating_sub(1));
            let row = (visible.len() as u16).saturating_sub(1);
            frame.set_cursor_position((area.x + 1 + col, area.y + 1 + row));
        }
    }
}

impl EventHandler for TextField {
    type Event = FieldEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.disabled {
            return None;
        }
        match event {
            TuiEvent::InputChar(c) => {
                let mut text = self.text.clone();
                text.push(*c);
                self.edited(text)
            }
            TuiEvent::Paste(pasted) => self.edited(format!("{}{}", self.text, pasted)),
            TuiEvent::Newline if self.multiline => self.edited(format!("{}\n", self.text)),
            TuiEvent::Backspace => {
                let mut text = self.text.clone();
                text.pop()?;
                self.edited(text)
            }
            _ => None,
        }
    }
}
