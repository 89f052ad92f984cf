//! # TitleBar Component
//!
//! Top status bar: which case is open, its email status, and what the
//! composer is doing right now.
//!
//! TitleBar is purely presentational. It receives all data as props and has
//! no internal state:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::new("CS-1001 · Dana Reyes".into(), "Draft".into(), "Saved".into());
//! title_bar.render(frame, area);
//! ```
//!
//! The activity label (a running backend operation) wins over the save
//! indicator, because autosave never runs while an operation is in flight.

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

pub struct TitleBar {
    /// Case number and customer, or the raw id while loading
    pub case_label: String,
    /// Email status of the case (e.g. "Draft", "Scheduled")
    pub email_status: String,
    /// Activity or save indicator; empty when there is nothing to report
    pub status_message: String,
}

impl TitleBar {
    pub fn new(case_label: String, email_status: String, status_message: String) -> Self {
        Self {
            case_label,
            email_status,
            status_message,
        }
    }

    fn text(&self) -> String {
        let mut text = format!("CaseMail | {}", self.case_label);
        if !self.email_status.is_empty() {
            text.push_str(&format!(" [{}]", self.email_status));
        }
        if !self.status_message.is_empty() {
            text.push_str(&format!(" | {}", self.status_message));
        }
        text
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let line = Line::from(Span::styled(
            self.text(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(line, area);
    }
}
