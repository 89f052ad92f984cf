//! # StatsBar Component
//!
//! One line under the editor with the draft's live statistics.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;

use crate::core::draft::MAX_SUBJECT_CHARS;
use crate::core::stats::DraftStats;
use crate::tui::component::Component;

pub struct StatsBar {
    pub stats: DraftStats,
    /// Characters in the subject, shown against the subject limit
    pub subject_chars: usize,
}

impl StatsBar {
    pub fn new(stats: DraftStats, subject_chars: usize) -> Self {
        Self {
            stats,
            subject_chars,
        }
    }

    fn text(&self) -> String {
        format!(
            "Subject {}/{} · {} chars · {} words · {} min read · Tone: {}",
            self.subject_chars,
            MAX_SUBJECT_CHARS,
            self.stats.characters,
            self.stats.words,
            self.stats.read_minutes,
            self.stats.tone
        )
    }
}

impl Component for StatsBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let span = Span::styled(self.text(), Style::default().add_modifier(Modifier::DIM));
        frame.render_widget(span, area);
    }
}
