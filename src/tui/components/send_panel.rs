//! # SendPanel Component
//!
//! Delivery controls: send mode, the picked send time, and the last
//! notification. Stateless; the time is adjusted through actions, not here.

use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph};

use crate::core::schedule::{SendMode, format_send_time};
use crate::core::state::{Notification, NotificationKind};
use crate::tui::component::Component;

pub struct SendPanel {
    pub send_mode: SendMode,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub notification: Option<Notification>,
}

impl SendPanel {
    pub fn new(
        send_mode: SendMode,
        scheduled_at: Option<DateTime<Utc>>,
        notification: Option<Notification>,
    ) -> Self {
        Self {
            send_mode,
            scheduled_at,
            notification,
        }
    }

    fn delivery_line(&self) -> Line<'static> {
        let mode = Span::styled(
            format!("Mode: {}", self.send_mode.label()),
            Style::default().add_modifier(Modifier::BOLD),
        );
        let detail = match (self.send_mode, self.scheduled_at) {
            (SendMode::Manual, _) => "  (Ctrl+E marks the email as sent)".to_string(),
            (SendMode::Scheduled, Some(at)) => format!("  Send at: {}", format_send_time(at)),
            (SendMode::Scheduled, None) => "  Send at: not chosen".to_string(),
        };
        Line::from(vec![mode, Span::raw(detail)])
    }

    fn notification_line(&self) -> Line<'static> {
        match &self.notification {
            Some(n) => {
                let color = match n.kind {
                    NotificationKind::Success => Color::Green,
                    NotificationKind::Info => Color::Cyan,
                    NotificationKind::Warning => Color::Yellow,
                    NotificationKind::Error => Color::Red,
                };
                Line::from(Span::styled(n.message.clone(), Style::default().fg(color)))
            }
            None => Line::default(),
        }
    }
}

impl Component for SendPanel {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().add_modifier(Modifier::DIM))
            .title("Delivery");
        let paragraph =
            Paragraph::new(vec![self.delivery_line(), self.notification_line()]).block(block);
        frame.render_widget(paragraph, area);
    }
}
