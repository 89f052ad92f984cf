//! # TUI Components
//!
//! Components follow two patterns:
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: case, email status and activity
//! - `StatsBar`: live draft statistics
//! - `SendPanel`: send mode, send time and the latest notification
//!
//! ### Event-Driven Components
//!
//! - `TextField`: subject and body editors; emit `FieldEvent::Changed`
//!
//! Components receive data as props (struct fields) set by the parent right
//! before rendering. None of them reads `App` directly.

mod send_panel;
mod stats_bar;
pub mod text_field;
mod title_bar;

pub use send_panel::SendPanel;
pub use stats_bar::StatsBar;
pub use text_field::{FieldEvent, TextField};
pub use title_bar::TitleBar;
