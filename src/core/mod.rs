//! # Core Composer Logic
//!
//! This module contains the composer's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (App)          │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • Effect (requests)    │
//!                    └───────────┬─────────────┘
//!                                │ Effect
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │  effects   │      │  autosave  │
//!     │  Adapter   │      │  (backend  │      │  (tokio    │
//!     │ (ratatui)  │      │   calls)   │      │   timers)  │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all session state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`draft`]: Subject/body with dirty tracking
//! - [`activity`]: Which operation is in flight
//! - [`schedule`]: Send mode and the send time window
//! - [`stats`]: Counts, read time and tone
//! - [`effects`]: Runs the backend side of an `Effect`
//! - [`autosave`]: The debounce timer
//! - [`config`]: Settings and their override order

pub mod action;
pub mod activity;
pub mod autosave;
pub mod config;
pub mod draft;
pub mod effects;
pub mod schedule;
pub mod state;
pub mod stats;
