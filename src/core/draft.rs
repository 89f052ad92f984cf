//! # Draft State
//!
//! The subject/body pair being edited, its dirty flag, and the last values
//! known to be persisted on the case record.
//!
//! ```text
//! DraftState
//! ├── subject: String           // ≤ MAX_SUBJECT_CHARS characters
//! ├── body: String
//! ├── dirty: bool               // edited since the last persist/load
//! └── persisted: DraftSnapshot  // what the case record holds, as far as we know
//! ```

use crate::backend::CaseRecord;

/// Subject lines longer than this are truncated on input.
pub const MAX_SUBJECT_CHARS: usize = 100;

/// An immutable copy of subject and body, used for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DraftSnapshot {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DraftState {
    subject: String,
    body: String,
    dirty: bool,
    persisted: DraftSnapshot,
}

impl DraftState {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        let subject = truncate_subject(&subject.into());
        let body = body.into();
        Self {
            persisted: DraftSnapshot {
                subject: subject.clone(),
                body: body.clone(),
            },
            subject,
            body,
            dirty: false,
        }
    }

    /// Loads the stored subject/body of a case with dirty cleared.
    pub fn from_case(case: &CaseRecord) -> Self {
        Self::new(
            case.email_subject.clone().unwrap_or_default(),
            case.email_draft.clone().unwrap_or_default(),
        )
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns true if the value changed.
    pub fn set_subject(&mut self, subject: &str) -> bool {
        let subject = truncate_subject(subject);
        if subject == self.subject {
            return false;
        }
        self.subject = subject;
        self.dirty = true;
        true
    }

    /// Returns true if the value changed.
    pub fn set_body(&mut self, body: &str) -> bool {
        if body == self.body {
            return false;
        }
        self.body = body.to_string();
        self.dirty = true;
        true
    }

    /// Whether the current text differs from what the case record holds.
    pub fn differs_from_persisted(&self) -> bool {
        self.subject != self.persisted.subject || self.body != self.persisted.body
    }

    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            subject: self.subject.clone(),
            body: self.body.clone(),
        }
    }

    /// Records that `snapshot` reached the case record. Dirty clears only if
    /// nothing was typed since the snapshot was taken.
    pub fn mark_persisted(&mut self, snapshot: DraftSnapshot) {
        self.dirty = self.subject != snapshot.subject || self.body != snapshot.body;
        self.persisted = snapshot;
    }

    /// Overwrites the draft with generated text. The generator stores what it
    /// returns, so the result counts as persisted.
    pub fn replace(&mut self, subject: Option<&str>, body: &str) {
        if let Some(subject) = subject {
            self.subject = truncate_subject(subject);
        }
        self.body = body.to_string();
        self.dirty = false;
        self.persisted = self.snapshot();
    }

    /// Export format for the clipboard.
    pub fn clipboard_text(&self) -> String {
        format!("Subject: {}\n\n{}", self.subject, self.body)
    }
}

fn truncate_subject(subject: &str) -> String {
    subject.chars().take(MAX_SUBJECT_CHARS).collect()
}
