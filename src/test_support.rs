//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::backend::{
    Actor, AuditEntry, BackendError, CaseBackend, CaseRecord, CaseUpdate, EmailStatus,
    GenerateRequest, GeneratedDraft,
};
use crate::core::draft::DraftState;
use crate::core::state::App;

/// A backend call, as recorded by `FakeBackend`.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Fetch(String),
    Generate(GenerateRequest),
    Update(String, CaseUpdate),
    Audit(AuditEntry),
    Actor,
}

/// An in-memory backend that records every call and fails on request.
#[derive(Default)]
pub struct FakeBackend {
    pub fail_actor: bool,
    pub fail_update: bool,
    pub generate_error: Option<String>,
    /// Number of audit appends that fail before one succeeds.
    pub audit_failures: usize,
    /// Simulated round-trip time of every call.
    pub latency: Duration,
    pub(crate) calls: Mutex<Vec<Call>>,
    pub(crate) audits: Mutex<Vec<AuditEntry>>,
}

impl FakeBackend {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Audit entries that were accepted.
    pub fn audits(&self) -> Vec<AuditEntry> {
        self.audits.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    async fn round_trip(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl CaseBackend for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    async fn fetch_case(&self, case_id: &str) -> Result<CaseRecord, BackendError> {
        self.round_trip().await;
        self.record(Call::Fetch(case_id.to_string()));
        Ok(case_with_draft(case_id, "Stored subject", "Stored body"))
    }

    async fn generate_draft(
        &self,
        request: &GenerateRequest,
    ) -> Result<GeneratedDraft, BackendError> {
        self.round_trip().await;
        self.record(Call::Generate(request.clone()));
        if let Some(ref message) = self.generate_error {
            return Err(BackendError::Rejected(message.clone()));
        }
        Ok(GeneratedDraft {
            subject: Some("Generated subject".to_string()),
            body: "Generated body".to_string(),
            version: Some(1),
            generated_at: Utc::now(),
        })
    }

    async fn update_case(&self, case_id: &str, update: &CaseUpdate) -> Result<(), BackendError> {
        self.round_trip().await;
        self.record(Call::Update(case_id.to_string(), update.clone()));
        if self.fail_update {
            return Err(BackendError::Api {
                status: 500,
                message: "update failed".to_string(),
            });
        }
        Ok(())
    }

    async fn append_audit(&self, entry: &AuditEntry) -> Result<(), BackendError> {
        self.round_trip().await;
        let previous_attempts = self
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, Call::Audit(_)))
            .count();
        self.record(Call::Audit(entry.clone()));
        if previous_attempts < self.audit_failures {
            return Err(BackendError::Network("audit store unavailable".to_string()));
        }
        self.audits.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn current_actor(&self) -> Result<Actor, BackendError> {
        self.round_trip().await;
        self.record(Call::Actor);
        if self.fail_actor {
            return Err(BackendError::Api {
                status: 401,
                message: "not signed in".to_string(),
            });
        }
        Ok(Actor {
            email: "agent@example.com".to_string(),
            full_name: Some("Agent Smith".to_string()),
        })
    }
}

/// A case record holding a stored draft.
pub fn case_with_draft(case_id: &str, subject: &str, body: &str) -> CaseRecord {
    CaseRecord {
        id: case_id.to_string(),
        case_number: Some("CS-1001".to_string()),
        customer_name: Some("Dana Reyes".to_string()),
        email_subject: Some(subject.to_string()),
        email_draft: Some(body.to_string()),
        email_status: EmailStatus::Draft,
        ..Default::default()
    }
}

/// Creates a test App with a FakeBackend and nothing open.
pub fn test_app() -> App {
    App::new(Arc::new(FakeBackend::default()))
}

/// Like `loaded_app`, with the case already scheduled for delivery.
pub fn scheduled_app(subject: &str, body: &str) -> App {
    let mut app = loaded_app(subject, body);
    if let Some(case) = app.case.as_mut() {
        case.email_status = EmailStatus::Scheduled;
    }
    app
}

/// Creates a test App with `case-1` open and the given draft loaded clean.
pub fn loaded_app(subject: &str, body: &str) -> App {
    let mut app = test_app();
    app.reset_session("case-1");
    app.case = Some(case_with_draft("case-1", subject, body));
    app.draft = DraftState::new(subject, body);
    app
}
