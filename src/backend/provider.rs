use std::fmt;

use async_trait::async_trait;

use super::types::{Actor, AuditEntry, CaseRecord, CaseUpdate, GenerateRequest, GeneratedDraft};

/// Errors that can occur while talking to the case backend.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Backend misconfigured (missing API key, bad URL).
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// The backend returned an error response.
    Api { status: u16, message: String },
    /// Failed to parse the backend's response.
    Parse(String),
    /// The backend answered but reported `success: false`.
    Rejected(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Config(msg) => write!(f, "config error: {msg}"),
            BackendError::Network(msg) => write!(f, "network error: {msg}"),
            BackendError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            BackendError::Parse(msg) => write!(f, "parse error: {msg}"),
            BackendError::Rejected(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

/// Everything the composer needs from the remote backend.
#[async_trait]
pub trait CaseBackend: Send + Sync {
    /// Returns the name of the backend (for logs).
    fn name(&self) -> &str;

    /// Fetches the current case record.
    async fn fetch_case(&self, case_id: &str) -> Result<CaseRecord, BackendError>;

    /// Asks the draft generator for a new subject/body.
    async fn generate_draft(&self, request: &GenerateRequest)
    -> Result<GeneratedDraft, BackendError>;

    /// Applies a partial update to the case record.
    async fn update_case(&self, case_id: &str, update: &CaseUpdate) -> Result<(), BackendError>;

    /// Appends an entry to the audit log.
    async fn append_audit(&self, entry: &AuditEntry) -> Result<(), BackendError>;

    /// Looks up the signed-in user.
    async fn current_actor(&self) -> Result<Actor, BackendError>;
}
