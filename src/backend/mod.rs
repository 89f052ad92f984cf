//! # Backend
//!
//! The remote collaborators the composer calls but does not own: the draft
//! generator function, the case entity store, the audit log and the identity
//! lookup. `CaseBackend` is the seam; `HttpBackend` is the real implementation.

pub mod http;
pub mod provider;
pub mod types;

pub use http::HttpBackend;
pub use provider::{BackendError, CaseBackend};
pub use types::{
    Actor, Adjustment, AuditEntry, CaseRecord, CaseUpdate, EmailStatus, GenerateOptions,
    GenerateRequest, GenerateResponse, GeneratedDraft,
};
