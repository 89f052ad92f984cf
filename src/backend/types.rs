use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delivery status of the email attached to a case.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    #[default]
    NotGenerated,
    Draft,
    Scheduled,
    Sent,
}

impl EmailStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EmailStatus::NotGenerated => "Not generated",
            EmailStatus::Draft => "Draft",
            EmailStatus::Scheduled => "Scheduled",
            EmailStatus::Sent => "Sent",
        }
    }
}

/// The case record as stored by the entity store.
///
/// Only the email-related fields are modeled; anything else the store returns
/// is ignored during deserialization.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CaseRecord {
    pub id: String,
    #[serde(default)]
    pub case_number: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub email_subject: Option<String>,
    #[serde(default)]
    pub email_draft: Option<String>,
    #[serde(default)]
    pub email_status: EmailStatus,
    #[serde(default)]
    pub email_scheduled_send_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub email_sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub email_sent_by: Option<String>,
    #[serde(default)]
    pub email_generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub zapier_trigger_pending: bool,
    #[serde(default)]
    pub last_activity_by: Option<String>,
    #[serde(default)]
    pub email_version: Option<u32>,
}

impl CaseRecord {
    /// True when there is no stored draft worth showing.
    pub fn needs_generation(&self) -> bool {
        self.email_status == EmailStatus::NotGenerated
            || self.email_draft.as_deref().is_none_or(str::is_empty)
    }

    /// Applies a partial update to the cached copy.
    pub fn apply(&mut self, update: &CaseUpdate) {
        if let Some(ref subject) = update.email_subject {
            self.email_subject = Some(subject.clone());
        }
        if let Some(ref draft) = update.email_draft {
            self.email_draft = Some(draft.clone());
        }
        if let Some(status) = update.email_status {
            self.email_status = status;
        }
        if let Some(time) = update.email_scheduled_send_time {
            self.email_scheduled_send_time = time;
        }
        if let Some(at) = update.email_sent_at {
            self.email_sent_at = Some(at);
        }
        if let Some(ref by) = update.email_sent_by {
            self.email_sent_by = Some(by.clone());
        }
        if let Some(at) = update.email_generated_at {
            self.email_generated_at = Some(at);
        }
        if let Some(pending) = update.zapier_trigger_pending {
            self.zapier_trigger_pending = pending;
        }
        if let Some(ref by) = update.last_activity_by {
            self.last_activity_by = Some(by.clone());
        }
        if let Some(version) = update.email_version {
            self.email_version = Some(version);
        }
    }
}

/// Partial update of a case record. `None` fields are left out of the payload.
///
/// `email_scheduled_send_time` is doubly optional: `Some(None)` serializes as an
/// explicit `null`, which clears the stored time.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct CaseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_draft: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_status: Option<EmailStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_scheduled_send_time: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_generated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zapier_trigger_pending: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_version: Option<u32>,
}

impl CaseUpdate {
    /// Subject and body only, as written by save and autosave.
    pub fn content(subject: &str, body: &str) -> Self {
        Self {
            email_subject: Some(subject.to_string()),
            email_draft: Some(body.to_string()),
            ..Default::default()
        }
    }
}

/// An append-only audit log entry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub case_id: String,
    pub action: String,
    pub action_category: String,
    pub actor: String,
    pub actor_email: String,
    pub timestamp: DateTime<Utc>,
}

/// The signed-in user performing an action.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl Actor {
    /// Name used in audit entries; falls back to the email address.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

/// Tone adjustments the draft generator understands.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Adjustment {
    Formal,
    Friendly,
    Urgent,
    Savings,
    Speed,
    Experience,
}

impl Adjustment {
    pub const ALL: [Adjustment; 6] = [
        Adjustment::Formal,
        Adjustment::Friendly,
        Adjustment::Urgent,
        Adjustment::Savings,
        Adjustment::Speed,
        Adjustment::Experience,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Adjustment::Formal => "formal",
            Adjustment::Friendly => "friendly",
            Adjustment::Urgent => "urgent",
            Adjustment::Savings => "savings",
            Adjustment::Speed => "speed",
            Adjustment::Experience => "experience",
        }
    }
}

/// What kind of draft to ask the generator for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerateOptions {
    #[default]
    Initial,
    Adjust(Adjustment),
    UseDefault,
}

/// Request body for the draft generator function.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub case_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<Adjustment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_default: Option<bool>,
}

impl GenerateRequest {
    pub fn new(case_id: &str, options: GenerateOptions) -> Self {
        let (adjustment, use_default) = match options {
            GenerateOptions::Initial => (None, None),
            GenerateOptions::Adjust(adjustment) => (Some(adjustment), None),
            GenerateOptions::UseDefault => (None, Some(true)),
        };
        Self {
            case_id: case_id.to_string(),
            adjustment,
            use_default,
        }
    }
}

/// Raw response from the draft generator function.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct GenerateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub draft: Option<String>,
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A successfully generated draft.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDraft {
    /// `None` when the generator left the subject alone.
    pub subject: Option<String>,
    pub body: String,
    pub version: Option<u32>,
    /// When the draft was received from the generator.
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_email_status_serializes_snake_case() {
        let json = serde_json::to_string(&EmailStatus::NotGenerated).unwrap();
        assert_eq!(json, "\"not_generated\"");
        let status: EmailStatus = serde_json::from_str("\"scheduled\"").unwrap();
        assert_eq!(status, EmailStatus::Scheduled);
    }

    #[test]
    fn test_case_record_tolerates_sparse_json() {
        let record: CaseRecord =
            serde_json::from_str(r#"{"id":"c1","unrelated_field":42}"#).unwrap();
        assert_eq!(record.id, "c1");
        assert_eq!(record.email_status, EmailStatus::NotGenerated);
        assert!(record.needs_generation());
    }

    #[test]
    fn test_needs_generation_when_draft_empty() {
        let record = CaseRecord {
            id: "c1".to_string(),
            email_status: EmailStatus::Draft,
            email_draft: Some(String::new()),
            ..Default::default()
        };
        assert!(record.needs_generation());
    }

    #[test]
    fn test_case_update_omits_unset_fields() {
        let update = CaseUpdate::content("Hi", "Body");
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"email_subject":"Hi","email_draft":"Body"}"#);
    }

    #[test]
    fn test_case_update_clears_schedule_with_null() {
        let update = CaseUpdate {
            email_scheduled_send_time: Some(None),
            ..Default::default()
        };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"email_scheduled_send_time":null}"#);
    }

    #[test]
    fn test_apply_clears_scheduled_time() {
        let mut record = CaseRecord {
            id: "c1".to_string(),
            email_scheduled_send_time: Some(Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap()),
            zapier_trigger_pending: true,
            ..Default::default()
        };
        record.apply(&CaseUpdate {
            email_status: Some(EmailStatus::Draft),
            email_scheduled_send_time: Some(None),
            zapier_trigger_pending: Some(false),
            ..Default::default()
        });
        assert_eq!(record.email_status, EmailStatus::Draft);
        assert!(record.email_scheduled_send_time.is_none());
        assert!(!record.zapier_trigger_pending);
    }

    #[test]
    fn test_generate_request_shapes() {
        let initial = serde_json::to_string(&GenerateRequest::new("c1", GenerateOptions::Initial)).unwrap();
        assert_eq!(initial, r#"{"case_id":"c1"}"#);

        let adjust = serde_json::to_string(&GenerateRequest::new(
            "c1",
            GenerateOptions::Adjust(Adjustment::Savings),
        ))
        .unwrap();
        assert_eq!(adjust, r#"{"case_id":"c1","adjustment":"savings"}"#);

        let default = serde_json::to_string(&GenerateRequest::new("c1", GenerateOptions::UseDefault)).unwrap();
        assert_eq!(default, r#"{"case_id":"c1","use_default":true}"#);
    }

    #[test]
    fn test_actor_display_name_falls_back_to_email() {
        let actor = Actor {
            email: "ana@example.com".to_string(),
            full_name: Some("  ".to_string()),
        };
        assert_eq!(actor.display_name(), "ana@example.com");
    }
}
