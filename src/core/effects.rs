//! # Effect Runner
//!
//! Carries out the backend side of an `Effect` and reports back with the
//! matching completion `Action`. Local effects (timers, closing) belong to the
//! adapter and yield `None` here.
//!
//! Delivery-affecting operations run as two steps: case update, then audit
//! append. The update is authoritative. If it fails nothing else happens; if
//! the audit append fails afterwards it is retried, and a persistent failure
//! is reported alongside the committed update instead of being rolled back.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::backend::{
    Actor, AuditEntry, BackendError, CaseBackend, CaseUpdate, EmailStatus, GenerateRequest,
};
use crate::core::action::{Action, Effect};
use crate::core::draft::DraftSnapshot;
use crate::core::schedule::format_send_time;

pub const DEFAULT_ACTION_CATEGORY: &str = "email";
pub const DEFAULT_AUDIT_RETRIES: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditSettings {
    pub action_category: String,
    /// Extra attempts after the first failed append.
    pub retries: u8,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            action_category: DEFAULT_ACTION_CATEGORY.to_string(),
            retries: DEFAULT_AUDIT_RETRIES,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuditOutcome {
    Recorded,
    Failed(BackendError),
}

impl AuditOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, AuditOutcome::Recorded)
    }
}

/// A case update that reached the store, and what happened to its audit entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Committed {
    pub update: CaseUpdate,
    pub audit: AuditOutcome,
}

/// Runs the backend part of `effect`. Returns `None` for local effects.
pub async fn run(
    backend: Arc<dyn CaseBackend>,
    audit: &AuditSettings,
    effect: Effect,
) -> Option<Action> {
    match effect {
        Effect::LoadCase { case_id } => {
            let result = backend.fetch_case(&case_id).await;
            Some(Action::CaseLoaded { case_id, result })
        }
        Effect::RefreshCase { case_id } => {
            let result = backend.fetch_case(&case_id).await;
            Some(Action::CaseRefreshed { case_id, result })
        }
        Effect::Generate { case_id, options } => {
            let request = GenerateRequest::new(&case_id, options);
            let result = backend.generate_draft(&request).await;
            Some(Action::GenerationFinished {
                case_id,
                options,
                result,
            })
        }
        Effect::Persist {
            case_id,
            origin,
            snapshot,
        } => {
            let update = CaseUpdate::content(&snapshot.subject, &snapshot.body);
            let result = backend.update_case(&case_id, &update).await;
            Some(Action::PersistFinished {
                case_id,
                origin,
                snapshot,
                result,
            })
        }
        Effect::MarkSent { case_id } => {
            let result = mark_sent(backend.as_ref(), audit, &case_id).await;
            Some(Action::MarkSentFinished { case_id, result })
        }
        Effect::Schedule {
            case_id,
            at,
            snapshot,
        } => {
            let result = schedule(backend.as_ref(), audit, &case_id, at, &snapshot).await;
            Some(Action::ScheduleFinished {
                case_id,
                at,
                snapshot,
                result,
            })
        }
        Effect::CancelSchedule { case_id } => {
            let result = cancel_schedule(backend.as_ref(), audit, &case_id).await;
            Some(Action::CancelScheduleFinished { case_id, result })
        }
        Effect::None
        | Effect::Close
        | Effect::ArmAutosave
        | Effect::CancelAutosave
        | Effect::ExpireSaveStatus => None,
    }
}

async fn mark_sent(
    backend: &dyn CaseBackend,
    audit: &AuditSettings,
    case_id: &str,
) -> Result<Committed, BackendError> {
    let actor = backend.current_actor().await?;
    let now = Utc::now();
    let update = CaseUpdate {
        email_status: Some(EmailStatus::Sent),
        email_sent_at: Some(now),
        email_sent_by: Some(actor.email.clone()),
        last_activity_by: Some(actor.email.clone()),
        ..Default::default()
    };
    commit(backend, audit, case_id, &actor, update, "Email marked as sent".to_string()).await
}

async fn schedule(
    backend: &dyn CaseBackend,
    audit: &AuditSettings,
    case_id: &str,
    at: DateTime<Utc>,
    snapshot: &DraftSnapshot,
) -> Result<Committed, BackendError> {
    let actor = backend.current_actor().await?;
    let update = CaseUpdate {
        email_subject: Some(snapshot.subject.clone()),
        email_draft: Some(snapshot.body.clone()),
        email_status: Some(EmailStatus::Scheduled),
        email_scheduled_send_time: Some(Some(at)),
        zapier_trigger_pending: Some(true),
        last_activity_by: Some(actor.email.clone()),
        ..Default::default()
    };
    let action = format!("Email scheduled for {}", format_send_time(at));
    commit(backend, audit, case_id, &actor, update, action).await
}

async fn cancel_schedule(
    backend: &dyn CaseBackend,
    audit: &AuditSettings,
    case_id: &str,
) -> Result<Committed, BackendError> {
    let actor = backend.current_actor().await?;
    let update = CaseUpdate {
        email_status: Some(EmailStatus::Draft),
        email_scheduled_send_time: Some(None),
        zapier_trigger_pending: Some(false),
        last_activity_by: Some(actor.email.clone()),
        ..Default::default()
    };
    commit(backend, audit, case_id, &actor, update, "Scheduled email cancelled".to_string()).await
}

/// Update, then audit. Only the update can fail the operation.
async fn commit(
    backend: &dyn CaseBackend,
    audit: &AuditSettings,
    case_id: &str,
    actor: &Actor,
    update: CaseUpdate,
    action: String,
) -> Result<Committed, BackendError> {
    backend.update_case(case_id, &update).await?;

    let entry = AuditEntry {
        case_id: case_id.to_string(),
        action,
        action_category: audit.action_category.clone(),
        actor: actor.display_name().to_string(),
        actor_email: actor.email.clone(),
        timestamp: Utc::now(),
    };
    let audit = append_with_retry(backend, &entry, audit.retries).await;
    Ok(Committed { update, audit })
}

async fn append_with_retry(backend: &dyn CaseBackend, entry: &AuditEntry, retries: u8) -> AuditOutcome {
    let mut attempt = 0u8;
    loop {
        match backend.append_audit(entry).await {
            Ok(()) => {
                info!("Audit recorded for case {}: {}", entry.case_id, entry.action);
                return AuditOutcome::Recorded;
            }
            Err(e) if attempt < retries => {
                attempt += 1;
                warn!("Audit append failed (attempt {}), retrying: {}", attempt, e);
            }
            Err(e) => {
                warn!(
                    "Audit append for case {} gave up after {} attempt(s): {}",
                    entry.case_id,
                    attempt + 1,
                    e
                );
                return AuditOutcome::Failed(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::GenerateOptions;
    use crate::core::action::SaveOrigin;
    use crate::test_support::{Call, FakeBackend};
    use chrono::Duration;

    fn settings() -> AuditSettings {
        AuditSettings::default()
    }

    #[tokio::test]
    async fn test_local_effects_yield_nothing() {
        let backend = Arc::new(FakeBackend::default());
        for effect in [Effect::None, Effect::Close, Effect::ArmAutosave, Effect::ExpireSaveStatus] {
            assert!(run(backend.clone(), &settings(), effect).await.is_none());
        }
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_persist_writes_subject_and_body() {
        let backend = Arc::new(FakeBackend::default());
        let snapshot = DraftSnapshot {
            subject: "S".to_string(),
            body: "B".to_string(),
        };
        let action = run(
            backend.clone(),
            &settings(),
            Effect::Persist {
                case_id: "case-1".to_string(),
                origin: SaveOrigin::Autosave,
                snapshot: snapshot.clone(),
            },
        )
        .await;
        assert!(matches!(
            action,
            Some(Action::PersistFinished { result: Ok(()), origin: SaveOrigin::Autosave, .. })
        ));
        assert_eq!(
            backend.calls(),
            vec![Call::Update("case-1".to_string(), CaseUpdate::content("S", "B"))]
        );
    }

    #[tokio::test]
    async fn test_generate_passes_options() {
        let backend = Arc::new(FakeBackend::default());
        let action = run(
            backend.clone(),
            &settings(),
            Effect::Generate {
                case_id: "case-1".to_string(),
                options: GenerateOptions::UseDefault,
            },
        )
        .await;
        assert!(matches!(action, Some(Action::GenerationFinished { result: Ok(_), .. })));
        assert_eq!(
            backend.calls(),
            vec![Call::Generate(GenerateRequest::new("case-1", GenerateOptions::UseDefault))]
        );
    }

    #[tokio::test]
    async fn test_mark_sent_updates_then_audits() {
        let backend = Arc::new(FakeBackend::default());
        let action = run(
            backend.clone(),
            &settings(),
            Effect::MarkSent {
                case_id: "case-1".to_string(),
            },
        )
        .await;
        let Some(Action::MarkSentFinished { result: Ok(committed), .. }) = action else {
            panic!("expected committed send, got {action:?}");
        };
        assert!(committed.audit.is_recorded());
        assert_eq!(committed.update.email_status, Some(EmailStatus::Sent));
        assert_eq!(committed.update.email_sent_by.as_deref(), Some("agent@example.com"));
        assert!(committed.update.email_sent_at.is_some());

        let calls = backend.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], Call::Actor);
        assert!(matches!(&calls[1], Call::Update(id, _) if id == "case-1"));
        let Call::Audit(entry) = &calls[2] else {
            panic!("expected audit call");
        };
        assert_eq!(entry.action, "Email marked as sent");
        assert_eq!(entry.action_category, "email");
        assert_eq!(entry.actor, "Agent Smith");
        assert_eq!(entry.actor_email, "agent@example.com");
    }

    #[tokio::test]
    async fn test_actor_failure_writes_nothing() {
        let backend = Arc::new(FakeBackend {
            fail_actor: true,
            ..Default::default()
        });
        let action = run(
            backend.clone(),
            &settings(),
            Effect::MarkSent {
                case_id: "case-1".to_string(),
            },
        )
        .await;
        assert!(matches!(action, Some(Action::MarkSentFinished { result: Err(_), .. })));
        assert_eq!(backend.calls(), vec![Call::Actor]);
    }

    #[tokio::test]
    async fn test_update_failure_skips_audit() {
        let backend = Arc::new(FakeBackend {
            fail_update: true,
            ..Default::default()
        });
        let action = run(
            backend.clone(),
            &settings(),
            Effect::CancelSchedule {
                case_id: "case-1".to_string(),
            },
        )
        .await;
        assert!(matches!(action, Some(Action::CancelScheduleFinished { result: Err(_), .. })));
        assert!(!backend.calls().iter().any(|c| matches!(c, Call::Audit(_))));
    }

    #[tokio::test]
    async fn test_schedule_audit_mentions_time() {
        let backend = Arc::new(FakeBackend::default());
        let at = Utc::now() + Duration::hours(3);
        let snapshot = DraftSnapshot {
            subject: "S".to_string(),
            body: "B".to_string(),
        };
        let action = run(
            backend.clone(),
            &settings(),
            Effect::Schedule {
                case_id: "case-1".to_string(),
                at,
                snapshot,
            },
        )
        .await;
        let Some(Action::ScheduleFinished { result: Ok(committed), .. }) = action else {
            panic!("expected committed schedule, got {action:?}");
        };
        assert_eq!(committed.update.email_scheduled_send_time, Some(Some(at)));
        assert_eq!(committed.update.zapier_trigger_pending, Some(true));
        assert_eq!(committed.update.email_subject.as_deref(), Some("S"));

        let audits = backend.audits();
        assert_eq!(audits.len(), 1);
        assert_eq!(
            audits[0].action,
            format!("Email scheduled for {}", format_send_time(at))
        );
    }

    #[tokio::test]
    async fn test_audit_retried_then_reported() {
        let backend = Arc::new(FakeBackend {
            audit_failures: 5,
            ..Default::default()
        });
        let action = run(
            backend.clone(),
            &AuditSettings {
                retries: 2,
                ..Default::default()
            },
            Effect::CancelSchedule {
                case_id: "case-1".to_string(),
            },
        )
        .await;
        let Some(Action::CancelScheduleFinished { result: Ok(committed), .. }) = action else {
            panic!("expected committed cancel, got {action:?}");
        };
        assert!(!committed.audit.is_recorded());
        let attempts = backend
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Audit(_)))
            .count();
        assert_eq!(attempts, 3);
    }

    /// Feeds actions through `update()` and runs backend effects until quiet.
    async fn drive(app: &mut crate::core::state::App, action: Action) -> Effect {
        let mut next = Some(action);
        let mut last = Effect::None;
        while let Some(action) = next.take() {
            last = crate::core::action::update(app, action);
            next = run(app.backend.clone(), &app.audit, last.clone()).await;
        }
        last
    }

    #[tokio::test]
    async fn test_open_then_mark_sent_flow() {
        let backend = Arc::new(FakeBackend::default());
        let mut app = crate::core::state::App::new(backend.clone());

        drive(&mut app, Action::OpenCase("case-9".to_string())).await;
        assert_eq!(app.draft.body(), "Stored body");
        assert!(app.can_mark_sent());

        let effect = drive(&mut app, Action::MarkSent).await;
        assert_eq!(effect, Effect::Close);
        assert!(!app.open);
        assert_eq!(backend.audits().len(), 1);
    }

    #[tokio::test]
    async fn test_generation_failure_flow_keeps_draft() {
        let backend = Arc::new(FakeBackend {
            generate_error: Some("Generator offline".to_string()),
            ..Default::default()
        });
        let mut app = crate::core::state::App::new(backend);
        drive(&mut app, Action::OpenCase("case-9".to_string())).await;
        drive(&mut app, Action::EditBody("Hand written".to_string())).await;

        drive(&mut app, Action::Generate(GenerateOptions::Initial)).await;
        assert!(app.activity.is_idle());
        assert_eq!(app.draft.subject(), "Stored subject");
        assert_eq!(app.draft.body(), "Hand written");
        assert_eq!(
            app.latest_notification().map(|n| n.message.as_str()),
            Some("Generator offline")
        );
    }

    #[tokio::test]
    async fn test_audit_retry_recovers() {
        let backend = Arc::new(FakeBackend {
            audit_failures: 1,
            ..Default::default()
        });
        let action = run(
            backend.clone(),
            &settings(),
            Effect::CancelSchedule {
                case_id: "case-1".to_string(),
            },
        )
        .await;
        let Some(Action::CancelScheduleFinished { result: Ok(committed), .. }) = action else {
            panic!("expected committed cancel, got {action:?}");
        };
        assert!(committed.audit.is_recorded());
        assert_eq!(backend.audits().len(), 1);
    }
}
