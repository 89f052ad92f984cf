//! HTTP implementation of `CaseBackend`.
//!
//! Endpoints (all relative to the configured base URL, bearer auth):
//! - `POST functions/generateEmailDraft`
//! - `GET|PUT entities/Case/{id}`
//! - `POST entities/AuditLog`
//! - `GET auth/me`

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::provider::{BackendError, CaseBackend};
use super::types::{
    Actor, AuditEntry, CaseRecord, CaseUpdate, GenerateRequest, GenerateResponse, GeneratedDraft,
};

pub struct HttpBackend {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Creates a new HTTP backend.
    ///
    /// # Arguments
    /// * `api_key` - Bearer token for the backend
    /// * `base_url` - API root, without trailing slash
    /// * `timeout` - Per-request timeout
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, BackendError> {
        if api_key.trim().is_empty() {
            return Err(BackendError::Config("API key is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Config(e.to_string()))?;
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Sends a request and maps transport and status failures.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, BackendError> {
        let response = request
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        debug!("Backend response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Backend API error: {} - {}", status, err_body);
            return Err(BackendError::Api {
                status,
                message: err_body,
            });
        }

        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| BackendError::Parse(e.to_string()))
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, BackendError> {
        self.send(self.client.post(self.url(path)).json(body)).await
    }
}

/// Turns the generator's envelope into a draft or an error.
fn into_generated(response: GenerateResponse) -> Result<GeneratedDraft, BackendError> {
    if !response.success {
        let message = response
            .error
            .unwrap_or_else(|| "Failed to generate email".to_string());
        return Err(BackendError::Rejected(message));
    }
    let body = response
        .draft
        .ok_or_else(|| BackendError::Rejected("Generation returned no draft".to_string()))?;
    Ok(GeneratedDraft {
        subject: response.subject,
        body,
        version: response.version,
        generated_at: Utc::now(),
    })
}

#[async_trait]
impl CaseBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_case(&self, case_id: &str) -> Result<CaseRecord, BackendError> {
        info!("Fetching case {}", case_id);
        let response = self
            .send(self.client.get(self.url(&format!("entities/Case/{case_id}"))))
            .await?;
        Self::read_json(response).await
    }

    async fn generate_draft(
        &self,
        request: &GenerateRequest,
    ) -> Result<GeneratedDraft, BackendError> {
        info!(
            "Generating draft: case={}, adjustment={:?}, use_default={:?}",
            request.case_id, request.adjustment, request.use_default
        );
        let response = self.post_json("functions/generateEmailDraft", request).await?;
        let envelope: GenerateResponse = Self::read_json(response).await?;
        into_generated(envelope)
    }

    async fn update_case(&self, case_id: &str, update: &CaseUpdate) -> Result<(), BackendError> {
        info!("Updating case {}", case_id);
        debug!("Case update: {:?}", update);
        self.send(
            self.client
                .put(self.url(&format!("entities/Case/{case_id}")))
                .json(update),
        )
        .await?;
        Ok(())
    }

    async fn append_audit(&self, entry: &AuditEntry) -> Result<(), BackendError> {
        info!("Appending audit entry for case {}: {}", entry.case_id, entry.action);
        self.post_json("entities/AuditLog", entry).await?;
        Ok(())
    }

    async fn current_actor(&self) -> Result<Actor, BackendError> {
        let response = self.send(self.client.get(self.url("auth/me"))).await?;
        Self::read_json(response).await
    }
}
