use crate::application::ports::remote_records::{RemoteError, RemoteRecordApi};
use crate::application::ports::session::SessionProvider;
use crate::domain::value_objects::{RecordId, TargetTable, WritePayload};
use crate::shared::config::RemoteConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;

/// Record API of a Supabase/PostgREST backend.
pub struct PostgrestRecordApi {
    base_url: String,
    anon_key: String,
    session: Arc<dyn SessionProvider>,
    http: reqwest::Client,
}

impl PostgrestRecordApi {
    pub fn new(config: &RemoteConfig, session: Arc<dyn SessionProvider>) -> Result<Self, AppError> {
        let trimmed = config.base_url.trim();
        if trimmed.is_empty() {
            return Err(AppError::ConfigurationError(
                "Remote base_url is empty".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                AppError::ConfigurationError(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            base_url: trimmed.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.trim().to_string(),
            session,
            http,
        })
    }

    fn request(&self, method: Method, table: &TargetTable) -> reqwest::RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.base_url, table.as_str());
        let token = self
            .session
            .access_token()
            .filter(|token| !token.trim().is_empty())
            .unwrap_or_else(|| self.anon_key.clone());

        let builder = self
            .http
            .request(method, url)
            .header("Authorization", format!("Bearer {token}"));
        if self.anon_key.is_empty() {
            builder
        } else {
            builder.header("apikey", &self.anon_key)
        }
    }
}

#[async_trait]
impl RemoteRecordApi for PostgrestRecordApi {
    async fn upsert(&self, table: &TargetTable, record: &WritePayload) -> Result<(), RemoteError> {
        let resp = self
            .request(Method::POST, table)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(record.as_map())
            .send()
            .await?;
        ensure_success(resp).await
    }

    async fn update_by_id(
        &self,
        table: &TargetTable,
        id: &RecordId,
        patch: &WritePayload,
    ) -> Result<(), RemoteError> {
        let resp = self
            .request(Method::PATCH, table)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .json(patch.as_map())
            .send()
            .await?;
        ensure_success(resp).await
    }

    async fn delete_by_id(&self, table: &TargetTable, id: &RecordId) -> Result<(), RemoteError> {
        let resp = self
            .request(Method::DELETE, table)
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        ensure_success(resp).await
    }
}

async fn ensure_success(resp: reqwest::Response) -> Result<(), RemoteError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    Err(RemoteError::from_status(
        status.as_u16(),
        error_message(status, &body),
    ))
}

/// PostgREST reports `{"message": ..., "code": ...}`; fall back to the raw body.
fn error_message(status: StatusCode, body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|value| value.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string);

    match message {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}
