use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::message::AnswerSource;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    question: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub answer: String,
    #[serde(default, deserialize_with = "answer_source")]
    pub source: Option<AnswerSource>,
}

fn answer_source<'de, D>(deserializer: D) -> Result<Option<AnswerSource>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(AnswerSource::from_json))
}

#[derive(Deserialize)]
struct MessageResponse {
    message: String,
}

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
}

/// HTTP client for the document chat backend
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload a document as multipart field `file`. Returns the backend's
    /// status message when it sends one.
    pub async fn upload(&self, path: &Path) -> Result<Option<String>, BackendError> {
        let url = format!("{}/upload", self.base_url);

        let bytes = tokio::fs::read(path).await.map_err(|source| BackendError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        // Success needs no particular body shape
        let body = response.text().await?;
        Ok(serde_json::from_str::<MessageResponse>(&body)
            .ok()
            .map(|r| r.message))
    }

    pub async fn chat(&self, question: &str) -> Result<ChatReply, BackendError> {
        let url = format!("{}/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { question })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        Ok(response.json().await?)
    }

    pub async fn reset(&self) -> Result<(), BackendError> {
        let url = format!("{}/reset", self.base_url);

        let response = self.client.post(&url).send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(())
    }

    pub async fn health(&self) -> Result<String, BackendError> {
        let url = format!("{}/api/health", self.base_url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let health: HealthResponse = response.json().await?;
        Ok(health.status)
    }
}

async fn status_error(response: Response) -> BackendError {
    let status = response.status();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    BackendError::Status {
        status,
        message: error_message(&body, status),
    }
}

/// Pick the most useful error text: `detail`, then `message`, then the
/// status reason phrase.
fn error_message(body: &Value, status: StatusCode) -> String {
    let detail = match body.get("detail") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::String(_)) | Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    };

    detail
        .or_else(|| {
            body.get("message")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}
