//! HTTP client for the draft generation collaborator.
//!
//! The collaborator takes `{title, summary, key_points}` and answers with
//! `{sections, full_draft, feedback}`. It is best-effort: any failure here is
//! turned into a placeholder by the coordinator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::models::{DraftRequest, DraftResult};

/// Default collaborator endpoint for local development.
pub const DEFAULT_DRAFT_URL: &str = "http://127.0.0.1:8001/draft";

/// Drafting collaborator errors.
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("draft service unreachable: {0}")]
    Http(#[from] reqwest::Error),

    #[error("draft service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("draft service returned a malformed response: {0}")]
    Malformed(String),

    #[error("draft service did not answer within {0:?}")]
    Timeout(Duration),

    #[error("skeleton has no key points to draft")]
    NoKeyPoints,
}

/// Something that turns a skeleton into a narrative draft.
#[async_trait]
pub trait DraftCollaborator: Send + Sync {
    async fn draft(&self, request: &DraftRequest) -> Result<DraftResult, DraftError>;
}

/// HTTP implementation of [`DraftCollaborator`].
#[derive(Debug, Clone)]
pub struct HttpDraftCollaborator {
    url: String,
    client: Client,
}

impl HttpDraftCollaborator {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DraftError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DraftCollaborator for HttpDraftCollaborator {
    async fn draft(&self, request: &DraftRequest) -> Result<DraftResult, DraftError> {
        let response = self.client.post(&self.url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DraftError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| DraftError::Malformed(e.to_string()))
    }
}
