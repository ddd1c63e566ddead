//! Best-effort history notification.
//!
//! After a successful analyze call the orchestrator tells the history service
//! what was produced. The call is attempted once, its failure is logged and
//! otherwise ignored; [`NotifyOutcome`] makes that explicit.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Record posted to the history service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: DateTime<Utc>,
    pub requirements: String,
    pub proposal_titles: Vec<String>,
}

/// What happened to a notification. Never an error for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Delivered,
    /// No history endpoint configured.
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct HistoryNotifier {
    url: Option<String>,
    client: Client,
}

impl HistoryNotifier {
    pub fn new(url: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(NOTIFY_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { url, client }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Attempt delivery once. Failures are reported in the outcome only.
    pub async fn notify(&self, record: &HistoryRecord) -> NotifyOutcome {
        let Some(url) = &self.url else {
            return NotifyOutcome::Skipped;
        };

        let outcome = match self.client.post(url).json(record).send().await {
            Ok(response) if response.status().is_success() => NotifyOutcome::Delivered,
            Ok(response) => NotifyOutcome::Failed(format!("status {}", response.status())),
            Err(e) => NotifyOutcome::Failed(e.to_string()),
        };

        if let NotifyOutcome::Failed(reason) = &outcome {
            tracing::debug!("History notification dropped: {}", reason);
        }
        outcome
    }
}
