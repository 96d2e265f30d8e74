//! End-of-session summary and the fire-and-forget sink it is sent to.
//!
//! A failing sink never reaches the user: `record_session` logs the error
//! and returns, and `spawn_record` does the same on a background task.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::error::SummaryError;
use crate::session::Session;
use crate::storage::config::SummaryConfig;

/// Body posted to the summary endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub goal: String,
    /// Whole minutes since the session started.
    #[serde(rename = "timeSpent")]
    pub time_spent_minutes: u64,
    pub slides_total: usize,
    pub slides_completed: usize,
    pub slides_marked_for_review: usize,
    pub extensions_used: u32,
    pub panic_mode: bool,
}

impl SessionSummary {
    pub fn from_session(session: &Session, now: DateTime<Utc>) -> Self {
        let time_spent_minutes = session
            .started_at
            .map(|started| (now - started).num_minutes().max(0) as u64)
            .unwrap_or(0);
        Self {
            session_id: session.id,
            goal: session.goal.clone(),
            time_spent_minutes,
            slides_total: session.slides.len(),
            slides_completed: session.slides_completed(),
            slides_marked_for_review: session.slides_marked_for_review(),
            extensions_used: session.extensions_used,
            panic_mode: session.panic_mode,
        }
    }
}

#[async_trait]
pub trait SummarySink: Send + Sync {
    async fn record(&self, summary: &SessionSummary) -> Result<(), SummaryError>;
}

/// Posts the summary as JSON.
pub struct HttpSummarySink {
    client: Client,
    endpoint: Url,
}

impl HttpSummarySink {
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: Client::new(),
            endpoint,
        }
    }

    /// `None` when the sink is switched off or the endpoint does not parse.
    pub fn from_config(config: &SummaryConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        match Url::parse(&config.endpoint) {
            Ok(endpoint) => Some(Self::new(endpoint)),
            Err(e) => {
                tracing::warn!(endpoint = %config.endpoint, error = %e, "invalid summary endpoint");
                None
            }
        }
    }
}

#[async_trait]
impl SummarySink for HttpSummarySink {
    async fn record(&self, summary: &SessionSummary) -> Result<(), SummaryError> {
        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(summary)
            .send()
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(SummaryError::Rejected {
                status: resp.status().as_u16(),
            })
        }
    }
}

/// Used when summaries are switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSink;

#[async_trait]
impl SummarySink for DisabledSink {
    async fn record(&self, _summary: &SessionSummary) -> Result<(), SummaryError> {
        Err(SummaryError::Disabled)
    }
}

/// Send and swallow. Returns whether the sink accepted the summary.
pub async fn record_session(sink: &dyn SummarySink, summary: &SessionSummary) -> bool {
    match sink.record(summary).await {
        Ok(()) => {
            tracing::info!(session_id = %summary.session_id, "session summary recorded");
            true
        }
        Err(SummaryError::Disabled) => {
            tracing::debug!("summary sink disabled, not recording");
            false
        }
        Err(e) => {
            tracing::warn!(session_id = %summary.session_id, error = %e, "failed to save session summary");
            false
        }
    }
}

/// Fire-and-forget on the current tokio runtime.
pub fn spawn_record(
    sink: Arc<dyn SummarySink>,
    summary: SessionSummary,
) -> tokio::task::JoinHandle<bool> {
    tokio::spawn(async move { record_session(sink.as_ref(), &summary).await })
}
