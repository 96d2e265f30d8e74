//! Slide-aware study assistant.
//!
//! The assistant is advisory: its failures become an inline notice in the
//! conversation and never touch the pacing state.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::error::AssistantError;
use crate::storage::config::AssistantConfig;

/// Shown in place of an answer when a request fails.
pub const REQUEST_FAILED_NOTICE: &str = "Sorry, I encountered an error. Please check your API key.";

/// Context block followed by the user's question.
pub fn build_prompt(slide_text: &str, question: &str) -> String {
    format!("Context from current study slide: \"{slide_text}\"\n\nUser question: {question}")
}

#[async_trait]
pub trait Assistant: Send + Sync {
    /// Answer `question` about a slide whose text is `context`.
    async fn ask(&self, context: &str, question: &str) -> Result<String, AssistantError>;
}

/// One-tap questions offered next to the free-form input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickAction {
    Explain,
    Simplify,
    KeyTakeaways,
}

impl QuickAction {
    pub const ALL: [QuickAction; 3] = [
        QuickAction::Explain,
        QuickAction::Simplify,
        QuickAction::KeyTakeaways,
    ];

    pub fn label(self) -> &'static str {
        match self {
            QuickAction::Explain => "Explain this",
            QuickAction::Simplify => "Simplify",
            QuickAction::KeyTakeaways => "Key takeaways",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            QuickAction::Explain => "Explain the main concepts on this slide simply.",
            QuickAction::Simplify => "Rewrite the content of this slide using very simple language.",
            QuickAction::KeyTakeaways => "What are the top 3 key takeaways from this slide?",
        }
    }
}

impl std::str::FromStr for QuickAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "explain" => Ok(QuickAction::Explain),
            "simplify" => Ok(QuickAction::Simplify),
            "takeaways" | "key_takeaways" | "key-takeaways" => Ok(QuickAction::KeyTakeaways),
            other => Err(format!("unknown quick action: {other}")),
        }
    }
}

/// What the conversation shows for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantReply {
    Answer(String),
    Notice(String),
}

impl AssistantReply {
    pub fn from_result(result: Result<String, AssistantError>) -> Self {
        match result {
            Ok(text) => AssistantReply::Answer(text),
            Err(AssistantError::Unavailable { env_var }) => AssistantReply::Notice(format!(
                "Assistant API key missing. Set {env_var} to enable the study assistant."
            )),
            Err(e) => {
                tracing::warn!(error = %e, "assistant request failed");
                AssistantReply::Notice(REQUEST_FAILED_NOTICE.to_string())
            }
        }
    }

    pub fn text(&self) -> &str {
        match self {
            AssistantReply::Answer(text) | AssistantReply::Notice(text) => text,
        }
    }

    pub fn is_notice(&self) -> bool {
        matches!(self, AssistantReply::Notice(_))
    }
}

/// Google Generative Language `generateContent` client.
pub struct GeminiAssistant {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: Url,
    key_env: String,
}

impl GeminiAssistant {
    pub fn new(api_key: Option<String>, model: impl Into<String>, base_url: Url) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            base_url,
            key_env: "GEMINI_API_KEY".to_string(),
        }
    }

    /// Reads the key from the environment variable named in the config.
    pub fn from_config(config: &AssistantConfig) -> Result<Self, AssistantError> {
        let base_url = Url::parse(&config.base_url)?;
        let api_key = std::env::var(&config.api_key_env).ok();
        let mut assistant = Self::new(api_key, config.model.clone(), base_url);
        assistant.key_env = config.api_key_env.clone();
        Ok(assistant)
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> Result<Url, AssistantError> {
        Ok(self
            .base_url
            .join(&format!("v1beta/models/{}:generateContent", self.model))?)
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl Assistant for GeminiAssistant {
    async fn ask(&self, context: &str, question: &str) -> Result<String, AssistantError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(AssistantError::Unavailable {
                env_var: self.key_env.clone(),
            });
        };

        let body = json!({
            "contents": [{
                "parts": [{ "text": build_prompt(context, question) }]
            }]
        });

        tracing::debug!(model = %self.model, "asking assistant");
        let resp = self
            .client
            .post(self.endpoint()?)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(AssistantError::Response {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = resp.json().await?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|text| !text.is_empty())
            .ok_or(AssistantError::Response {
                status: status.as_u16(),
                message: "response contained no text".to_string(),
            })
    }
}
