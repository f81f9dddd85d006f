// src/agent/model.rs

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use super::KNOWLEDGE_HEADER;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("request to language model failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("language model returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("language model returned an empty reply")]
    EmptyReply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// A chat-completion backend.
pub trait LanguageModel: Send + Sync {
    fn complete(
        &self,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<String, AgentError>> + Send;
}

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAiChat {
    client: Client,
    api_url: String,
    api_key: SecretString,
    model: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiChat {
    pub fn new(api_url: &str, api_key: SecretString, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for language model")?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl LanguageModel for OpenAiChat {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AgentError> {
        let url = format!("{}/chat/completions", self.api_url);
        debug!(model = %self.model, messages = messages.len(), "requesting chat completion");
        let resp = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&json!({ "model": self.model, "messages": messages }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AgentError::Api { status: status.as_u16(), body });
        }

        let completion: CompletionResponse = resp.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(AgentError::EmptyReply)
    }
}

/// Fallback used when no API key is configured: answers from the retrieved
/// knowledge context only.
#[derive(Debug, Clone, Default)]
pub struct OfflineModel;

impl LanguageModel for OfflineModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AgentError> {
        let knowledge = messages
            .iter()
            .find(|m| m.role == Role::System)
            .and_then(|m| m.content.split_once(KNOWLEDGE_HEADER))
            .map(|(_, section)| section.trim())
            .filter(|section| !section.is_empty());

        Ok(match knowledge {
            Some(section) => format!(
                "I'm running without a language model, so here is what my knowledge base says:\n\n{}",
                section
            ),
            None => "I'm running without a language model. Set LLM_API_KEY to enable chat.".to_string(),
        })
    }
}

/// The backends the binary can be configured with.
pub enum Backend {
    OpenAi(OpenAiChat),
    Offline(OfflineModel),
}

impl LanguageModel for Backend {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AgentError> {
        match self {
            Backend::OpenAi(model) => model.complete(messages).await,
            Backend::Offline(model) => model.complete(messages).await,
        }
    }
}
