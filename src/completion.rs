use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::catalog::PortfolioItem;
use crate::config::Settings;
use crate::error::CompletionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the conversation context sent along with a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub role: Role,
    pub content: String,
}

impl ContextEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// What the assistant hands to the completion boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub user_text: String,
    pub owner: String,
    pub item: PortfolioItem,
    pub prior: Vec<ContextEntry>,
}

/// The remote completion boundary. Transport and auth are up to the
/// implementation.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

// Wire structures for an OpenAI-compatible /v1/chat/completions endpoint
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for a hosted, OpenAI-compatible chat completion API.
#[derive(Debug, Clone)]
pub struct HostedCompletion {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl HostedCompletion {
    pub fn new(api_base: &str, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/v1/chat/completions", api_base.trim_end_matches('/')),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// `None` when no API key is configured.
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        if !settings.remote_enabled() {
            return None;
        }
        let key = settings.api_key.clone().unwrap_or_default();
        Some(Self::new(&settings.api_base, key, settings.model.clone()))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

pub fn build_system_prompt(owner: &str, item: &PortfolioItem) -> String {
    format!(
        "You are the assistant on {owner}'s creative video portfolio. Answer visitor questions \
        about the work warmly and concisely, in two or three sentences.\n\n\
        The visitor is currently watching:\n\
        Title: {title}\nCategory: {category}\nDate: {date}\nDescription: {description}",
        owner = owner,
        title = item.title,
        category = item.category,
        date = item.date,
        description = item.description,
    )
}

#[async_trait]
impl CompletionBackend for HostedCompletion {
    #[instrument(skip(self, request), fields(item = %request.item.title, prior = request.prior.len()))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let system_prompt = build_system_prompt(&request.owner, &request.item);

        let mut messages = Vec::with_capacity(request.prior.len() + 2);
        messages.push(WireMessage {
            role: "system",
            content: &system_prompt,
        });
        for entry in &request.prior {
            messages.push(WireMessage {
                role: match entry.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                },
                content: &entry.content,
            });
        }
        messages.push(WireMessage {
            role: "user",
            content: &request.user_text,
        });

        let payload = ChatCompletionRequest {
            model: &self.model,
            messages,
        };

        debug!(endpoint = %self.endpoint, "Sending completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|source| CompletionError::Transport {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(%status, %body, "Completion API request failed");
            return Err(CompletionError::Status { status, body });
        }

        let completion = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(CompletionError::Decode)?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(CompletionError::EmptyResponse);
        }

        debug!(response = %text, "Received completion");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_url() {
        let hosted = HostedCompletion::new("http://localhost:9000/", "key", "model");
        assert_eq!(hosted.endpoint(), "http://localhost:9000/v1/chat/completions");
    }

    #[test]
    fn test_from_settings_requires_key() {
        let mut settings = Settings::default();
        assert!(HostedCompletion::from_settings(&settings).is_none());

        settings.api_key = Some("sk-test".to_string());
        settings.api_base = "http://example.test".to_string();
        let hosted = HostedCompletion::from_settings(&settings).unwrap();
        assert_eq!(hosted.endpoint(), "http://example.test/v1/chat/completions");
    }

    #[test]
    fn test_system_prompt_mentions_item() {
        let item = PortfolioItem::new(1, "TGI Intro", "Brand Identity", "2024 - Featured", "Dynamic intro", "a.mp4");
        let prompt = build_system_prompt("Kilah Oliver", &item);
        assert!(prompt.contains("Kilah Oliver's creative video portfolio"));
        assert!(prompt.contains("Title: TGI Intro"));
        assert!(prompt.contains("Category: Brand Identity"));
        assert!(prompt.contains("Description: Dynamic intro"));
    }

    #[test]
    fn test_context_entry_roles_serialize_lowercase() {
        let entry = ContextEntry::assistant("hi");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(ContextEntry::user("q").role, Role::User);
    }
}
