use super::client::OpenAiHttpClient;
use super::types::{ChatCompletionRequest, ChatMessage};
use crate::ai::{require_credential, ChatService};
use crate::models::Credential;
use crate::{prompts, Result};
use async_trait::async_trait;

pub const CHAT_MODEL: &str = "gpt-4o";
pub const CHAT_TEMPERATURE: f32 = 0.8;
pub const CHAT_MAX_TOKENS: u32 = 1000;

pub struct OpenAiChatClient {
    http: OpenAiHttpClient,
}

impl OpenAiChatClient {
    pub fn new() -> Self {
        Self::new_with_client(reqwest::Client::new())
    }

    pub fn new_with_client(client: reqwest::Client) -> Self {
        Self {
            http: OpenAiHttpClient::new_with_client(client),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }
}

impl Default for OpenAiChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatService for OpenAiChatClient {
    async fn generate_text_completion(
        &self,
        credential: Option<&Credential>,
        system_instruction: &str,
        brief: &str,
    ) -> Result<String> {
        let credential = require_credential(credential)?;

        let request = ChatCompletionRequest {
            model: CHAT_MODEL.to_string(),
            messages: vec![
                ChatMessage::new("system", system_instruction),
                ChatMessage::new(
                    "user",
                    prompts::render(prompts::CHAT_USER, &[("briefing", brief)]),
                ),
            ],
            temperature: CHAT_TEMPERATURE,
            max_tokens: CHAT_MAX_TOKENS,
        };

        let response = self.http.chat_completion(credential, request).await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty());

        Ok(text.unwrap_or_else(|| {
            tracing::warn!("OpenAI returned no completion content, using fallback text");
            prompts::EMPTY_COMPLETION_FALLBACK.to_string()
        }))
    }
}
