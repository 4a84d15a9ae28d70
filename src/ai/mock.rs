use super::{require_credential, ChatService, ImageGenerationService};
use crate::models::Credential;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Canned outcome for a mocked provider call.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Status(u16),
}

impl MockReply {
    fn into_result(self) -> Result<String> {
        match self {
            MockReply::Text(text) => Ok(text),
            MockReply::Status(status) => Err(Error::Provider {
                status,
                status_text: reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|code| code.canonical_reason())
                    .unwrap_or_default()
                    .to_string(),
                body: String::new(),
            }),
        }
    }
}

/// Shared bookkeeping for both mock clients.
#[derive(Clone, Default)]
struct Script {
    replies: Arc<Mutex<Vec<MockReply>>>,
    inputs: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
    delay: Option<Duration>,
}

impl Script {
    async fn next(&self, input: &str, default: impl FnOnce() -> String) -> Result<String> {
        let index = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count - 1
        };
        self.inputs.lock().unwrap().push(input.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = {
            let replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                None
            } else {
                Some(replies[index % replies.len()].clone())
            }
        };

        match reply {
            Some(reply) => reply.into_result(),
            None => Ok(default()),
        }
    }
}

#[derive(Clone, Default)]
pub struct MockChatClient {
    script: Script,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prompt_response(self, response: impl Into<String>) -> Self {
        self.script
            .replies
            .lock()
            .unwrap()
            .push(MockReply::Text(response.into()));
        self
    }

    pub fn with_error_status(self, status: u16) -> Self {
        self.script
            .replies
            .lock()
            .unwrap()
            .push(MockReply::Status(status));
        self
    }

    /// Hold every call for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.script.delay = Some(delay);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.script.call_count.lock().unwrap()
    }

    pub fn received_briefs(&self) -> Vec<String> {
        self.script.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatService for MockChatClient {
    async fn generate_text_completion(
        &self,
        credential: Option<&Credential>,
        _system_instruction: &str,
        brief: &str,
    ) -> Result<String> {
        require_credential(credential)?;
        self.script
            .next(brief, || format!("Mock prompt for: {}", brief))
            .await
    }
}

#[derive(Clone, Default)]
pub struct MockImageGenerationClient {
    script: Script,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image_response(self, url: impl Into<String>) -> Self {
        self.script
            .replies
            .lock()
            .unwrap()
            .push(MockReply::Text(url.into()));
        self
    }

    pub fn with_error_status(self, status: u16) -> Self {
        self.script
            .replies
            .lock()
            .unwrap()
            .push(MockReply::Status(status));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.script.delay = Some(delay);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.script.call_count.lock().unwrap()
    }

    pub fn received_prompts(&self) -> Vec<String> {
        self.script.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_image(
        &self,
        credential: Option<&Credential>,
        prompt: &str,
    ) -> Result<String> {
        require_credential(credential)?;
        self.script
            .next(prompt, || "https://mock-images.example.com/1.png".to_string())
            .await
    }
}
