//! Provider integration for prompt and image generation
//!
//! Two stateless operations against an OpenAI-compatible API: a chat
//! completion that turns a brief into an image prompt, and an image
//! generation that turns that prompt into a hosted image URL. The credential
//! is passed per call; an absent credential fails before any request is made.

pub mod mock;
pub mod openai;

pub use mock::{MockChatClient, MockImageGenerationClient};
pub use openai::{OpenAiChatClient, OpenAiImageClient};

use crate::models::Credential;
use crate::{Error, Result};
use async_trait::async_trait;

#[async_trait]
pub trait ChatService: Send + Sync {
    async fn generate_text_completion(
        &self,
        credential: Option<&Credential>,
        system_instruction: &str,
        brief: &str,
    ) -> Result<String>;
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Returns the first image URL, or an empty string when the provider
    /// answered without any image entry.
    async fn generate_image(&self, credential: Option<&Credential>, prompt: &str)
        -> Result<String>;
}

pub(crate) fn require_credential(credential: Option<&Credential>) -> Result<&Credential> {
    credential.ok_or(Error::MissingCredential)
}
