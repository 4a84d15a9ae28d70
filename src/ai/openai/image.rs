use super::client::OpenAiHttpClient;
use super::types::{ImageGenerationRequest, ImageGenerationResponse};
use crate::ai::{require_credential, ImageGenerationService};
use crate::models::Credential;
use crate::Result;
use async_trait::async_trait;

pub const IMAGE_MODEL: &str = "dall-e-3";
pub const IMAGE_SIZE: &str = "1024x1024";
pub const IMAGE_QUALITY: &str = "standard";
/// Provider limit on prompt length, in characters.
pub const MAX_PROMPT_CHARS: usize = 4000;

pub struct OpenAiImageClient {
    http: OpenAiHttpClient,
}

impl OpenAiImageClient {
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

impl Default for OpenAiImageClient {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate_prompt(prompt: &str) -> &str {
    match prompt.char_indices().nth(MAX_PROMPT_CHARS) {
        Some((byte_index, _)) => &prompt[..byte_index],
        None => prompt,
    }
}

#[async_trait]
impl ImageGenerationService for OpenAiImageClient {
    async fn generate_image(
        &self,
        credential: Option<&Credential>,
        prompt: &str,
    ) -> Result<String> {
        let credential = require_credential(credential)?;

        let request = ImageGenerationRequest {
            model: IMAGE_MODEL.to_string(),
            prompt: truncate_prompt(prompt).to_string(),
            n: 1,
            size: IMAGE_SIZE.to_string(),
            quality: IMAGE_QUALITY.to_string(),
        };

        let response: ImageGenerationResponse = self
            .http
            .post("/v1/images/generations", credential, &request)
            .await?;

        match response.data.into_iter().next().and_then(|image| image.url) {
            Some(url) => Ok(url),
            None => {
                tracing::warn!("OpenAI returned no image URL");
                Ok(String::new())
            }
        }
    }
}
