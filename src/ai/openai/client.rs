use super::types::{ChatCompletionRequest, ChatCompletionResponse};
use crate::models::Credential;
use crate::{Error, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Shared transport for the OpenAI endpoints. Holds no credential; each call
/// supplies its own.
#[derive(Clone)]
pub struct OpenAiHttpClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
}

impl OpenAiHttpClient {
    pub fn new() -> Self {
        Self::new_with_client(Client::new())
    }

    pub fn new_with_client(client: Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub async fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        path: &str,
        credential: &Credential,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(credential.expose())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to OpenAI: {}", e);
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("OpenAI API error (status {}): {}", status, body);
            return Err(Error::Provider {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse OpenAI response: {}", e);
            Error::Decode(e.to_string())
        })
    }

    pub async fn chat_completion(
        &self,
        credential: &Credential,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        self.post("/v1/chat/completions", credential, &request).await
    }
}

impl Default for OpenAiHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_post_sends_bearer_and_json_content_type() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/ping"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let http = OpenAiHttpClient::new().with_base_url(server.uri());
        let credential = Credential::new("sk-test").unwrap();

        let body: serde_json::Value = http
            .post("/v1/ping", &credential, &serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_non_success_maps_to_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let http = OpenAiHttpClient::new().with_base_url(server.uri());
        let credential = Credential::new("sk-bad").unwrap();

        let err = http
            .post::<_, serde_json::Value>("/v1/ping", &credential, &serde_json::json!({}))
            .await
            .unwrap_err();

        match err {
            Error::Provider {
                status,
                status_text,
                body,
            } => {
                assert_eq!(status, 401);
                assert_eq!(status_text, "Unauthorized");
                assert_eq!(body, "invalid api key");
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let http = OpenAiHttpClient::new().with_base_url(server.uri());
        let credential = Credential::new("sk-test").unwrap();

        let err = http
            .post::<_, serde_json::Value>("/v1/ping", &credential, &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let http = OpenAiHttpClient::new().with_base_url(format!("http://127.0.0.1:{}", port));
        let credential = Credential::new("sk-test").unwrap();

        let err = http
            .post::<_, serde_json::Value>("/v1/ping", &credential, &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
