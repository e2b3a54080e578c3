//! OpenAI-compatible chat completions gateway (OpenAI, Mistral)

use async_trait::async_trait;
use gaia_application::{GatewayError, LlmGateway};
use gaia_domain::{CompletionRequest, Message};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

/// Gateway for a hosted API speaking `POST /v1/chat/completions`.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleGateway {
    name: String,
    base_url: String,
    api_key_env: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl OpenAiCompatibleGateway {
    /// `api_key_env` is read on each request unless a key was set with
    /// [`with_api_key`](Self::with_api_key).
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key_env: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key_env: api_key_env.into(),
            api_key: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn openai() -> Self {
        Self::new("openai", "https://api.openai.com", "OPENAI_API_KEY")
    }

    pub fn mistral() -> Self {
        Self::new("mistral", "https://api.mistral.ai", "MISTRAL_API_KEY")
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn resolve_api_key(&self) -> Result<String, GatewayError> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GatewayError::MissingCredentials(self.api_key_env.clone()))
    }
}

#[async_trait]
impl LlmGateway for OpenAiCompatibleGateway {
    fn provider_name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        let api_key = self.resolve_api_key()?;

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&ChatCompletionRequest {
                model: &request.model,
                messages: &request.messages,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| {
                GatewayError::ConnectionError(format!("failed to call {} API: {}", self.name, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GatewayError::RequestFailed(format!(
                "{} API error: {} - {}",
                self.name, status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            GatewayError::InvalidResponse(format!(
                "failed to decode {} response: {}",
                self.name, e
            ))
        })?;

        parse_completion(completion, &self.name)
    }
}

fn parse_completion(
    completion: ChatCompletionResponse,
    provider: &str,
) -> Result<String, GatewayError> {
    completion
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| {
            GatewayError::InvalidResponse(format!("{} response contained no choices", provider))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let gateway = OpenAiCompatibleGateway::new("local", "http://localhost:8080/", "X");
        assert_eq!(gateway.endpoint(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(
            OpenAiCompatibleGateway::mistral().endpoint(),
            "https://api.mistral.ai/v1/chat/completions"
        );
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let gateway = OpenAiCompatibleGateway::new("t", "http://x", "GAIA_TEST_UNSET_KEY_VAR")
            .with_api_key("sk-test");
        assert_eq!(gateway.resolve_api_key().unwrap(), "sk-test");
    }

    #[test]
    fn test_missing_api_key() {
        let gateway = OpenAiCompatibleGateway::new("t", "http://x", "GAIA_TEST_UNSET_KEY_VAR");
        let err = gateway.resolve_api_key().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing credentials: GAIA_TEST_UNSET_KEY_VAR environment variable is not set"
        );
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_any_request() {
        let gateway = OpenAiCompatibleGateway::new("t", "http://127.0.0.1:9", "GAIA_TEST_UNSET_KEY_VAR");
        let err = gateway
            .complete(&CompletionRequest::new("gpt-4o-mini"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::MissingCredentials(_)));
    }

    #[test]
    fn test_parse_completion() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"hi there"}}]}"#;
        let completion: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parse_completion(completion, "openai").unwrap(), "hi there");

        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            parse_completion(empty, "openai"),
            Err(GatewayError::InvalidResponse(_))
        ));
    }
}
