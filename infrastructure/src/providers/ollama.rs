//! Ollama gateway
//!
//! Local HTTP API:
//! - `POST /api/chat` - streamed chat completion (NDJSON)
//! - `GET /api/tags` - installed models
//! - `POST /api/pull` - download a model

use async_trait::async_trait;
use futures::StreamExt;
use gaia_application::{GatewayError, LlmGateway, StreamHandle};
use gaia_domain::{CompletionRequest, Message, StreamEvent};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

/// One NDJSON line of a `/api/chat` stream.
#[derive(Debug, Default, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    message: Option<ChunkMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    name: &'a str,
    stream: bool,
}

/// Gateway for a local (or LAN) Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaGateway {
    host: String,
    port: u16,
    client: reqwest::Client,
}

impl OllamaGateway {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    fn connection_error(&self, err: reqwest::Error) -> GatewayError {
        GatewayError::ConnectionError(format!(
            "failed to connect to API server at {}:{}: {}. Please ensure the server is running",
            self.host, self.port, err
        ))
    }

    /// Names of the installed models.
    pub async fn list_models(&self) -> Result<Vec<String>, GatewayError> {
        let url = format!("{}/api/tags", self.base_url());
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.connection_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::RequestFailed(format!(
                "API server returned status {}. Please check server configuration",
                status
            )));
        }

        let tags: TagsResponse = response.json().await.map_err(|e| {
            GatewayError::InvalidResponse(format!("failed to decode model list: {}", e))
        })?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Download `model`, waiting until the server reports completion.
    pub async fn pull_model(&self, model: &str) -> Result<(), GatewayError> {
        let url = format!("{}/api/pull", self.base_url());
        let response = self
            .client
            .post(&url)
            .json(&PullRequest {
                name: model,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| self.connection_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = body.trim();
            return Err(GatewayError::ModelNotAvailable(if body.is_empty() {
                format!("failed to pull model '{}': API returned status {}", model, status)
            } else {
                format!(
                    "failed to pull model '{}': API returned status {}. Response: {}",
                    model, status, body
                )
            }));
        }
        Ok(())
    }
}

#[async_trait]
impl LlmGateway for OllamaGateway {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        self.complete_streaming(request).await?.collect_text().await
    }

    async fn complete_streaming(
        &self,
        request: &CompletionRequest,
    ) -> Result<StreamHandle, GatewayError> {
        let url = format!("{}/api/chat", self.base_url());
        let response = self
            .client
            .post(&url)
            .json(&ChatRequest {
                model: &request.model,
                messages: &request.messages,
                stream: true,
            })
            .send()
            .await
            .map_err(|e| self.connection_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::RequestFailed(format!(
                "API server returned status {}: {}",
                status,
                body.trim()
            )));
        }

        let (tx, rx) = mpsc::channel(64);
        let mut stream = response.bytes_stream();
        tokio::spawn(async move {
            let mut decoder = NdjsonDecoder::default();
            let mut full_text = String::new();

            while let Some(chunk) = stream.next().await {
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                        return;
                    }
                };
                for line in decoder.push(&bytes) {
                    match parse_line(&line) {
                        Ok((content, done)) => {
                            if !content.is_empty() {
                                full_text.push_str(&content);
                                if tx.send(StreamEvent::Delta(content)).await.is_err() {
                                    return; // Receiver dropped
                                }
                            }
                            if done {
                                let _ = tx.send(StreamEvent::Completed(full_text)).await;
                                return;
                            }
                        }
                        Err(message) => {
                            let _ = tx.send(StreamEvent::Error(message)).await;
                            return;
                        }
                    }
                }
            }

            // Stream ended without a done marker; flush a trailing line
            if let Some(line) = decoder.finish()
                && let Ok((content, _)) = parse_line(&line)
                && !content.is_empty()
            {
                full_text.push_str(&content);
                let _ = tx.send(StreamEvent::Delta(content)).await;
            }
            let _ = tx.send(StreamEvent::Completed(full_text)).await;
        });

        Ok(StreamHandle::new(rx))
    }

    async fn ensure_model(&self, model: &str) -> Result<(), GatewayError> {
        if model.trim().is_empty() {
            return Err(GatewayError::ModelNotAvailable(
                "configuration error: model name is not set".to_string(),
            ));
        }
        let installed = self.list_models().await?;
        if model_exists(&installed, model) {
            debug!(model, "model already installed");
            return Ok(());
        }
        info!(model, "model not found, pulling");
        self.pull_model(model).await
    }
}

/// `(content, done)` for one stream line, or the error to report.
fn parse_line(line: &str) -> Result<(String, bool), String> {
    let chunk: ChatChunk = serde_json::from_str(line).map_err(|e| {
        format!(
            "failed to decode API response: {}. The server may be returning invalid or incomplete data",
            e
        )
    })?;
    if let Some(error) = chunk.error {
        return Err(error);
    }
    let content = chunk.message.map(|m| m.content).unwrap_or_default();
    Ok((content, chunk.done))
}

/// Splits a byte stream into complete, non-empty lines.
#[derive(Debug, Default)]
struct NdjsonDecoder {
    buffer: Vec<u8>,
}

impl NdjsonDecoder {
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line).trim().to_string();
            if !line.is_empty() {
                lines.push(line);
            }
        }
        lines
    }

    fn finish(&mut self) -> Option<String> {
        let rest = String::from_utf8_lossy(&std::mem::take(&mut self.buffer))
            .trim()
            .to_string();
        (!rest.is_empty()).then_some(rest)
    }
}

/// Whether `wanted` is among `installed`, ignoring case. A name without a
/// tag matches any tag of the same model (`llama3` matches `llama3:8b`).
pub fn model_exists(installed: &[String], wanted: &str) -> bool {
    let wanted = wanted.trim();
    if wanted.is_empty() {
        return false;
    }
    let wanted_has_tag = wanted.contains(':');
    let wanted_base = wanted.split(':').next().unwrap_or(wanted);

    installed
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .any(|name| {
            name.eq_ignore_ascii_case(wanted)
                || (!wanted_has_tag
                    && name
                        .split(':')
                        .next()
                        .is_some_and(|base| base.eq_ignore_ascii_case(wanted_base)))
        })
}
