//! LLM Gateway port
//!
//! Defines the interface for communicating with LLM providers.

use async_trait::async_trait;
use gaia_domain::{CompletionRequest, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Missing credentials: {0} environment variable is not set")]
    MissingCredentials(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Gateway for LLM communication
///
/// This port defines how the application layer talks to a model backend.
/// Implementations (adapters) live in the infrastructure layer; callers never
/// know which backend serves a request.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Short provider name (e.g. "ollama"), used in cache keys and logs
    fn provider_name(&self) -> &str;

    /// Send a request and wait for the complete reply text
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError>;

    /// Send a request and receive the reply incrementally.
    ///
    /// Default implementation calls `complete()` and wraps the result in a
    /// single `Completed` event.
    async fn complete_streaming(
        &self,
        request: &CompletionRequest,
    ) -> Result<StreamHandle, GatewayError> {
        let result = self.complete(request).await?;
        let (tx, rx) = mpsc::channel(1);
        // Receiver may already be gone; nothing to do then
        let _ = tx.send(StreamEvent::Completed(result)).await;
        Ok(StreamHandle::new(rx))
    }

    /// Make sure `model` can serve requests (pulling it if the backend
    /// supports that). Remote APIs validate server-side, so the default is
    /// a no-op.
    async fn ensure_model(&self, _model: &str) -> Result<(), GatewayError> {
        Ok(())
    }
}

/// Handle for receiving streaming events from a completion.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Consume the stream, forwarding each chunk to `on_chunk`, and return
    /// the full text.
    pub async fn collect_with<F>(mut self, mut on_chunk: F) -> Result<String, GatewayError>
    where
        F: FnMut(&str) + Send,
    {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => {
                    on_chunk(&chunk);
                    full_text.push_str(&chunk);
                }
                StreamEvent::Completed(text) => {
                    if full_text.is_empty() {
                        on_chunk(&text);
                        return Ok(text);
                    }
                    return Ok(full_text);
                }
                StreamEvent::Error(e) => return Err(GatewayError::RequestFailed(e)),
            }
        }
        // Channel closed without Completed: return what we have
        Ok(full_text)
    }

    /// Consume the stream and collect all text into a single string.
    pub async fn collect_text(self) -> Result<String, GatewayError> {
        self.collect_with(|_| {}).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGateway;

    #[async_trait]
    impl LlmGateway for FixedGateway {
        fn provider_name(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, _request: &CompletionRequest) -> Result<String, GatewayError> {
            Ok("hello".to_string())
        }
    }

    #[tokio::test]
    async fn test_default_streaming_wraps_complete() {
        let handle = FixedGateway
            .complete_streaming(&CompletionRequest::new("m"))
            .await
            .unwrap();
        let mut chunks = Vec::new();
        let text = handle
            .collect_with(|c| chunks.push(c.to_string()))
            .await
            .unwrap();
        assert_eq!(text, "hello");
        assert_eq!(chunks, ["hello"]);
    }

    #[tokio::test]
    async fn test_collect_deltas_then_completed() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(StreamEvent::Delta("he".into())).await.unwrap();
        tx.send(StreamEvent::Delta("llo".into())).await.unwrap();
        tx.send(StreamEvent::Completed("hello".into())).await.unwrap();
        drop(tx);
        assert_eq!(StreamHandle::new(rx).collect_text().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_stream_error_surfaces() {
        let (tx, rx) = mpsc::channel(2);
        tx.send(StreamEvent::Delta("partial".into())).await.unwrap();
        tx.send(StreamEvent::Error("boom".into())).await.unwrap();
        drop(tx);
        let err = StreamHandle::new(rx).collect_text().await.unwrap_err();
        assert!(matches!(err, GatewayError::RequestFailed(msg) if msg == "boom"));
    }

    #[tokio::test]
    async fn test_ensure_model_default_is_ok() {
        assert!(FixedGateway.ensure_model("anything").await.is_ok());
    }
}
