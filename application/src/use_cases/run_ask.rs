//! Run Ask use case.
//!
//! Answers one message: pick a role, build the request (system prompt,
//! prior history, the message), serve it from the response cache when
//! possible, otherwise complete it and remember the answer. `chat` calls
//! this once per line with a shared [`ChatHistory`].

use crate::config::{Endpoint, RoleCatalog};
use crate::ports::cache::{NoCache, ResponseCache, ResponseCacheKey};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::progress::{NoResponseProgress, ResponseProgressNotifier};
use crate::use_cases::detect_role::{DetectRoleError, DetectRoleUseCase};
use gaia_domain::util::truncate_str;
use gaia_domain::{ChatHistory, CompletionRequest, DetectionResult, Message};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum RunAskError {
    #[error("no message provided")]
    EmptyMessage,

    #[error("Gateway error: {0}")]
    GatewayError(#[from] GatewayError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl From<DetectRoleError> for RunAskError {
    fn from(e: DetectRoleError) -> Self {
        match e {
            DetectRoleError::Cancelled => RunAskError::Cancelled,
        }
    }
}

/// How the response cache is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Read, and write on a miss
    #[default]
    Use,
    /// Skip the read, write the fresh answer
    Refresh,
    /// Neither read nor write
    Bypass,
}

impl CacheMode {
    /// `--no-cache` wins over `--refresh-cache`.
    pub fn from_flags(no_cache: bool, refresh_cache: bool) -> Self {
        if no_cache {
            CacheMode::Bypass
        } else if refresh_cache {
            CacheMode::Refresh
        } else {
            CacheMode::Use
        }
    }

    pub fn reads(&self) -> bool {
        matches!(self, CacheMode::Use)
    }

    pub fn writes(&self) -> bool {
        !matches!(self, CacheMode::Bypass)
    }
}

#[derive(Debug, Clone)]
pub struct RunAskInput {
    pub message: String,
    /// `--role`; skips detection when set
    pub explicit_role: Option<String>,
    pub cache_mode: CacheMode,
}

impl RunAskInput {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            explicit_role: None,
            cache_mode: CacheMode::default(),
        }
    }

    pub fn with_role(mut self, role: Option<String>) -> Self {
        self.explicit_role = role;
        self
    }

    pub fn with_cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }
}

#[derive(Debug, Clone)]
pub struct RunAskOutput {
    pub response: String,
    pub detection: DetectionResult,
    pub from_cache: bool,
}

pub struct RunAskUseCase {
    gateway: Arc<dyn LlmGateway>,
    endpoint: Endpoint,
    roles: RoleCatalog,
    detector: DetectRoleUseCase,
    cache: Arc<dyn ResponseCache>,
    model_ready: AtomicBool,
    cancellation_token: Option<CancellationToken>,
}

impl RunAskUseCase {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        endpoint: Endpoint,
        roles: RoleCatalog,
        detector: DetectRoleUseCase,
    ) -> Self {
        Self {
            gateway,
            endpoint,
            roles,
            detector,
            cache: Arc::new(NoCache),
            model_ready: AtomicBool::new(false),
            cancellation_token: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Also handed to the role detector.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.detector = self.detector.with_cancellation(token.clone());
        self.cancellation_token = Some(token);
        self
    }

    pub async fn execute(
        &self,
        input: RunAskInput,
        history: &mut ChatHistory,
    ) -> Result<RunAskOutput, RunAskError> {
        self.execute_with_progress(input, history, &NoResponseProgress)
            .await
    }

    /// Answer `input.message`. On success the exchange is appended to
    /// `history`.
    pub async fn execute_with_progress(
        &self,
        input: RunAskInput,
        history: &mut ChatHistory,
        progress: &dyn ResponseProgressNotifier,
    ) -> Result<RunAskOutput, RunAskError> {
        let message = input.message.trim();
        if message.is_empty() {
            return Err(RunAskError::EmptyMessage);
        }
        info!("Ask: {}", truncate_str(message, 100));

        self.ensure_model().await?;

        let detection = self
            .detector
            .execute(message, input.explicit_role.as_deref())
            .await?;
        progress.on_role_detected(&detection);

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(self.roles.render(&detection.role)));
        messages.extend(history.messages().iter().cloned());
        messages.push(Message::user(message));

        let key = ResponseCacheKey {
            provider: self.gateway.provider_name().to_string(),
            host: self.endpoint.host.clone(),
            port: self.endpoint.port,
            model: self.endpoint.model.clone(),
            system_role: detection.role.clone(),
            role_template: self.roles.template(&detection.role).to_string(),
            messages: messages.clone(),
        };

        if input.cache_mode.reads() {
            match self.cache.get(&key).await {
                Ok(Some(cached)) => {
                    debug!(role = %detection.role, "Response served from cache");
                    progress.on_chunk(&cached);
                    history.push_user(message);
                    history.push_assistant(cached.clone());
                    return Ok(RunAskOutput {
                        response: cached,
                        detection,
                        from_cache: true,
                    });
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Response cache read failed"),
            }
        }

        let request = CompletionRequest::new(&self.endpoint.model).with_messages(messages);
        let response = self.complete(&request, progress).await?;

        if input.cache_mode.writes()
            && let Err(e) = self.cache.put(&key, &response).await
        {
            warn!(error = %e, "Response cache write failed");
        }

        history.push_user(message);
        history.push_assistant(response.clone());

        Ok(RunAskOutput {
            response,
            detection,
            from_cache: false,
        })
    }

    /// A pull can take minutes, so it is raced against cancellation too.
    async fn ensure_model(&self) -> Result<(), RunAskError> {
        if self.model_ready.load(Ordering::Acquire) {
            return Ok(());
        }
        let token = self.cancellation_token.clone().unwrap_or_default();
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(RunAskError::Cancelled),
            result = self.gateway.ensure_model(&self.endpoint.model) => result,
        };
        match result {
            Err(GatewayError::Cancelled) => return Err(RunAskError::Cancelled),
            other => other?,
        }
        self.model_ready.store(true, Ordering::Release);
        Ok(())
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
        progress: &dyn ResponseProgressNotifier,
    ) -> Result<String, RunAskError> {
        let token = self.cancellation_token.clone().unwrap_or_default();
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(RunAskError::Cancelled),
            result = async {
                let stream = self.gateway.complete_streaming(request).await?;
                stream.collect_with(|chunk| progress.on_chunk(chunk)).await
            } => result,
        };
        match result {
            Err(GatewayError::Cancelled) => Err(RunAskError::Cancelled),
            other => Ok(other?),
        }
    }
}
