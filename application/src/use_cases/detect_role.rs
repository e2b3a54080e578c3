//! Detect Role use case.
//!
//! Picks the system-prompt role for a message: explicit choice first, then
//! the keyword heuristic, then (in hybrid mode) a one-word LLM
//! classification, falling back to `default`.

use crate::config::DetectionSettings;
use crate::ports::cache::{DetectionCache, NoCache};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use gaia_domain::role::heuristic;
use gaia_domain::{
    CompletionRequest, DetectionMethod, DetectionResult, Message, classification_prompt,
    parse_classification,
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Heuristic matches at or below this score are ignored.
pub const HEURISTIC_ACCEPT_SCORE: f64 = 0.3;

/// Detection degrades to `default` on every failure except cancellation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectRoleError {
    #[error("Operation cancelled")]
    Cancelled,
}

pub struct DetectRoleUseCase {
    gateway: Arc<dyn LlmGateway>,
    model: String,
    settings: DetectionSettings,
    cache: Arc<dyn DetectionCache>,
    cancellation_token: Option<CancellationToken>,
}

impl DetectRoleUseCase {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        model: impl Into<String>,
        settings: DetectionSettings,
    ) -> Self {
        Self {
            gateway,
            model: model.into(),
            settings,
            cache: Arc::new(NoCache),
            cancellation_token: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn DetectionCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Abort the classification call when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn settings(&self) -> &DetectionSettings {
        &self.settings
    }

    /// Every problem other than cancellation degrades to the default role.
    pub async fn execute(
        &self,
        message: &str,
        explicit_role: Option<&str>,
    ) -> Result<DetectionResult, DetectRoleError> {
        if let Some(role) = explicit_role.map(str::trim).filter(|r| !r.is_empty()) {
            debug!(role, "Using explicit role");
            return Ok(DetectionResult::explicit(role));
        }

        if !self.settings.enabled {
            return Ok(DetectionResult::fallback("auto-role detection disabled"));
        }

        let available = self.settings.available_roles();

        match self.cache.get(message, &available).await {
            Ok(Some(cached)) => {
                debug!(
                    role = %cached.role,
                    method = %cached.method.as_str(),
                    "Using cached role detection"
                );
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Detection cache read failed"),
        }

        let result = self
            .detect_uncached(message, &available)
            .await?
            .unwrap_or_else(|| DetectionResult::fallback("no role detected, using default"));

        if let Err(e) = self.cache.put(message, &available, &result).await {
            warn!(error = %e, "Detection cache write failed");
        }

        debug!(
            role = %result.role,
            method = %result.method.as_str(),
            score = result.score,
            reason = %result.reason,
            "Auto-detected role"
        );
        Ok(result)
    }

    async fn detect_uncached(
        &self,
        message: &str,
        available: &[String],
    ) -> Result<Option<DetectionResult>, DetectRoleError> {
        let mode = self.settings.mode;

        if mode.uses_heuristic()
            && let Some(m) = heuristic::detect(message, available, &self.settings.keywords)
            && !m.role.is_empty()
            && m.score > HEURISTIC_ACCEPT_SCORE
        {
            return Ok(Some(
                DetectionResult::new(m.role, DetectionMethod::Heuristic, m.reason)
                    .with_score(m.score),
            ));
        }

        if mode.uses_llm() {
            match self.classify(message, available).await {
                Ok((role, reason)) => {
                    return Ok(Some(DetectionResult::new(role, DetectionMethod::Llm, reason)));
                }
                Err(GatewayError::Cancelled) => return Err(DetectRoleError::Cancelled),
                Err(e) => warn!(error = %e, "LLM role detection failed, falling back to default"),
            }
        }

        Ok(None)
    }

    async fn classify(
        &self,
        message: &str,
        available: &[String],
    ) -> Result<(String, &'static str), GatewayError> {
        let request = CompletionRequest::new(&self.model)
            .with_message(Message::system(&self.settings.classifier_system_prompt))
            .with_message(Message::user(classification_prompt(message, available)));
        let token = self.cancellation_token.clone().unwrap_or_default();
        let reply = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(GatewayError::Cancelled),
            reply = self.gateway.complete(&request) => reply?,
        };
        Ok(parse_classification(&reply, available))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::cache::CacheError;
    use async_trait::async_trait;
    use gaia_domain::{DetectionMode, Role};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct Classifier {
        reply: Result<String, ()>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl Classifier {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LlmGateway for Classifier {
        fn provider_name(&self) -> &str {
            "classifier"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
            self.requests.lock().unwrap().push(request.clone());
            self.reply
                .clone()
                .map_err(|_| GatewayError::ConnectionError("refused".to_string()))
        }
    }

    #[derive(Default)]
    struct MemoryCache {
        entries: Mutex<HashMap<String, DetectionResult>>,
    }

    fn cache_key(message: &str, roles: &[String]) -> String {
        format!("{}|{}", message, roles.join(","))
    }

    #[async_trait]
    impl DetectionCache for MemoryCache {
        async fn get(
            &self,
            message: &str,
            available_roles: &[String],
        ) -> Result<Option<DetectionResult>, CacheError> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .get(&cache_key(message, available_roles))
                .cloned())
        }

        async fn put(
            &self,
            message: &str,
            available_roles: &[String],
            result: &DetectionResult,
        ) -> Result<(), CacheError> {
            self.entries
                .lock()
                .unwrap()
                .insert(cache_key(message, available_roles), result.clone());
            Ok(())
        }
    }

    fn settings() -> DetectionSettings {
        DetectionSettings::default()
            .with_roles(["shell", "code", "describe", "commit", "branch"])
            .with_classifier_system_prompt("You are a helpful assistant.")
    }

    #[tokio::test]
    async fn test_explicit_role_wins_even_when_disabled() {
        let gateway = Classifier::replying("code");
        let uc = DetectRoleUseCase::new(gateway.clone(), "m", settings().with_enabled(false));
        let result = uc.execute("run ls -la", Some("commit")).await.unwrap();
        assert_eq!(result, DetectionResult::explicit("commit"));
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_disabled_returns_default() {
        let uc = DetectRoleUseCase::new(
            Classifier::replying("code"),
            "m",
            settings().with_enabled(false),
        );
        let result = uc.execute("run ls -la", None).await.unwrap();
        assert_eq!(result.role, "default");
        assert_eq!(result.method, DetectionMethod::Default);
        assert_eq!(result.reason, "auto-role detection disabled");
    }

    #[tokio::test]
    async fn test_heuristic_match_skips_llm() {
        let gateway = Classifier::replying("code");
        let uc = DetectRoleUseCase::new(gateway.clone(), "m", settings());
        let result = uc.execute("run ls -la", None).await.unwrap();
        assert_eq!(result.role, "shell");
        assert_eq!(result.method, DetectionMethod::Heuristic);
        assert!(result.score > HEURISTIC_ACCEPT_SCORE);
        assert!(result.reason.starts_with("matched "));
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_hybrid_falls_back_to_llm() {
        let gateway = Classifier::replying("\"Describe.\"");
        let uc = DetectRoleUseCase::new(gateway.clone(), "llama3", settings());
        let result = uc.execute("Ponder the universe with me", None).await.unwrap();
        assert_eq!(result.role, "describe");
        assert_eq!(result.method, DetectionMethod::Llm);
        assert_eq!(result.reason, "LLM selected based on message analysis");

        let requests = gateway.requests.lock().unwrap();
        assert_eq!(requests[0].model, "llama3");
        assert_eq!(requests[0].messages[0].role, Role::System);
        assert_eq!(requests[0].messages[0].content, "You are a helpful assistant.");
        assert!(requests[0].messages[1]
            .content
            .contains("Available roles: default, shell, code, describe, commit, branch"));
    }

    #[tokio::test]
    async fn test_llm_unknown_role_maps_to_default() {
        let uc = DetectRoleUseCase::new(Classifier::replying("poet"), "m", settings());
        let result = uc.execute("Ponder the universe with me", None).await.unwrap();
        assert_eq!(result.role, "default");
        assert_eq!(result.method, DetectionMethod::Llm);
    }

    #[tokio::test]
    async fn test_llm_error_falls_back() {
        let uc = DetectRoleUseCase::new(Classifier::failing(), "m", settings());
        let result = uc.execute("Ponder the universe with me", None).await.unwrap();
        assert_eq!(
            result,
            DetectionResult::fallback("no role detected, using default")
        );
    }

    #[tokio::test]
    async fn test_heuristic_mode_never_calls_llm() {
        let gateway = Classifier::replying("describe");
        let uc = DetectRoleUseCase::new(
            gateway.clone(),
            "m",
            settings().with_mode(DetectionMode::Heuristic),
        );
        let result = uc.execute("Ponder the universe with me", None).await.unwrap();
        assert_eq!(result.method, DetectionMethod::Default);
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_off_mode_skips_both() {
        let gateway = Classifier::replying("describe");
        let uc = DetectRoleUseCase::new(gateway.clone(), "m", settings().with_mode(DetectionMode::Off));
        let result = uc.execute("run ls -la", None).await.unwrap();
        assert_eq!(result.role, "default");
        assert_eq!(gateway.calls(), 0);
    }

    /// Never answers; only cancellation ends a call.
    struct Stalled;

    #[async_trait]
    impl LlmGateway for Stalled {
        fn provider_name(&self) -> &str {
            "stalled"
        }

        async fn complete(&self, _request: &CompletionRequest) -> Result<String, GatewayError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_cancel_during_classification_is_not_cached() {
        let cache = Arc::new(MemoryCache::default());
        let token = CancellationToken::new();
        let uc = DetectRoleUseCase::new(Arc::new(Stalled), "m", settings())
            .with_cache(cache.clone())
            .with_cancellation(token.clone());

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            canceller.cancel();
        });
        let result = tokio::time::timeout(
            std::time::Duration::from_secs(2),
            uc.execute("Ponder the universe with me", None),
        )
        .await
        .unwrap();

        assert_eq!(result, Err(DetectRoleError::Cancelled));
        assert!(cache.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_result_cached() {
        let gateway = Classifier::replying("describe");
        let cache = Arc::new(MemoryCache::default());
        let uc = DetectRoleUseCase::new(gateway.clone(), "m", settings()).with_cache(cache.clone());

        let first = uc.execute("Ponder the universe with me", None).await.unwrap();
        let second = uc.execute("Ponder the universe with me", None).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(gateway.calls(), 1);
        assert_eq!(cache.entries.lock().unwrap().len(), 1);
    }
}
