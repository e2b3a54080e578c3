//! Backend selection from the configured host and port.
//!
//! Routing priority:
//!  1. host contains `api.openai.com` on port 443 → OpenAI
//!  2. host contains `api.mistral.ai` on port 443 → Mistral
//!  3. anything else → Ollama at `http://host:port`

use super::ProviderKind;
use super::ollama::OllamaGateway;
use super::openai_compat::OpenAiCompatibleGateway;
use gaia_application::{Endpoint, LlmGateway};
use std::sync::Arc;
use tracing::debug;

/// The Ollama default model; hosted APIs substitute their own default for it.
const OLLAMA_DEFAULT_MODEL: &str = "mistral";

impl ProviderKind {
    pub fn detect(host: &str, port: u16) -> Self {
        let host = host.trim().to_lowercase();
        if port == 443 && host.contains("api.openai.com") {
            ProviderKind::OpenAi
        } else if port == 443 && host.contains("api.mistral.ai") {
            ProviderKind::Mistral
        } else {
            ProviderKind::Ollama
        }
    }

    /// Model to request given the configured one.
    pub fn effective_model(&self, configured: &str) -> String {
        let configured = configured.trim();
        let untouched = configured.is_empty() || configured == OLLAMA_DEFAULT_MODEL;
        match self {
            ProviderKind::OpenAi if untouched => "gpt-4o-mini".to_string(),
            ProviderKind::Mistral if untouched => "mistral-medium-latest".to_string(),
            _ => configured.to_string(),
        }
    }
}

/// The gateway serving `endpoint`, plus the endpoint with its model
/// resolved for that backend.
pub fn gateway_for(endpoint: &Endpoint) -> (Arc<dyn LlmGateway>, Endpoint) {
    let kind = ProviderKind::detect(&endpoint.host, endpoint.port);
    let resolved = Endpoint::new(
        endpoint.host.clone(),
        endpoint.port,
        kind.effective_model(&endpoint.model),
    );
    debug!(provider = ?kind, model = %resolved.model, "selected provider");

    let gateway: Arc<dyn LlmGateway> = match kind {
        ProviderKind::OpenAi => Arc::new(OpenAiCompatibleGateway::openai()),
        ProviderKind::Mistral => Arc::new(OpenAiCompatibleGateway::mistral()),
        ProviderKind::Ollama => Arc::new(OllamaGateway::new(
            endpoint.host.clone(),
            endpoint.port,
        )),
    };
    (gateway, resolved)
}
