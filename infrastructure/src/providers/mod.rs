//! Model provider adapters implementing [`LlmGateway`](gaia_application::LlmGateway)

pub mod ollama;
pub mod openai_compat;
pub mod routing;

pub use ollama::OllamaGateway;
pub use openai_compat::OpenAiCompatibleGateway;
pub use routing::gateway_for;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Ollama,
    OpenAi,
    Mistral,
}
