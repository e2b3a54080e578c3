//! Provider configuration from TOML (`[provider]` section)

use gaia_application::Endpoint;
use serde::{Deserialize, Serialize};

/// Where completions are sent.
///
/// ```toml
/// [provider]
/// model = "mistral"
/// host = "localhost"   # "api.openai.com" / "api.mistral.ai" with port 443 for hosted APIs
/// port = 11434
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    pub model: String,
    pub host: String,
    pub port: u16,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            model: "mistral".to_string(),
            host: "localhost".to_string(),
            port: 11434,
        }
    }
}

impl FileProviderConfig {
    pub fn to_endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.trim(), self.port, self.model.trim())
    }
}
