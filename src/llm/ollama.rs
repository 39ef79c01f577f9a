//! Local Ollama server client.

use super::{CompletionProvider, LOCAL_CHAR_BUDGET, LlmError, post_json};

/// Configuration for the Ollama client.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL for the Ollama API.
    pub base_url: String,
    /// Model name to use.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            model: "qwen2.5:7b".into(),
            timeout_secs: 120,
        }
    }
}

/// Client for the Ollama `/api/generate` endpoint.
pub struct OllamaClient {
    config: OllamaConfig,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Self {
        Self { config }
    }

    /// Get the model name being used.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": 0.1,
                "num_predict": 4000,
            },
        })
    }
}

impl CompletionProvider for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    fn char_budget(&self) -> usize {
        LOCAL_CHAR_BUDGET
    }

    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.config.base_url.trim_end_matches('/'));
        let json = post_json(&url, &[], &self.request_body(prompt), self.config.timeout_secs)?;
        response_text(&json)
    }
}

fn response_text(json: &serde_json::Value) -> Result<String, LlmError> {
    json["response"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| LlmError::ParseError {
            message: "missing 'response' field".into(),
        })
}

impl std::fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}
