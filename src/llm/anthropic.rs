//! Anthropic Messages API client.

use super::{CompletionProvider, HOSTED_CHAR_BUDGET, LlmError, post_json, read_api_key};

const API_VERSION: &str = "2023-06-01";

/// Configuration for the Anthropic client.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".into(),
            model: "claude-3-haiku-20240307".into(),
            api_key_env: "ANTHROPIC_API_KEY".into(),
            timeout_secs: 120,
        }
    }
}

pub struct AnthropicClient {
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Self {
        Self { config }
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "max_tokens": 4000,
            "temperature": 0.1,
            "messages": [
                {"role": "user", "content": prompt},
            ],
        })
    }
}

impl CompletionProvider for AnthropicClient {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn char_budget(&self) -> usize {
        HOSTED_CHAR_BUDGET
    }

    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let key = read_api_key(self.name(), &self.config.api_key_env)?;
        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));
        let headers = [("x-api-key", key.as_str()), ("anthropic-version", API_VERSION)];
        let json = post_json(&url, &headers, &self.request_body(prompt), self.config.timeout_secs)?;
        response_text(&json)
    }
}

/// Concatenate the text blocks of a Messages API reply.
fn response_text(json: &serde_json::Value) -> Result<String, LlmError> {
    let blocks = json["content"].as_array().ok_or_else(|| LlmError::ParseError {
        message: "missing 'content' array".into(),
    })?;

    Ok(blocks
        .iter()
        .filter(|b| b["type"] == "text")
        .filter_map(|b| b["text"].as_str())
        .collect())
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("api_key_env", &self.config.api_key_env)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_surfaces_at_call_time() {
        let client = AnthropicClient::new(AnthropicConfig {
            api_key_env: "FIHRIS_TEST_NO_ANTHROPIC_KEY".into(),
            ..Default::default()
        });
        let err = client.complete("x").unwrap_err();
        assert!(matches!(err, LlmError::MissingCredential { .. }));
    }

    #[test]
    fn joins_text_blocks() {
        let json = serde_json::json!({
            "content": [
                {"type": "text", "text": "{\"toc\":"},
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": " []}"},
            ]
        });
        assert_eq!(response_text(&json).unwrap(), "{\"toc\": []}");
        assert!(response_text(&serde_json::json!({"error": {}})).is_err());
    }

    #[test]
    fn request_body_shape() {
        let client = AnthropicClient::new(AnthropicConfig::default());
        let body = client.request_body("hello");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(body["max_tokens"], 4000);
    }
}
