//! OpenAI Chat Completions client.

use super::{CompletionProvider, HOSTED_CHAR_BUDGET, LlmError, post_json, read_api_key};

const SYSTEM_PROMPT: &str = "You analyze the structure of Arabic books. Reply with a single JSON object and nothing else.";

/// Configuration for the OpenAI client.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            model: "gpt-4o-mini".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            timeout_secs: 120,
        }
    }
}

pub struct OpenAiClient {
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        Self { config }
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "temperature": 0.1,
            "max_tokens": 4000,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt},
            ],
        })
    }
}

impl CompletionProvider for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    fn char_budget(&self) -> usize {
        HOSTED_CHAR_BUDGET
    }

    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let key = read_api_key(self.name(), &self.config.api_key_env)?;
        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let auth = format!("Bearer {key}");
        let headers = [("Authorization", auth.as_str())];
        let json = post_json(&url, &headers, &self.request_body(prompt), self.config.timeout_secs)?;
        response_text(&json)
    }
}

fn response_text(json: &serde_json::Value) -> Result<String, LlmError> {
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| LlmError::ParseError {
            message: "missing 'choices[0].message.content'".into(),
        })
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
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
        let client = OpenAiClient::new(OpenAiConfig {
            api_key_env: "FIHRIS_TEST_NO_OPENAI_KEY".into(),
            ..Default::default()
        });
        assert!(matches!(
            client.complete("x"),
            Err(LlmError::MissingCredential { .. })
        ));
    }

    #[test]
    fn extracts_first_choice() {
        let json = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "{}"}}]
        });
        assert_eq!(response_text(&json).unwrap(), "{}");
        assert!(response_text(&serde_json::json!({"choices": []})).is_err());
    }

    #[test]
    fn request_asks_for_json_object() {
        let body = OpenAiClient::new(OpenAiConfig::default()).request_body("p");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][1]["content"], "p");
    }
}
