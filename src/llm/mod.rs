//! Completion providers for semantic TOC parsing.
//!
//! A provider turns one prompt into one reply string. Three HTTP-backed
//! providers are available: a local Ollama server and the hosted Anthropic
//! and OpenAI APIs. Each is an explicit handle owned by the caller; nothing
//! here is global. Hosted credentials are read from the environment when a
//! request is made, so constructing a client never fails.

pub mod anthropic;
pub mod ollama;
pub mod openai;

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

use crate::config::{ProviderConfig, ProviderKind};

pub use anthropic::{AnthropicClient, AnthropicConfig};
pub use ollama::{OllamaClient, OllamaConfig};
pub use openai::{OpenAiClient, OpenAiConfig};

/// Prompt budget, in characters, for a local model server.
pub const LOCAL_CHAR_BUDGET: usize = 10_000;
/// Prompt budget, in characters, for hosted APIs.
pub const HOSTED_CHAR_BUDGET: usize = 50_000;

/// Errors from the completion providers.
#[derive(Debug, Error, Diagnostic)]
pub enum LlmError {
    #[error("completion provider is not reachable at {url}")]
    #[diagnostic(
        code(fihris::llm::unavailable),
        help("Start the model server (e.g. `ollama serve`) or choose another provider with --provider.")
    )]
    Unavailable { url: String },

    #[error("completion request failed: {message}")]
    #[diagnostic(
        code(fihris::llm::request_failed),
        help("Check the provider URL, the model name, and that the model is available.")
    )]
    RequestFailed { message: String },

    #[error("failed to parse provider response: {message}")]
    #[diagnostic(
        code(fihris::llm::parse_error),
        help("The provider returned an unexpected response format.")
    )]
    ParseError { message: String },

    #[error("completion request timed out after {timeout_secs}s")]
    #[diagnostic(
        code(fihris::llm::timeout),
        help("Increase `provider.timeout_secs` or use a smaller model.")
    )]
    Timeout { timeout_secs: u64 },

    #[error("no API key for {provider}: environment variable {env_var} is not set")]
    #[diagnostic(
        code(fihris::llm::missing_credential),
        help("Export {env_var} or set `provider.api_key_env` to the variable holding the key.")
    )]
    MissingCredential { provider: String, env_var: String },
}

/// A text-completion capability.
///
/// Replies are untrusted free text; callers must validate whatever they
/// extract from them.
pub trait CompletionProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Maximum number of input characters worth sending in one prompt.
    fn char_budget(&self) -> usize;

    /// Send `prompt` and return the reply text.
    fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Build the provider selected by `config`, or `None` when disabled.
pub fn provider_from_config(config: &ProviderConfig) -> Option<Box<dyn CompletionProvider>> {
    match config.kind {
        ProviderKind::None => None,
        ProviderKind::Ollama => {
            let defaults = OllamaConfig::default();
            Some(Box::new(OllamaClient::new(OllamaConfig {
                base_url: config.base_url.clone().unwrap_or(defaults.base_url),
                model: config.model.clone().unwrap_or(defaults.model),
                timeout_secs: config.timeout_secs,
            })))
        }
        ProviderKind::Anthropic => {
            let defaults = AnthropicConfig::default();
            Some(Box::new(AnthropicClient::new(AnthropicConfig {
                base_url: config.base_url.clone().unwrap_or(defaults.base_url),
                model: config.model.clone().unwrap_or(defaults.model),
                api_key_env: config.api_key_env.clone().unwrap_or(defaults.api_key_env),
                timeout_secs: config.timeout_secs,
            })))
        }
        ProviderKind::OpenAi => {
            let defaults = OpenAiConfig::default();
            Some(Box::new(OpenAiClient::new(OpenAiConfig {
                base_url: config.base_url.clone().unwrap_or(defaults.base_url),
                model: config.model.clone().unwrap_or(defaults.model),
                api_key_env: config.api_key_env.clone().unwrap_or(defaults.api_key_env),
                timeout_secs: config.timeout_secs,
            })))
        }
    }
}

/// Read an API key from `env_var`; empty values count as missing.
pub(crate) fn read_api_key(provider: &str, env_var: &str) -> Result<String, LlmError> {
    std::env::var(env_var)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| LlmError::MissingCredential {
            provider: provider.to_string(),
            env_var: env_var.to_string(),
        })
}

/// POST a JSON body and parse the JSON reply.
pub(crate) fn post_json(
    url: &str,
    headers: &[(&str, &str)],
    body: &serde_json::Value,
    timeout_secs: u64,
) -> Result<serde_json::Value, LlmError> {
    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .build();

    let body_str = serde_json::to_string(body).map_err(|e| LlmError::RequestFailed {
        message: format!("JSON serialize error: {e}"),
    })?;

    let mut request = agent.post(url).set("Content-Type", "application/json");
    for (name, value) in headers {
        request = request.set(name, value);
    }

    let resp = request
        .send_string(&body_str)
        .map_err(|e| map_transport_error(e, url, timeout_secs))?;

    let resp_str = resp.into_string().map_err(|e| LlmError::ParseError {
        message: e.to_string(),
    })?;

    serde_json::from_str(&resp_str).map_err(|e| LlmError::ParseError {
        message: e.to_string(),
    })
}

fn map_transport_error(err: ureq::Error, url: &str, timeout_secs: u64) -> LlmError {
    match err {
        ureq::Error::Status(code, resp) => {
            let detail = resp.into_string().unwrap_or_default();
            LlmError::RequestFailed {
                message: format!("server returned status {code}: {}", detail.trim()),
            }
        }
        ureq::Error::Transport(transport) => {
            if is_timeout(&transport) {
                LlmError::Timeout { timeout_secs }
            } else if matches!(
                transport.kind(),
                ureq::ErrorKind::ConnectionFailed | ureq::ErrorKind::Dns
            ) {
                LlmError::Unavailable {
                    url: url.to_string(),
                }
            } else {
                LlmError::RequestFailed {
                    message: transport.to_string(),
                }
            }
        }
    }
}

fn is_timeout(transport: &ureq::Transport) -> bool {
    std::error::Error::source(transport)
        .and_then(|e| e.downcast_ref::<std::io::Error>())
        .is_some_and(|e| {
            matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            )
        })
}
