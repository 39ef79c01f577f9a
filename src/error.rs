//! Rich diagnostic error types for fihris.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. Detection and partitioning never fail
//! on content: missing signals degrade to fallbacks and empty results. Errors
//! here cover invalid caller input, configuration, and provider transport.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::llm::LlmError;

/// Top-level error type for fihris.
#[derive(Debug, Error, Diagnostic)]
pub enum FihrisError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Llm(#[from] LlmError),
}

/// Convenience alias for functions that can fail with any fihris error.
pub type FihrisResult<T> = std::result::Result<T, FihrisError>;

// ---------------------------------------------------------------------------
// Input errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum InputError {
    #[error("invalid page number {page}: pages are numbered from 1")]
    #[diagnostic(
        code(fihris::input::page_number),
        help("Renumber the page records so the first page is 1.")
    )]
    InvalidPageNumber { page: i64 },

    #[error("invalid OCR confidence {value}: must lie in [0, 1]")]
    #[diagnostic(
        code(fihris::input::confidence),
        help("Scale OCR confidences to the unit interval or omit them.")
    )]
    InvalidConfidence { value: f32 },

    #[error("failed to read input file: {path}")]
    #[diagnostic(
        code(fihris::input::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {message}")]
    #[diagnostic(
        code(fihris::input::json),
        help(
            "Pages are `[{{\"page_number\": 1, \"text\": \"...\"}}]`; TOC entries are \
             `[{{\"title\": \"...\", \"page\": 3, \"level\": 1}}]`."
        )
    )]
    Json { path: String, message: String },
}

pub type InputResult<T> = std::result::Result<T, InputError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_errors_keep_codes_and_help() {
        let err: FihrisError = InputError::InvalidPageNumber { page: 0 }.into();
        assert_eq!(
            err.code().map(|c| c.to_string()).as_deref(),
            Some("fihris::input::page_number")
        );
        assert!(err.help().is_some());

        let err: FihrisError = LlmError::Timeout { timeout_secs: 3 }.into();
        assert_eq!(err.to_string(), "completion request timed out after 3s");
    }

    #[test]
    fn missing_credential_names_the_variable() {
        let err: FihrisError = LlmError::MissingCredential {
            provider: "anthropic".into(),
            env_var: "ANTHROPIC_API_KEY".into(),
        }
        .into();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
        let help = err.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("ANTHROPIC_API_KEY"));
    }
}
