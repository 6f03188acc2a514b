pub mod gemini;
pub mod multi_agent;

#[cfg(test)]
pub mod testing;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use thiserror::Error;

/// Sampling settings for a single generation call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
}

impl Default for GenerationOptions {
    /// Fully deterministic sampling
    fn default() -> Self {
        Self { temperature: 0.0 }
    }
}

/// Why a model call produced no text
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("GOOGLE_API_KEY is not set")]
    MissingCredential,
    #[error("request failed: {0}")]
    Request(String),
    #[error("API returned status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("model returned no text")]
    Empty,
}

impl ModelError {
    /// Short machine-readable cause, used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            ModelError::MissingCredential => "missing_credential",
            ModelError::Request(_) => "network",
            ModelError::Api { .. } => "api",
            ModelError::InvalidResponse(_) => "invalid_response",
            ModelError::Empty => "empty",
        }
    }
}

/// A hosted text-in/text-out model. Everything that talks to an LLM goes
/// through this trait so tests can swap in a deterministic fake.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Model identifier for logs
    fn name(&self) -> &str;

    async fn generate_text(&self, prompt: &str, options: &GenerationOptions) -> Result<String, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_deterministic() {
        assert_eq!(GenerationOptions::default().temperature, 0.0);
    }

    #[test]
    fn test_error_kinds_are_distinct() {
        let errors = [
            ModelError::MissingCredential,
            ModelError::Request("timeout".into()),
            ModelError::Api { status: 500, message: "boom".into() },
            ModelError::InvalidResponse("bad".into()),
            ModelError::Empty,
        ];
        let mut kinds: Vec<&str> = errors.iter().map(|e| e.kind()).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn test_error_display() {
        let err = ModelError::Api { status: 429, message: "quota exceeded".into() };
        assert_eq!(err.to_string(), "API returned status 429: quota exceeded");
    }
}
