use crate::ai::{GenerationOptions, ModelError, TextModel};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Client for the Gemini `generateContent` endpoint (API key mode)
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "candidateCount")]
    candidate_count: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<&str>, base_url: Option<&str>, model: Option<&str>) -> Result<Self, String> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        // No request timeout: a call takes as long as the provider needs
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        let base_url = base_url
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_GEMINI_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        let model = match model {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => DEFAULT_GEMINI_MODEL.to_string(),
        };

        Ok(Self {
            client,
            base_url,
            model,
            api_key: api_key.filter(|k| !k.is_empty()).map(str::to_string),
        })
    }

    pub fn endpoint_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate_text(&self, prompt: &str, options: &GenerationOptions) -> Result<String, ModelError> {
        let api_key = self.api_key.as_deref().ok_or(ModelError::MissingCredential)?;

        let request = GenerateContentRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: options.temperature,
                candidate_count: 1,
            },
        };

        log::info!(
            "[GEMINI] Sending request to model {} (prompt_len: {}, temperature: {})",
            self.model,
            prompt.len(),
            options.temperature
        );

        let response = self
            .client
            .post(self.endpoint_url())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ModelError::Request(format!("Failed to read Gemini response: {}", e)))?;

        if !status.is_success() {
            return Err(parse_error_body(status.as_u16(), &body));
        }

        log::debug!("[GEMINI] Raw response:\n{}", body);
        extract_text(&body)
    }
}

/// Turn a non-2xx body into a `ModelError`, preferring the API's own message
fn parse_error_body(status: u16, body: &str) -> ModelError {
    let message = match serde_json::from_str::<GeminiErrorResponse>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body.to_string(),
    };
    ModelError::Api { status, message }
}

/// Concatenate the text parts of the first candidate
fn extract_text(body: &str) -> Result<String, ModelError> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| ModelError::InvalidResponse(format!("Failed to parse Gemini response: {}", e)))?;

    let candidate = parsed.candidates.into_iter().next().ok_or(ModelError::Empty)?;

    log::debug!("[GEMINI] finish_reason: {:?}", candidate.finish_reason);

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ModelError::Empty);
    }
    Ok(text)
}
