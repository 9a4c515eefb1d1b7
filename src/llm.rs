use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const MODEL: &str = "gemini-1.5-pro-latest";

/// Returned instead of calling the API when no key is configured
pub const MISSING_KEY_MESSAGE: &str = "Silakan periksa AI_GOOGLE_API Anda di file env";

/// Turns a prompt into the text shown to the user.
///
/// `Ok` carries everything the user should see as the answer, including the
/// recoverable failures (missing key, non-200 status). `Err` is reserved for
/// transport and decoding failures.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub max_output_tokens: u32,
    pub stop_sequences: Vec<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_k: 0,
            top_p: 0.95,
            max_output_tokens: 8192,
            stop_sequences: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

/// Single-shot client for the Gemini `generateContent` endpoint
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|key| !key.is_empty()),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            MODEL
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("AI_GOOGLE_API is not configured, skipping Gemini call");
            return Ok(MISSING_KEY_MESSAGE.to_string());
        };

        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig::default(),
        };

        let url = self.endpoint();
        debug!("Sending request to Gemini: {} ({} bytes)", url, prompt.len());

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            // The URL carries the API key as a query parameter.
            .map_err(|e| e.without_url())
            .context("Failed to send request to Gemini")?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            warn!("Gemini returned status {}", status);
            return Ok(format!(
                "Failed to generate content. Status code: {}",
                status.as_u16()
            ));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to parse Gemini response")?;

        body.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .context("Gemini response contained no candidate text")
    }
}
