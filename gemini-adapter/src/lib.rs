//! Gemini implementation of the extraction pipeline's [`TextModel`] seam.
//!
//! A thin client over the Generative Language REST API. Provider failures
//! are surfaced with the HTTP status line in the message so the pipeline's
//! failure classifier can tell a 429 from an auth error.
//!
//! # Example
//!
//! ```rust,ignore
//! use cardforge_extract::Generator;
//! use cardforge_gemini::GeminiClient;
//!
//! let client = GeminiClient::from_env()?;
//! let generator = Generator::new(client);
//! ```

pub mod types;

use async_trait::async_trait;
use cardforge_extract::{ModelError, TextModel};
use secrecy::{ExposeSecret, SecretString};

use crate::types::{GenerateContentRequest, GenerateContentResponse};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// HTTP client for Gemini text completion.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl GeminiClient {
    /// Creates a client with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: SecretString::from(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Creates a client from the `GEMINI_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error when the variable is unset.
    pub fn from_env() -> Result<Self, ModelError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ModelError::new("GEMINI_API_KEY not set"))?;
        Ok(Self::new(api_key))
    }

    /// Overrides the API base URL (proxies, regional endpoints, tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, ModelError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let request = GenerateContentRequest::from_prompt(prompt);

        tracing::debug!(
            event = "gemini_request",
            model = %model,
            prompt_chars = prompt.chars().count(),
            "gemini_request"
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::new(format!("request to Gemini failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                event = "gemini_http_error",
                model = %model,
                status = %status,
                "gemini_http_error"
            );
            // Keep the status line in the message: "429 Too Many Requests"
            // is what routes this to the next ladder rung.
            return Err(ModelError::new(format!(
                "Gemini returned HTTP {status}: {body}"
            )));
        }

        let decoded: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ModelError::new(format!("could not decode Gemini response: {e}")))?;

        Ok(decoded.text())
    }
}
