//! The generation orchestrator: model ladder, retries, and fallback.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::classify::FailureClass;
use crate::error::{GenerateError, ModelError};
use crate::ladder::ModelLadder;
use crate::prompt;
use crate::recover;
use crate::types::{GeneratedItem, GenerationRequest, GenerationResult};

/// A text-completion client for one LLM provider.
///
/// Given a model identifier and an opaque prompt, returns the model's raw
/// text. Errors carry the provider's human-readable message, which the
/// failure classifier routes on.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Runs one completion against the named model.
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, ModelError>;
}

/// Retry and fallback knobs for the orchestrator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Attempts per model before falling through to the next rung
    /// (default: 2). Values below 1 are treated as 1.
    pub max_retries: usize,
    /// Fixed pause between same-model retries (default: 1s). No jitter or
    /// exponential growth: the retry budget is small and the next ladder
    /// rung is the real recovery mechanism.
    pub retry_backoff: Duration,
    /// The model tier table.
    pub ladder: ModelLadder,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_backoff: Duration::from_secs(1),
            ladder: ModelLadder::default(),
        }
    }
}

impl GeneratorConfig {
    /// Sets the per-model attempt budget.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the pause between same-model retries.
    #[must_use]
    pub const fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Sets the model ladder.
    #[must_use]
    pub fn with_ladder(mut self, ladder: ModelLadder) -> Self {
        self.ladder = ladder;
        self
    }
}

/// Drives one extraction request end to end: select models, call the
/// client, recover and project the output, and decide per failure class
/// whether to retry, fall through, or abort.
///
/// Holds no per-request state, so a single `Generator` can serve concurrent
/// requests. Exactly one model call is in flight at a time within a request:
/// fallback decisions depend on the prior call's outcome, and speculative
/// parallel calls would multiply billed usage for nothing in the common case.
pub struct Generator<M> {
    model: M,
    config: GeneratorConfig,
}

impl<M: TextModel> Generator<M> {
    /// Creates a generator with default configuration.
    #[must_use]
    pub fn new(model: M) -> Self {
        Self {
            model,
            config: GeneratorConfig::default(),
        }
    }

    /// Creates a generator with explicit configuration.
    #[must_use]
    pub const fn with_config(model: M, config: GeneratorConfig) -> Self {
        Self { model, config }
    }

    /// The underlying text-completion client.
    #[must_use]
    pub const fn client(&self) -> &M {
        &self.model
    }

    /// Runs a request with the default prompt builder.
    ///
    /// # Errors
    ///
    /// See [`Generator::generate_with_prompt`].
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerateError> {
        let prompt = prompt::build_prompt(request);
        self.generate_with_prompt(request, &prompt).await
    }

    /// Runs a request with a caller-built prompt.
    ///
    /// # Errors
    ///
    /// Returns the fatal error directly when one occurs, or
    /// [`GenerateError::ModelsExhausted`] (displaying the last attempt's
    /// error verbatim) once every ladder rung is consumed.
    pub async fn generate_with_prompt(
        &self,
        request: &GenerationRequest,
        prompt: &str,
    ) -> Result<GenerationResult, GenerateError> {
        let batch_mode = request.effective_batch_mode();
        let models = self.config.ladder.select(
            request.generation_type,
            batch_mode,
            request.is_refinement(),
        );
        let max_retries = self.config.max_retries.max(1);
        let mut last_error: Option<GenerateError> = None;

        'ladder: for &model in &models {
            let mut attempt = 0;
            while attempt < max_retries {
                tracing::debug!(
                    event = "generation_attempt",
                    model = %model,
                    attempt,
                    batch_mode,
                    "generation_attempt"
                );

                let error = match self.attempt(model, prompt, batch_mode).await {
                    Ok(items) => {
                        tracing::debug!(
                            event = "generation_succeeded",
                            model = %model,
                            items = items.len(),
                            "generation_succeeded"
                        );
                        return Ok(GenerationResult {
                            items,
                            model_used: model.to_string(),
                        });
                    }
                    Err(error) => error,
                };

                match FailureClass::classify(&error) {
                    FailureClass::RateLimited => {
                        // No point retrying a throttled model; the next rung
                        // is the recovery path.
                        tracing::warn!(
                            event = "model_rate_limited",
                            model = %model,
                            error = %error,
                            "model_rate_limited"
                        );
                        last_error = Some(error);
                        continue 'ladder;
                    }
                    FailureClass::TransientParseFailure => {
                        tracing::warn!(
                            event = "transient_parse_failure",
                            model = %model,
                            attempt,
                            error = %error,
                            "transient_parse_failure"
                        );
                        last_error = Some(error);
                        attempt += 1;
                        if attempt < max_retries {
                            tokio::time::sleep(self.config.retry_backoff).await;
                        }
                    }
                    FailureClass::Fatal => {
                        // Retrying or switching models cannot fix auth or
                        // configuration errors; surface it unmodified.
                        tracing::error!(
                            event = "generation_fatal",
                            model = %model,
                            error = %error,
                            "generation_fatal"
                        );
                        return Err(error);
                    }
                }
            }
        }

        let last = last_error.unwrap_or(GenerateError::EmptyModelResponse);
        tracing::error!(
            event = "models_exhausted",
            models_tried = models.len(),
            error = %last,
            "models_exhausted"
        );
        Err(GenerateError::ModelsExhausted {
            models_tried: models.len(),
            last: Box::new(last),
        })
    }

    /// One call to one model: complete, recover, parse, project.
    async fn attempt(
        &self,
        model: &str,
        prompt: &str,
        batch_mode: bool,
    ) -> Result<Vec<GeneratedItem>, GenerateError> {
        let raw = self.model.complete(model, prompt).await?;
        if raw.trim().is_empty() {
            return Err(GenerateError::EmptyModelResponse);
        }

        let candidate = recover::extract_json(&raw);
        let value: Value =
            serde_json::from_str(&candidate).map_err(|e| GenerateError::JsonUnrecoverable {
                message: e.to_string(),
                raw: candidate,
            })?;

        crate::project::project(value, batch_mode)
    }
}
