//! Failure classification for retry/fallback decisions.

use crate::error::GenerateError;

/// Message fragments that indicate quota or throughput rejection.
const RATE_LIMIT_TOKENS: [&str; 4] = [
    "429",
    "resource exhausted",
    "too many requests",
    "rate limit",
];

/// Message fragments that indicate a malformed-output failure on a model
/// call error.
const PARSE_TOKENS: [&str; 2] = ["json", "parse"];

/// What a failed attempt means for the orchestrator's next action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The provider rejected the request on quota. Retrying the same model
    /// immediately would burn more quota; switch to the next ladder rung.
    RateLimited,
    /// The model produced output we could not turn into a record. Worth a
    /// bounded retry on the same model before falling through.
    TransientParseFailure,
    /// Nothing a retry or a different model can fix (auth, configuration,
    /// network). Abort immediately.
    Fatal,
}

impl FailureClass {
    /// Classifies an error from a model call or parse attempt.
    ///
    /// Rate-limit detection runs first: a message could plausibly carry both
    /// rate-limit and parse tokens, and the rate limit dictates a different
    /// recovery action (switch model, not retry the same one).
    #[must_use]
    pub fn classify(error: &GenerateError) -> Self {
        let message = error.to_string().to_lowercase();
        if RATE_LIMIT_TOKENS.iter().any(|t| message.contains(t)) {
            return Self::RateLimited;
        }

        match error {
            // Bad model output in all its forms: retry/fallback can help.
            GenerateError::EmptyModelResponse
            | GenerateError::JsonUnrecoverable { .. }
            | GenerateError::MalformedShape { .. } => Self::TransientParseFailure,
            GenerateError::ModelsExhausted { last, .. } => Self::classify(last),
            GenerateError::Model(_) => {
                if PARSE_TOKENS.iter().any(|t| message.contains(t)) {
                    Self::TransientParseFailure
                } else {
                    Self::Fatal
                }
            }
        }
    }
}
