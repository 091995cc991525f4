//! Typed errors for the generation pipeline.

use thiserror::Error;

/// Error returned by a [`TextModel`](crate::generator::TextModel) implementation.
///
/// Carries the provider's human-readable message verbatim. The failure
/// classifier routes on this text (HTTP status codes, "rate limit" phrasing,
/// and so on), so implementations should not launder provider messages.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ModelError {
    message: String,
}

impl ModelError {
    /// Creates a model error from a provider message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The provider's message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors that can occur while generating structured records.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The model returned no text at all.
    #[error("model returned an empty response")]
    EmptyModelResponse,

    /// The parsed JSON had a shape the projector cannot represent.
    #[error("malformed result shape: {reason}")]
    MalformedShape {
        /// What was expected versus what the model returned.
        reason: String,
    },

    /// Every recovery repair was exhausted and the payload never parsed.
    #[error("JSON parse failed after recovery: {message}")]
    JsonUnrecoverable {
        /// The final parse error message.
        message: String,
        /// The best-effort cleaned text that still failed to parse.
        raw: String,
    },

    /// The model call itself failed (HTTP error, rate limit, auth, ...).
    #[error("{0}")]
    Model(#[from] ModelError),

    /// Every rung of the model ladder was consumed without success.
    ///
    /// Displays the last error encountered verbatim, since that is the most
    /// relevant to why the final attempt failed.
    #[error("{last}")]
    ModelsExhausted {
        /// How many models were tried before giving up.
        models_tried: usize,
        /// The error from the final attempt.
        last: Box<GenerateError>,
    },
}
