//! Scripted model doubles for exercising the pipeline without a provider.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::ModelError;
use crate::generator::TextModel;

/// A [`TextModel`] that replays canned outcomes per model identifier and
/// records every call, so tests can assert exactly how many attempts each
/// ladder rung received.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    scripts: Mutex<HashMap<String, Vec<Result<String, ModelError>>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedModel {
    /// Creates an empty script. Calling an unscripted model fails the test
    /// with a descriptive error.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful completion for `model`.
    #[must_use]
    pub fn respond(self, model: &str, text: &str) -> Self {
        self.enqueue(model, Ok(text.to_string()));
        self
    }

    /// Queues a failed completion for `model` with the given message.
    #[must_use]
    pub fn fail(self, model: &str, message: &str) -> Self {
        self.enqueue(model, Err(ModelError::new(message)));
        self
    }

    fn enqueue(&self, model: &str, outcome: Result<String, ModelError>) {
        lock(&self.scripts)
            .entry(model.to_string())
            .or_default()
            .push(outcome);
    }

    /// Every model identifier called so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// How many times `model` was called.
    #[must_use]
    pub fn calls_for(&self, model: &str) -> usize {
        lock(&self.calls).iter().filter(|m| *m == model).count()
    }
}

#[async_trait]
impl TextModel for ScriptedModel {
    async fn complete(&self, model: &str, _prompt: &str) -> Result<String, ModelError> {
        lock(&self.calls).push(model.to_string());
        let mut scripts = lock(&self.scripts);
        let queue = scripts.entry(model.to_string()).or_default();
        if queue.is_empty() {
            return Err(ModelError::new(format!(
                "no scripted response left for model {model}"
            )));
        }
        queue.remove(0)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
