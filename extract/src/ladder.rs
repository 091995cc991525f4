//! Model selection: which models to try, in which order.

use crate::types::GenerationType;

/// The tiered table of model identifiers the orchestrator draws from.
///
/// Injected configuration rather than hard-coded constants, so the pipeline
/// is testable without live model identifiers and tiers can be re-pointed
/// without touching selection logic.
#[derive(Debug, Clone)]
pub struct ModelLadder {
    fast: String,
    high_capacity: [String; 2],
}

impl Default for ModelLadder {
    fn default() -> Self {
        Self {
            fast: "gemini-2.0-flash".to_string(),
            high_capacity: [
                "gemini-2.5-pro".to_string(),
                "gemini-2.5-flash".to_string(),
            ],
        }
    }
}

impl ModelLadder {
    /// Creates a ladder from a fast/cheap model and a high-capacity pair
    /// (primary first, same-tier fallback second).
    #[must_use]
    pub fn new(
        fast: impl Into<String>,
        high_primary: impl Into<String>,
        high_fallback: impl Into<String>,
    ) -> Self {
        Self {
            fast: fast.into(),
            high_capacity: [high_primary.into(), high_fallback.into()],
        }
    }

    /// Returns the ordered, non-empty list of models to try for a task.
    ///
    /// - Refinements get the fast model alone: they are small edits, and a
    ///   second model reinterprets the instruction too much to be an
    ///   acceptable substitute.
    /// - Card extraction gets both high-capacity models: many fields,
    ///   including color/branding inference.
    /// - Batch extraction gets both high-capacity models: pulling many
    ///   records out of one blob raises the accuracy bar.
    /// - A single component extraction is low-risk and gets the fast model
    ///   with no fallback tier.
    #[must_use]
    pub fn select(
        &self,
        generation_type: GenerationType,
        batch_mode: bool,
        is_refinement: bool,
    ) -> Vec<&str> {
        if is_refinement {
            return vec![self.fast.as_str()];
        }
        if generation_type == GenerationType::Card || batch_mode {
            return self.high_capacity.iter().map(String::as_str).collect();
        }
        vec![self.fast.as_str()]
    }
}
