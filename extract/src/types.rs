//! Request and result types for the generation pipeline.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which record schema an extraction request targets.
///
/// Selects both the prompt schema and the model ladder tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationType {
    /// A full card record (name, issuer, network, fee, branding colors).
    Card,
    /// A statement credit attached to a card.
    Credit,
    /// A non-monetary perk attached to a card.
    Perk,
    /// A spend-category earn multiplier.
    Multiplier,
}

impl GenerationType {
    /// Lowercase noun for prompt text ("card", "credit", ...).
    #[must_use]
    pub fn noun(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Credit => "credit",
            Self::Perk => "perk",
            Self::Multiplier => "multiplier",
        }
    }
}

/// Prior output plus a correction instruction.
///
/// A refinement always carries both halves: the instruction and the output it
/// amends. Requests that have one without the other cannot be constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refinement {
    /// Natural-language correction to apply to the previous output.
    pub prompt: String,
    /// The output being corrected.
    pub previous: PreviousOutput,
}

/// The previous output a refinement amends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreviousOutput {
    /// A single extracted record.
    Single(Map<String, Value>),
    /// Multiple extracted records from a batch run.
    Batch(Vec<Map<String, Value>>),
}

/// One extraction task, as handed over by the HTTP-facing layer.
///
/// The caller has already validated field presence and enum membership;
/// this core assumes `raw_data` is non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Unstructured source text to extract from.
    pub raw_data: String,
    /// Which record schema to extract.
    pub generation_type: GenerationType,
    /// Whether to extract every record found rather than a single one.
    #[serde(default)]
    pub batch_mode: bool,
    /// Present when this request refines prior output instead of extracting
    /// fresh from `raw_data`.
    #[serde(default)]
    pub refinement: Option<Refinement>,
}

impl GenerationRequest {
    /// Creates a single-record extraction request.
    #[must_use]
    pub fn new(raw_data: impl Into<String>, generation_type: GenerationType) -> Self {
        Self {
            raw_data: raw_data.into(),
            generation_type,
            batch_mode: false,
            refinement: None,
        }
    }

    /// Enables batch mode.
    #[must_use]
    pub fn batch(mut self) -> Self {
        self.batch_mode = true;
        self
    }

    /// Attaches a refinement of prior output.
    #[must_use]
    pub fn with_refinement(mut self, refinement: Refinement) -> Self {
        self.refinement = Some(refinement);
        self
    }

    /// Whether this request refines prior output.
    #[must_use]
    pub fn is_refinement(&self) -> bool {
        self.refinement.is_some()
    }

    /// Batch mode as the pipeline sees it.
    ///
    /// Refining a batch of records is implicitly a batch request even when
    /// the caller left `batch_mode` unset.
    #[must_use]
    pub fn effective_batch_mode(&self) -> bool {
        if self.batch_mode {
            return true;
        }
        matches!(
            self.refinement,
            Some(Refinement {
                previous: PreviousOutput::Batch(_),
                ..
            })
        )
    }
}

/// One displayable scalar property of an extracted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedField {
    /// Property key as the model emitted it.
    pub key: String,
    /// Human-readable label for the key.
    pub label: String,
    /// Scalar value (string, number, boolean, or null).
    pub value: Value,
}

/// One extracted record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedItem {
    /// Display-oriented projection of the record's scalar properties,
    /// in the model's key order.
    pub fields: Vec<GeneratedField>,
    /// The full record. Authoritative; `fields` is derived from it.
    pub json: Map<String, Value>,
}

/// The outcome of a successful pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    /// Extracted records, one per item (single-record runs produce one).
    pub items: Vec<GeneratedItem>,
    /// Which rung of the model ladder produced the result.
    pub model_used: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn generation_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&GenerationType::Multiplier).unwrap(),
            "\"multiplier\""
        );
        let parsed: GenerationType = serde_json::from_str("\"card\"").unwrap();
        assert_eq!(parsed, GenerationType::Card);
    }

    #[test]
    fn batch_refinement_forces_batch_mode() {
        let request = GenerationRequest::new("raw", GenerationType::Credit).with_refinement(
            Refinement {
                prompt: "fix the cadence".to_string(),
                previous: PreviousOutput::Batch(vec![map(json!({"title": "Dining credit"}))]),
            },
        );
        assert!(!request.batch_mode);
        assert!(request.effective_batch_mode());
        assert!(request.is_refinement());
    }

    #[test]
    fn single_refinement_keeps_batch_mode_off() {
        let request = GenerationRequest::new("raw", GenerationType::Credit).with_refinement(
            Refinement {
                prompt: "fix the value".to_string(),
                previous: PreviousOutput::Single(map(json!({"title": "Dining credit"}))),
            },
        );
        assert!(!request.effective_batch_mode());
    }

    #[test]
    fn previous_output_deserializes_untagged() {
        let single: PreviousOutput = serde_json::from_str(r#"{"title": "Uber credit"}"#).unwrap();
        assert!(matches!(single, PreviousOutput::Single(_)));

        let batch: PreviousOutput = serde_json::from_str(r#"[{"title": "Uber credit"}]"#).unwrap();
        assert!(matches!(batch, PreviousOutput::Batch(_)));
    }
}
