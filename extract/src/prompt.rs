//! Default prompt construction for extraction and refinement requests.
//!
//! The orchestrator treats the prompt as an opaque string, so callers with
//! their own prompt layer can bypass this module entirely via
//! [`Generator::generate_with_prompt`](crate::generator::Generator::generate_with_prompt).

use crate::types::{GenerationRequest, GenerationType, PreviousOutput};

/// Per-type field listing fed to the model as the output contract.
fn schema_lines(generation_type: GenerationType) -> &'static str {
    match generation_type {
        GenerationType::Card => {
            "- name: string, the card's product name\n\
             - issuer: string, the issuing bank\n\
             - network: string, one of Visa, Mastercard, Amex, Discover\n\
             - annualFee: number, in whole dollars (0 if none)\n\
             - primaryColor: string, hex color inferred from the card's branding\n\
             - secondaryColor: string, hex color inferred from the card's branding\n\
             - description: string, one-sentence summary"
        }
        GenerationType::Credit => {
            "- title: string, short name of the credit\n\
             - value: number, dollar value per occurrence\n\
             - cadence: string, one of monthly, quarterly, semiannual, annual\n\
             - description: string, conditions and how to redeem"
        }
        GenerationType::Perk => {
            "- title: string, short name of the perk\n\
             - category: string, e.g. travel, dining, entertainment\n\
             - description: string, what the perk grants and any conditions"
        }
        GenerationType::Multiplier => {
            "- category: string, the spend category\n\
             - rate: number, points or percent earned per dollar\n\
             - description: string, caps and exclusions if any"
        }
    }
}

/// Builds the default extraction (or refinement) prompt for a request.
#[must_use]
pub fn build_prompt(request: &GenerationRequest) -> String {
    let noun = request.generation_type.noun();
    let mut prompt = String::new();

    prompt.push_str("You are a data-entry assistant for a credit card metadata database.\n");

    if let Some(refinement) = &request.refinement {
        prompt.push_str("You previously produced this output:\n");
        let previous = match &refinement.previous {
            PreviousOutput::Single(record) => serde_json::to_string_pretty(record),
            PreviousOutput::Batch(records) => serde_json::to_string_pretty(records),
        };
        prompt.push_str(&previous.unwrap_or_else(|_| "{}".to_string()));
        prompt.push_str("\n\nApply this correction and return the full corrected output:\n");
        prompt.push_str(&refinement.prompt);
        prompt.push('\n');
    } else {
        if request.effective_batch_mode() {
            prompt.push_str(&format!(
                "Extract every {noun} described in the source text below. \
                 Respond with a JSON array containing one object per {noun}.\n"
            ));
        } else {
            prompt.push_str(&format!(
                "Extract the {noun} described in the source text below. \
                 Respond with a single JSON object.\n"
            ));
        }
        prompt.push_str("Each object has exactly these fields:\n");
        prompt.push_str(schema_lines(request.generation_type));
        prompt.push_str("\n\nSource text:\n");
        prompt.push_str(&request.raw_data);
        prompt.push('\n');
    }

    prompt.push_str("\nRespond with JSON only: no prose, no markdown fences.");
    prompt
}
