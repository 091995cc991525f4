//! End-to-end pipeline tests: ladder fallback, retry budgets, and failure
//! short-circuits, driven by a scripted model.

use std::time::Duration;

use cardforge_extract::testing::ScriptedModel;
use cardforge_extract::{
    GenerateError, GenerationRequest, GenerationType, Generator, GeneratorConfig, ModelLadder,
    PreviousOutput, Refinement,
};
use serde_json::{json, Map, Value};

const FAST: &str = "fast-model";
const HIGH_A: &str = "high-capacity-a";
const HIGH_B: &str = "high-capacity-b";

fn generator(model: ScriptedModel) -> Generator<ScriptedModel> {
    let config = GeneratorConfig::default()
        .with_retry_backoff(Duration::ZERO)
        .with_ladder(ModelLadder::new(FAST, HIGH_A, HIGH_B));
    Generator::with_config(model, config)
}

fn card_request() -> GenerationRequest {
    GenerationRequest::new("pasted card blurb", GenerationType::Card)
}

fn record(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

#[tokio::test]
async fn rate_limited_model_is_skipped_without_retry() {
    let model = ScriptedModel::new()
        .fail(HIGH_A, "HTTP 429 Too Many Requests")
        .respond(HIGH_B, r#"{"name": "Sapphire Reserve", "annualFee": 550}"#);
    let generator = generator(model);

    let result = generator.generate(&card_request()).await.unwrap();

    assert_eq!(result.model_used, HIGH_B);
    assert_eq!(generator_calls(&generator, HIGH_A), 1);
    assert_eq!(generator_calls(&generator, HIGH_B), 1);
}

#[tokio::test]
async fn parse_failures_retry_twice_then_fall_through() {
    let model = ScriptedModel::new()
        .respond(HIGH_A, "total garbage")
        .respond(HIGH_A, "still garbage")
        .respond(HIGH_B, r#"{"name": "Gold Card"}"#);
    let generator = generator(model);

    let result = generator.generate(&card_request()).await.unwrap();

    assert_eq!(result.model_used, HIGH_B);
    assert_eq!(generator_calls(&generator, HIGH_A), 2);
    assert_eq!(generator_calls(&generator, HIGH_B), 1);
}

#[tokio::test]
async fn fatal_error_short_circuits_the_whole_ladder() {
    let model = ScriptedModel::new().fail(HIGH_A, "invalid API key for project");
    let generator = generator(model);

    let err = generator.generate(&card_request()).await.unwrap_err();

    assert_eq!(err.to_string(), "invalid API key for project");
    assert_eq!(total_calls(&generator), 1);
}

#[tokio::test]
async fn exhausted_ladder_surfaces_the_last_error() {
    let model = ScriptedModel::new()
        .fail(HIGH_A, "rate limit reached")
        .respond(HIGH_B, "not json")
        .respond(HIGH_B, "also not json");
    let generator = generator(model);

    let err = generator.generate(&card_request()).await.unwrap_err();

    let GenerateError::ModelsExhausted { models_tried, last } = &err else {
        panic!("expected ModelsExhausted, got {err}");
    };
    assert_eq!(*models_tried, 2);
    assert!(matches!(**last, GenerateError::JsonUnrecoverable { .. }));
    // The display is the last error's message, not a wrapper's.
    assert!(err.to_string().starts_with("JSON parse failed"));
}

#[tokio::test]
async fn batch_request_uses_high_capacity_ladder_and_splits_items() {
    let model = ScriptedModel::new().respond(
        HIGH_A,
        r#"[{"title": "Uber credit", "value": 15}, {"title": "Dining", "value": 10}]"#,
    );
    let generator = generator(model);
    let request = GenerationRequest::new("two credits", GenerationType::Credit).batch();

    let result = generator.generate(&request).await.unwrap();

    assert_eq!(result.model_used, HIGH_A);
    assert_eq!(result.items.len(), 2);
    assert_eq!(result.items[0].json["title"], json!("Uber credit"));
}

#[tokio::test]
async fn batch_request_tolerates_single_object_response() {
    let model = ScriptedModel::new().respond(HIGH_A, r#"{"title": "Uber credit", "value": 15}"#);
    let generator = generator(model);
    let request = GenerationRequest::new("credits", GenerationType::Credit).batch();

    let result = generator.generate(&request).await.unwrap();
    assert_eq!(result.items.len(), 1);
}

#[tokio::test]
async fn single_request_rejects_array_response_then_retries() {
    let model = ScriptedModel::new()
        .respond(FAST, r#"[{"title": "Perk"}]"#)
        .respond(FAST, r#"{"title": "Perk"}"#);
    let generator = generator(model);
    let request = GenerationRequest::new("one perk", GenerationType::Perk);

    let result = generator.generate(&request).await.unwrap();

    assert_eq!(result.items.len(), 1);
    assert_eq!(generator_calls(&generator, FAST), 2);
}

#[tokio::test]
async fn refinement_uses_the_fast_model_only() {
    let model = ScriptedModel::new().respond(FAST, r#"{"title": "Dining", "value": 10}"#);
    let generator = generator(model);
    let request = GenerationRequest::new("ignored", GenerationType::Card).with_refinement(
        Refinement {
            prompt: "value should be 10".to_string(),
            previous: PreviousOutput::Single(record(json!({"title": "Dining", "value": 15}))),
        },
    );

    let result = generator.generate(&request).await.unwrap();

    assert_eq!(result.model_used, FAST);
    assert_eq!(total_calls(&generator), 1);
}

#[tokio::test]
async fn batch_refinement_projects_arrays_despite_batch_flag_off() {
    let model = ScriptedModel::new().respond(FAST, r#"[{"title": "A"}, {"title": "B"}]"#);
    let generator = generator(model);
    let request = GenerationRequest::new("ignored", GenerationType::Credit).with_refinement(
        Refinement {
            prompt: "capitalize the titles".to_string(),
            previous: PreviousOutput::Batch(vec![
                record(json!({"title": "a"})),
                record(json!({"title": "b"})),
            ]),
        },
    );

    let result = generator.generate(&request).await.unwrap();
    assert_eq!(result.items.len(), 2);
}

#[tokio::test]
async fn truncated_model_output_still_yields_a_record() {
    let model = ScriptedModel::new().respond(
        HIGH_A,
        "```json\n{\"name\": \"Platinum Card\", \"annualFee\": 695, \"network\": \"Ame",
    );
    let generator = generator(model);

    let result = generator.generate(&card_request()).await.unwrap();

    let fields: Vec<&str> = result.items[0]
        .fields
        .iter()
        .map(|f| f.key.as_str())
        .collect();
    // The incomplete trailing field is dropped, not fabricated.
    assert_eq!(fields, vec!["name", "annualFee"]);
    assert_eq!(result.items[0].fields[1].label, "Annual Fee");
}

fn generator_calls(generator: &Generator<ScriptedModel>, model: &str) -> usize {
    generator.client().calls_for(model)
}

fn total_calls(generator: &Generator<ScriptedModel>) -> usize {
    generator.client().calls().len()
}
