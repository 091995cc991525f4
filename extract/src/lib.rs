//! Resilient structured-record extraction from untrusted LLM output.
//!
//! The model on the other end of the wire is a non-deterministic text
//! generator: it wraps JSON in prose or markdown fences, truncates output
//! mid-object at token limits, leaves string literals unterminated, emits
//! trailing commas, and gets rate-limited. This crate turns that raw text
//! into validated, typed records anyway:
//!
//! - [`recover::extract_json`] - byte-level recovery parser that locates and
//!   repairs the first JSON value in arbitrary text
//! - [`project::project`] - projection of parsed values into display-ready
//!   [`GeneratedItem`]s with labeled fields
//! - [`FailureClass`] - classifies failures into rate-limited, transient,
//!   or fatal
//! - [`ModelLadder`] - ordered model candidates per task
//! - [`Generator`] - the retry/fallback orchestrator tying it together
//!
//! The pipeline is stateless per request and does exactly one model call at
//! a time. It ends at an in-memory [`GenerationResult`]; persistence,
//! authentication, and presentation belong to the layers around it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use cardforge_extract::{GenerationRequest, GenerationType, Generator};
//!
//! let generator = Generator::new(client); // any TextModel implementation
//! let request = GenerationRequest::new(pasted_text, GenerationType::Credit);
//! let result = generator.generate(&request).await?;
//! println!("extracted by {}", result.model_used);
//! ```

pub mod classify;
pub mod error;
pub mod generator;
pub mod ladder;
pub mod project;
pub mod prompt;
pub mod recover;
pub mod testing;
pub mod types;

pub use classify::FailureClass;
pub use error::{GenerateError, ModelError};
pub use generator::{Generator, GeneratorConfig, TextModel};
pub use ladder::ModelLadder;
pub use project::project;
pub use recover::extract_json;
pub use types::{
    GeneratedField, GeneratedItem, GenerationRequest, GenerationResult, GenerationType,
    PreviousOutput, Refinement,
};
