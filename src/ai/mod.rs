//! AI Gateway Layer
//!
//! Provider abstraction, prompt construction, and response validation
//! for the external generative-text service.

pub mod prompt;
pub mod provider;
pub mod validation;

pub use provider::{
    GeminiProvider, LlmProvider, LlmResponse, ProviderConfig, SharedProvider, create_provider,
};
pub use validation::{PromptAnalysis, TagValidator, extract_json_from_response, shape_analysis};
