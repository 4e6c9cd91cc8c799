//! AI Response Validation
//!
//! Validation layer for LLM responses:
//! - JSON repair for malformed output
//! - Tag-shape filtering and category grouping
//! - Analysis payload shaping
//!
//! ## Design Philosophy
//! - Repair on format issues, fail on structural ones
//! - The caller owns fallback policy; validation only reports

mod analysis;
mod json_repair;
mod tags;

pub use analysis::{ImprovedPrompt, PromptAnalysis, shape_analysis};
pub use json_repair::{JsonRepairer, extract_json_from_response};
pub use tags::{TagValidator, normalize_tag};
