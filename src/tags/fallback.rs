//! Static Fallback Tags
//!
//! Deterministic tag content substituted when the generative call fails
//! or is unavailable. Same inputs always yield the same list, so tests
//! and the client can rely on it.

use super::TagCategory;

/// Static tag pool, ordered by canonical category.
///
/// Every entry obeys the tag shape rules: 3-4 title-cased words, no
/// punctuation.
const FALLBACK_POOL: &[(TagCategory, &str)] = &[
    (TagCategory::Role, "Act As Patient Teacher"),
    (TagCategory::Role, "Act As Friendly Tutor"),
    (TagCategory::Context, "For A Beginner"),
    (TagCategory::Context, "With Everyday Life Examples"),
    (TagCategory::Task, "Explain Key Concepts Simply"),
    (TagCategory::Task, "Compare With Real Examples"),
    (TagCategory::Format, "Use Bullet Point Lists"),
    (TagCategory::Format, "Include A Short Summary"),
    (TagCategory::Reasoning, "Think Step By Step"),
    (TagCategory::Reasoning, "Check Understanding With Questions"),
];

/// Produce `count` fallback entries with their categories, skipping any
/// tag the caller already holds.
///
/// Comparison against existing tags is case-insensitive so a client
/// holding a model-generated tag never receives its fallback twin.
pub fn fallback_entries(count: usize, existing: &[String]) -> Vec<(TagCategory, String)> {
    let existing_lower: Vec<String> = existing.iter().map(|t| t.to_lowercase()).collect();

    FALLBACK_POOL
        .iter()
        .filter(|(_, text)| !existing_lower.contains(&text.to_lowercase()))
        .take(count)
        .map(|(category, text)| (*category, text.to_string()))
        .collect()
}

/// Produce `count` fallback tags, skipping any the caller already holds.
pub fn fallback_tags(count: usize, existing: &[String]) -> Vec<String> {
    fallback_entries(count, existing)
        .into_iter()
        .map(|(_, text)| text)
        .collect()
}
