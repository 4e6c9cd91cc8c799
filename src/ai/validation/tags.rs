//! Tag Validator
//!
//! Filters raw model output against the tag-shape rules and groups the
//! survivors by semantic category.
//!
//! Pipeline per candidate string:
//! 1. Strip punctuation, collapse whitespace, title-case
//! 2. Retain only candidates with 3-4 words
//! 3. Drop duplicates of caller-supplied existing tags
//!
//! Zero retained tags across all categories is a failure; the caller
//! substitutes fallback content.

use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

use crate::constants::tags::{MAX_TAG_WORDS, MIN_TAG_WORDS};
use crate::tags::{TagCategory, TagGroups};
use crate::types::{LoomError, Result};

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").unwrap_or_else(|_| unreachable!()));

/// Normalize a candidate tag: strip punctuation, collapse whitespace,
/// title-case each word.
pub fn normalize_tag(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let collapsed = WHITESPACE.replace_all(stripped.trim(), " ");

    collapsed
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Validator for model-suggested tags
#[derive(Debug, Default)]
pub struct TagValidator;

impl TagValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a parsed model payload against the tag-shape rules.
    ///
    /// Accepts either the canonical categorized object (category name →
    /// array of strings, with `"tags"` treated as the task category) or
    /// a bare flat array. Model ordering is preserved within each
    /// category; the output map iterates categories in canonical order.
    pub fn validate(&self, payload: &Value, existing_tags: &[String]) -> Result<TagGroups> {
        let mut seen: HashSet<String> = existing_tags.iter().map(|t| normalize_tag(t)).collect();
        let mut groups = TagGroups::new();

        match payload {
            Value::Array(items) => {
                self.collect(items, TagCategory::Task, &mut seen, &mut groups);
            }
            Value::Object(map) => {
                for (key, value) in map {
                    let Value::Array(items) = value else {
                        continue;
                    };
                    let category = if key == "tags" {
                        TagCategory::Task
                    } else {
                        match key.parse::<TagCategory>() {
                            Ok(c) => c,
                            Err(_) => {
                                debug!(key, "skipping unknown tag category");
                                continue;
                            }
                        }
                    };
                    self.collect(items, category, &mut seen, &mut groups);
                }
            }
            _ => {
                return Err(LoomError::Validation(
                    "Tag payload is neither an object nor an array".to_string(),
                ));
            }
        }

        if groups.values().all(|tags| tags.is_empty()) {
            return Err(LoomError::Validation(
                "No valid tags after filtering".to_string(),
            ));
        }
        groups.retain(|_, tags| !tags.is_empty());

        Ok(groups)
    }

    fn collect(
        &self,
        items: &[Value],
        category: TagCategory,
        seen: &mut HashSet<String>,
        groups: &mut TagGroups,
    ) {
        let bucket = groups.entry(category).or_default();
        for item in items {
            let Some(raw) = item.as_str() else { continue };
            let tag = normalize_tag(raw);
            let words = tag.split(' ').filter(|w| !w.is_empty()).count();

            if !(MIN_TAG_WORDS..=MAX_TAG_WORDS).contains(&words) {
                debug!(tag, words, "dropping tag with out-of-range word count");
                continue;
            }
            if !seen.insert(tag.clone()) {
                debug!(tag, "dropping duplicate tag");
                continue;
            }
            bucket.push(tag);
        }
    }
}
