//! JSON Repair Mechanism
//!
//! Unified JSON extraction and repair for LLM responses.
//!
//! Handles common LLM JSON output issues:
//! - Markdown code fence wrapping (```json ... ```)
//! - Trailing commas
//! - Missing closing braces/brackets
//! - JSON embedded in explanatory text
//!
//! Repair failure here is the hard parse failure the tag pipeline
//! treats as "fall back to static content".

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::types::{LoomError, Result};

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([\]}])").unwrap_or_else(|_| unreachable!()));

/// Extract and parse JSON from an LLM response.
///
/// This is the primary entry point for parsing LLM JSON output.
pub fn extract_json_from_response(content: &str) -> Result<Value> {
    let repairer = JsonRepairer::new();
    repairer.parse_or_repair(content).map(|(value, _)| value)
}

/// JSON repair strategies
#[derive(Debug, Default)]
pub struct JsonRepairer;

impl JsonRepairer {
    pub fn new() -> Self {
        Self
    }

    /// Parse JSON, attempting repair if the initial parse fails.
    ///
    /// Returns (value, was_repaired).
    pub fn parse_or_repair(&self, raw: &str) -> Result<(Value, bool)> {
        let cleaned = self.preprocess(raw);

        if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
            return Ok((value, false));
        }

        debug!("Initial JSON parse failed, attempting repair");

        let repaired = self.balance_brackets(&TRAILING_COMMA.replace_all(&cleaned, "$1"));
        if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
            warn!("JSON repaired");
            return Ok((value, true));
        }

        // Final attempt: pull JSON out of surrounding explanatory text
        if let Some(extracted) = self.extract_embedded(&cleaned)
            && let Ok(value) = serde_json::from_str::<Value>(&extracted)
        {
            warn!("JSON extracted from mixed content");
            return Ok((value, true));
        }

        Err(LoomError::LlmApi(format!(
            "Failed to parse or repair JSON. Content preview: {}...",
            &cleaned.chars().take(200).collect::<String>()
        )))
    }

    /// Strip code fences, BOM, and surrounding whitespace
    fn preprocess(&self, raw: &str) -> String {
        let mut s = raw.trim().trim_start_matches('\u{feff}').to_string();

        if s.starts_with("```")
            && let Some(first_newline) = s.find('\n')
        {
            s = s[first_newline + 1..].to_string();
        }
        if s.ends_with("```") {
            s.truncate(s.len() - 3);
        }

        s.trim().to_string()
    }

    /// Append closers for unbalanced braces/brackets and close an
    /// unterminated trailing string.
    fn balance_brackets(&self, s: &str) -> String {
        let mut braces = 0i32;
        let mut brackets = 0i32;
        let mut in_string = false;
        let mut escape = false;

        for ch in s.chars() {
            if escape {
                escape = false;
                continue;
            }
            match ch {
                '\\' if in_string => escape = true,
                '"' => in_string = !in_string,
                '{' if !in_string => braces += 1,
                '}' if !in_string => braces -= 1,
                '[' if !in_string => brackets += 1,
                ']' if !in_string => brackets -= 1,
                _ => {}
            }
        }

        let mut result = s.to_string();
        if in_string {
            result.push('"');
        }
        for _ in 0..brackets.max(0) {
            result.push(']');
        }
        for _ in 0..braces.max(0) {
            result.push('}');
        }
        result
    }

    /// Extract the first complete JSON object or array from mixed text
    fn extract_embedded(&self, s: &str) -> Option<String> {
        let start = s.find(['{', '['])?;
        let mut depth = 0i32;
        let mut in_string = false;
        let mut escape = false;

        for (i, ch) in s[start..].char_indices() {
            if escape {
                escape = false;
                continue;
            }
            match ch {
                '\\' if in_string => escape = true,
                '"' => in_string = !in_string,
                '{' | '[' if !in_string => depth += 1,
                '}' | ']' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(s[start..start + i + 1].to_string());
                    }
                }
                _ => {}
            }
        }
        None
    }
}
