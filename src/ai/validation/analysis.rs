//! Prompt Analysis Response Shaping
//!
//! Turns the model's scoring payload into the `PromptAnalysis` contract:
//! score clamped to 0-100, feedback required, and a structured rewrite
//! whose fields are all nullable except `task`, which defaults to the
//! learner's original prompt so the rewrite is always usable.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{LoomError, Result};

/// Structured rewrite of the learner's prompt.
///
/// Every field the model may omit stays `None`; `task` alone is
/// guaranteed present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovedPrompt {
    pub role: Option<String>,
    pub context: Option<String>,
    pub task: String,
    pub exemplars: Option<String>,
    pub persona: Option<String>,
    pub format: Option<String>,
    pub tone: Option<String>,
}

/// Scored critique of a learner-authored prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptAnalysis {
    /// 0-100 across clarity, context, specificity, and structure
    pub score: u8,
    pub feedback: String,
    #[serde(rename = "improvedPrompt")]
    pub improved_prompt: ImprovedPrompt,
}

/// Shape a raw model payload into a `PromptAnalysis`.
///
/// `original_prompt` backfills the rewrite's `task` when the model
/// omits it.
pub fn shape_analysis(payload: &Value, original_prompt: &str) -> Result<PromptAnalysis> {
    let score = payload
        .get("score")
        .and_then(Value::as_i64)
        .ok_or_else(|| LoomError::Validation("Analysis payload missing score".to_string()))?
        .clamp(0, 100) as u8;

    let feedback = payload
        .get("feedback")
        .and_then(Value::as_str)
        .ok_or_else(|| LoomError::Validation("Analysis payload missing feedback".to_string()))?
        .to_string();

    let rewrite = payload.get("improvedPrompt").unwrap_or(&Value::Null);
    let field = |name: &str| -> Option<String> {
        rewrite
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    let improved_prompt = ImprovedPrompt {
        role: field("role"),
        context: field("context"),
        task: field("task").unwrap_or_else(|| original_prompt.to_string()),
        exemplars: field("exemplars"),
        persona: field("persona"),
        format: field("format"),
        tone: field("tone"),
    };

    Ok(PromptAnalysis {
        score,
        feedback,
        improved_prompt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_complete_payload() {
        let payload = json!({
            "score": 72,
            "feedback": "Add more context about the audience.",
            "improvedPrompt": {
                "role": "You are a biology teacher",
                "task": "Explain photosynthesis",
                "format": "Bullet points"
            }
        });
        let analysis = shape_analysis(&payload, "explain photosynthesis").unwrap();
        assert_eq!(analysis.score, 72);
        assert_eq!(analysis.improved_prompt.task, "Explain photosynthesis");
        assert_eq!(analysis.improved_prompt.context, None);
        assert_eq!(analysis.improved_prompt.tone, None);
    }

    #[test]
    fn test_task_defaults_to_original_prompt() {
        let payload = json!({
            "score": 40,
            "feedback": "Too vague.",
            "improvedPrompt": {}
        });
        let analysis = shape_analysis(&payload, "tell me about plants").unwrap();
        assert_eq!(analysis.improved_prompt.task, "tell me about plants");
    }

    #[test]
    fn test_missing_rewrite_object_still_usable() {
        let payload = json!({"score": 10, "feedback": "Say what you want."});
        let analysis = shape_analysis(&payload, "plants?").unwrap();
        assert_eq!(analysis.improved_prompt.task, "plants?");
    }

    #[test]
    fn test_score_clamped() {
        let payload = json!({"score": 150, "feedback": "ok"});
        assert_eq!(shape_analysis(&payload, "p").unwrap().score, 100);

        let payload = json!({"score": -5, "feedback": "ok"});
        assert_eq!(shape_analysis(&payload, "p").unwrap().score, 0);
    }

    #[test]
    fn test_missing_score_or_feedback_is_error() {
        assert!(shape_analysis(&json!({"feedback": "x"}), "p").is_err());
        assert!(shape_analysis(&json!({"score": 50}), "p").is_err());
    }

    #[test]
    fn test_blank_fields_become_null() {
        let payload = json!({
            "score": 60,
            "feedback": "ok",
            "improvedPrompt": {"role": "  ", "task": "Do the thing"}
        });
        let analysis = shape_analysis(&payload, "p").unwrap();
        assert_eq!(analysis.improved_prompt.role, None);
    }
}
