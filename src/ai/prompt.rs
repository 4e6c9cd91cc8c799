//! Prompt Construction
//!
//! Standardized prompt construction for the two gateway calls: tag
//! suggestion and prompt analysis. A small section-based builder keeps
//! the structure consistent (role, objectives, context, constraints).

use serde_json::{Value, json};

use crate::tags::{TagCategory, TagRequest};

/// Prompt section types
#[derive(Debug, Clone)]
enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Numbered objectives
    Objectives(Vec<String>),
    /// Labeled context line
    Context { label: String, content: String },
    /// Constraint list
    Constraints(Vec<String>),
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    pub fn objectives(mut self, objectives: Vec<String>) -> Self {
        self.sections.push(PromptSection::Objectives(objectives));
        self
    }

    pub fn context(mut self, label: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Context {
            label: label.to_string(),
            content: content.to_string(),
        });
        self
    }

    pub fn constraints(mut self, constraints: Vec<String>) -> Self {
        self.sections.push(PromptSection::Constraints(constraints));
        self
    }

    pub fn build(self) -> String {
        let mut out = String::new();
        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    out.push_str(&format!("You are {}. Your task: {}\n\n", expertise, task));
                }
                PromptSection::Objectives(items) => {
                    out.push_str("## Objectives\n");
                    for (i, item) in items.iter().enumerate() {
                        out.push_str(&format!("{}. {}\n", i + 1, item));
                    }
                    out.push('\n');
                }
                PromptSection::Context { label, content } => {
                    out.push_str(&format!("{}: {}\n", label, content));
                }
                PromptSection::Constraints(items) => {
                    out.push_str("\n## Constraints\n");
                    for item in items {
                        out.push_str(&format!("- {}\n", item));
                    }
                }
            }
        }
        out.trim_end().to_string()
    }
}

/// Build the tag-suggestion prompt and its output schema.
pub fn tag_generation(request: &TagRequest) -> (String, Value) {
    let target = request.stage.target_count();

    let mut builder = PromptBuilder::new()
        .role(
            "an expert prompt engineering coach for school education",
            "suggest short phrase tags a learner can add to refine their prompt",
        )
        .objectives(vec![
            format!("Suggest exactly {} tags in total across the categories", target),
            "Each tag must be a 3 to 4 word instruction fragment".to_string(),
            "Phrase tags so they suit the requester's role".to_string(),
        ])
        .context("Topic", request.topic.trim())
        .context("Requester role", request.persona.label())
        .context("Intent", request.intent.label());

    if !request.existing_tags.is_empty() {
        builder = builder.context("Already suggested", &request.existing_tags.join(", "));
    }

    let prompt = builder
        .constraints(vec![
            "No punctuation inside tags".to_string(),
            "Do not repeat any already suggested tag".to_string(),
            "Group tags under the schema's category keys".to_string(),
        ])
        .build();

    let mut properties = serde_json::Map::new();
    for category in TagCategory::ALL {
        properties.insert(
            category.as_str().to_string(),
            json!({"type": "array", "items": {"type": "string"}}),
        );
    }
    let schema = json!({
        "type": "object",
        "properties": Value::Object(properties),
    });

    (prompt, schema)
}

/// Build the prompt-analysis prompt and its output schema.
pub fn prompt_analysis(student_prompt: &str) -> (String, Value) {
    let prompt = PromptBuilder::new()
        .role(
            "an expert prompt engineering tutor",
            "score a learner's prompt and rewrite it into a well-structured form",
        )
        .objectives(vec![
            "Score the prompt from 0 to 100 across clarity, context, specificity, and structure"
                .to_string(),
            "Give one short paragraph of constructive feedback".to_string(),
            "Rewrite the prompt into the structured fields of the schema".to_string(),
        ])
        .context("Learner prompt", student_prompt.trim())
        .constraints(vec![
            "Leave a rewrite field null rather than inventing content for it".to_string(),
        ])
        .build();

    let schema = json!({
        "type": "object",
        "required": ["score", "feedback"],
        "properties": {
            "score": {"type": "integer", "minimum": 0, "maximum": 100},
            "feedback": {"type": "string"},
            "improvedPrompt": {
                "type": "object",
                "properties": {
                    "role": {"type": ["string", "null"]},
                    "context": {"type": ["string", "null"]},
                    "task": {"type": ["string", "null"]},
                    "exemplars": {"type": ["string", "null"]},
                    "persona": {"type": ["string", "null"]},
                    "format": {"type": ["string", "null"]},
                    "tone": {"type": ["string", "null"]}
                }
            }
        }
    });

    (prompt, schema)
}
