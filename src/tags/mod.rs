//! Tag Domain Types
//!
//! Core vocabulary shared by the server pipeline and the client session:
//! intents, personas, generation stages, tag categories, and the
//! request/response payloads for tag generation.

pub mod fallback;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::constants::tags as tag_constants;
use crate::types::LoomError;

// =============================================================================
// Intent / Persona / Stage
// =============================================================================

/// The user's stated purpose for the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Learn,
    ExamPrep,
    HomeworkHelp,
    Revision,
}

impl Intent {
    /// Human-readable label used in prompts
    pub fn label(&self) -> &'static str {
        match self {
            Self::Learn => "Learn",
            Self::ExamPrep => "Exam Prep",
            Self::HomeworkHelp => "Homework Help",
            Self::Revision => "Revision",
        }
    }

    /// Wire name, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Learn => "learn",
            Self::ExamPrep => "exam_prep",
            Self::HomeworkHelp => "homework_help",
            Self::Revision => "revision",
        }
    }
}

impl FromStr for Intent {
    type Err = LoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "learn" => Ok(Self::Learn),
            "exam_prep" | "exam-prep" => Ok(Self::ExamPrep),
            "homework_help" | "homework-help" => Ok(Self::HomeworkHelp),
            "revision" => Ok(Self::Revision),
            other => Err(LoomError::Validation(format!(
                "Unknown intent '{}'. Valid values: learn, exam_prep, homework_help, revision",
                other
            ))),
        }
    }
}

/// The user's role, which changes tag phrasing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    Teacher,
    Parent,
    Student,
}

impl Persona {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Teacher => "Teacher",
            Self::Parent => "Parent",
            Self::Student => "Student",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::Parent => "parent",
            Self::Student => "student",
        }
    }
}

impl FromStr for Persona {
    type Err = LoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "teacher" => Ok(Self::Teacher),
            "parent" => Ok(Self::Parent),
            "student" => Ok(Self::Student),
            other => Err(LoomError::Validation(format!(
                "Unknown persona '{}'. Valid values: teacher, parent, student",
                other
            ))),
        }
    }
}

/// Generation phase: initial suggestions, then follow-up suggestions
/// after the user's first selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Stage {
    Initial,
    FollowUp,
}

impl Stage {
    /// Tag count requested from the model for this stage.
    ///
    /// Enforced as a request to the model, not validated post-hoc.
    pub fn target_count(&self) -> usize {
        match self {
            Self::Initial => tag_constants::STAGE1_TARGET,
            Self::FollowUp => tag_constants::STAGE2_TARGET,
        }
    }
}

impl TryFrom<u8> for Stage {
    type Error = LoomError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Initial),
            2 => Ok(Self::FollowUp),
            other => Err(LoomError::Validation(format!(
                "Invalid stage {}. Valid values: 1, 2",
                other
            ))),
        }
    }
}

impl From<Stage> for u8 {
    fn from(stage: Stage) -> u8 {
        match stage {
            Stage::Initial => 1,
            Stage::FollowUp => 2,
        }
    }
}

// =============================================================================
// Tag Categories
// =============================================================================

/// Semantic tag category.
///
/// Declaration order is the canonical emission order; grouped output
/// always lists categories in this order regardless of model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagCategory {
    Role,
    Context,
    Task,
    Format,
    Reasoning,
}

impl TagCategory {
    /// All categories in canonical order
    pub const ALL: [TagCategory; 5] = [
        Self::Role,
        Self::Context,
        Self::Task,
        Self::Format,
        Self::Reasoning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Role => "role",
            Self::Context => "context",
            Self::Task => "task",
            Self::Format => "format",
            Self::Reasoning => "reasoning",
        }
    }
}

impl FromStr for TagCategory {
    type Err = LoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "role" | "persona" | "persona-style" => Ok(Self::Role),
            "context" => Ok(Self::Context),
            "task" => Ok(Self::Task),
            "format" => Ok(Self::Format),
            "reasoning" => Ok(Self::Reasoning),
            other => Err(LoomError::Validation(format!(
                "Unknown tag category '{}'",
                other
            ))),
        }
    }
}

/// Tags grouped by category, iterated in canonical category order
pub type TagGroups = BTreeMap<TagCategory, Vec<String>>;

// =============================================================================
// Request / Response
// =============================================================================

/// A tag-generation request, immutable per call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRequest {
    pub topic: String,
    pub intent: Intent,
    pub persona: Persona,
    pub stage: Stage,
    /// Tags the caller already holds; never returned again
    pub existing_tags: Vec<String>,
}

impl TagRequest {
    /// Check the request satisfies the generation preconditions
    pub fn validate(&self) -> crate::types::Result<()> {
        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(LoomError::Validation("Topic must not be empty".to_string()));
        }
        if topic.chars().count() < tag_constants::MIN_TOPIC_CHARS {
            return Err(LoomError::Validation(format!(
                "Topic must be at least {} characters",
                tag_constants::MIN_TOPIC_CHARS
            )));
        }
        Ok(())
    }
}

/// Tag-generation result payload.
///
/// Generation failures degrade into this same shape with
/// `fallback: true`; they are never surfaced as HTTP errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagResponse {
    pub success: bool,
    /// Flattened tags in canonical category order
    pub tags: Vec<String>,
    /// Tags grouped by category
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub groups: TagGroups,
    /// Whether static fallback content was substituted
    pub fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TagResponse {
    /// Successful model-backed response
    pub fn generated(groups: TagGroups) -> Self {
        let tags = groups.values().flatten().cloned().collect();
        Self {
            success: true,
            tags,
            groups,
            fallback: false,
            message: None,
        }
    }

    /// Static fallback response with an explanatory message
    pub fn fallback(tags: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            tags,
            groups: BTreeMap::new(),
            fallback: true,
            message: Some(message.into()),
        }
    }
}
