//! Prompt Assembly
//!
//! Pure function turning (topic, persona, intent, selected tags) into
//! the final natural-language prompt. No randomness: identical inputs
//! always produce byte-identical output, and the fixed sentences below
//! are part of the contract that tests assert on.

use crate::tags::{Intent, Persona, TagCategory};

/// Role sentence used when no role-category tag is selected
pub const DEFAULT_ROLE_LINE: &str = "Act as a knowledgeable and patient teacher.";

/// Fixed closing instruction
pub const CLOSING_LINE: &str = "Keep the response well-organized and easy to follow.";

/// Assemble the final prompt text.
///
/// With no tags selected the output is a single fixed sentence
/// containing the topic verbatim. Otherwise: a role line (the first
/// role-category tag, else the fixed default), a context line, a
/// numbered requirements list in selection order, and the fixed closing
/// sentence. The role tag that produced the role line is not repeated
/// in the requirements list.
pub fn assemble(
    topic: &str,
    persona: Persona,
    intent: Intent,
    tags: &[(TagCategory, String)],
) -> String {
    let topic = topic.trim();

    if tags.is_empty() {
        return format!(
            "Explain {} in a clear and simple way with examples that are easy to understand.",
            topic
        );
    }

    let role_tag = tags
        .iter()
        .position(|(category, _)| *category == TagCategory::Role);

    let mut out = String::new();
    match role_tag {
        Some(index) => {
            out.push_str(&tags[index].1);
            out.push('.');
        }
        None => out.push_str(DEFAULT_ROLE_LINE),
    }
    out.push('\n');

    out.push_str(&format!(
        "My role is {} and my intent is {}. The topic is {}.\n",
        persona.label(),
        intent.label(),
        topic
    ));

    out.push_str("Requirements:\n");
    let mut number = 1;
    for (index, (_, text)) in tags.iter().enumerate() {
        if Some(index) == role_tag {
            continue;
        }
        out.push_str(&format!("{}. {}\n", number, text));
        number += 1;
    }

    out.push_str(CLOSING_LINE);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_tags_yields_fixed_default_with_topic() {
        let text = assemble("Photosynthesis", Persona::Teacher, Intent::Learn, &[]);
        assert_eq!(
            text,
            "Explain Photosynthesis in a clear and simple way with examples that are easy to understand."
        );
    }

    #[test]
    fn test_assembly_is_pure() {
        let tags = vec![
            (TagCategory::Task, "Explain Key Concepts Simply".to_string()),
            (TagCategory::Format, "Use Bullet Point Lists".to_string()),
        ];
        let a = assemble("Gravity", Persona::Student, Intent::ExamPrep, &tags);
        let b = assemble("Gravity", Persona::Student, Intent::ExamPrep, &tags);
        assert_eq!(a, b);
    }

    #[test]
    fn test_role_tag_leads_and_is_not_repeated() {
        let tags = vec![
            (TagCategory::Task, "Explain Key Concepts Simply".to_string()),
            (TagCategory::Role, "Act As Science Teacher".to_string()),
        ];
        let text = assemble("Gravity", Persona::Student, Intent::Learn, &tags);

        assert!(text.starts_with("Act As Science Teacher.\n"));
        assert_eq!(text.matches("Act As Science Teacher").count(), 1);
        assert!(text.contains("1. Explain Key Concepts Simply\n"));
    }

    #[test]
    fn test_default_role_line_without_role_tag() {
        let tags = vec![(TagCategory::Task, "Explain Key Concepts Simply".to_string())];
        let text = assemble("Gravity", Persona::Parent, Intent::Learn, &tags);
        assert!(text.starts_with(DEFAULT_ROLE_LINE));
        assert!(text.ends_with(CLOSING_LINE));
    }

    #[test]
    fn test_requirements_follow_selection_order() {
        let tags = vec![
            (TagCategory::Format, "Use Bullet Point Lists".to_string()),
            (TagCategory::Task, "Explain Key Concepts Simply".to_string()),
            (TagCategory::Reasoning, "Think Step By Step".to_string()),
        ];
        let text = assemble("Gravity", Persona::Student, Intent::Revision, &tags);

        let bullets: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with(['1', '2', '3']))
            .collect();
        assert_eq!(
            bullets,
            vec![
                "1. Use Bullet Point Lists",
                "2. Explain Key Concepts Simply",
                "3. Think Step By Step"
            ]
        );
    }
}
