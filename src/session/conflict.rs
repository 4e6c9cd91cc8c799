//! Conflict Detection
//!
//! A fixed table of mutually-exclusive keyword pairs scanned against
//! the current selection. When several rules match at once only the
//! first is surfaced; that is documented behavior, not a limitation.

/// One mutually-exclusive keyword pairing
#[derive(Debug)]
pub struct ConflictRule {
    left: &'static [&'static str],
    right: &'static [&'static str],
    /// User-facing warning text
    pub message: &'static str,
}

/// Conflict rules, checked in order; first match wins
pub const CONFLICT_RULES: &[ConflictRule] = &[
    ConflictRule {
        left: &["short", "brief", "concise"],
        right: &["detailed", "comprehensive", "in depth"],
        message: "You asked for both a brief and a detailed response; pick one",
    },
    ConflictRule {
        left: &["simple", "beginner"],
        right: &["advanced", "technical", "expert"],
        message: "You asked for both a simple and an advanced level; pick one",
    },
    ConflictRule {
        left: &["formal", "professional"],
        right: &["casual", "fun", "playful"],
        message: "You asked for both a formal and a casual tone; pick one",
    },
];

impl ConflictRule {
    fn matches(&self, selected_lower: &[String]) -> bool {
        let hit = |keywords: &[&str]| {
            selected_lower
                .iter()
                .any(|tag| keywords.iter().any(|kw| tag.contains(kw)))
        };
        hit(self.left) && hit(self.right)
    }
}

/// Scan the selection against the rule table.
///
/// Returns the first matching rule's message, or None when the
/// selection is consistent.
pub fn detect_conflict<'a>(selected: impl Iterator<Item = &'a str>) -> Option<&'static str> {
    let selected_lower: Vec<String> = selected.map(|t| t.to_lowercase()).collect();

    CONFLICT_RULES
        .iter()
        .find(|rule| rule.matches(&selected_lower))
        .map(|rule| rule.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brief_vs_comprehensive() {
        let tags = ["Keep It Brief Please", "Give Comprehensive Full Coverage"];
        let conflict = detect_conflict(tags.iter().copied());
        assert_eq!(conflict, Some(CONFLICT_RULES[0].message));
    }

    #[test]
    fn test_no_conflict_without_both_sides() {
        let tags = ["Keep It Brief Please", "Use Bullet Point Lists"];
        assert_eq!(detect_conflict(tags.iter().copied()), None);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let tags = [
            "Short Simple Summary Please",
            "Comprehensive Advanced Technical Coverage",
        ];
        // Both rule 1 and rule 2 match; only the first is surfaced
        let conflict = detect_conflict(tags.iter().copied());
        assert_eq!(conflict, Some(CONFLICT_RULES[0].message));
    }

    #[test]
    fn test_removing_either_side_clears_conflict() {
        let tags = ["Give Comprehensive Full Coverage"];
        assert_eq!(detect_conflict(tags.iter().copied()), None);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let tags = ["FORMAL Academic Register", "Keep It Fun Please"];
        assert!(detect_conflict(tags.iter().copied()).is_some());
    }
}
