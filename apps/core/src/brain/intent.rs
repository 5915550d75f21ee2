//! Discussion intent classification using regex patterns.
//!
//! Once recommendations have been given, every student turn is sorted into
//! one of three canned intents. Patterns are checked in priority order and
//! the first group with a hit wins.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// What the student wants after seeing recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscussionIntent {
    /// Wants detail on a specific career (tell me more, details, explore...)
    CareerDetail,
    /// Wants different options (other, different, something else...)
    OtherOptions,
    /// Anything else
    General,
}

impl fmt::Display for DiscussionIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl DiscussionIntent {
    pub fn label(&self) -> &'static str {
        match self {
            DiscussionIntent::CareerDetail => "career_detail",
            DiscussionIntent::OtherOptions => "other_options",
            DiscussionIntent::General => "general",
        }
    }
}

/// Result of intent classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent: DiscussionIntent,
    /// Text fragments that matched
    pub matched_patterns: Vec<String>,
}

struct IntentPattern {
    intent: DiscussionIntent,
    patterns: &'static [Regex],
}

// NOTE: expect() is acceptable here, the patterns are literals.
// Only the leading edge is anchored so inflections ("others", "exploring")
// still match while "another" does not.
static DETAIL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\b(tell me more|learn more)").expect("Invalid regex: more-about phrases"),
        Regex::new(r"(?i)\b(details?|explor)").expect("Invalid regex: detail words"),
    ]
});

static OTHER_OPTIONS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\b(other|different)").expect("Invalid regex: alternative words"),
        Regex::new(r"(?i)\b(more options|something else)").expect("Invalid regex: alternative phrases"),
    ]
});

/// Classifier for the three discussion intents
pub struct IntentClassifier {
    patterns: Vec<IntentPattern>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    pub fn new() -> Self {
        let patterns = vec![
            IntentPattern {
                intent: DiscussionIntent::CareerDetail,
                patterns: DETAIL_PATTERNS.as_slice(),
            },
            IntentPattern {
                intent: DiscussionIntent::OtherOptions,
                patterns: OTHER_OPTIONS_PATTERNS.as_slice(),
            },
        ];

        Self { patterns }
    }

    /// Classify a discussion turn
    pub fn classify(&self, text: &str) -> IntentResult {
        let text = text.trim();

        for group in &self.patterns {
            let matched_patterns: Vec<String> = group
                .patterns
                .iter()
                .filter_map(|pattern| pattern.find(text))
                .map(|m| m.as_str().to_string())
                .collect();

            if !matched_patterns.is_empty() {
                return IntentResult {
                    intent: group.intent,
                    matched_patterns,
                };
            }
        }

        IntentResult {
            intent: DiscussionIntent::General,
            matched_patterns: vec![],
        }
    }
}
