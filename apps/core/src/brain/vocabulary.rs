//! Vocabulary tables for profile extraction.
//!
//! Each table maps a canonical lowercase term to the profile list it feeds.
//! Hobby terms are only considered when the utterance carries a free-time cue.

use std::sync::LazyLock;

use crate::models::ProfileField;

/// Built-in term table, in scan order within each field.
const TERM_TABLE: &[(&str, ProfileField)] = &[
    // Subjects
    ("biology", ProfileField::Subjects),
    ("chemistry", ProfileField::Subjects),
    ("physics", ProfileField::Subjects),
    ("math", ProfileField::Subjects),
    ("english", ProfileField::Subjects),
    ("history", ProfileField::Subjects),
    ("geography", ProfileField::Subjects),
    ("economics", ProfileField::Subjects),
    ("literature", ProfileField::Subjects),
    ("psychology", ProfileField::Subjects),
    ("computer science", ProfileField::Subjects),
    // Interests
    ("science", ProfileField::Interests),
    ("art", ProfileField::Interests),
    ("music", ProfileField::Interests),
    ("technology", ProfileField::Interests),
    ("computers", ProfileField::Interests),
    ("coding", ProfileField::Interests),
    ("programming", ProfileField::Interests),
    ("design", ProfileField::Interests),
    ("writing", ProfileField::Interests),
    ("reading", ProfileField::Interests),
    ("sports", ProfileField::Interests),
    ("nature", ProfileField::Interests),
    ("animals", ProfileField::Interests),
    ("helping people", ProfileField::Interests),
    ("business", ProfileField::Interests),
    ("photography", ProfileField::Interests),
    // Strengths
    ("problem solving", ProfileField::Strengths),
    ("critical thinking", ProfileField::Strengths),
    ("communication", ProfileField::Strengths),
    ("creativity", ProfileField::Strengths),
    ("leadership", ProfileField::Strengths),
    ("teamwork", ProfileField::Strengths),
    ("analytical", ProfileField::Strengths),
    ("organization", ProfileField::Strengths),
    ("empathy", ProfileField::Strengths),
    ("attention to detail", ProfileField::Strengths),
    // Hobbies
    ("music", ProfileField::Hobbies),
    ("reading", ProfileField::Hobbies),
    ("drawing", ProfileField::Hobbies),
    ("painting", ProfileField::Hobbies),
    ("gaming", ProfileField::Hobbies),
    ("sports", ProfileField::Hobbies),
    ("photography", ProfileField::Hobbies),
    ("cooking", ProfileField::Hobbies),
    ("writing", ProfileField::Hobbies),
    ("hiking", ProfileField::Hobbies),
    ("dancing", ProfileField::Hobbies),
    ("coding", ProfileField::Hobbies),
];

/// Phrases that frame an utterance as a free-time activity.
const HOBBY_CUES: &[&str] = &["free time", "hobby", "hobbies"];

/// Shared default vocabulary, built once.
pub static DEFAULT_VOCABULARY: LazyLock<Vocabulary> = LazyLock::new(Vocabulary::builtin);

/// Term tables grouped by profile field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    subjects: Vec<String>,
    interests: Vec<String>,
    strengths: Vec<String>,
    hobbies: Vec<String>,
    hobby_cues: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        DEFAULT_VOCABULARY.clone()
    }
}

impl Vocabulary {
    fn builtin() -> Self {
        Self::from_table(TERM_TABLE, HOBBY_CUES)
    }

    /// Build a vocabulary from a `(term, field)` table and a list of hobby cues.
    ///
    /// Terms are lowercased and trimmed; duplicates within a field are dropped.
    pub fn from_table(table: &[(&str, ProfileField)], hobby_cues: &[&str]) -> Self {
        let mut vocabulary = Self {
            subjects: Vec::new(),
            interests: Vec::new(),
            strengths: Vec::new(),
            hobbies: Vec::new(),
            hobby_cues: hobby_cues
                .iter()
                .map(|cue| cue.trim().to_lowercase())
                .filter(|cue| !cue.is_empty())
                .collect(),
        };

        for (term, field) in table {
            let term = term.trim().to_lowercase();
            if term.is_empty() {
                continue;
            }
            let list = vocabulary.list_mut(*field);
            if !list.contains(&term) {
                list.push(term);
            }
        }

        vocabulary
    }

    fn list_mut(&mut self, field: ProfileField) -> &mut Vec<String> {
        match field {
            ProfileField::Subjects => &mut self.subjects,
            ProfileField::Interests => &mut self.interests,
            ProfileField::Strengths => &mut self.strengths,
            ProfileField::Hobbies => &mut self.hobbies,
        }
    }

    /// Terms feeding the given field, in scan order.
    pub fn terms(&self, field: ProfileField) -> &[String] {
        match field {
            ProfileField::Subjects => &self.subjects,
            ProfileField::Interests => &self.interests,
            ProfileField::Strengths => &self.strengths,
            ProfileField::Hobbies => &self.hobbies,
        }
    }

    pub fn hobby_cues(&self) -> &[String] {
        &self.hobby_cues
    }

    /// True when `lowered` (an already-lowercased utterance) carries a free-time cue.
    pub fn is_hobby_framed(&self, lowered: &str) -> bool {
        self.hobby_cues.iter().any(|cue| lowered.contains(cue.as_str()))
    }

    pub fn is_hobby_term(&self, term: &str) -> bool {
        self.hobbies.iter().any(|hobby| hobby == term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_are_populated() {
        let vocabulary = Vocabulary::default();
        for field in ProfileField::ALL {
            assert!(!vocabulary.terms(field).is_empty(), "{} table is empty", field);
        }
        assert!(vocabulary.terms(ProfileField::Subjects).contains(&"biology".to_string()));
        assert!(vocabulary.terms(ProfileField::Strengths).contains(&"problem solving".to_string()));
    }

    #[test]
    fn test_from_table_normalizes_and_dedupes() {
        let vocabulary = Vocabulary::from_table(
            &[
                (" Chess ", ProfileField::Hobbies),
                ("chess", ProfileField::Hobbies),
                ("", ProfileField::Interests),
            ],
            &["Weekend"],
        );
        assert_eq!(vocabulary.terms(ProfileField::Hobbies), &["chess".to_string()]);
        assert!(vocabulary.terms(ProfileField::Interests).is_empty());
        assert!(vocabulary.is_hobby_framed("on the weekend i play"));
    }

    #[test]
    fn test_hobby_cues() {
        let vocabulary = Vocabulary::default();
        assert!(vocabulary.is_hobby_framed("in my free time i paint"));
        assert!(vocabulary.is_hobby_framed("my hobbies are many"));
        assert!(!vocabulary.is_hobby_framed("i like music"));
    }
}
