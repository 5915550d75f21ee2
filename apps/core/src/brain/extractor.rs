//! Profile extraction by vocabulary lookup.
//!
//! Plain case-insensitive substring search, no fuzzy matching and no negation
//! handling: "I don't like biology" still records Biology.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use super::vocabulary::Vocabulary;
use crate::models::{ProfileField, StudentProfile};

/// Profile fields returned by an external extraction delegate.
///
/// Keys the delegate omits deserialize as empty lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileDelta {
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub hobbies: Vec<String>,
    #[serde(default)]
    pub favorite_subjects: Vec<String>,
    #[serde(default)]
    pub academic_strengths: Vec<String>,
}

impl ProfileDelta {
    pub fn is_empty(&self) -> bool {
        self.interests.is_empty()
            && self.hobbies.is_empty()
            && self.favorite_subjects.is_empty()
            && self.academic_strengths.is_empty()
    }

    fn entries(&self) -> impl Iterator<Item = (ProfileField, &String)> {
        self.favorite_subjects
            .iter()
            .map(|t| (ProfileField::Subjects, t))
            .chain(self.interests.iter().map(|t| (ProfileField::Interests, t)))
            .chain(self.academic_strengths.iter().map(|t| (ProfileField::Strengths, t)))
            .chain(self.hobbies.iter().map(|t| (ProfileField::Hobbies, t)))
    }
}

/// Scans utterances for known vocabulary and files hits into a profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileExtractor {
    vocabulary: Arc<Vocabulary>,
}

impl ProfileExtractor {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Returns a copy of `profile` with everything found in `utterance` appended.
    pub fn extract(&self, profile: &StudentProfile, utterance: &str) -> StudentProfile {
        let mut next = profile.clone();
        self.apply(&mut next, utterance);
        next
    }

    /// Appends matches to `profile` in place and returns what was added.
    pub fn apply(&self, profile: &mut StudentProfile, utterance: &str) -> Vec<(ProfileField, String)> {
        let lowered = utterance.to_lowercase();
        let hobby_framed = self.vocabulary.is_hobby_framed(&lowered);
        let mut added = Vec::new();

        for field in ProfileField::ALL {
            if field == ProfileField::Hobbies && !hobby_framed {
                continue;
            }

            for term in self.vocabulary.terms(field) {
                // free-time framing routes hobby terms away from interests
                if field == ProfileField::Interests
                    && hobby_framed
                    && self.vocabulary.is_hobby_term(term)
                {
                    continue;
                }

                if !self.matches(field, term, &lowered) {
                    continue;
                }

                let entry = capitalize(term);
                if profile.add(field, &entry) {
                    added.push((field, entry));
                }
            }
        }

        if !added.is_empty() {
            debug!("Extracted {} new profile entries", added.len());
        }
        added
    }

    fn matches(&self, field: ProfileField, term: &str, lowered: &str) -> bool {
        if lowered.contains(term) {
            return true;
        }
        // "problemsolving" for "problem solving"
        field == ProfileField::Strengths
            && term.contains(' ')
            && lowered.contains(&term.replace(' ', ""))
    }

    /// Merges delegate output into `profile` with the same casing and dedupe rules.
    pub fn merge(&self, profile: &mut StudentProfile, delta: &ProfileDelta) -> usize {
        delta
            .entries()
            .filter(|(field, term)| profile.add(*field, &capitalize(term.trim())))
            .count()
    }
}

/// Upper-cases the first character, leaving the rest untouched.
pub fn capitalize(term: &str) -> String {
    let mut chars = term.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
