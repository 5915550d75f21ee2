use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four lists that make up a [`StudentProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Subjects,
    Interests,
    Strengths,
    Hobbies,
}

impl ProfileField {
    /// All fields, in extraction order.
    pub const ALL: [ProfileField; 4] = [
        ProfileField::Subjects,
        ProfileField::Interests,
        ProfileField::Strengths,
        ProfileField::Hobbies,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProfileField::Subjects => "subjects",
            ProfileField::Interests => "interests",
            ProfileField::Strengths => "strengths",
            ProfileField::Hobbies => "hobbies",
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Accumulated facts about a student, inferred from what they typed.
///
/// Each list keeps first-mentioned-first order and never holds two entries
/// that compare equal ignoring case. Entries are only ever appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StudentProfile {
    interests: Vec<String>,
    subjects: Vec<String>,
    strengths: Vec<String>,
    hobbies: Vec<String>,
}

impl StudentProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interests(&self) -> &[String] {
        &self.interests
    }

    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    pub fn strengths(&self) -> &[String] {
        &self.strengths
    }

    pub fn hobbies(&self) -> &[String] {
        &self.hobbies
    }

    pub fn entries(&self, field: ProfileField) -> &[String] {
        match field {
            ProfileField::Subjects => &self.subjects,
            ProfileField::Interests => &self.interests,
            ProfileField::Strengths => &self.strengths,
            ProfileField::Hobbies => &self.hobbies,
        }
    }

    fn entries_mut(&mut self, field: ProfileField) -> &mut Vec<String> {
        match field {
            ProfileField::Subjects => &mut self.subjects,
            ProfileField::Interests => &mut self.interests,
            ProfileField::Strengths => &mut self.strengths,
            ProfileField::Hobbies => &mut self.hobbies,
        }
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, field: ProfileField, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        self.entries(field)
            .iter()
            .any(|existing| existing.to_lowercase() == term)
    }

    /// Appends `term` unless an equivalent entry is already present.
    ///
    /// Returns `true` when the profile changed.
    pub fn add(&mut self, field: ProfileField, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() || self.contains(field, term) {
            return false;
        }
        self.entries_mut(field).push(term.to_string());
        true
    }

    /// Builder-style variant of [`StudentProfile::add`].
    pub fn with(mut self, field: ProfileField, term: &str) -> Self {
        self.add(field, term);
        self
    }

    /// Sum of the lengths of all four lists.
    pub fn total_info_count(&self) -> usize {
        ProfileField::ALL
            .iter()
            .map(|field| self.entries(*field).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_info_count() == 0
    }

    /// True when any entry of the given fields contains `keyword` (lowercase).
    pub fn mentions(&self, fields: &[ProfileField], keyword: &str) -> bool {
        fields.iter().any(|field| {
            self.entries(*field)
                .iter()
                .any(|entry| entry.to_lowercase().contains(keyword))
        })
    }

    /// Share of the four lists that hold at least one entry (0.0 - 1.0).
    pub fn completeness(&self) -> f32 {
        let filled = ProfileField::ALL
            .iter()
            .filter(|field| !self.entries(**field).is_empty())
            .count();
        filled as f32 / ProfileField::ALL.len() as f32
    }

    /// What the counselor still does not know about the student.
    pub fn missing_information(&self) -> Vec<MissingInfo> {
        let mut missing = Vec::new();
        if self.interests.is_empty() && self.hobbies.is_empty() {
            missing.push(MissingInfo::InterestsAndHobbies);
        }
        if self.subjects.is_empty() {
            missing.push(MissingInfo::FavoriteSubjects);
        }
        if self.strengths.is_empty() {
            missing.push(MissingInfo::Strengths);
        }
        missing
    }

    /// Interest categories touched by interests, hobbies and subjects,
    /// most-mentioned first. Ties keep [`InterestCategory::ALL`] order.
    pub fn dominant_categories(&self) -> Vec<InterestCategory> {
        let mentions: Vec<String> = self
            .interests
            .iter()
            .chain(self.hobbies.iter())
            .chain(self.subjects.iter())
            .map(|entry| entry.to_lowercase())
            .collect();

        let mut counted: Vec<(InterestCategory, usize)> = InterestCategory::ALL
            .iter()
            .map(|category| {
                let count = mentions
                    .iter()
                    .filter(|entry| category.keywords().iter().any(|kw| entry.contains(kw)))
                    .count();
                (*category, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect();

        // stable sort keeps the fixed order among equal counts
        counted.sort_by(|a, b| b.1.cmp(&a.1));
        counted.into_iter().map(|(category, _)| category).collect()
    }
}

/// Gaps in a profile, reported alongside clarifying questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingInfo {
    InterestsAndHobbies,
    FavoriteSubjects,
    Strengths,
}

/// Broad interest groupings used to summarise a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestCategory {
    Creative,
    Analytical,
    Social,
    HandsOn,
    Entrepreneurial,
    Nature,
    Technology,
}

impl InterestCategory {
    pub const ALL: [InterestCategory; 7] = [
        InterestCategory::Creative,
        InterestCategory::Analytical,
        InterestCategory::Social,
        InterestCategory::HandsOn,
        InterestCategory::Entrepreneurial,
        InterestCategory::Nature,
        InterestCategory::Technology,
    ];

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            InterestCategory::Creative => {
                &["art", "music", "draw", "paint", "design", "creative", "write", "writing"]
            }
            InterestCategory::Analytical => &["math", "logic", "puzzle", "analy", "research", "data"],
            InterestCategory::Social => &["people", "help", "team", "communicat", "counsel", "teach"],
            InterestCategory::HandsOn => &["build", "fix", "craft", "make", "construct", "repair"],
            InterestCategory::Entrepreneurial => &["business", "lead", "manag", "sell", "organiz"],
            InterestCategory::Nature => &["nature", "environment", "animal", "outdoor", "plant"],
            InterestCategory::Technology => {
                &["computer", "code", "coding", "program", "tech", "digital", "software"]
            }
        }
    }
}

/// Broad career field a recommendation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareerField {
    Technology,
    Healthcare,
    CreativeArts,
    Business,
    Education,
    ScienceResearch,
    SocialServices,
}

impl CareerField {
    pub fn label(&self) -> &'static str {
        match self {
            CareerField::Technology => "Technology",
            CareerField::Healthcare => "Healthcare",
            CareerField::CreativeArts => "Creative Arts",
            CareerField::Business => "Business",
            CareerField::Education => "Education",
            CareerField::ScienceResearch => "Science & Research",
            CareerField::SocialServices => "Social Services",
        }
    }
}

/// A single career suggestion.
///
/// `match_score` is informational only; lists of entries are ordered by the
/// rule that produced them, never by score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationEntry {
    pub title: String,
    pub field: CareerField,
    pub rationale: String,
    pub next_steps: Vec<String>,
    pub match_score: f32,
    pub skills: Vec<String>,
    pub outlook: String,
    pub salary_range: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_case_insensitive() {
        let mut profile = StudentProfile::new();
        assert!(profile.add(ProfileField::Subjects, "Biology"));
        assert!(!profile.add(ProfileField::Subjects, "biology"));
        assert!(!profile.add(ProfileField::Subjects, "  BIOLOGY "));
        assert_eq!(profile.subjects(), &["Biology".to_string()]);
    }

    #[test]
    fn test_add_rejects_blank() {
        let mut profile = StudentProfile::new();
        assert!(!profile.add(ProfileField::Hobbies, "   "));
        assert!(profile.is_empty());
    }

    #[test]
    fn test_same_term_allowed_in_different_fields() {
        let profile = StudentProfile::new()
            .with(ProfileField::Interests, "Music")
            .with(ProfileField::Hobbies, "Music");
        assert_eq!(profile.total_info_count(), 2);
    }

    #[test]
    fn test_completeness() {
        let profile = StudentProfile::new();
        assert_eq!(profile.completeness(), 0.0);

        let profile = profile
            .with(ProfileField::Subjects, "Math")
            .with(ProfileField::Subjects, "Physics")
            .with(ProfileField::Strengths, "Leadership");
        assert!((profile.completeness() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_missing_information() {
        let profile = StudentProfile::new().with(ProfileField::Hobbies, "Cooking");
        assert_eq!(
            profile.missing_information(),
            vec![MissingInfo::FavoriteSubjects, MissingInfo::Strengths]
        );

        let empty = StudentProfile::new();
        assert_eq!(empty.missing_information().len(), 3);
    }

    #[test]
    fn test_dominant_categories_ordering() {
        let profile = StudentProfile::new()
            .with(ProfileField::Interests, "Coding")
            .with(ProfileField::Interests, "Computers")
            .with(ProfileField::Hobbies, "Drawing");

        let categories = profile.dominant_categories();
        assert_eq!(
            categories,
            vec![InterestCategory::Technology, InterestCategory::Creative]
        );
    }

    #[test]
    fn test_dominant_categories_empty() {
        assert!(StudentProfile::new().dominant_categories().is_empty());
    }

    #[test]
    fn test_profile_serializes_all_lists() {
        let profile = StudentProfile::new().with(ProfileField::Subjects, "History");
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["subjects"][0], "History");
        assert!(json["interests"].as_array().unwrap().is_empty());
        assert!(json["hobbies"].as_array().unwrap().is_empty());
        assert!(json["strengths"].as_array().unwrap().is_empty());
    }
}
