//! Rule-based recommendation matching.
//!
//! Rules are evaluated in a fixed order and each firing rule appends its
//! careers at its own position. Nothing is ranked or deduplicated. When no
//! rule fires the two fallback careers are returned, so the result is never
//! empty.

use crate::models::{CareerField, ProfileField, RecommendationEntry, StudentProfile};

/// Static description of a career a rule can emit.
#[derive(Debug)]
pub struct CareerTemplate {
    pub title: &'static str,
    pub field: CareerField,
    pub rationale: &'static str,
    pub next_steps: &'static [&'static str],
    pub match_score: f32,
    pub skills: &'static [&'static str],
    pub outlook: &'static str,
    pub salary_range: &'static str,
}

impl CareerTemplate {
    fn to_entry(&self, matched_on: &[String]) -> RecommendationEntry {
        let rationale = if matched_on.is_empty() {
            self.rationale.to_string()
        } else {
            format!("{} You mentioned: {}.", self.rationale, matched_on.join(", "))
        };

        RecommendationEntry {
            title: self.title.to_string(),
            field: self.field,
            rationale,
            next_steps: self.next_steps.iter().map(|s| s.to_string()).collect(),
            match_score: self.match_score,
            skills: self.skills.iter().map(|s| s.to_string()).collect(),
            outlook: self.outlook.to_string(),
            salary_range: self.salary_range.to_string(),
        }
    }
}

/// A predicate over the profile mapped to the careers it emits.
///
/// The rule fires when any entry of `fields` contains any of `keywords`
/// (lowercase substring test).
#[derive(Debug)]
pub struct Rule {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub fields: &'static [ProfileField],
    pub careers: &'static [CareerTemplate],
}

impl Rule {
    pub fn fires(&self, profile: &StudentProfile) -> bool {
        self.keywords
            .iter()
            .any(|keyword| profile.mentions(self.fields, keyword))
    }

    /// Profile entries that made this rule fire, in field order.
    fn matched_entries(&self, profile: &StudentProfile) -> Vec<String> {
        let mut matched: Vec<String> = Vec::new();
        for field in self.fields {
            for entry in profile.entries(*field) {
                let lowered = entry.to_lowercase();
                if self.keywords.iter().any(|kw| lowered.contains(kw)) && !matched.contains(entry) {
                    matched.push(entry.clone());
                }
            }
        }
        matched
    }
}

const ALL_FIELDS: &[ProfileField] = &ProfileField::ALL;

/// Rule table, in evaluation order.
pub static RULES: &[Rule] = &[
    Rule {
        name: "biology_science",
        keywords: &["biology", "science"],
        fields: &[ProfileField::Subjects, ProfileField::Interests],
        careers: &[
            CareerTemplate {
                title: "Biologist",
                field: CareerField::ScienceResearch,
                rationale: "Your interest in living systems and scientific inquiry fits research biology.",
                next_steps: &[
                    "Take advanced biology and chemistry courses",
                    "Join a science club or enter a science fair",
                    "Ask a local university lab about summer internships",
                ],
                match_score: 0.85,
                skills: &["Research methods", "Data analysis", "Laboratory techniques"],
                outlook: "Steady growth, strongest in biotechnology and environmental work",
                salary_range: "$50,000 - $100,000",
            },
            CareerTemplate {
                title: "Medical Doctor",
                field: CareerField::Healthcare,
                rationale: "A strong science foundation is the first step toward medicine.",
                next_steps: &[
                    "Focus on biology, chemistry and physics",
                    "Volunteer at a hospital or clinic",
                    "Shadow a physician to see the day-to-day work",
                ],
                match_score: 0.8,
                skills: &["Diagnosis", "Patient communication", "Decision making under pressure"],
                outlook: "High demand across most specialties",
                salary_range: "$200,000 - $400,000",
            },
        ],
    },
    Rule {
        name: "math_analytical",
        keywords: &["math", "analytical"],
        fields: ALL_FIELDS,
        careers: &[CareerTemplate {
            title: "Data Scientist",
            field: CareerField::Technology,
            rationale: "Analytical thinking and math are the core of turning data into decisions.",
            next_steps: &[
                "Learn Python and basic statistics",
                "Practice on public datasets",
                "Take an introductory machine learning course",
            ],
            match_score: 0.9,
            skills: &["Statistics", "Programming", "Data visualization"],
            outlook: "Very strong growth expected over the next decade",
            salary_range: "$80,000 - $150,000",
        }],
    },
    Rule {
        name: "art_creative",
        keywords: &["art", "creativ", "design", "drawing", "painting"],
        fields: ALL_FIELDS,
        careers: &[CareerTemplate {
            title: "Graphic Designer",
            field: CareerField::CreativeArts,
            rationale: "Creative and visual interests translate directly into design work.",
            next_steps: &[
                "Build a portfolio of your best pieces",
                "Learn a design tool such as Figma or Illustrator",
                "Take an art or design elective",
            ],
            match_score: 0.85,
            skills: &["Visual communication", "Typography", "Design software"],
            outlook: "Stable, with growing demand in digital media",
            salary_range: "$40,000 - $85,000",
        }],
    },
    Rule {
        name: "technology",
        keywords: &["tech", "computer", "coding", "programming"],
        fields: ALL_FIELDS,
        careers: &[CareerTemplate {
            title: "Software Developer",
            field: CareerField::Technology,
            rationale: "An interest in technology and computers is a natural path into software.",
            next_steps: &[
                "Start with a beginner programming language like Python",
                "Build a small project you care about",
                "Join a coding club or hackathon",
            ],
            match_score: 0.9,
            skills: &["Programming", "Problem solving", "Collaboration"],
            outlook: "Strong growth across nearly every industry",
            salary_range: "$70,000 - $140,000",
        }],
    },
    Rule {
        name: "psychology_helping",
        keywords: &["psychology", "helping", "empathy"],
        fields: ALL_FIELDS,
        careers: &[CareerTemplate {
            title: "Psychologist/Counselor",
            field: CareerField::SocialServices,
            rationale: "Wanting to understand and help people is the heart of counseling.",
            next_steps: &[
                "Take psychology if your school offers it",
                "Volunteer with a peer support or mentoring program",
                "Read about different counseling specialties",
            ],
            match_score: 0.8,
            skills: &["Active listening", "Empathy", "Communication"],
            outlook: "Growing demand for mental health services",
            salary_range: "$45,000 - $100,000",
        }],
    },
];

/// Returned when no rule fires.
pub static FALLBACK_CAREERS: &[CareerTemplate] = &[
    CareerTemplate {
        title: "Teacher/Educator",
        field: CareerField::Education,
        rationale: "Teaching suits people who enjoy sharing knowledge across many subjects.",
        next_steps: &[
            "Tutor a younger student",
            "Help out in a classroom or camp",
            "Notice which subjects you enjoy explaining",
        ],
        match_score: 0.6,
        skills: &["Communication", "Patience", "Organization"],
        outlook: "Consistent demand, especially in STEM subjects",
        salary_range: "$40,000 - $75,000",
    },
    CareerTemplate {
        title: "Project Manager",
        field: CareerField::Business,
        rationale: "Project management fits almost every industry and rewards organized people.",
        next_steps: &[
            "Lead a school project or club activity",
            "Try a free planning tool to organize your own work",
            "Talk to someone who manages projects about their job",
        ],
        match_score: 0.6,
        skills: &["Planning", "Leadership", "Communication"],
        outlook: "Steady demand across industries",
        salary_range: "$60,000 - $120,000",
    },
];

/// Evaluates the rule table against a profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationMatcher;

impl RecommendationMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Careers for `profile`, in rule order. Never empty.
    pub fn recommend(&self, profile: &StudentProfile) -> Vec<RecommendationEntry> {
        let mut entries = Vec::new();

        for rule in RULES {
            if !rule.fires(profile) {
                continue;
            }
            let matched = rule.matched_entries(profile);
            entries.extend(rule.careers.iter().map(|career| career.to_entry(&matched)));
        }

        if entries.is_empty() {
            entries.extend(FALLBACK_CAREERS.iter().map(|career| career.to_entry(&[])));
        }

        entries
    }

    /// Names of the rules that fire for `profile`, in order.
    pub fn fired_rules(&self, profile: &StudentProfile) -> Vec<&'static str> {
        RULES
            .iter()
            .filter(|rule| rule.fires(profile))
            .map(|rule| rule.name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(entries: &[RecommendationEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn test_biology_subject_gives_biologist_then_doctor() {
        let profile = StudentProfile::new().with(ProfileField::Subjects, "Biology");
        let matcher = RecommendationMatcher::new();

        for _ in 0..3 {
            let entries = matcher.recommend(&profile);
            assert_eq!(titles(&entries)[..2], ["Biologist", "Medical Doctor"]);
        }
    }

    #[test]
    fn test_science_interest_fires_first_rule() {
        let profile = StudentProfile::new().with(ProfileField::Interests, "Science");
        let entries = RecommendationMatcher::new().recommend(&profile);
        assert_eq!(titles(&entries), vec!["Biologist", "Medical Doctor"]);
    }

    #[test]
    fn test_order_follows_rules_not_scores() {
        // Data Scientist scores higher than Biologist but its rule comes later
        let profile = StudentProfile::new()
            .with(ProfileField::Strengths, "Analytical")
            .with(ProfileField::Subjects, "Biology");
        let entries = RecommendationMatcher::new().recommend(&profile);
        assert_eq!(
            titles(&entries),
            vec!["Biologist", "Medical Doctor", "Data Scientist"]
        );
        assert!(entries[2].match_score > entries[0].match_score);
    }

    #[test]
    fn test_all_rules_fire_in_order() {
        let profile = StudentProfile::new()
            .with(ProfileField::Subjects, "Psychology")
            .with(ProfileField::Interests, "Technology")
            .with(ProfileField::Interests, "Art")
            .with(ProfileField::Subjects, "Math")
            .with(ProfileField::Subjects, "Biology");
        let matcher = RecommendationMatcher::new();

        assert_eq!(
            matcher.fired_rules(&profile),
            vec![
                "biology_science",
                "math_analytical",
                "art_creative",
                "technology",
                "psychology_helping"
            ]
        );
        assert_eq!(
            titles(&matcher.recommend(&profile)),
            vec![
                "Biologist",
                "Medical Doctor",
                "Data Scientist",
                "Graphic Designer",
                "Software Developer",
                "Psychologist/Counselor"
            ]
        );
    }

    #[test]
    fn test_empty_profile_gets_fallback_pair() {
        let entries = RecommendationMatcher::new().recommend(&StudentProfile::new());
        assert_eq!(titles(&entries), vec!["Teacher/Educator", "Project Manager"]);
        assert_eq!(entries[0].field, CareerField::Education);
    }

    #[test]
    fn test_unmatched_profile_gets_fallback_pair() {
        let profile = StudentProfile::new().with(ProfileField::Hobbies, "Cooking");
        let entries = RecommendationMatcher::new().recommend(&profile);
        assert_eq!(titles(&entries), vec!["Teacher/Educator", "Project Manager"]);
    }

    #[test]
    fn test_rationale_names_matched_entries() {
        let profile = StudentProfile::new().with(ProfileField::Hobbies, "Drawing");
        let entries = RecommendationMatcher::new().recommend(&profile);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].rationale.ends_with("You mentioned: Drawing."));
        assert!(!entries[0].next_steps.is_empty());
        assert!(!entries[0].skills.is_empty());
    }
}
