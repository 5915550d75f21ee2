//! Canned counselor texts and recommendation rendering.

use crate::models::RecommendationEntry;

pub const GREETING: &str = "Hi there! I'm your career counselor, and I'm really excited to help you explore career paths that might be perfect for you.\n\n\
I'd love to learn what makes you tick! Could you start by telling me:\n\
- What subjects or activities do you genuinely enjoy?\n\
- What do you like to do in your free time?\n\
- Are there any particular strengths you've noticed about yourself?\n\n\
There are no wrong answers here. What would you like to share first?";

pub const CLARIFYING_QUESTIONS: &[&str] = &[
    "Thanks for sharing! Which school subjects do you enjoy the most, or find easiest?",
    "That's helpful. What do you like to do in your free time, and what kind of activities make you lose track of time?",
    "Almost there! What would your friends say you're especially good at? Think problem solving, creativity, leadership, or helping others.",
];

pub const OTHER_OPTIONS: &str = "Of course! There are plenty of other directions worth a look. A few ideas:\n\
- Tell me about a subject or activity we haven't talked about yet and I'll factor it in.\n\
- We could look at careers that mix your interests, like science with technology or art with business.\n\
- If you'd rather keep your options open, ask about careers with flexible education paths such as apprenticeships or online certificates.\n\n\
What sounds most interesting?";

pub const GENERAL_DISCUSSION: &str = "That's a great thought! Here's how I can help from here:\n\
- Say \"tell me more about\" a career to get its skills, outlook and next steps.\n\
- Ask for other options if none of these feel right.\n\
- Share anything else about yourself and I'll keep your profile up to date.";

/// Clarifying question for a gathering turn. Past the end of the list the
/// last question is repeated.
pub fn clarifying_question(index: usize) -> &'static str {
    let last = CLARIFYING_QUESTIONS.len() - 1;
    CLARIFYING_QUESTIONS[index.min(last)]
}

pub fn render_recommendations(entries: &[RecommendationEntry]) -> String {
    let mut text = String::from(
        "Based on what you've shared, here are some careers that could be a great fit:\n",
    );

    for (position, entry) in entries.iter().enumerate() {
        text.push_str(&format!(
            "\n{}. **{}** ({})\n   {}\n   Next steps: {}\n",
            position + 1,
            entry.title,
            entry.field.label(),
            entry.rationale,
            entry.next_steps.join("; "),
        ));
    }

    text.push_str("\nWould you like to learn more about any of these, or explore other options?");
    text
}

/// Menu shown when the student asks for detail without naming a career.
pub fn detail_menu(entries: &[RecommendationEntry]) -> String {
    let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
    format!(
        "I'd be happy to go deeper! Which career would you like to explore: {}?\n\
I can cover what the work looks like day to day, the education path, the skills to start building, and the job outlook.",
        titles.join(", ")
    )
}

pub fn render_career_detail(entry: &RecommendationEntry) -> String {
    format!(
        "**{}** ({})\n\n\
Why it fits: {}\n\
Skills to develop: {}\n\
Job outlook: {}\n\
Typical salary: {}\n\n\
Next steps you can take now:\n{}",
        entry.title,
        entry.field.label(),
        entry.rationale,
        entry.skills.join(", "),
        entry.outlook,
        entry.salary_range,
        entry
            .next_steps
            .iter()
            .map(|step| format!("- {}", step))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::matcher::RecommendationMatcher;
    use crate::models::StudentProfile;

    #[test]
    fn test_clarifying_question_saturates() {
        assert_eq!(clarifying_question(0), CLARIFYING_QUESTIONS[0]);
        let last = CLARIFYING_QUESTIONS[CLARIFYING_QUESTIONS.len() - 1];
        assert_eq!(clarifying_question(CLARIFYING_QUESTIONS.len() - 1), last);
        assert_eq!(clarifying_question(99), last);
    }

    #[test]
    fn test_render_recommendations_lists_entries_in_order() {
        let entries = RecommendationMatcher::new().recommend(&StudentProfile::new());
        let text = render_recommendations(&entries);

        let educator = text.find("1. **Teacher/Educator**").unwrap();
        let manager = text.find("2. **Project Manager**").unwrap();
        assert!(educator < manager);
    }

    #[test]
    fn test_career_detail_contains_all_sections() {
        let entries = RecommendationMatcher::new().recommend(&StudentProfile::new());
        let text = render_career_detail(&entries[1]);
        assert!(text.starts_with("**Project Manager**"));
        assert!(text.contains("Skills to develop:"));
        assert!(text.contains("Typical salary:"));
        assert!(text.contains("- Lead a school project"));
    }

    #[test]
    fn test_detail_menu_names_careers() {
        let entries = RecommendationMatcher::new().recommend(&StudentProfile::new());
        assert!(detail_menu(&entries).contains("Teacher/Educator, Project Manager"));
    }
}
