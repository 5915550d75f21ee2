//! Turn engine.
//!
//! Pure function of `(session state, utterance)`: the caller owns storage and
//! commits the returned state. Nothing here blocks or does I/O.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::conversation::{ConversationState, Event, TurnEffect};
use super::extractor::{ProfileDelta, ProfileExtractor};
use super::intent::{DiscussionIntent, IntentClassifier};
use super::matcher::RecommendationMatcher;
use super::responses;
use super::vocabulary::Vocabulary;
use crate::models::{InterestCategory, MissingInfo, RecommendationEntry, StudentProfile};

/// Everything the core tracks for one conversation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub profile: StudentProfile,
    pub conversation: ConversationState,
}

impl SessionState {
    pub fn turn_counter(&self) -> u32 {
        self.conversation.turn_counter()
    }

    pub fn recommendations_given(&self) -> bool {
        self.conversation.recommendations_given()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    Greeting,
    Question,
    Recommendations,
    Discussion,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnMetadata {
    pub state: &'static str,
    pub turn_counter: u32,
    pub completeness: f32,
    pub missing_information: Vec<MissingInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dominant_interests: Vec<InterestCategory>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<RecommendationEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discussion_intent: Option<DiscussionIntent>,
}

/// Counselor reply for one turn, with the profile as it stands afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    pub text: String,
    pub kind: TurnKind,
    pub profile: StudentProfile,
    pub metadata: TurnMetadata,
}

struct Reply {
    text: String,
    kind: TurnKind,
    recommendations: Vec<RecommendationEntry>,
    intent: Option<DiscussionIntent>,
}

/// Extractor, state machine and matcher wired together.
#[derive(Default)]
pub struct CounselorEngine {
    extractor: ProfileExtractor,
    intents: IntentClassifier,
    matcher: RecommendationMatcher,
}

impl CounselorEngine {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self {
            extractor: ProfileExtractor::new(vocabulary),
            intents: IntentClassifier::new(),
            matcher: RecommendationMatcher::new(),
        }
    }

    pub fn extractor(&self) -> &ProfileExtractor {
        &self.extractor
    }

    pub fn matcher(&self) -> &RecommendationMatcher {
        &self.matcher
    }

    /// Fresh session with the greeting already emitted.
    pub fn open(&self) -> (SessionState, TurnResponse) {
        let (conversation, _) = ConversationState::default().transition(Event::Reset);
        let cleared = SessionState {
            profile: StudentProfile::new(),
            conversation,
        };
        self.process_turn(&cleared, "", None)
    }

    /// Runs one student turn against `state`.
    ///
    /// `delegated` is extra extraction output from an external service; it is
    /// merged after the rule-based pass. The greeting turn ignores both.
    pub fn process_turn(
        &self,
        state: &SessionState,
        utterance: &str,
        delegated: Option<&ProfileDelta>,
    ) -> (SessionState, TurnResponse) {
        let profile = if state.conversation.is_greeting() {
            state.profile.clone()
        } else {
            let mut profile = self.extractor.extract(&state.profile, utterance);
            if let Some(delta) = delegated {
                let merged = self.extractor.merge(&mut profile, delta);
                debug!("Merged {} delegated profile entries", merged);
            }
            profile
        };

        let (conversation, effect) = state.conversation.advance(profile.total_info_count());

        let reply = match effect {
            TurnEffect::Greet => Reply {
                text: responses::GREETING.to_string(),
                kind: TurnKind::Greeting,
                recommendations: vec![],
                intent: None,
            },
            TurnEffect::AskQuestion { index } => Reply {
                text: responses::clarifying_question(index).to_string(),
                kind: TurnKind::Question,
                recommendations: vec![],
                intent: None,
            },
            TurnEffect::Recommend => {
                let recommendations = self.matcher.recommend(&profile);
                info!(
                    "Recommending {} careers after {} gathering turns",
                    recommendations.len(),
                    conversation.turn_counter()
                );
                Reply {
                    text: responses::render_recommendations(&recommendations),
                    kind: TurnKind::Recommendations,
                    recommendations,
                    intent: None,
                }
            }
            TurnEffect::Discuss => self.discuss(&profile, utterance),
        };

        let metadata = TurnMetadata {
            state: conversation.label(),
            turn_counter: conversation.turn_counter(),
            completeness: profile.completeness(),
            missing_information: profile.missing_information(),
            dominant_interests: if reply.kind == TurnKind::Recommendations {
                profile.dominant_categories()
            } else {
                vec![]
            },
            recommendations: reply.recommendations,
            discussion_intent: reply.intent,
        };

        let next = SessionState {
            profile: profile.clone(),
            conversation,
        };
        let response = TurnResponse {
            text: reply.text,
            kind: reply.kind,
            profile,
            metadata,
        };
        (next, response)
    }

    fn discuss(&self, profile: &StudentProfile, utterance: &str) -> Reply {
        let intent = self.intents.classify(utterance).intent;

        let text = match intent {
            DiscussionIntent::CareerDetail => {
                let careers = self.matcher.recommend(profile);
                let lowered = utterance.to_lowercase();
                match careers
                    .iter()
                    .find(|career| mentions_title(&lowered, &career.title))
                {
                    Some(career) => responses::render_career_detail(career),
                    None => responses::detail_menu(&careers),
                }
            }
            DiscussionIntent::OtherOptions => responses::OTHER_OPTIONS.to_string(),
            DiscussionIntent::General => responses::GENERAL_DISCUSSION.to_string(),
        };

        Reply {
            text,
            kind: TurnKind::Discussion,
            recommendations: vec![],
            intent: Some(intent),
        }
    }
}

/// "Psychologist/Counselor" matches on either half.
fn mentions_title(lowered: &str, title: &str) -> bool {
    title
        .to_lowercase()
        .split('/')
        .map(str::trim)
        .any(|part| !part.is_empty() && lowered.contains(part))
}
