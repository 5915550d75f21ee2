//! # Brain Module
//!
//! Rule-based conversation core. No I/O and no LLM: everything here is a
//! deterministic function of the session state and the student's text.
//!
//! ## Components
//! - `vocabulary`: term tables feeding each profile list
//! - `extractor`: substring-based profile extraction
//! - `intent`: discussion intent classification (regex)
//! - `conversation`: the greeting/gathering/discussing state machine
//! - `matcher`: ordered rule table producing career recommendations
//! - `responses`: canned texts and rendering
//! - `engine`: one turn, end to end

pub mod conversation;
pub mod engine;
pub mod extractor;
pub mod intent;
pub mod matcher;
pub mod responses;
pub mod vocabulary;

pub use conversation::{ConversationState, Effect, Event, TurnEffect};
pub use engine::{CounselorEngine, SessionState, TurnKind, TurnMetadata, TurnResponse};
pub use extractor::{ProfileDelta, ProfileExtractor};
pub use intent::{DiscussionIntent, IntentClassifier, IntentResult};
pub use matcher::RecommendationMatcher;
pub use vocabulary::Vocabulary;
