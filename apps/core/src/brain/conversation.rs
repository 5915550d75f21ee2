//! Conversation state machine.
//!
//! `Greeting -> Gathering -> Discussing`, with `Reset` returning to `Greeting`
//! from anywhere. The gathering turn counter lives inside the state so a
//! counter without a gathering phase cannot be represented.

/// Minimum number of profile entries that triggers recommendations.
pub const INFO_THRESHOLD: usize = 2;

/// Gathering turns after which recommendations are given regardless of
/// how much was learned.
pub const MAX_GATHERING_TURNS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationState {
    /// Nothing said yet; the next turn emits the welcome text.
    #[default]
    Greeting,
    /// Collecting information. `turns` counts student turns in this phase.
    Gathering { turns: u32 },
    /// Recommendations have been given. Terminal until reset.
    Discussing { gathering_turns: u32 },
}

/// Input to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A student turn, carrying the profile size after extraction.
    Turn { info_count: usize },
    Reset,
}

/// Reply a student turn calls for. A turn can never clear the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnEffect {
    Greet,
    /// Ask the clarifying question at `index` (the caller saturates it).
    AskQuestion { index: usize },
    Recommend,
    Discuss,
}

/// What the engine should produce for a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Turn(TurnEffect),
    Cleared,
}

impl ConversationState {
    pub fn transition(self, event: Event) -> (ConversationState, Effect) {
        match event {
            Event::Reset => (ConversationState::Greeting, Effect::Cleared),
            Event::Turn { info_count } => {
                let (next, effect) = self.advance(info_count);
                (next, Effect::Turn(effect))
            }
        }
    }

    /// Applies one student turn. `info_count` is the profile size after extraction.
    pub fn advance(self, info_count: usize) -> (ConversationState, TurnEffect) {
        match self {
            ConversationState::Greeting => {
                (ConversationState::Gathering { turns: 0 }, TurnEffect::Greet)
            }
            ConversationState::Gathering { turns } => {
                let turns = turns + 1;
                if info_count >= INFO_THRESHOLD || turns >= MAX_GATHERING_TURNS {
                    (
                        ConversationState::Discussing {
                            gathering_turns: turns,
                        },
                        TurnEffect::Recommend,
                    )
                } else {
                    (
                        ConversationState::Gathering { turns },
                        TurnEffect::AskQuestion {
                            index: (turns - 1) as usize,
                        },
                    )
                }
            }
            state @ ConversationState::Discussing { .. } => (state, TurnEffect::Discuss),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConversationState::Greeting => "greeting",
            ConversationState::Gathering { .. } => "gathering",
            ConversationState::Discussing { .. } => "discussing",
        }
    }

    /// Student turns counted while gathering.
    pub fn turn_counter(&self) -> u32 {
        match self {
            ConversationState::Greeting => 0,
            ConversationState::Gathering { turns } => *turns,
            ConversationState::Discussing { gathering_turns } => *gathering_turns,
        }
    }

    pub fn recommendations_given(&self) -> bool {
        matches!(self, ConversationState::Discussing { .. })
    }

    pub fn is_greeting(&self) -> bool {
        matches!(self, ConversationState::Greeting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(info_count: usize) -> Event {
        Event::Turn { info_count }
    }

    #[test]
    fn test_greeting_moves_to_gathering() {
        let (state, effect) = ConversationState::Greeting.transition(turn(5));
        assert_eq!(state, ConversationState::Gathering { turns: 0 });
        assert_eq!(effect, Effect::Turn(TurnEffect::Greet));
    }

    #[test]
    fn test_gathering_asks_until_third_turn() {
        let state = ConversationState::Gathering { turns: 0 };

        let (state, effect) = state.transition(turn(0));
        assert_eq!(effect, Effect::Turn(TurnEffect::AskQuestion { index: 0 }));
        assert_eq!(state.turn_counter(), 1);

        let (state, effect) = state.transition(turn(1));
        assert_eq!(effect, Effect::Turn(TurnEffect::AskQuestion { index: 1 }));
        assert_eq!(state.turn_counter(), 2);

        let (state, effect) = state.transition(turn(1));
        assert_eq!(effect, Effect::Turn(TurnEffect::Recommend));
        assert_eq!(state, ConversationState::Discussing { gathering_turns: 3 });
        assert!(state.recommendations_given());
    }

    #[test]
    fn test_info_threshold_short_circuits() {
        let (state, effect) = ConversationState::Gathering { turns: 0 }.transition(turn(2));
        assert_eq!(effect, Effect::Turn(TurnEffect::Recommend));
        assert_eq!(state.turn_counter(), 1);
    }

    #[test]
    fn test_discussing_is_terminal() {
        let state = ConversationState::Discussing { gathering_turns: 2 };
        let (next, effect) = state.transition(turn(0));
        assert_eq!(next, state);
        assert_eq!(effect, Effect::Turn(TurnEffect::Discuss));
    }

    #[test]
    fn test_reset_from_every_state() {
        for state in [
            ConversationState::Greeting,
            ConversationState::Gathering { turns: 2 },
            ConversationState::Discussing { gathering_turns: 1 },
        ] {
            let (next, effect) = state.transition(Event::Reset);
            assert_eq!(next, ConversationState::Greeting);
            assert_eq!(effect, Effect::Cleared);
            assert_eq!(next.turn_counter(), 0);
            assert!(!next.recommendations_given());
        }
    }

    #[test]
    fn test_turn_never_clears() {
        for state in [
            ConversationState::Greeting,
            ConversationState::Gathering { turns: 0 },
            ConversationState::Gathering { turns: 2 },
            ConversationState::Discussing { gathering_turns: 3 },
        ] {
            for info_count in [0, 1, 5] {
                let (next, effect) = state.transition(turn(info_count));
                assert_eq!(effect, Effect::Turn(state.advance(info_count).1));
                assert_eq!(next, state.advance(info_count).0);
                assert_ne!(effect, Effect::Cleared);
            }
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(ConversationState::Greeting.label(), "greeting");
        assert_eq!(ConversationState::Gathering { turns: 1 }.label(), "gathering");
        assert_eq!(
            ConversationState::Discussing { gathering_turns: 1 }.label(),
            "discussing"
        );
    }
}
