use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::parsed_segment::ChoiceMarker;

pub const INITIAL_PROGRESS: &str = "new story";
pub const NO_CHOICE_YET: &str = "none";

/// Progress of one story session.
///
/// `history` has one entry per completed turn and `progress` carries one
/// "Child chose" annotation per entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryState {
    pub progress: String,
    pub last_choice: String,
    pub history: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NewSession,
    AwaitingChoice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Advanced { turn: usize },
    Ignored { reason: String },
}

impl Default for StoryState {
    fn default() -> Self {
        Self::new()
    }
}

impl StoryState {
    pub fn new() -> Self {
        Self {
            progress: INITIAL_PROGRESS.to_string(),
            last_choice: NO_CHOICE_YET.to_string(),
            history: Vec::new(),
        }
    }

    pub fn turns(&self) -> usize {
        self.history.len()
    }

    pub fn can_export(&self) -> bool {
        !self.history.is_empty()
    }

    /// Records the reader's choice, exactly as given, and the segment they
    /// were shown. A missing or blank choice changes nothing.
    pub fn advance(
        &mut self,
        choice: Option<&str>,
        displayed: &str,
        marker: ChoiceMarker,
    ) -> AdvanceOutcome {
        let Some(choice) = choice.filter(|c| !c.trim().is_empty()) else {
            debug!("advance ignored: no choice selected");
            return AdvanceOutcome::Ignored {
                reason: "No choice selected".to_string(),
            };
        };

        self.progress.push_str(&marker.annotate(choice));
        self.last_choice = choice.to_string();
        self.history.push(displayed.to_string());

        debug!(turn = self.history.len(), %choice, "story advanced");
        AdvanceOutcome::Advanced {
            turn: self.history.len(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_starts_blank() {
        let state = StoryState::new();
        assert_eq!(state.progress, "new story");
        assert_eq!(state.last_choice, "none");
        assert!(state.history.is_empty());
        assert!(!state.can_export());
    }

    #[test]
    fn advance_records_choice_and_segment() {
        let mut state = StoryState::new();
        let outcome = state.advance(Some("Go left"), "They walked.\nNice!", ChoiceMarker::Chose);

        assert_eq!(outcome, AdvanceOutcome::Advanced { turn: 1 });
        assert_eq!(state.progress, "new story\nChild chose: Go left.");
        assert_eq!(state.last_choice, "Go left");
        assert_eq!(state.history, vec!["They walked.\nNice!".to_string()]);
    }

    #[test]
    fn advance_uses_option_wording_when_asked() {
        let mut state = StoryState::new();
        state.advance(Some("Share the apple"), "raw", ChoiceMarker::ChoseOption);
        assert!(state.progress.ends_with("\nChild chose option: Share the apple."));
    }

    #[test]
    fn choice_is_recorded_as_given() {
        let mut state = StoryState::new();
        state.advance(Some(" Go left "), "segment", ChoiceMarker::Chose);

        assert_eq!(state.progress, "new story\nChild chose:  Go left .");
        assert_eq!(state.last_choice, " Go left ");
    }

    #[test]
    fn missing_or_blank_choice_changes_nothing() {
        let mut state = StoryState::new();
        state.advance(Some("Wave hello"), "first", ChoiceMarker::Chose);
        let before = state.clone();

        for choice in [None, Some(""), Some("   ")] {
            let outcome = state.advance(choice, "ignored segment", ChoiceMarker::Chose);
            assert!(matches!(outcome, AdvanceOutcome::Ignored { .. }));
            assert_eq!(state, before);
        }
    }

    #[test]
    fn history_and_markers_track_turns() {
        let mut state = StoryState::new();
        let choices = ["Climb the tree", "Ask for help", "Say thank you", "Go home"];

        for (i, choice) in choices.iter().enumerate() {
            state.advance(Some(choice), &format!("segment {}", i), ChoiceMarker::Chose);
        }

        assert_eq!(state.history.len(), choices.len());
        assert_eq!(state.progress.matches("Child chose").count(), choices.len());
        assert_eq!(state.last_choice, "Go home");
    }

    #[test]
    fn reset_returns_to_new_session() {
        let mut state = StoryState::new();
        state.advance(Some("Jump"), "segment", ChoiceMarker::Chose);
        state.reset();
        assert_eq!(state, StoryState::new());
    }
}
