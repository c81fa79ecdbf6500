use crate::engine::narrative_parser::parse_segment;
use crate::engine::prompt_builder::PromptBuilder;
use crate::model::parsed_segment::{ParsedSegment, StoryVariant};
use crate::model::story_config::StoryConfig;
use crate::model::story_state::{AdvanceOutcome, SessionPhase, StoryState};

/// The segment currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedSegment {
    pub raw: String,
    pub segment: ParsedSegment,
    /// What the reader sees; stored in the history once a choice is made.
    pub displayed: String,
}

/// One reader's story: configuration, progress and the open segment.
#[derive(Debug, Clone)]
pub struct StorySession {
    config: StoryConfig,
    variant: StoryVariant,
    state: StoryState,
    current: Option<PresentedSegment>,
}

impl StorySession {
    pub fn new(config: StoryConfig, variant: StoryVariant) -> Self {
        Self {
            config,
            variant,
            state: StoryState::new(),
            current: None,
        }
    }

    pub fn config(&self) -> &StoryConfig {
        &self.config
    }

    pub fn variant(&self) -> StoryVariant {
        self.variant
    }

    pub fn state(&self) -> &StoryState {
        &self.state
    }

    pub fn current(&self) -> Option<&PresentedSegment> {
        self.current.as_ref()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.current.is_none() && self.state.history.is_empty() {
            SessionPhase::NewSession
        } else {
            SessionPhase::AwaitingChoice
        }
    }

    pub fn prompt(&self) -> String {
        PromptBuilder::build(&self.config.normalized(), &self.state, self.variant.parse_mode)
    }

    pub fn illustration_prompt(&self) -> String {
        PromptBuilder::illustration(&self.config.normalized())
    }

    /// Parses a fresh model response and puts it on screen.
    pub fn present(&mut self, raw: String) -> &PresentedSegment {
        let segment = parse_segment(&raw, self.variant.parse_mode);
        let displayed = self.variant.presentation.displayed_segment(&raw, &segment);

        self.current.insert(PresentedSegment {
            raw,
            segment,
            displayed,
        })
    }

    pub fn choose(&mut self, choice: Option<&str>) -> AdvanceOutcome {
        let Some(current) = self.current.as_ref() else {
            return AdvanceOutcome::Ignored {
                reason: "No story segment is being shown".to_string(),
            };
        };

        let outcome = self.state.advance(
            choice,
            &current.displayed,
            self.variant.presentation.marker(),
        );

        if matches!(outcome, AdvanceOutcome::Advanced { .. }) {
            self.current = None;
        }

        outcome
    }

    /// New cast or setting: the next segment starts from it, history stays.
    pub fn set_config(&mut self, config: StoryConfig) {
        self.config = config;
        self.current = None;
    }

    /// Re-reads the open segment under the new variant.
    pub fn set_variant(&mut self, variant: StoryVariant) {
        self.variant = variant;

        if let Some(raw) = self.current.take().map(|c| c.raw) {
            self.present(raw);
        }
    }

    pub fn restart(&mut self) {
        self.state.reset();
        self.current = None;
    }
}
