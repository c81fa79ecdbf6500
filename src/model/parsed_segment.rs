use serde::{Deserialize, Serialize};

/// One model response split into the parts the UI shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSegment {
    pub narrative: Vec<String>,
    pub choices: Vec<String>,
    pub feedback: Option<String>,
}

impl ParsedSegment {
    pub fn narrative_text(&self) -> String {
        self.narrative.join("\n")
    }

    pub fn feedback_text(&self) -> &str {
        self.feedback.as_deref().unwrap_or("")
    }

    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }
}

/// How choices are pulled out of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseMode {
    /// Line scanning after a "Choices" header, any number of choices.
    Unbounded,
    /// Numbered items anywhere in the text, capped, with generic fallbacks.
    Bounded { max_choices: usize },
}

/// What the reader sees and what ends up in the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationMode {
    /// Narrative and feedback shown apart; history keeps both joined.
    Structured,
    /// The raw model output is shown and stored as-is.
    Verbatim,
}

/// Wording of the progress annotation appended on each choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceMarker {
    Chose,
    ChoseOption,
}

impl ChoiceMarker {
    pub fn annotate(self, choice: &str) -> String {
        match self {
            ChoiceMarker::Chose => format!("\nChild chose: {}.", choice),
            ChoiceMarker::ChoseOption => format!("\nChild chose option: {}.", choice),
        }
    }
}

impl PresentationMode {
    pub fn marker(self) -> ChoiceMarker {
        match self {
            PresentationMode::Structured => ChoiceMarker::Chose,
            PresentationMode::Verbatim => ChoiceMarker::ChoseOption,
        }
    }

    /// The text shown for this turn, which is also what the history keeps.
    pub fn displayed_segment(self, raw: &str, segment: &ParsedSegment) -> String {
        match self {
            PresentationMode::Structured => {
                format!("{}\n{}", segment.narrative_text(), segment.feedback_text())
            }
            PresentationMode::Verbatim => raw.to_string(),
        }
    }

    /// The text handed to speech synthesis.
    pub fn narration_text(self, raw: &str, segment: &ParsedSegment) -> String {
        match self {
            PresentationMode::Structured => segment.narrative_text(),
            PresentationMode::Verbatim => raw.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryVariant {
    pub parse_mode: ParseMode,
    pub presentation: PresentationMode,
}

impl StoryVariant {
    /// Open-ended choices, narrative and feedback extracted.
    pub fn classic() -> Self {
        Self {
            parse_mode: ParseMode::Unbounded,
            presentation: PresentationMode::Structured,
        }
    }

    /// Exactly two choices, raw output shown.
    pub fn two_choice() -> Self {
        Self {
            parse_mode: ParseMode::Bounded { max_choices: 2 },
            presentation: PresentationMode::Verbatim,
        }
    }

    pub fn label(&self) -> &'static str {
        match (self.parse_mode, self.presentation) {
            (ParseMode::Unbounded, PresentationMode::Structured) => "Classic",
            (ParseMode::Bounded { .. }, PresentationMode::Verbatim) => "Two choices",
            _ => "Custom",
        }
    }
}

impl Default for StoryVariant {
    fn default() -> Self {
        Self::classic()
    }
}
