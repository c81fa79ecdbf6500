use std::path::PathBuf;

use crate::model::parsed_segment::{PresentationMode, StoryVariant};
use crate::model::story_config::StoryConfig;
use crate::model::story_session::PresentedSegment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineOptions {
    pub narration: bool,
    pub illustrations: bool,
    pub variant: StoryVariant,
}

#[derive(Debug)]
pub enum EngineCommand {
    StartStory { config: StoryConfig },
    UpdateOptions { options: EngineOptions },
    Choose { choice: Option<String> },
    Regenerate,
    Restart,
    ExportStorybook { path: PathBuf },
    TestConnection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentView {
    pub raw: String,
    pub narrative: String,
    pub choices: Vec<String>,
    pub feedback: Option<String>,
    pub presentation: PresentationMode,
    /// 1-based number of the turn this segment belongs to.
    pub step: usize,
}

impl SegmentView {
    pub fn new(presented: &PresentedSegment, presentation: PresentationMode, step: usize) -> Self {
        Self {
            raw: presented.raw.clone(),
            narrative: presented.segment.narrative_text(),
            choices: presented.segment.choices.clone(),
            feedback: presented.segment.feedback.clone(),
            presentation,
            step,
        }
    }
}

/// Decoded RGBA pixels ready for a texture.
#[derive(Clone, PartialEq, Eq)]
pub struct IllustrationImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for IllustrationImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IllustrationImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineResponse {
    Busy(bool),
    SegmentReady(SegmentView),
    HistoryUpdated(Vec<String>),
    Narration { path: PathBuf },
    Illustration(Option<IllustrationImage>),
    Exported { path: PathBuf },
    ConnectionStatus(String),
    Warning(String),
}
