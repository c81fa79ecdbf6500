//! StoryWorlds: interactive children's stories written by a language
//! model, one choice at a time.

pub mod config;
pub mod engine;
pub mod model;

pub use engine::narrative_parser::parse_segment;
pub use engine::prompt_builder::build_story_prompt;
pub use model::parsed_segment::{ParseMode, ParsedSegment, PresentationMode, StoryVariant};
pub use model::story_config::StoryConfig;
pub use model::story_state::{AdvanceOutcome, StoryState};
