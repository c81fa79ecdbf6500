use crate::model::parsed_segment::ParseMode;
use crate::model::story_config::StoryConfig;
use crate::model::story_state::StoryState;

/// Builds the text sent to the story model.
/// Formatting only: no parsing, no networking, no state changes.
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn build(config: &StoryConfig, state: &StoryState, mode: ParseMode) -> String {
        build_story_prompt(config, state, mode)
    }

    pub fn illustration(config: &StoryConfig) -> String {
        build_illustration_prompt(config)
    }
}

pub fn build_story_prompt(config: &StoryConfig, state: &StoryState, mode: ParseMode) -> String {
    let mut prompt = String::new();

    push_role(&mut prompt);
    push_story_context(&mut prompt, config, state);
    push_output_format(&mut prompt, mode);

    prompt
}

pub fn build_illustration_prompt(config: &StoryConfig) -> String {
    format!(
        "A children's story illustration of {} and {} in {}",
        config.character, config.sidekick, config.setting
    )
}

fn push_role(prompt: &mut String) {
    prompt.push_str("You are a friendly storytelling assistant for children with autism.\n");
    prompt.push_str("Create a short, simple, interactive story with gentle social lessons.\n\n");
}

fn push_story_context(prompt: &mut String, config: &StoryConfig, state: &StoryState) {
    prompt.push_str(&format!("Character: {}\n", config.character));
    prompt.push_str(&format!("Sidekick: {}\n", config.sidekick));
    prompt.push_str(&format!("Setting: {}\n", config.setting));
    prompt.push_str(&format!("Story progress so far: {}\n", state.progress));
    prompt.push_str(&format!("Child's last choice: {}\n\n", state.last_choice));
}

// The parser leans on this layout; the model is asked, not forced.
fn push_output_format(prompt: &mut String, mode: ParseMode) {
    prompt.push_str("Output format:\n");
    prompt.push_str("1. Story Segment (3–4 sentences)\n");

    match mode {
        ParseMode::Unbounded => {
            prompt.push_str("2. Choices (numbered, simple phrasing)\n");
        }
        ParseMode::Bounded { max_choices } => {
            prompt.push_str(&format!(
                "2. Choices (numbered, simple phrasing, exactly {} options)\n",
                max_choices
            ));
        }
    }

    prompt.push_str("3. Encouragement/Feedback (1 supportive line)\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parsed_segment::ChoiceMarker;

    #[test]
    fn new_story_prompt_carries_all_inputs() {
        let config = StoryConfig::default();
        let state = StoryState::new();
        let prompt = build_story_prompt(&config, &state, ParseMode::Unbounded);

        assert!(prompt.starts_with("You are a friendly storytelling assistant"));
        assert!(prompt.contains("Character: Alex the Explorer\n"));
        assert!(prompt.contains("Sidekick: Spark the Dragon\n"));
        assert!(prompt.contains("Setting: Magic Forest\n"));
        assert!(prompt.contains("Story progress so far: new story\n"));
        assert!(prompt.contains("Child's last choice: none\n"));
        assert!(prompt.contains("2. Choices (numbered, simple phrasing)\n"));
        assert!(!prompt.contains("exactly"));
    }

    #[test]
    fn bounded_prompt_asks_for_fixed_choice_count() {
        let prompt = build_story_prompt(
            &StoryConfig::default(),
            &StoryState::new(),
            ParseMode::Bounded { max_choices: 2 },
        );
        assert!(prompt.contains("2. Choices (numbered, simple phrasing, exactly 2 options)\n"));
        assert!(prompt.ends_with("3. Encouragement/Feedback (1 supportive line)\n"));
    }

    #[test]
    fn prompt_reflects_progress_after_a_choice() {
        let mut state = StoryState::new();
        state.advance(Some("Help the bunny"), "segment", ChoiceMarker::Chose);

        let prompt = build_story_prompt(&StoryConfig::default(), &state, ParseMode::Unbounded);
        assert!(
            prompt.contains("Story progress so far: new story\nChild chose: Help the bunny.\n")
        );
        assert!(prompt.contains("Child's last choice: Help the bunny\n"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let config = StoryConfig::new("Mia", "Pip the Owl", "Moon Base");
        let state = StoryState::new();
        assert_eq!(
            build_story_prompt(&config, &state, ParseMode::Unbounded),
            build_story_prompt(&config, &state, ParseMode::Unbounded)
        );
    }

    #[test]
    fn illustration_prompt_names_the_cast() {
        let config = StoryConfig::new("Mia", "Pip the Owl", "Moon Base");
        assert_eq!(
            build_illustration_prompt(&config),
            "A children's story illustration of Mia and Pip the Owl in Moon Base"
        );
    }
}
