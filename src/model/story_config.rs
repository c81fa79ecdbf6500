use serde::{Deserialize, Serialize};

/// Who the story is about and where it happens.
/// Held for the whole session; editing it restarts the narrative context
/// but keeps the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryConfig {
    pub character: String,
    pub sidekick: String,
    pub setting: String,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            character: "Alex the Explorer".into(),
            sidekick: "Spark the Dragon".into(),
            setting: "Magic Forest".into(),
        }
    }
}

impl StoryConfig {
    pub fn new(
        character: impl Into<String>,
        sidekick: impl Into<String>,
        setting: impl Into<String>,
    ) -> Self {
        Self {
            character: character.into(),
            sidekick: sidekick.into(),
            setting: setting.into(),
        }
    }

    /// Blank fields fall back to the defaults so the prompt never carries
    /// an empty role.
    pub fn normalized(&self) -> Self {
        let defaults = Self::default();
        let pick = |value: &str, fallback: String| {
            let value = value.trim();
            if value.is_empty() {
                fallback
            } else {
                value.to_string()
            }
        };

        Self {
            character: pick(&self.character, defaults.character),
            sidekick: pick(&self.sidekick, defaults.sidekick),
            setting: pick(&self.setting, defaults.setting),
        }
    }
}
