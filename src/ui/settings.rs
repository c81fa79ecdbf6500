use serde::{Deserialize, Serialize};
use egui::Color32;
use std::collections::HashMap;

use storyworlds::config::VariantName;
use storyworlds::model::story_config::StoryConfig;

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct UiSettings {
    pub ui_scale: f32,

    // Panel role → color mapping
    pub colors: HashMap<String, [u8; 4]>,

    pub narration: bool,
    pub illustrations: bool,
    pub variant: Option<VariantName>,

    /// Hero, sidekick and setting from the last session.
    pub story: StoryConfig,
}

impl Default for UiSettings {
    fn default() -> Self {
        let mut colors = HashMap::new();

        colors.insert("Story".into(), [40, 90, 60, 255]);
        colors.insert("Feedback".into(), [40, 70, 120, 255]);
        colors.insert("History".into(), [80, 80, 80, 255]);
        colors.insert("Warning".into(), [140, 90, 20, 255]);

        Self {
            ui_scale: 1.0,
            colors,
            narration: false,
            illustrations: false,
            variant: None,
            story: StoryConfig::default(),
        }
    }
}

impl UiSettings {
    pub fn color(&self, key: &str) -> Color32 {
        self.colors
            .get(key)
            .map(|c| Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3]))
            .unwrap_or(Color32::DARK_GRAY)
    }

    pub fn set_color(&mut self, key: &str, color: Color32) {
        self.colors.insert(
            key.to_string(),
            [color.r(), color.g(), color.b(), color.a()],
        );
    }
}
