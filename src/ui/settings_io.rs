use std::fs;
use std::path::PathBuf;

use tracing::warn;

use storyworlds::config::app_dir;

use crate::ui::settings::UiSettings;

fn settings_path() -> PathBuf {
    app_dir(dirs::config_dir()).join("ui_settings.json")
}

pub fn load_settings() -> UiSettings {
    let path = settings_path();
    fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn save_settings(settings: &UiSettings) {
    let path = settings_path();
    if let Ok(json) = serde_json::to_string_pretty(settings) {
        if let Err(err) = fs::write(&path, json) {
            warn!(%err, path = %path.display(), "could not save UI settings");
        }
    }
}
