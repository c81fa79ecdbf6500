use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::parsed_segment::StoryVariant;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const APP_DIR: &str = "storyworlds";

/// Service settings. Anything missing from the file keeps its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(alias = "OPENAI_API_KEY")]
    pub openai_api_key: Option<String>,
    pub base_url: String,

    pub text_model: String,
    pub max_tokens: u32,

    pub speech_model: String,
    pub voice: String,

    pub image_model: String,
    pub image_size: String,

    pub variant: VariantName,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantName {
    #[default]
    Classic,
    TwoChoice,
}

impl VariantName {
    pub fn variant(self) -> StoryVariant {
        match self {
            VariantName::Classic => StoryVariant::classic(),
            VariantName::TwoChoice => StoryVariant::two_choice(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            base_url: "https://api.openai.com/v1".into(),
            text_model: "gpt-4.1-mini".into(),
            max_tokens: 350,
            speech_model: "gpt-4o-mini-tts".into(),
            voice: "alloy".into(),
            image_model: "dall-e-3".into(),
            image_size: "1024x1024".into(),
            variant: VariantName::Classic,
            log_level: None,
        }
    }
}

impl AppConfig {
    /// The key from the file, or from the environment when the file has
    /// none.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with(|name| std::env::var(name).ok())
    }

    fn api_key_with(&self, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        self.openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .or_else(|| {
                env(API_KEY_ENV)
                    .map(|key| key.trim().to_string())
                    .filter(|key| !key.is_empty())
            })
    }
}

pub fn app_dir(base: Option<PathBuf>) -> PathBuf {
    let mut path = base.unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    fs::create_dir_all(&path).ok();
    path
}

pub fn config_path() -> PathBuf {
    app_dir(dirs::config_dir()).join("config.json")
}

/// Reads the config file without logging, so it can run before the
/// subscriber exists. `Ok(None)` means there is no file yet.
pub fn read_config(path: &Path) -> anyhow::Result<Option<AppConfig>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    let config = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(config))
}

/// A missing, unreadable or malformed file gives the defaults.
pub fn load_config_from(path: &Path) -> AppConfig {
    match read_config(path) {
        Ok(Some(config)) => config,
        Ok(None) => {
            debug!(path = %path.display(), "no config file, using defaults");
            AppConfig::default()
        }
        Err(err) => {
            warn!(error = %format!("{:#}", err), "bad config file, using defaults");
            AppConfig::default()
        }
    }
}

pub fn save_config_to(path: &Path, config: &AppConfig) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.json"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(load_config_from(&path), AppConfig::default());

        let err = read_config(&path).unwrap_err();
        assert!(format!("{:#}", err).starts_with("Failed to parse"));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_config(&dir.path().join("absent.json")).unwrap().is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "OPENAI_API_KEY": " sk-test ", "variant": "two_choice" }"#).unwrap();

        let config = load_config_from(&path);
        assert_eq!(config.api_key_with(no_env).as_deref(), Some("sk-test"));
        assert_eq!(config.variant, VariantName::TwoChoice);
        assert_eq!(config.text_model, "gpt-4.1-mini");
        assert_eq!(config.max_tokens, 350);
    }

    #[test]
    fn blank_key_falls_back_to_environment() {
        let config = AppConfig {
            openai_api_key: Some("   ".into()),
            ..AppConfig::default()
        };
        let env = |name: &str| (name == API_KEY_ENV).then(|| "sk-env".to_string());

        assert_eq!(config.api_key_with(env).as_deref(), Some("sk-env"));
        assert_eq!(config.api_key_with(no_env), None);
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = AppConfig {
            voice: "nova".into(),
            variant: VariantName::TwoChoice,
            ..AppConfig::default()
        };

        save_config_to(&path, &config).unwrap();
        assert_eq!(load_config_from(&path), config);
    }
}
