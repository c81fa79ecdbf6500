mod ui;

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use storyworlds::config::{self, AppConfig, APP_DIR};

fn env_filter(level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.unwrap_or("info")))
}

fn setup_logging(level: Option<&str>) -> anyhow::Result<PathBuf> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_path = log_dir.join("storyworlds.log");
    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_env_filter(env_filter(level))
        .init();

    Ok(log_path)
}

/// Writes a default config on first run so there is a file to fill in.
fn ensure_config_file(config: &AppConfig) -> anyhow::Result<()> {
    let path = config::config_path();
    if !path.exists() {
        config::save_config_to(&path, config)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "wrote default config");
    }
    Ok(())
}

fn main() -> eframe::Result<()> {
    // Read before logging so `log_level` applies; report once logging is up.
    let config_path = config::config_path();
    let loaded = config::read_config(&config_path);
    let config = match &loaded {
        Ok(Some(config)) => config.clone(),
        _ => AppConfig::default(),
    };

    match setup_logging(config.log_level.as_deref()) {
        Ok(path) => info!(path = %path.display(), "logging started"),
        Err(err) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter(config.log_level.as_deref()))
                .init();
            warn!(%err, "file logging unavailable, logging to stderr");
        }
    }

    match loaded {
        Ok(Some(_)) => info!(path = %config_path.display(), "config loaded"),
        Ok(None) => debug!(path = %config_path.display(), "no config file, using defaults"),
        Err(err) => warn!(error = %format!("{:#}", err), "bad config file, using defaults"),
    }

    if let Err(err) = ensure_config_file(&config) {
        warn!(%err, "could not create config file");
    }
    if config.api_key().is_none() {
        warn!("no OpenAI API key configured; story generation will fail until one is set");
    }

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "StoryWorlds",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(ui::app::StoryApp::new(&config)))
        }),
    )
}
