use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};

use tracing::{debug, info, warn};

use crate::engine::error::GenerationFailure;
use crate::engine::illustration::decode_illustration;
use crate::engine::llm_client::{ImageGenerator, SpeechSynthesizer, TextGenerator};
use crate::engine::protocol::{EngineCommand, EngineOptions, EngineResponse, SegmentView};
use crate::engine::storybook::{save_storybook, DocumentExporter};
use crate::model::story_config::StoryConfig;
use crate::model::story_session::StorySession;
use crate::model::story_state::AdvanceOutcome;

/// The generation services a session talks to.
pub struct Services {
    pub text: Box<dyn TextGenerator>,
    pub speech: Option<Box<dyn SpeechSynthesizer>>,
    pub images: Option<Box<dyn ImageGenerator>>,
    pub exporter: Box<dyn DocumentExporter>,
}

/// Owns the story session and runs one turn at a time on its own thread.
pub struct Engine {
    rx: Receiver<EngineCommand>,
    tx: Sender<EngineResponse>,
    services: Services,
    session: StorySession,
    options: EngineOptions,
    narration_path: PathBuf,
}

impl Engine {
    pub fn new(
        rx: Receiver<EngineCommand>,
        tx: Sender<EngineResponse>,
        services: Services,
        options: EngineOptions,
        narration_path: PathBuf,
    ) -> Self {
        Self {
            rx,
            tx,
            services,
            session: StorySession::new(StoryConfig::default(), options.variant),
            options,
            narration_path,
        }
    }

    pub fn run(&mut self) {
        while let Ok(cmd) = self.rx.recv() {
            debug!(?cmd, "engine command");

            match cmd {
                EngineCommand::StartStory { config } => {
                    self.session.set_config(config);
                    self.take_turn();
                }

                EngineCommand::UpdateOptions { options } => {
                    let variant_changed = options.variant != self.options.variant;
                    self.options = options;

                    if variant_changed {
                        self.session.set_variant(options.variant);
                        self.send_current_segment();
                    }
                }

                EngineCommand::Choose { choice } => match self.session.choose(choice.as_deref()) {
                    AdvanceOutcome::Advanced { turn } => {
                        info!(turn, "choice accepted");
                        self.send(EngineResponse::HistoryUpdated(
                            self.session.state().history.clone(),
                        ));
                        self.take_turn();
                    }
                    AdvanceOutcome::Ignored { reason } => {
                        debug!(%reason, "choice ignored");
                        // the reader still needs something to choose from
                        self.send_current_segment();
                    }
                },

                EngineCommand::Regenerate => self.take_turn(),

                EngineCommand::Restart => {
                    info!("story restarted");
                    self.session.restart();
                    self.send(EngineResponse::HistoryUpdated(Vec::new()));
                    self.take_turn();
                }

                EngineCommand::ExportStorybook { path } => {
                    let history = &self.session.state().history;
                    match save_storybook(self.services.exporter.as_ref(), history, &path) {
                        Ok(path) => self.send(EngineResponse::Exported { path }),
                        Err(err) => {
                            warn!(%err, "storybook export failed");
                            self.send(EngineResponse::Warning(format!(
                                "Could not save the storybook: {}",
                                err
                            )));
                        }
                    }
                }

                EngineCommand::TestConnection => match self.services.text.test_connection() {
                    Ok(status) => self.send(EngineResponse::ConnectionStatus(status)),
                    Err(err) => self.send(EngineResponse::Warning(describe_failure(
                        "Connection test failed",
                        &err,
                    ))),
                },
            }
        }

        debug!("engine channel closed");
    }

    fn send(&self, response: EngineResponse) {
        let _ = self.tx.send(response);
    }

    fn send_current_segment(&self) {
        if let Some(current) = self.session.current() {
            self.send(EngineResponse::SegmentReady(SegmentView::new(
                current,
                self.session.variant().presentation,
                self.session.state().turns() + 1,
            )));
        }
    }

    /// Asks for the next segment. A failed request leaves the session as
    /// it was.
    fn take_turn(&mut self) {
        self.send(EngineResponse::Busy(true));

        let prompt = self.session.prompt();
        match self.services.text.complete(&prompt) {
            Ok(raw) => {
                self.session.present(raw);
                self.send_current_segment();

                if self.options.narration {
                    self.narrate();
                }
                if self.options.illustrations {
                    self.illustrate();
                }
            }
            Err(err) => {
                warn!(%err, "story generation failed");
                self.send(EngineResponse::Warning(describe_failure(
                    "Story generation failed",
                    &err,
                )));
            }
        }

        self.send(EngineResponse::Busy(false));
    }

    fn narrate(&self) {
        let (Some(speech), Some(current)) = (self.services.speech.as_ref(), self.session.current())
        else {
            return;
        };

        let text = self
            .session
            .variant()
            .presentation
            .narration_text(&current.raw, &current.segment);
        if text.trim().is_empty() {
            return;
        }

        let audio = match speech.synthesize(&text) {
            Ok(audio) => audio,
            Err(err) => {
                warn!(%err, "narration failed");
                self.send(EngineResponse::Warning(describe_failure("Narration failed", &err)));
                return;
            }
        };

        match fs::write(&self.narration_path, audio) {
            Ok(()) => self.send(EngineResponse::Narration {
                path: self.narration_path.clone(),
            }),
            Err(err) => {
                warn!(%err, path = %self.narration_path.display(), "could not save narration");
                self.send(EngineResponse::Warning(format!(
                    "Could not save narration: {}",
                    err
                )));
            }
        }
    }

    fn illustrate(&self) {
        let Some(images) = self.services.images.as_ref() else {
            return;
        };

        let prompt = self.session.illustration_prompt();
        let url = match images.generate(&prompt) {
            Ok(Some(url)) => url,
            Ok(None) => {
                self.send(EngineResponse::Warning(
                    "Image response did not contain a valid URL. Check your API access and quota."
                        .to_string(),
                ));
                self.send(EngineResponse::Illustration(None));
                return;
            }
            Err(err) => {
                warn!(%err, "illustration failed");
                self.send(EngineResponse::Warning(describe_failure(
                    "Image generation failed",
                    &err,
                )));
                self.send(EngineResponse::Illustration(None));
                return;
            }
        };

        let image = images
            .fetch(&url)
            .map_err(|err| err.to_string())
            .and_then(|bytes| decode_illustration(&bytes).map_err(|err| err.to_string()));

        match image {
            Ok(image) => self.send(EngineResponse::Illustration(Some(image))),
            Err(err) => {
                warn!(%err, %url, "could not load illustration");
                self.send(EngineResponse::Warning(format!(
                    "Could not load the illustration: {}",
                    err
                )));
                self.send(EngineResponse::Illustration(None));
            }
        }
    }
}

fn describe_failure(what: &str, err: &GenerationFailure) -> String {
    if err.is_quota() {
        format!("{}: {}. Check your API usage and quota.", what, err)
    } else {
        format!("{}: {}", what, err)
    }
}
