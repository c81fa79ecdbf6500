use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use storyworlds::config::{app_dir, AppConfig, VariantName};
use storyworlds::engine::engine::{Engine, Services};
use storyworlds::engine::llm_client::OpenAiClient;
use storyworlds::engine::protocol::{
    EngineCommand, EngineOptions, EngineResponse, IllustrationImage, SegmentView,
};
use storyworlds::engine::storybook::PdfStorybook;
use storyworlds::model::story_config::StoryConfig;

use super::center_panel::draw_center_panel;
use super::left_panel::draw_left_panel;
use super::right_panel::draw_right_panel;
use super::settings::UiSettings;
use super::settings_io::{load_settings, save_settings};

const MAX_WARNINGS: usize = 5;

/* =========================
   Tabs
   ========================= */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeftTab {
    #[default]
    Setup,
    Options,
}

/* =========================
   UI State
   ========================= */

#[derive(Default)]
pub struct UiState {
    /// Fields being edited; sent to the engine on "Apply".
    pub story: StoryConfig,
    pub narration: bool,
    pub illustrations: bool,
    pub variant: VariantName,

    pub segment: Option<SegmentView>,
    pub selected_choice: Option<usize>,
    /// A choice was sent and the engine has not answered it yet.
    pub choice_pending: bool,
    pub history: Vec<String>,

    pub busy: bool,
    pub warnings: Vec<String>,
    pub status: Option<String>,
    pub narration_path: Option<PathBuf>,
    pub illustration: Option<egui::TextureHandle>,
    pub illustration_requested: bool,

    pub left_tab: LeftTab,
    pub settings: UiSettings,
}

impl UiState {
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            narration: self.narration,
            illustrations: self.illustrations,
            variant: self.variant.variant(),
        }
    }

    pub fn selected_choice_text(&self) -> Option<String> {
        let segment = self.segment.as_ref()?;
        segment
            .choices
            .get(self.selected_choice?)
            .filter(|choice| !choice.trim().is_empty())
            .cloned()
    }

    pub fn can_continue(&self) -> bool {
        !self.busy && !self.choice_pending && self.selected_choice_text().is_some()
    }

    pub fn receive_segment(&mut self, view: SegmentView) {
        self.segment = Some(view);
        self.selected_choice = None;
        self.choice_pending = false;
    }

    /// New history means the shown segment was recorded (or the story
    /// restarted), so it leaves the screen only now.
    pub fn receive_history(&mut self, history: Vec<String>) {
        self.clear_segment();
        self.history = history;
    }

    fn clear_segment(&mut self) {
        self.segment = None;
        self.selected_choice = None;
        self.choice_pending = false;
        self.narration_path = None;
        self.illustration = None;
        self.illustration_requested = self.illustrations;
    }

    pub fn push_warning(&mut self, warning: String) {
        self.warnings.push(warning);
        if self.warnings.len() > MAX_WARNINGS {
            self.warnings.remove(0);
        }
    }

    /// Writes the editable fields back into the persisted settings.
    pub fn persist(&mut self) {
        self.settings.story = self.story.clone();
        self.settings.narration = self.narration;
        self.settings.illustrations = self.illustrations;
        self.settings.variant = Some(self.variant);
        save_settings(&self.settings);
    }
}

/* =========================
   App
   ========================= */

pub struct StoryApp {
    pub ui: UiState,

    cmd_tx: mpsc::Sender<EngineCommand>,
    resp_rx: mpsc::Receiver<EngineResponse>,
}

impl StoryApp {
    pub fn new(config: &AppConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();

        let settings = load_settings();
        let ui = UiState {
            story: settings.story.clone(),
            narration: settings.narration,
            illustrations: settings.illustrations,
            variant: settings.variant.unwrap_or(config.variant),
            settings,
            ..Default::default()
        };

        let client = OpenAiClient::from_config(config);
        let services = Services {
            text: Box::new(client.clone()),
            speech: Some(Box::new(client.clone())),
            images: Some(Box::new(client)),
            exporter: Box::new(PdfStorybook),
        };
        let options = ui.engine_options();
        let narration_path = app_dir(dirs::cache_dir()).join("narration.mp3");

        std::thread::spawn(move || {
            let mut engine = Engine::new(cmd_rx, resp_tx, services, options, narration_path);
            engine.run();
        });

        let app = Self { ui, cmd_tx, resp_rx };
        app.send_command(EngineCommand::StartStory {
            config: app.ui.story.clone(),
        });
        app
    }

    pub fn send_command(&self, cmd: EngineCommand) {
        let _ = self.cmd_tx.send(cmd);
    }

    pub fn options_changed(&mut self) {
        self.ui.persist();
        self.send_command(EngineCommand::UpdateOptions {
            options: self.ui.engine_options(),
        });
    }

    pub fn apply_story_setup(&mut self) {
        self.ui.persist();
        self.ui.clear_segment();
        self.send_command(EngineCommand::StartStory {
            config: self.ui.story.clone(),
        });
    }

    pub fn continue_story(&mut self) {
        if !self.ui.can_continue() {
            return;
        }
        let Some(choice) = self.ui.selected_choice_text() else {
            return;
        };

        self.ui.choice_pending = true;
        self.send_command(EngineCommand::Choose {
            choice: Some(choice),
        });
    }

    pub fn restart_story(&mut self) {
        self.ui.clear_segment();
        self.send_command(EngineCommand::Restart);
    }

    pub fn save_storybook(&mut self) {
        let path = rfd::FileDialog::new()
            .set_file_name("storybook.pdf")
            .add_filter("PDF", &["pdf"])
            .save_file();

        if let Some(path) = path {
            self.send_command(EngineCommand::ExportStorybook { path });
        }
    }

    fn handle_response(&mut self, ctx: &egui::Context, resp: EngineResponse) {
        match resp {
            EngineResponse::Busy(busy) => self.ui.busy = busy,
            EngineResponse::SegmentReady(view) => self.ui.receive_segment(view),
            EngineResponse::HistoryUpdated(history) => self.ui.receive_history(history),
            EngineResponse::Narration { path } => self.ui.narration_path = Some(path),
            EngineResponse::Illustration(image) => {
                self.ui.illustration = image.map(|image| load_illustration(ctx, &image));
                self.ui.illustration_requested = false;
            }
            EngineResponse::Exported { path } => {
                self.ui.status = Some(format!("Storybook saved to {}", path.display()));
            }
            EngineResponse::ConnectionStatus(status) => self.ui.status = Some(status),
            EngineResponse::Warning(warning) => self.ui.push_warning(warning),
        }
    }
}

fn load_illustration(ctx: &egui::Context, image: &IllustrationImage) -> egui::TextureHandle {
    let pixels = egui::ColorImage::from_rgba_unmultiplied([image.width, image.height], &image.rgba);
    ctx.load_texture("illustration", pixels, egui::TextureOptions::LINEAR)
}

/* =========================
   egui App
   ========================= */

impl eframe::App for StoryApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.ui.settings.ui_scale);

        while let Ok(resp) = self.resp_rx.try_recv() {
            self.handle_response(ctx, resp);
        }

        draw_left_panel(ctx, self);
        draw_right_panel(ctx, self);
        draw_center_panel(ctx, self);

        if self.ui.busy || self.ui.illustration_requested {
            ctx.request_repaint_after(Duration::from_millis(150));
        }
    }
}

/* =========================
   UI Helpers
   ========================= */

pub fn bubble(ui: &mut egui::Ui, color: egui::Color32, text: &str) {
    egui::Frame::new()
        .fill(color)
        .corner_radius(egui::CornerRadius::same(8))
        .inner_margin(egui::Margin::symmetric(10, 6))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).color(egui::Color32::WHITE));
        });
}
