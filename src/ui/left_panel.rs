use eframe::egui;

use storyworlds::config::VariantName;
use storyworlds::engine::protocol::EngineCommand;

use super::app::{LeftTab, StoryApp};

pub fn draw_left_panel(ctx: &egui::Context, app: &mut StoryApp) {
    egui::SidePanel::left("left")
        .resizable(false)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut app.ui.left_tab, LeftTab::Setup, "Story Setup");
                ui.selectable_value(&mut app.ui.left_tab, LeftTab::Options, "Options");
            });

            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| match app.ui.left_tab {
                LeftTab::Setup => draw_setup(ui, app),
                LeftTab::Options => draw_options(ui, app),
            });
        });
}

/* =========================
   Story Setup
   ========================= */

fn draw_setup(ui: &mut egui::Ui, app: &mut StoryApp) {
    ui.heading("Story Setup");

    ui.label("Hero (e.g., Alex the Explorer)");
    ui.text_edit_singleline(&mut app.ui.story.character);

    ui.label("Sidekick (e.g., Spark the Dragon)");
    ui.text_edit_singleline(&mut app.ui.story.sidekick);

    ui.label("Setting (e.g., Magic Forest)");
    ui.text_edit_singleline(&mut app.ui.story.setting);

    ui.add_space(6.0);
    if ui
        .add_enabled(!app.ui.busy, egui::Button::new("Apply & Regenerate"))
        .clicked()
    {
        app.apply_story_setup();
    }

    ui.separator();

    let mut options_changed = false;
    options_changed |= ui
        .checkbox(&mut app.ui.narration, "Enable Narration (TTS)")
        .changed();
    options_changed |= ui
        .checkbox(&mut app.ui.illustrations, "Enable Illustrations")
        .changed();

    ui.add_space(4.0);
    egui::ComboBox::from_label("Story style")
        .selected_text(app.ui.variant.variant().label())
        .show_ui(ui, |ui| {
            options_changed |= ui
                .selectable_value(&mut app.ui.variant, VariantName::Classic, "Classic")
                .changed();
            options_changed |= ui
                .selectable_value(&mut app.ui.variant, VariantName::TwoChoice, "Two choices")
                .changed();
        });

    if options_changed {
        app.options_changed();
    }

    ui.separator();

    if ui
        .add_enabled(!app.ui.busy, egui::Button::new("New Story"))
        .clicked()
    {
        app.restart_story();
    }
}

/* =========================
   Options
   ========================= */

fn draw_options(ui: &mut egui::Ui, app: &mut StoryApp) {
    ui.label("UI Scale");
    ui.add(egui::Slider::new(&mut app.ui.settings.ui_scale, 0.75..=2.0));

    ui.separator();
    ui.label("Colors");

    for key in ["Story", "Feedback", "History", "Warning"] {
        let mut color = app.ui.settings.color(key);
        ui.horizontal(|ui| {
            if ui.color_edit_button_srgba(&mut color).changed() {
                app.ui.settings.set_color(key, color);
            }
            ui.label(key);
        });
    }

    ui.separator();

    if ui.button("Save Settings").clicked() {
        app.ui.persist();
    }

    if ui.button("Test Connection").clicked() {
        app.send_command(EngineCommand::TestConnection);
    }
}
