use eframe::egui;

use storyworlds::engine::protocol::{EngineCommand, SegmentView};
use storyworlds::model::parsed_segment::PresentationMode;

use super::app::{bubble, StoryApp};

pub fn draw_center_panel(ctx: &egui::Context, app: &mut StoryApp) {
    // ---------- Choice bar ----------
    egui::TopBottomPanel::bottom("choices").show(ctx, |ui| {
        ui.add_space(4.0);
        ui.heading("Make a Choice");

        let choices = app
            .ui
            .segment
            .as_ref()
            .map(|s| s.choices.clone())
            .unwrap_or_default();

        if choices.is_empty() {
            ui.label("No choices yet.");
        } else {
            ui.label("What should happen next?");
            for (i, choice) in choices.iter().enumerate() {
                ui.radio_value(&mut app.ui.selected_choice, Some(i), choice);
            }
        }

        ui.horizontal(|ui| {
            let can_continue = app.ui.can_continue();
            if ui
                .add_enabled(can_continue, egui::Button::new("Continue Story"))
                .clicked()
            {
                app.continue_story();
            }

            if app.ui.segment.is_none()
                && !app.ui.busy
                && ui.button("Try Again").clicked()
            {
                app.send_command(EngineCommand::Regenerate);
            }
        });
        ui.add_space(4.0);
    });

    // ---------- Current segment ----------
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("📖 StoryWorlds: Interactive Adventures");
        ui.label("Choose your hero, sidekick, and world. Let’s create a magical story together!");
        ui.separator();

        egui::ScrollArea::vertical().id_salt("segment").show(ui, |ui| {
            draw_notices(ui, app);

            if app.ui.busy {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Writing the next part of the story…");
                });
            }

            if let Some(segment) = &app.ui.segment {
                ui.label(
                    egui::RichText::new(format!("Current Story Segment (step {})", segment.step))
                        .strong(),
                );
                draw_segment(ui, app, segment);
            }

            draw_illustration(ui, app);

            if let Some(path) = &app.ui.narration_path {
                ui.add_space(6.0);
                ui.label(format!("🔊 Narration saved to {}", path.display()));
            }
        });
    });
}

fn draw_segment(ui: &mut egui::Ui, app: &StoryApp, segment: &SegmentView) {
    let story_color = app.ui.settings.color("Story");

    match segment.presentation {
        PresentationMode::Structured => {
            bubble(ui, story_color, &segment.narrative);
            if let Some(feedback) = segment.feedback.as_deref().filter(|f| !f.is_empty()) {
                ui.add_space(6.0);
                bubble(ui, app.ui.settings.color("Feedback"), feedback);
            }
        }
        PresentationMode::Verbatim => bubble(ui, story_color, &segment.raw),
    }
}

fn draw_illustration(ui: &mut egui::Ui, app: &StoryApp) {
    if let Some(texture) = &app.ui.illustration {
        ui.add_space(6.0);
        ui.label(egui::RichText::new("Illustration").strong());
        ui.add(egui::Image::new(texture).max_width(ui.available_width().min(512.0)));
    } else if app.ui.illustration_requested && app.ui.segment.is_some() {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Drawing a picture…");
        });
    }
}

fn draw_notices(ui: &mut egui::Ui, app: &mut StoryApp) {
    if let Some(status) = &app.ui.status {
        ui.label(status);
    }

    let warning_color = app.ui.settings.color("Warning");
    let mut dismissed = false;

    for warning in &app.ui.warnings {
        bubble(ui, warning_color, &format!("⚠ {}", warning));
        ui.add_space(4.0);
    }

    if !app.ui.warnings.is_empty() && ui.small_button("Dismiss").clicked() {
        dismissed = true;
    }

    if dismissed {
        app.ui.warnings.clear();
    }
}
