use eframe::egui;

use super::app::{bubble, StoryApp};

pub fn draw_right_panel(ctx: &egui::Context, app: &mut StoryApp) {
    egui::SidePanel::right("right")
        .resizable(true)
        .default_width(320.0)
        .min_width(240.0)
        .show(ctx, |ui| {
            ui.heading("Your Story So Far");
            ui.separator();

            if !app.ui.history.is_empty() {
                if ui.button("📥 Save Storybook as PDF").clicked() {
                    app.save_storybook();
                }
                ui.separator();
            }

            let color = app.ui.settings.color("History");

            egui::ScrollArea::vertical()
                .id_salt("history")
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    if app.ui.history.is_empty() {
                        ui.label("Make a choice to start your storybook.");
                    }

                    for (i, segment) in app.ui.history.iter().enumerate() {
                        ui.label(egui::RichText::new(format!("Step {}:", i + 1)).strong());
                        bubble(ui, color, segment);
                        ui.add_space(6.0);
                    }
                });
        });
}
