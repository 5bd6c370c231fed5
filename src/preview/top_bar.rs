//! Top bar UI: address bar, source and location selection.

use super::{PreviewApp, TopBarAction};
use crate::data::NAMED_LOCATIONS;
use eframe::egui::{self, Color32, RichText};

pub fn render_top_bar(ctx: &egui::Context, app: &mut PreviewApp) -> Option<TopBarAction> {
    let mut action = None;

    egui::TopBottomPanel::top("top_bar")
        .exact_height(36.0)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                ui.label(
                    RichText::new("Vector Map Viewer")
                        .strong()
                        .size(16.0)
                        .color(Color32::WHITE),
                );

                ui.separator();

                // Address bar, mirrors the URL fragment unless being edited
                ui.label(RichText::new("#").size(12.0).color(Color32::GRAY));
                let response = ui.add(
                    egui::TextEdit::singleline(&mut app.address)
                        .desired_width(360.0)
                        .font(egui::FontId::monospace(12.0)),
                );
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    action = Some(TopBarAction::Navigate(app.address.clone()));
                } else if !response.has_focus() {
                    app.address.clone_from(&app.viewer.context().page.hash);
                }

                ui.separator();

                let context = app.viewer.context();
                let current = context.view.source_id.clone();

                ui.label(RichText::new("Source:").size(12.0).color(Color32::GRAY));
                egui::ComboBox::from_id_salt("source")
                    .selected_text(current.as_str())
                    .show_ui(ui, |ui| {
                        for source in context.registry.iter() {
                            if ui
                                .selectable_label(source.id == current, source.id.as_str())
                                .clicked()
                                && source.id != current
                            {
                                action = Some(TopBarAction::SelectSource(source.id.clone()));
                            }
                        }
                    });

                egui::ComboBox::from_id_salt("location")
                    .selected_text("Go to")
                    .show_ui(ui, |ui| {
                        for location in NAMED_LOCATIONS {
                            if ui.selectable_label(false, location.name).clicked() {
                                action = Some(TopBarAction::Navigate(format!(
                                    "{},{}",
                                    current, location.name
                                )));
                            }
                        }
                    });

                if let Some(mode) = &context.layer.render_mode {
                    ui.separator();
                    ui.label(
                        RichText::new(format!("mode: {}", mode))
                            .size(12.0)
                            .color(Color32::GRAY),
                    );
                }
            });
        });

    action
}
