//! Closing message once the answer is committed.

use bevy_egui::{egui, EguiContexts};

use crate::theme;

pub const FINAL_TITLE: &str = "Yay! I love you!";
pub const FINAL_SUBTITLE: &str = "See you on the 14th \u{2764}";

pub fn final_screen_ui(mut contexts: EguiContexts) {
    let ctx = contexts.ctx_mut();
    egui::Area::new(egui::Id::new("final_screen"))
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .interactable(false)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new(FINAL_TITLE)
                        .size(theme::FONT_TITLE * 1.4)
                        .color(theme::ROSE),
                );
                ui.add_space(8.0);
                ui.label(
                    egui::RichText::new(FINAL_SUBTITLE)
                        .size(theme::FONT_HEADING)
                        .color(theme::GOLD),
                );
            });
        });
}
