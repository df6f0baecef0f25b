//! Countdown shown above the envelope while it is still sealed. Once the
//! deadline passes the cells give way to the unlocked banner.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use experience::deadline::CountdownSnapshot;

use crate::theme;
use crate::ui_state::UiState;

const UNIT_LABELS: [&str; 4] = ["Days", "Hours", "Minutes", "Seconds"];

/// The four countdown cells as (value, unit) pairs.
pub fn countdown_cells(snapshot: &CountdownSnapshot) -> [(String, &'static str); 4] {
    let [d, h, m, s] = snapshot.padded();
    [
        (d, UNIT_LABELS[0]),
        (h, UNIT_LABELS[1]),
        (m, UNIT_LABELS[2]),
        (s, UNIT_LABELS[3]),
    ]
}

pub fn countdown_panel_ui(mut contexts: EguiContexts, ui_state: Res<UiState>) {
    let ctx = contexts.ctx_mut();
    egui::Area::new(egui::Id::new("countdown_panel"))
        .anchor(egui::Align2::CENTER_TOP, egui::Vec2::new(0.0, 32.0))
        .interactable(false)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                if ui_state.countdown.reached {
                    ui.label(
                        egui::RichText::new(ui_state.countdown.label())
                            .size(theme::FONT_TITLE)
                            .color(theme::GOLD),
                    );
                    return;
                }
                ui.label(
                    egui::RichText::new("Not yet, my love")
                        .size(theme::FONT_HEADING)
                        .color(theme::ROSE_LIGHT),
                );
                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    for (value, unit) in countdown_cells(&ui_state.countdown) {
                        egui::Frame::new()
                            .fill(theme::BG_PANEL)
                            .stroke(egui::Stroke::new(1.0, theme::ROSE))
                            .corner_radius(egui::CornerRadius::same(10))
                            .inner_margin(egui::Margin::symmetric(14, 8))
                            .show(ui, |ui| {
                                ui.vertical_centered(|ui| {
                                    ui.label(
                                        egui::RichText::new(value)
                                            .size(theme::FONT_TITLE)
                                            .color(theme::TEXT)
                                            .monospace(),
                                    );
                                    ui.label(
                                        egui::RichText::new(unit)
                                            .size(theme::FONT_SMALL)
                                            .color(theme::TEXT_MUTED),
                                    );
                                });
                            });
                    }
                });
            });
        });
}
