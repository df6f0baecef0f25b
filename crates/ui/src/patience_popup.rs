//! "Not yet" popup raised by tapping the sealed envelope. Clicking it
//! dismisses it early; otherwise the machine hides it on a timer.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use experience::machine::Control;
use experience::ExperienceInput;

use crate::theme;
use crate::ui_state::UiState;

pub const PATIENCE_MESSAGE: &str = "Patience, my love... it's not time yet!";

pub fn patience_popup_ui(
    mut contexts: EguiContexts,
    ui_state: Res<UiState>,
    mut inputs: EventWriter<ExperienceInput>,
) {
    if !ui_state.popup_visible {
        return;
    }
    let ctx = contexts.ctx_mut();
    let response = egui::Window::new("patience_popup")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(egui::Align2::CENTER_BOTTOM, egui::Vec2::new(0.0, -60.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(6.0);
                ui.label(
                    egui::RichText::new(PATIENCE_MESSAGE)
                        .size(theme::FONT_BODY)
                        .color(theme::TEXT),
                );
                ui.add_space(6.0);
            });
        });
    let Some(inner) = response else {
        return;
    };
    if inner.response.interact(egui::Sense::click()).clicked() {
        inputs.send(ExperienceInput::activate(Control::PatiencePopup));
    }
}
