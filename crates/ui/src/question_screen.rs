//! The question and its two affirmative answers.
//!
//! Both buttons mean the same thing. They stay disabled until the machine
//! enables them, and are disabled again the moment an answer is accepted.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use experience::machine::Control;
use experience::ExperienceInput;

use crate::theme;
use crate::ui_state::{QuestionFocus, UiState};

pub const QUESTION_TEXT: &str = "Will you be my Valentine?";

pub fn question_screen_ui(
    mut contexts: EguiContexts,
    ui_state: Res<UiState>,
    focus: Res<QuestionFocus>,
    mut inputs: EventWriter<ExperienceInput>,
) {
    let ctx = contexts.ctx_mut();
    egui::Window::new("question_screen")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .default_width(360.0)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.label(
                    egui::RichText::new(QUESTION_TEXT)
                        .size(theme::FONT_TITLE)
                        .color(theme::ROSE_LIGHT),
                );
                ui.add_space(16.0);
                ui.horizontal(|ui| {
                    let button_size = egui::Vec2::new(150.0, 44.0);
                    for (control, text, which) in [
                        (Control::Yes, "Yes", QuestionFocus::Yes),
                        (Control::OfCourse, "Of course!", QuestionFocus::OfCourse),
                    ] {
                        let stroke = if *focus == which {
                            egui::Stroke::new(2.0, theme::GOLD)
                        } else {
                            egui::Stroke::NONE
                        };
                        let button = egui::Button::new(
                            egui::RichText::new(text).size(theme::FONT_HEADING),
                        )
                        .stroke(stroke);
                        let clicked = ui
                            .add_enabled_ui(ui_state.question_enabled, |ui| {
                                ui.add_sized(button_size, button)
                            })
                            .inner
                            .clicked();
                        if clicked {
                            inputs.send(ExperienceInput::activate(control));
                        }
                    }
                });
                ui.add_space(12.0);
            });
        });
}
