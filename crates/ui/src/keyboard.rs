//! Keyboard activation: Enter or Space activates the focused control,
//! Tab and the arrow keys move focus between the two answers, Escape
//! dismisses the patience popup.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use experience::app_state::AppState;
use experience::machine::Control;
use experience::ExperienceInput;

use crate::ui_state::{QuestionFocus, UiState};

/// The control Enter/Space activates right now.
pub fn keyboard_target(state: AppState, ui: &UiState, focus: QuestionFocus) -> Option<Control> {
    match state {
        AppState::Locked => Some(Control::LockedEnvelope),
        AppState::Unlocked => Some(Control::Envelope),
        AppState::Playing if ui.indicator_actionable() => Some(Control::MediaIndicator),
        AppState::Question if ui.question_enabled => Some(match focus {
            QuestionFocus::Yes => Control::Yes,
            QuestionFocus::OfCourse => Control::OfCourse,
        }),
        AppState::Question if ui.indicator_actionable() => Some(Control::MediaIndicator),
        _ => None,
    }
}

pub fn keyboard_activation(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<AppState>>,
    ui: Res<UiState>,
    mut focus: ResMut<QuestionFocus>,
    mut contexts: EguiContexts,
    mut inputs: EventWriter<ExperienceInput>,
) {
    if contexts.ctx_mut().wants_keyboard_input() {
        return;
    }
    if keys.any_just_pressed([KeyCode::Tab, KeyCode::ArrowLeft, KeyCode::ArrowRight]) {
        *focus = focus.toggled();
    }
    if keys.just_pressed(KeyCode::Escape) && ui.popup_visible {
        inputs.send(ExperienceInput::activate(Control::PatiencePopup));
    }
    if !keys.any_just_pressed([KeyCode::Enter, KeyCode::NumpadEnter, KeyCode::Space]) {
        return;
    }
    if let Some(control) = keyboard_target(*state.get(), &ui, *focus) {
        debug!("Keyboard: activate {control:?}");
        inputs.send(ExperienceInput::activate(control));
    }
}
