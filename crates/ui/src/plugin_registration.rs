use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use experience::app_state::AppState;
use experience::ExperienceSet;

use crate::*;

/// Register the egui screens and their shared state.
///
/// Directives are absorbed first so every screen draws this frame's state.
pub(crate) fn register_ui_systems(app: &mut App) {
    // Core egui
    app.add_plugins(EguiPlugin);

    // UI resources
    app.init_resource::<ui_state::UiState>();
    app.init_resource::<ui_state::QuestionFocus>();
    app.init_resource::<loading_indicator::LoadingAnimation>();

    // UI systems
    app.add_systems(Startup, theme::apply_rose_theme);
    app.add_systems(
        Update,
        keyboard::keyboard_activation.in_set(ExperienceSet::Input),
    );
    app.add_systems(
        Update,
        (
            ui_state::absorb_directives,
            (
                countdown_panel::countdown_panel_ui
                    .run_if(in_state(AppState::Locked).or(in_state(AppState::Unlocked))),
                patience_popup::patience_popup_ui,
                loading_indicator::loading_indicator_ui,
                question_screen::question_screen_ui.run_if(in_state(AppState::Question)),
                final_screen::final_screen_ui.run_if(in_state(AppState::Final)),
            ),
        )
            .chain()
            .in_set(ExperienceSet::Present),
    );
}
