use bevy::prelude::*;

pub mod countdown_panel;
pub mod final_screen;
pub mod keyboard;
pub mod loading_indicator;
pub mod patience_popup;
pub mod question_screen;
pub mod theme;
pub mod ui_state;

mod plugin_registration;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        plugin_registration::register_ui_systems(app);
    }
}
