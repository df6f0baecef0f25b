use bevy::prelude::*;

pub mod audio_playback;
pub mod camera;
pub mod confetti;
pub mod egui_input_guard;
pub mod envelope_scene;
pub mod montage_playback;

mod plugin_registration;

/// Everything drawn or played in the world: the envelope, confetti, the
/// montage soundtrack and the locked chime.
///
/// Expects [`experience::ExperiencePlugin`] to be added first.
pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        plugin_registration::register_rendering_systems(app);
    }
}
