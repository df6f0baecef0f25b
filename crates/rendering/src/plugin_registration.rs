use bevy::prelude::*;

use crate::*;

/// Register all rendering plugins and systems.
///
/// Each plugin is registered on its own line for conflict-free additions.
pub(crate) fn register_rendering_systems(app: &mut App) {
    app.insert_resource(ClearColor(camera::BACKGROUND));
    app.add_systems(Startup, camera::setup_camera);

    app.add_plugins(envelope_scene::EnvelopeScenePlugin);
    app.add_plugins(confetti::ConfettiPlugin);
    app.add_plugins(montage_playback::MontagePlaybackPlugin);
    app.add_plugins(audio_playback::AudioPlaybackPlugin);
}
