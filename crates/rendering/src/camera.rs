use bevy::prelude::*;

/// Deep night-rose backdrop behind the envelope.
pub const BACKGROUND: Color = Color::srgb(0.16, 0.07, 0.12);

pub fn setup_camera(mut commands: Commands) {
    commands.spawn((Camera2d, Msaa::Sample4));
}
