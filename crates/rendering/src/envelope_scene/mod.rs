//! The envelope scene: sprites for the envelope, flap, letter and video
//! panel, tween playback for sequencer requests, and pointer activation.

mod tests;
pub mod types;

mod systems;

use bevy::prelude::*;

use experience::ExperienceSet;

pub use systems::{
    advance_part_tweens, apply_part_poses, apply_scene_directives, envelope_control,
    envelope_pointer_input, hit_test, part_pose, spawn_envelope_scene, start_part_tweens,
};
pub use types::{BaseLook, EnvelopeHitbox, EnvelopeInteractive, EnvelopeRoot, Part, PartProps};

pub struct EnvelopeScenePlugin;

impl Plugin for EnvelopeScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EnvelopeInteractive>()
            .add_systems(Startup, spawn_envelope_scene)
            .add_systems(Update, envelope_pointer_input.in_set(ExperienceSet::Input))
            .add_systems(
                Update,
                (
                    start_part_tweens,
                    apply_scene_directives,
                    advance_part_tweens,
                    apply_part_poses,
                )
                    .chain()
                    .in_set(ExperienceSet::Present),
            );
    }
}
