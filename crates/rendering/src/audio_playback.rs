//! Audio playback for the locked-envelope chime.
//!
//! Consumes `PlayLockedChime` directives. Each one spawns a player that
//! despawns itself when the clip ends. A tap while the chime is still
//! sounding restarts it from the beginning.

use bevy::audio::{PlaybackSettings, Volume};
use bevy::prelude::*;

use experience::machine::Directive;
use experience::{ExperienceDirective, ExperienceSet};

pub const CHIME_PATH: &str = "audio/chime.ogg";
const CHIME_VOLUME: f32 = 0.6;

#[derive(Resource)]
pub struct ChimeSound(pub Handle<AudioSource>);

/// Marker for the chime's audio player entity.
#[derive(Component)]
pub struct LockedChime;

fn load_chime(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands.insert_resource(ChimeSound(asset_server.load(CHIME_PATH)));
}

/// System that reads chime directives each frame and plays the clip.
fn play_locked_chime(
    mut commands: Commands,
    mut directives: EventReader<ExperienceDirective>,
    chime: Res<ChimeSound>,
    playing: Query<Entity, With<LockedChime>>,
) {
    for ExperienceDirective(directive) in directives.read() {
        if *directive != Directive::PlayLockedChime {
            continue;
        }
        debug!("SFX: locked chime vol={CHIME_VOLUME:.2}");
        for entity in &playing {
            commands.entity(entity).despawn();
        }
        commands.spawn((
            LockedChime,
            AudioPlayer(chime.0.clone()),
            PlaybackSettings::DESPAWN.with_volume(Volume::new(CHIME_VOLUME)),
        ));
    }
}

/// Plugin that wires up the chime loader and player.
pub struct AudioPlaybackPlugin;

impl Plugin for AudioPlaybackPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, load_chime).add_systems(
            Update,
            play_locked_chime
                .run_if(resource_exists::<ChimeSound>)
                .in_set(ExperienceSet::Present),
        );
    }
}
