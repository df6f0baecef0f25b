//! Confetti: turns `Burst` directives into short-lived particles.
//!
//! Each burst fans its particles upward within its spread angle. Particles
//! fall under gravity, fade over [`PARTICLE_TICKS`] frames and despawn. Rose
//! glyphs need a font; if it fails to load the machine is told once and
//! later bursts arrive stamped with basic shapes.

use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use experience::machine::{Directive, ExperienceEvent};
use experience::particles::{ParticleBurst, ShapeSet, PALETTE, PARTICLE_TICKS};
use experience::{ExperienceDirective, ExperienceInput, ExperienceSet};

pub const ROSE_FONT_PATH: &str = "fonts/rose.ttf";
const ROSE_GLYPH: &str = "\u{1F339}";

/// Scene extent used when there is no window (headless runs).
const FALLBACK_EXTENT: Vec2 = Vec2::new(1280.0, 720.0);
const GRAVITY: f32 = 900.0;
const DRAG: f32 = 0.9;
const MIN_SPEED: f32 = 280.0;
const MAX_SPEED: f32 = 620.0;
const PARTICLE_Z: f32 = 20.0;

// ---------------------------------------------------------------------------
// Components and resources
// ---------------------------------------------------------------------------

#[derive(Component, Debug)]
pub struct Particle {
    pub velocity: Vec2,
    pub ticks_left: u32,
    pub color: Color,
}

/// Shape variant a spawned particle uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleShape {
    Rose,
    Circle,
    Square,
}

/// Spawn parameters for one particle, computed before touching the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSeed {
    pub position: Vec2,
    pub velocity: Vec2,
    pub color: [u8; 3],
    pub shape: ParticleShape,
}

#[derive(Resource)]
pub struct ConfettiRng(pub ChaCha8Rng);

impl Default for ConfettiRng {
    fn default() -> Self {
        Self(ChaCha8Rng::seed_from_u64(rand::random()))
    }
}

#[derive(Resource)]
pub struct RoseFont {
    pub handle: Handle<Font>,
    pub reported: bool,
}

#[derive(Resource)]
pub struct ConfettiAssets {
    pub circle: Handle<Mesh>,
    pub materials: Vec<Handle<ColorMaterial>>,
}

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

/// Map a normalised burst origin to world space with the origin at the
/// centre of the screen and +y up.
pub fn burst_origin(burst: &ParticleBurst, extent: Vec2) -> Vec2 {
    Vec2::new(
        (burst.origin_x - 0.5) * extent.x,
        (0.5 - burst.origin_y) * extent.y,
    )
}

/// Lay out every particle of a burst. Directions are centred on straight
/// up and spread over `spread_deg`.
pub fn burst_particles(
    burst: &ParticleBurst,
    extent: Vec2,
    rng: &mut impl Rng,
) -> Vec<ParticleSeed> {
    let origin = burst_origin(burst, extent);
    let half_spread = burst.spread_deg.clamp(0.0, 360.0).to_radians() / 2.0;
    (0..burst.count)
        .map(|i| {
            let angle = std::f32::consts::FRAC_PI_2 + rng.gen_range(-half_spread..=half_spread);
            let speed = rng.gen_range(MIN_SPEED..=MAX_SPEED);
            let shape = match burst.shapes {
                ShapeSet::Roses => ParticleShape::Rose,
                ShapeSet::Basic if i % 2 == 0 => ParticleShape::Circle,
                ShapeSet::Basic => ParticleShape::Square,
            };
            ParticleSeed {
                position: origin,
                velocity: Vec2::new(angle.cos(), angle.sin()) * speed,
                color: PALETTE[rng.gen_range(0..PALETTE.len())],
                shape,
            }
        })
        .collect()
}

/// Advance one particle by one frame. Returns `false` once it has expired.
pub fn step_particle(particle: &mut Particle, position: &mut Vec2, dt: f32) -> bool {
    if particle.ticks_left == 0 {
        return false;
    }
    particle.ticks_left -= 1;
    particle.velocity.y -= GRAVITY * dt;
    particle.velocity *= DRAG.powf(dt);
    *position += particle.velocity * dt;
    particle.ticks_left > 0
}

fn palette_color(rgb: [u8; 3]) -> Color {
    Color::srgb_u8(rgb[0], rgb[1], rgb[2])
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

fn setup_confetti(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    commands.insert_resource(RoseFont {
        handle: asset_server.load(ROSE_FONT_PATH),
        reported: false,
    });
    commands.insert_resource(ConfettiAssets {
        circle: meshes.add(Circle::new(5.0)),
        materials: PALETTE
            .iter()
            .map(|&rgb| materials.add(palette_color(rgb)))
            .collect(),
    });
}

/// Report a failed rose font to the state machine, once.
fn watch_rose_font(
    asset_server: Res<AssetServer>,
    mut font: ResMut<RoseFont>,
    mut inputs: EventWriter<ExperienceInput>,
) {
    if font.reported {
        return;
    }
    if let LoadState::Failed(err) = asset_server.load_state(&font.handle) {
        warn!("Confetti: rose font unavailable: {err}");
        font.reported = true;
        inputs.send(ExperienceInput(ExperienceEvent::ParticleShapeUnavailable));
    }
}

#[allow(clippy::too_many_arguments)]
fn spawn_bursts(
    mut commands: Commands,
    mut directives: EventReader<ExperienceDirective>,
    mut rng: ResMut<ConfettiRng>,
    font: Res<RoseFont>,
    assets: Res<ConfettiAssets>,
    windows: Query<&Window, With<PrimaryWindow>>,
    particles: Query<Entity, With<Particle>>,
) {
    let extent = windows
        .get_single()
        .map(|w| Vec2::new(w.width(), w.height()))
        .unwrap_or(FALLBACK_EXTENT);

    for ExperienceDirective(directive) in directives.read() {
        match directive {
            Directive::Burst(burst) => {
                for seed in burst_particles(burst, extent, &mut rng.0) {
                    let color = palette_color(seed.color);
                    let particle = Particle {
                        velocity: seed.velocity,
                        ticks_left: PARTICLE_TICKS,
                        color,
                    };
                    let transform = Transform::from_translation(seed.position.extend(PARTICLE_Z));
                    match seed.shape {
                        ParticleShape::Rose => {
                            commands.spawn((
                                particle,
                                Text2d::new(ROSE_GLYPH),
                                TextFont {
                                    font: font.handle.clone(),
                                    font_size: 18.0,
                                    ..default()
                                },
                                TextColor(color),
                                transform,
                            ));
                        }
                        ParticleShape::Circle => {
                            let index = PALETTE.iter().position(|c| *c == seed.color).unwrap_or(0);
                            commands.spawn((
                                particle,
                                Mesh2d(assets.circle.clone()),
                                MeshMaterial2d(assets.materials[index].clone()),
                                transform,
                            ));
                        }
                        ParticleShape::Square => {
                            commands.spawn((
                                particle,
                                Sprite::from_color(color, Vec2::splat(8.0)),
                                transform,
                            ));
                        }
                    }
                }
            }
            Directive::ClearParticles => {
                for entity in &particles {
                    commands.entity(entity).despawn();
                }
            }
            _ => {}
        }
    }
}

fn animate_particles(
    mut commands: Commands,
    time: Res<Time>,
    mut particles: Query<(
        Entity,
        &mut Particle,
        &mut Transform,
        Option<&mut Sprite>,
        Option<&mut TextColor>,
    )>,
) {
    let dt = time.delta_secs();
    for (entity, mut particle, mut transform, sprite, text) in &mut particles {
        let mut position = transform.translation.truncate();
        if !step_particle(&mut particle, &mut position, dt) {
            commands.entity(entity).despawn();
            continue;
        }
        transform.translation = position.extend(PARTICLE_Z);
        let alpha = particle.ticks_left as f32 / PARTICLE_TICKS as f32;
        let faded = particle.color.with_alpha(alpha);
        if let Some(mut sprite) = sprite {
            sprite.color = faded;
        }
        if let Some(mut text) = text {
            text.0 = faded;
        }
    }
}

pub struct ConfettiPlugin;

impl Plugin for ConfettiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ConfettiRng>()
            .add_systems(Startup, setup_confetti)
            .add_systems(
                Update,
                watch_rose_font
                    .run_if(resource_exists::<RoseFont>)
                    .in_set(ExperienceSet::Input),
            )
            .add_systems(
                Update,
                (spawn_bursts, animate_particles)
                    .chain()
                    .run_if(resource_exists::<ConfettiAssets>)
                    .in_set(ExperienceSet::Present),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn burst(count: u32, spread_deg: f32, shapes: ShapeSet) -> ParticleBurst {
        ParticleBurst {
            origin_x: 0.5,
            origin_y: 0.0,
            count,
            spread_deg,
            shapes,
        }
    }

    #[test]
    fn test_origin_maps_to_world_space() {
        let extent = Vec2::new(1000.0, 800.0);
        let top = burst(1, 0.0, ShapeSet::Roses);
        assert_eq!(burst_origin(&top, extent), Vec2::new(0.0, 400.0));
        let centre = ParticleBurst {
            origin_y: 0.5,
            ..burst(1, 0.0, ShapeSet::Roses)
        };
        assert_eq!(burst_origin(&centre, extent), Vec2::ZERO);
    }

    #[test]
    fn test_burst_count_and_spread() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let upward = burst(60, 90.0, ShapeSet::Roses);
        let seeds = burst_particles(&upward, FALLBACK_EXTENT, &mut rng);
        assert_eq!(seeds.len(), 60);
        for seed in &seeds {
            let angle = seed.velocity.y.atan2(seed.velocity.x).to_degrees();
            assert!(
                (45.0 - 1e-3..=135.0 + 1e-3).contains(&angle),
                "angle {angle} outside spread"
            );
            assert!(PALETTE.contains(&seed.color));
            assert_eq!(seed.shape, ParticleShape::Rose);
        }
    }

    #[test]
    fn test_basic_shapes_alternate() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let seeds = burst_particles(&burst(4, 360.0, ShapeSet::Basic), FALLBACK_EXTENT, &mut rng);
        let shapes: Vec<ParticleShape> = seeds.iter().map(|s| s.shape).collect();
        assert_eq!(
            shapes,
            vec![
                ParticleShape::Circle,
                ParticleShape::Square,
                ParticleShape::Circle,
                ParticleShape::Square
            ]
        );
    }

    #[test]
    fn test_particle_expires_after_lifetime() {
        let mut particle = Particle {
            velocity: Vec2::new(0.0, 400.0),
            ticks_left: PARTICLE_TICKS,
            color: Color::WHITE,
        };
        let mut position = Vec2::ZERO;
        let mut frames = 0;
        while step_particle(&mut particle, &mut position, 1.0 / 60.0) {
            frames += 1;
        }
        assert_eq!(frames, PARTICLE_TICKS - 1);
        assert!(position.y < 0.0, "gravity wins over a 200-frame life");
    }
}
