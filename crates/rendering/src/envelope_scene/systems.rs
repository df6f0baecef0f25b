use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use experience::app_state::AppState;
use experience::machine::{Control, Directive};
use experience::sequencer::Target;
use experience::{ExperienceDirective, ExperienceInput};

use crate::egui_input_guard::egui_wants_pointer;

use super::types::*;

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

/// Compute where a part sits this frame. `container` is the envelope
/// root's props; its opacity multiplies into every part.
pub fn part_pose(
    target: Target,
    props: &PartProps,
    base: &BaseLook,
    container: &PartProps,
) -> Pose {
    let inherited = container.opacity;
    match target {
        Target::EnvelopeContainer => Pose {
            translation: base.translation,
            scale: Vec3::splat(props.scale),
            alpha: props.opacity,
        },
        Target::Flap => Pose {
            translation: base.translation,
            // Folding around the top edge: -180 degrees flips the flap up.
            scale: Vec3::new(1.0, props.flap_angle.to_radians().cos(), 1.0),
            alpha: inherited,
        },
        Target::Letter => {
            let tucked_y = base.translation.y + props.letter_rise;
            let expand = props.letter_expand.clamp(0.0, 1.0);
            let y = tucked_y + (0.0 - tucked_y) * expand;
            let z = base.translation.z + 2.5 * expand;
            Pose {
                translation: Vec3::new(base.translation.x, y, z),
                scale: Vec3::splat(1.0 + (LETTER_EXPANDED_SCALE - 1.0) * expand),
                alpha: props.opacity * inherited,
            }
        }
        Target::VideoPanel => {
            let fit = props.video_fit.clamp(0.0, 1.0);
            Pose {
                translation: base.translation,
                scale: Vec3::splat(VIDEO_COVER_SCALE + (1.0 - VIDEO_COVER_SCALE) * fit),
                alpha: props.opacity * inherited,
            }
        }
        Target::UnlockMessage | Target::Caption => Pose {
            translation: base.translation,
            scale: Vec3::ONE,
            alpha: props.opacity,
        },
    }
}

pub fn hit_test(point: Vec2, center: Vec2, half_size: Vec2) -> bool {
    let d = (point - center).abs();
    d.x <= half_size.x && d.y <= half_size.y
}

/// The envelope control that a pointer or key press means in `state`.
pub fn envelope_control(state: AppState) -> Option<Control> {
    match state {
        AppState::Locked => Some(Control::LockedEnvelope),
        AppState::Unlocked => Some(Control::Envelope),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

fn part_bundle(target: Target, sprite: Sprite, translation: Vec3) -> impl Bundle {
    let base = BaseLook {
        color: sprite.color,
        translation,
    };
    (
        Part(target),
        PartProps::initial(target),
        PartTweens::default(),
        base,
        sprite,
        Transform::from_translation(translation),
    )
}

pub fn spawn_envelope_scene(mut commands: Commands) {
    let container = Target::EnvelopeContainer;
    commands
        .spawn((
            EnvelopeRoot,
            EnvelopeHitbox {
                half_size: ENVELOPE_SIZE / 2.0,
            },
            Part(container),
            PartProps::initial(container),
            PartTweens::default(),
            BaseLook {
                color: Color::WHITE,
                translation: Vec3::new(0.0, -40.0, 0.0),
            },
            Transform::from_xyz(0.0, -40.0, 0.0),
            Visibility::default(),
        ))
        .with_children(|parent| {
            parent.spawn((
                Sprite::from_color(ENVELOPE_BACK, ENVELOPE_SIZE),
                Transform::from_xyz(0.0, 0.0, 0.0),
            ));
            parent
                .spawn(part_bundle(
                    Target::Letter,
                    Sprite::from_color(LETTER_PAPER, LETTER_SIZE),
                    Vec3::new(0.0, 10.0, 1.0),
                ))
                .with_children(|letter| {
                    letter.spawn(part_bundle(
                        Target::VideoPanel,
                        Sprite::from_color(VIDEO_BACKDROP, LETTER_SIZE * 0.9),
                        Vec3::new(0.0, 0.0, 0.1),
                    ));
                });
            let front_size = Vec2::new(ENVELOPE_SIZE.x, ENVELOPE_SIZE.y * 0.6);
            parent.spawn((
                Sprite::from_color(ENVELOPE_FRONT, front_size),
                Transform::from_xyz(0.0, -ENVELOPE_SIZE.y * 0.2, 2.0),
            ));
            let flap_size = Vec2::new(ENVELOPE_SIZE.x, FLAP_HEIGHT);
            let mut flap = Sprite::from_color(ENVELOPE_FLAP, flap_size);
            flap.anchor = bevy::sprite::Anchor::TopCenter;
            parent.spawn(part_bundle(
                Target::Flap,
                flap,
                Vec3::new(0.0, ENVELOPE_SIZE.y / 2.0, 3.0),
            ));
        });

    for (target, text, y, size) in [
        (Target::UnlockMessage, "It's time! Tap the envelope", 200.0, 30.0),
        (Target::Caption, "For you", 130.0, 22.0),
    ] {
        commands.spawn((
            Part(target),
            PartProps::initial(target),
            PartTweens::default(),
            BaseLook {
                color: Color::WHITE,
                translation: Vec3::new(0.0, y, 5.0),
            },
            Text2d::new(text),
            TextFont {
                font_size: size,
                ..default()
            },
            TextColor(Color::WHITE),
            Transform::from_xyz(0.0, y, 5.0),
            // The unlock message appears once the envelope can be opened.
            if target == Target::UnlockMessage {
                Visibility::Hidden
            } else {
                Visibility::Inherited
            },
        ));
    }
}

/// Turn `Tween` directives into running property tweens.
pub fn start_part_tweens(
    mut directives: EventReader<ExperienceDirective>,
    mut parts: Query<(&Part, &PartProps, &mut PartTweens)>,
) {
    for ExperienceDirective(directive) in directives.read() {
        let Directive::Tween(request) = directive else {
            continue;
        };
        let Some((_, props, mut tweens)) = parts.iter_mut().find(|(p, _, _)| p.0 == request.target)
        else {
            warn!("Envelope: no entity for {:?}", request.target);
            continue;
        };
        for &(property, to) in &request.props {
            tweens.start(PropertyTween {
                property,
                from: props.get(property),
                to,
                elapsed: std::time::Duration::ZERO,
                duration: request.duration,
                ease: request.ease,
            });
        }
    }
}

pub fn advance_part_tweens(time: Res<Time>, mut parts: Query<(&mut PartProps, &mut PartTweens)>) {
    let dt = time.delta();
    for (mut props, mut tweens) in &mut parts {
        if tweens.0.is_empty() {
            continue;
        }
        tweens.0.retain_mut(|tween| {
            let (value, done) = tween.step(dt);
            props.set(tween.property, value);
            !done
        });
    }
}

#[allow(clippy::type_complexity)]
pub fn apply_part_poses(
    time: Res<Time>,
    interactive: Res<EnvelopeInteractive>,
    roots: Query<&PartProps, With<EnvelopeRoot>>,
    mut parts: Query<(
        &Part,
        &PartProps,
        &BaseLook,
        &mut Transform,
        Option<&mut Sprite>,
        Option<&mut TextColor>,
    )>,
) {
    let container = roots.get_single().copied().unwrap_or_default();
    let pulse = if interactive.0 {
        1.0 + 0.02 * (time.elapsed_secs() * 3.0).sin()
    } else {
        1.0
    };
    for (part, props, base, mut transform, sprite, text) in &mut parts {
        let pose = part_pose(part.0, props, base, &container);
        transform.translation = pose.translation;
        transform.scale = if part.0 == Target::EnvelopeContainer {
            pose.scale * pulse
        } else {
            pose.scale
        };
        let color = base.color.with_alpha(pose.alpha.clamp(0.0, 1.0));
        if let Some(mut sprite) = sprite {
            sprite.color = color;
        }
        if let Some(mut text) = text {
            text.0 = color;
        }
    }
}

/// Visibility and interactivity changes that aren't tweens.
pub fn apply_scene_directives(
    mut directives: EventReader<ExperienceDirective>,
    mut interactive: ResMut<EnvelopeInteractive>,
    mut roots: Query<&mut Visibility, With<EnvelopeRoot>>,
    mut labels: Query<(&Part, &mut Visibility), Without<EnvelopeRoot>>,
) {
    for ExperienceDirective(directive) in directives.read() {
        match directive {
            Directive::EnvelopeInteractive(on) => {
                interactive.0 = *on;
                if *on {
                    for (part, mut visibility) in &mut labels {
                        if part.0 == Target::UnlockMessage {
                            *visibility = Visibility::Inherited;
                        }
                    }
                }
            }
            Directive::HideEnvelope => {
                for mut visibility in &mut roots {
                    *visibility = Visibility::Hidden;
                }
            }
            _ => {}
        }
    }
}

/// Pointer and touch activation of the envelope.
#[allow(clippy::too_many_arguments)]
pub fn envelope_pointer_input(
    mouse: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    hitboxes: Query<(&GlobalTransform, &EnvelopeHitbox, &InheritedVisibility)>,
    state: Res<State<AppState>>,
    mut contexts: EguiContexts,
    mut inputs: EventWriter<ExperienceInput>,
) {
    let Some(control) = envelope_control(*state.get()) else {
        return;
    };
    let mut presses: Vec<Vec2> = touches.iter_just_pressed().map(|t| t.position()).collect();
    if mouse.just_pressed(MouseButton::Left) {
        if egui_wants_pointer(&mut contexts) {
            return;
        }
        if let Some(cursor) = windows.get_single().ok().and_then(Window::cursor_position) {
            presses.push(cursor);
        }
    }
    if presses.is_empty() {
        return;
    }
    let Ok((camera, camera_transform)) = cameras.get_single() else {
        return;
    };
    for screen in presses {
        let Ok(world) = camera.viewport_to_world_2d(camera_transform, screen) else {
            continue;
        };
        let hit = hitboxes.iter().any(|(transform, hitbox, visible)| {
            visible.get() && hit_test(world, transform.translation().truncate(), hitbox.half_size)
        });
        if hit {
            debug!("Envelope: activated ({control:?})");
            inputs.send(ExperienceInput::activate(control));
            return;
        }
    }
}
