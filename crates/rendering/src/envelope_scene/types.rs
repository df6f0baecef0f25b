use std::time::Duration;

use bevy::prelude::*;

use experience::sequencer::{Ease, Layout, Property, Target};

// ---------------------------------------------------------------------------
// Scene geometry
// ---------------------------------------------------------------------------

pub const ENVELOPE_SIZE: Vec2 = Vec2::new(360.0, 240.0);
pub const FLAP_HEIGHT: f32 = 140.0;
pub const LETTER_SIZE: Vec2 = Vec2::new(320.0, 210.0);
/// Letter scale at `LetterExpand = 1`.
pub const LETTER_EXPANDED_SCALE: f32 = 2.4;
/// Video panel scale at `VideoFit = 0` (cover crops past the letter edge).
pub const VIDEO_COVER_SCALE: f32 = 1.08;

pub const ENVELOPE_BACK: Color = Color::srgb(0.88, 0.42, 0.52);
pub const ENVELOPE_FRONT: Color = Color::srgb(0.95, 0.55, 0.63);
pub const ENVELOPE_FLAP: Color = Color::srgb(0.82, 0.33, 0.45);
pub const LETTER_PAPER: Color = Color::srgb(1.0, 0.97, 0.93);
pub const VIDEO_BACKDROP: Color = Color::srgb(0.08, 0.06, 0.1);

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// Root of the envelope hierarchy; carries the `EnvelopeContainer` part.
#[derive(Component)]
pub struct EnvelopeRoot;

/// Clickable area of the envelope, centred on the entity.
#[derive(Component)]
pub struct EnvelopeHitbox {
    pub half_size: Vec2,
}

/// Which animated element this entity renders.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Part(pub Target);

/// Resting look of a part, before any property is applied.
#[derive(Component, Debug, Clone, Copy)]
pub struct BaseLook {
    pub color: Color,
    pub translation: Vec3,
}

/// Live property values of one part.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct PartProps {
    pub opacity: f32,
    pub flap_angle: f32,
    pub letter_rise: f32,
    pub letter_expand: f32,
    pub video_fit: f32,
    pub scale: f32,
}

impl Default for PartProps {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            flap_angle: 0.0,
            letter_rise: 0.0,
            letter_expand: 0.0,
            video_fit: 0.0,
            scale: 1.0,
        }
    }
}

impl PartProps {
    /// Initial values for `target`, taken from the sequencer's resting
    /// layout so both sides agree on the starting pose.
    pub fn initial(target: Target) -> Self {
        let mut props = Self::default();
        for (t, property, value) in Layout::default().iter() {
            if t == target {
                props.set(property, value);
            }
        }
        props
    }

    pub fn get(&self, property: Property) -> f32 {
        match property {
            Property::Opacity => self.opacity,
            Property::FlapAngle => self.flap_angle,
            Property::LetterRise => self.letter_rise,
            Property::LetterExpand => self.letter_expand,
            Property::VideoFit => self.video_fit,
            Property::Scale => self.scale,
        }
    }

    pub fn set(&mut self, property: Property, value: f32) {
        let slot = match property {
            Property::Opacity => &mut self.opacity,
            Property::FlapAngle => &mut self.flap_angle,
            Property::LetterRise => &mut self.letter_rise,
            Property::LetterExpand => &mut self.letter_expand,
            Property::VideoFit => &mut self.video_fit,
            Property::Scale => &mut self.scale,
        };
        *slot = value;
    }
}

/// One property interpolating from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyTween {
    pub property: Property,
    pub from: f32,
    pub to: f32,
    pub elapsed: Duration,
    pub duration: Duration,
    pub ease: Ease,
}

impl PropertyTween {
    /// Advance by `dt`; returns the new value and whether the tween is done.
    pub fn step(&mut self, dt: Duration) -> (f32, bool) {
        self.elapsed += dt;
        if self.duration.is_zero() || self.elapsed >= self.duration {
            return (self.to, true);
        }
        let t = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        let eased = self.ease.sample(t);
        (self.from + (self.to - self.from) * eased, false)
    }
}

/// Tweens currently running on a part.
#[derive(Component, Debug, Default)]
pub struct PartTweens(pub Vec<PropertyTween>);

impl PartTweens {
    /// Start a tween, replacing any running tween on the same property.
    pub fn start(&mut self, tween: PropertyTween) {
        self.0.retain(|t| t.property != tween.property);
        self.0.push(tween);
    }
}

/// Gentle pulse on the envelope while it can be activated.
#[derive(Resource, Debug, Default)]
pub struct EnvelopeInteractive(pub bool);

/// Where and how a part is drawn this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub scale: Vec3,
    pub alpha: f32,
}
