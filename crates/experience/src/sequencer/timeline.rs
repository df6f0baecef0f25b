use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::MotionPreference;

/// Every effect lasts at most this long under reduced motion.
pub const REDUCED_MOTION_FLOOR_SECS: f64 = 0.1;

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SequenceName {
    /// Envelope opens, letter slides out and enlarges, video fades in.
    Open,
    /// Reverse of `Open`: video fades, letter shrinks back, flap closes.
    Retract,
    /// Whole envelope container fades and shrinks away.
    FadeOut,
}

/// Visual element an effect animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target {
    UnlockMessage,
    Caption,
    Flap,
    Letter,
    VideoPanel,
    EnvelopeContainer,
}

/// Animated property. Values are unitless except `FlapAngle` (degrees)
/// and `LetterRise` (logical pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    Opacity,
    FlapAngle,
    LetterRise,
    /// 0 = tucked letter size, 1 = full-screen letter.
    LetterExpand,
    /// 0 = cover, 1 = contain.
    VideoFit,
    Scale,
}

/// Quadratic easing curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ease {
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
}

impl Ease {
    /// Map linear progress `t` in `[0, 1]` to eased progress.
    pub fn sample(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::QuadIn => t * t,
            Ease::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Ease::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// Where an effect starts relative to the timeline's current end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    AfterPrevious,
    /// Start this many seconds before the current end.
    Overlap(f64),
    /// Start this many seconds after the current end.
    Gap(f64),
}

#[derive(Debug, Clone, Copy)]
pub struct EffectSpec {
    pub target: Target,
    pub props: &'static [(Property, f32)],
    pub duration_secs: f64,
    pub ease: Ease,
    pub position: Position,
}

const fn tween(
    target: Target,
    props: &'static [(Property, f32)],
    duration_secs: f64,
    ease: Ease,
    position: Position,
) -> EffectSpec {
    EffectSpec {
        target,
        props,
        duration_secs,
        ease,
        position,
    }
}

/// Zero-duration property snap.
const fn set(target: Target, props: &'static [(Property, f32)]) -> EffectSpec {
    tween(target, props, 0.0, Ease::Linear, Position::AfterPrevious)
}

// ---------------------------------------------------------------------------
// Sequence definitions
// ---------------------------------------------------------------------------

const OPEN: &[EffectSpec] = &[
    tween(
        Target::UnlockMessage,
        &[(Property::Opacity, 0.0)],
        0.3,
        Ease::QuadOut,
        Position::AfterPrevious,
    ),
    tween(
        Target::Caption,
        &[(Property::Opacity, 0.0)],
        0.3,
        Ease::QuadOut,
        Position::Overlap(0.2),
    ),
    tween(
        Target::Flap,
        &[(Property::FlapAngle, -180.0)],
        0.8,
        Ease::QuadInOut,
        Position::Gap(0.2),
    ),
    tween(
        Target::Letter,
        &[(Property::Opacity, 1.0), (Property::LetterRise, 200.0)],
        0.9,
        Ease::QuadOut,
        Position::Overlap(0.3),
    ),
    tween(
        Target::Letter,
        &[(Property::LetterExpand, 1.0)],
        0.7,
        Ease::QuadInOut,
        Position::Overlap(0.3),
    ),
    tween(
        Target::VideoPanel,
        &[(Property::Opacity, 1.0)],
        0.5,
        Ease::QuadIn,
        Position::Overlap(0.3),
    ),
    set(Target::VideoPanel, &[(Property::VideoFit, 1.0)]),
];

const RETRACT: &[EffectSpec] = &[
    tween(
        Target::VideoPanel,
        &[(Property::Opacity, 0.0)],
        0.4,
        Ease::QuadOut,
        Position::AfterPrevious,
    ),
    set(Target::VideoPanel, &[(Property::VideoFit, 0.0)]),
    tween(
        Target::Letter,
        &[(Property::LetterExpand, 0.0)],
        0.7,
        Ease::QuadInOut,
        Position::Overlap(0.2),
    ),
    tween(
        Target::Letter,
        &[(Property::LetterRise, 0.0), (Property::Opacity, 0.0)],
        0.8,
        Ease::QuadIn,
        Position::Overlap(0.3),
    ),
    tween(
        Target::Flap,
        &[(Property::FlapAngle, 0.0)],
        0.6,
        Ease::QuadInOut,
        Position::Overlap(0.4),
    ),
    tween(
        Target::Caption,
        &[(Property::Opacity, 1.0)],
        0.4,
        Ease::QuadInOut,
        Position::Overlap(0.3),
    ),
];

const FADE_OUT: &[EffectSpec] = &[tween(
    Target::EnvelopeContainer,
    &[(Property::Opacity, 0.0), (Property::Scale, 0.9)],
    0.5,
    Ease::QuadOut,
    Position::AfterPrevious,
)];

pub fn specs(name: SequenceName) -> &'static [EffectSpec] {
    match name {
        SequenceName::Open => OPEN,
        SequenceName::Retract => RETRACT,
        SequenceName::FadeOut => FADE_OUT,
    }
}

// ---------------------------------------------------------------------------
// Scheduling
// ---------------------------------------------------------------------------

/// An effect placed on the timeline, relative to the run's start.
#[derive(Debug, Clone, Copy)]
pub struct ScheduledEffect {
    pub start: Duration,
    pub duration: Duration,
    pub spec: EffectSpec,
}

impl ScheduledEffect {
    pub fn end(&self) -> Duration {
        self.start + self.duration
    }
}

/// Lay out a sequence's effects.
///
/// Start times never go backwards: an overlap that would place an effect
/// before its predecessor's start is clamped to that start, so the declared
/// order survives when reduced motion shortens every duration.
pub fn schedule(name: SequenceName, motion: MotionPreference) -> Vec<ScheduledEffect> {
    let mut end = 0.0_f64;
    let mut prev_start = 0.0_f64;
    specs(name)
        .iter()
        .map(|spec| {
            let duration = if motion.is_reduced() {
                spec.duration_secs.min(REDUCED_MOTION_FLOOR_SECS)
            } else {
                spec.duration_secs
            };
            let anchor = match spec.position {
                Position::AfterPrevious => end,
                Position::Overlap(secs) => end - secs,
                Position::Gap(secs) => end + secs,
            };
            let start = anchor.max(prev_start).max(0.0);
            prev_start = start;
            end = end.max(start + duration);
            ScheduledEffect {
                start: Duration::from_secs_f64(start),
                duration: Duration::from_secs_f64(duration),
                spec: *spec,
            }
        })
        .collect()
}

/// Wall time from the first effect's start to the last effect settling.
pub fn total_duration(name: SequenceName, motion: MotionPreference) -> Duration {
    schedule(name, motion)
        .iter()
        .map(ScheduledEffect::end)
        .max()
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Settled property values for every target.
///
/// Updated only when an effect finishes, so it always describes a resting
/// visual state rather than an in-between frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    values: BTreeMap<(Target, Property), f32>,
}

impl Default for Layout {
    fn default() -> Self {
        let values = [
            ((Target::UnlockMessage, Property::Opacity), 1.0),
            ((Target::Caption, Property::Opacity), 1.0),
            ((Target::Flap, Property::FlapAngle), 0.0),
            ((Target::Letter, Property::Opacity), 0.0),
            ((Target::Letter, Property::LetterRise), 0.0),
            ((Target::Letter, Property::LetterExpand), 0.0),
            ((Target::VideoPanel, Property::Opacity), 0.0),
            ((Target::VideoPanel, Property::VideoFit), 0.0),
            ((Target::EnvelopeContainer, Property::Opacity), 1.0),
            ((Target::EnvelopeContainer, Property::Scale), 1.0),
        ]
        .into_iter()
        .collect();
        Self { values }
    }
}

impl Layout {
    pub fn get(&self, target: Target, property: Property) -> Option<f32> {
        self.values.get(&(target, property)).copied()
    }

    pub fn apply(&mut self, target: Target, props: &[(Property, f32)]) {
        for &(property, value) in props {
            self.values.insert((target, property), value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Target, Property, f32)> + '_ {
        self.values.iter().map(|(&(t, p), &v)| (t, p, v))
    }
}
