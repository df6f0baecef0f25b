use std::time::Duration;

use bevy::prelude::*;
use chrono::{DateTime, Utc};

pub mod app_state;
pub mod config;
pub mod deadline;
pub mod error;
pub mod machine;
pub mod media;
pub mod particles;
pub mod schedule;
pub mod sequencer;

#[cfg(test)]
mod integration_tests;
#[cfg(any(test, feature = "test-harness"))]
pub mod test_harness;

use app_state::AppState;
use config::{ExperienceConfig, MotionPreference};
use machine::{Control, Directive, Experience, ExperienceEvent};

// ---------------------------------------------------------------------------
// Bevy-facing events, sets and resources
// ---------------------------------------------------------------------------

/// Inbound event for the state machine. Presentation crates send these for
/// clicks, key presses, media backend signals and asset failures.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ExperienceInput(pub ExperienceEvent);

impl ExperienceInput {
    pub fn activate(control: Control) -> Self {
        Self(ExperienceEvent::Activate(control))
    }
}

/// Outbound side effect decided by the state machine.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ExperienceDirective(pub Directive);

/// Frame phases. Input producers run in `Input`, the machine runs in
/// `Drive`, and everything that reacts to directives runs in `Present`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExperienceSet {
    Input,
    Drive,
    Present,
}

/// Source of wall-clock time for the deadline.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WallClock {
    #[default]
    System,
    /// Frozen (or manually advanced) time, for tests and previews.
    Fixed(DateTime<Utc>),
}

impl WallClock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            WallClock::System => Utc::now(),
            WallClock::Fixed(at) => *at,
        }
    }

    /// Move a fixed clock forward. No-op for the system clock.
    pub fn advance(&mut self, by: Duration) {
        if let WallClock::Fixed(at) = self {
            if let Ok(delta) = chrono::Duration::from_std(by) {
                *at += delta;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Builds the [`Experience`] from the [`ExperienceConfig`] and
/// [`MotionPreference`] resources and drives it once per frame.
///
/// Insert both resources **before** adding this plugin; missing ones fall
/// back to their defaults. The initial [`AppState`] is decided here, so a
/// session opened after the deadline never enters `Locked`.
pub struct ExperiencePlugin;

impl Plugin for ExperiencePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ExperienceConfig>()
            .init_resource::<MotionPreference>()
            .init_resource::<WallClock>()
            .add_event::<ExperienceInput>()
            .add_event::<ExperienceDirective>()
            .configure_sets(
                Update,
                (
                    ExperienceSet::Input,
                    ExperienceSet::Drive,
                    ExperienceSet::Present,
                )
                    .chain(),
            );

        let config = app.world().resource::<ExperienceConfig>().clone();
        let motion = *app.world().resource::<MotionPreference>();
        let mut experience = match Experience::new(config, motion) {
            Ok(experience) => experience,
            Err(err) => {
                warn!("Experience: invalid config ({err}), using defaults");
                app.insert_resource(ExperienceConfig::default());
                match Experience::new(ExperienceConfig::default(), motion) {
                    Ok(experience) => experience,
                    Err(err) => {
                        error!("Experience: default config rejected: {err}");
                        return;
                    }
                }
            }
        };

        let wall = app.world().resource::<WallClock>().now();
        experience.start(Duration::ZERO, wall);
        info!(
            "Experience: deadline {} ({}), starting in {:?}, motion {:?}",
            experience.deadline().target_local(),
            experience.deadline().timezone(),
            experience.state(),
            motion
        );

        app.insert_state(experience.state())
            .insert_resource(experience)
            .add_systems(Update, pump_experience.in_set(ExperienceSet::Drive))
            .add_systems(Last, teardown_on_exit);
    }
}

/// Feed queued inputs, advance the machine and publish its directives.
fn pump_experience(
    mut experience: ResMut<Experience>,
    mut inputs: EventReader<ExperienceInput>,
    mut directives: EventWriter<ExperienceDirective>,
    time: Res<Time>,
    wall: Res<WallClock>,
    state: Res<State<AppState>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    for ExperienceInput(event) in inputs.read() {
        experience.dispatch(*event);
    }
    experience.pump(time.elapsed(), wall.now());
    for directive in experience.take_directives() {
        directives.send(ExperienceDirective(directive));
    }
    if *state.get() != experience.state() {
        next_state.set(experience.state());
    }
}

fn teardown_on_exit(
    mut exits: EventReader<AppExit>,
    mut experience: ResMut<Experience>,
    mut directives: EventWriter<ExperienceDirective>,
) {
    if exits.read().next().is_none() {
        return;
    }
    info!("Experience: tearing down");
    experience.teardown();
    for directive in experience.take_directives() {
        directives.send(ExperienceDirective(directive));
    }
}
