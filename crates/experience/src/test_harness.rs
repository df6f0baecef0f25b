//! # TestExperience: headless harness for the experience plugin
//!
//! Wraps a `bevy::app::App` with `MinimalPlugins`, `StatesPlugin` and
//! [`ExperiencePlugin`](crate::ExperiencePlugin). Time is manual: every
//! update advances the Bevy clock by [`FRAME`] and a fixed [`WallClock`] by
//! the same amount, so countdowns and timeouts are deterministic.

use std::time::Duration;

use bevy::app::App;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use chrono::{DateTime, Utc};

use crate::app_state::AppState;
use crate::config::{ExperienceConfig, MotionPreference};
use crate::machine::{Control, Directive, Experience, ExperienceEvent};
use crate::media::{MediaSignal, MediaSignalKind};
use crate::{ExperienceDirective, ExperienceInput, ExperiencePlugin, ExperienceSet, WallClock};

/// Simulated frame length.
pub const FRAME: Duration = Duration::from_millis(10);

/// Every directive published so far, in order.
#[derive(Resource, Default, Debug)]
pub struct DirectiveLog(pub Vec<Directive>);

fn record_directives(mut events: EventReader<ExperienceDirective>, mut log: ResMut<DirectiveLog>) {
    log.0.extend(events.read().map(|e| e.0.clone()));
}

pub struct TestExperience {
    app: App,
}

impl TestExperience {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Full motion, seeded particles, default timings, wall clock frozen at
    /// `wall`.
    pub fn new(wall: DateTime<Utc>) -> Self {
        let config = ExperienceConfig {
            seed: Some(7),
            ..Default::default()
        };
        Self::with_config(config, MotionPreference::Full, wall)
    }

    pub fn with_config(
        config: ExperienceConfig,
        motion: MotionPreference,
        wall: DateTime<Utc>,
    ) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(StatesPlugin);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));

        // Resources the plugin reads in build() must exist first.
        app.insert_resource(config);
        app.insert_resource(motion);
        app.insert_resource(WallClock::Fixed(wall));
        app.init_resource::<DirectiveLog>();
        app.add_plugins(ExperiencePlugin);
        app.add_systems(Update, record_directives.in_set(ExperienceSet::Present));

        // First update flushes the startup directives.
        app.update();
        Self { app }
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    /// Run `n` frames.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app
                .world_mut()
                .resource_mut::<WallClock>()
                .advance(FRAME);
            self.app.update();
        }
    }

    /// Run enough frames to cover `duration`.
    pub fn advance(&mut self, duration: Duration) {
        let frames = duration.as_millis().div_ceil(FRAME.as_millis());
        self.tick(u32::try_from(frames).unwrap_or(u32::MAX));
    }

    /// Deliver an event and run one frame.
    pub fn send(&mut self, event: ExperienceEvent) {
        self.app.world_mut().send_event(ExperienceInput(event));
        self.tick(1);
    }

    pub fn activate(&mut self, control: Control) {
        self.send(ExperienceEvent::Activate(control));
    }

    /// Report a media signal for the current session.
    pub fn media(&mut self, kind: MediaSignalKind) {
        let session = self
            .experience()
            .media()
            .session()
            .expect("no active media session");
        self.send(ExperienceEvent::Media(MediaSignal { session, kind }));
    }

    /// Raise `AppExit` and run two frames: teardown happens in `Last`, its
    /// directives are recorded on the following update.
    pub fn exit(&mut self) {
        self.app.world_mut().send_event(AppExit::Success);
        self.app.update();
        self.app.update();
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The Bevy state. Lags [`Self::machine_state`] by one frame because
    /// `NextState` is applied at the start of the following update.
    pub fn state(&self) -> AppState {
        *self.app.world().resource::<State<AppState>>().get()
    }

    pub fn machine_state(&self) -> AppState {
        self.experience().state()
    }

    pub fn experience(&self) -> &Experience {
        self.app.world().resource::<Experience>()
    }

    pub fn directives(&self) -> &[Directive] {
        &self.app.world().resource::<DirectiveLog>().0
    }

    pub fn count(&self, pred: impl Fn(&Directive) -> bool) -> usize {
        self.directives().iter().filter(|d| pred(d)).count()
    }

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}
