//! Animation Sequencer: single-flight, timeline-style visual sequences.
//!
//! The sequencer decides *when* each effect of a named sequence starts and
//! settles. It never draws anything: starting an effect yields a
//! [`TweenRequest`] for the rendering side, and a finished run hands back the
//! completion payload supplied to [`Sequencer::run`].

pub mod timeline;

use std::time::Duration;

use crate::config::MotionPreference;

pub use timeline::{
    schedule, total_duration, Ease, Layout, Property, ScheduledEffect, SequenceName, Target,
    REDUCED_MOTION_FLOOR_SECS,
};

/// Identity of one sequence run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(pub u64);

/// Request to the tweening capability: animate `target` to `props`.
#[derive(Debug, Clone, PartialEq)]
pub struct TweenRequest {
    pub run: RunId,
    pub sequence: SequenceName,
    pub target: Target,
    pub props: Vec<(Property, f32)>,
    pub duration: Duration,
    pub ease: Ease,
}

#[derive(Debug)]
struct ActiveRun<C> {
    id: RunId,
    name: SequenceName,
    started_at: Duration,
    effects: Vec<ScheduledEffect>,
    emitted: usize,
    settled: Vec<bool>,
    end: Duration,
    on_complete: C,
}

/// Runs at most one sequence at a time.
///
/// `C` is the completion payload; the state machine passes the event it
/// wants delivered back to itself.
#[derive(Debug)]
pub struct Sequencer<C> {
    motion: MotionPreference,
    active: Option<ActiveRun<C>>,
    layout: Layout,
    next_run: u64,
    starts: u64,
}

impl<C> Sequencer<C> {
    pub fn new(motion: MotionPreference) -> Self {
        Self {
            motion,
            active: None,
            layout: Layout::default(),
            next_run: 0,
            starts: 0,
        }
    }

    /// Start `name` unless a run is already in flight.
    ///
    /// Returns `None` (and drops `on_complete`) when busy: the call does not
    /// queue and is not an error.
    pub fn run(&mut self, name: SequenceName, now: Duration, on_complete: C) -> Option<RunId> {
        if let Some(active) = &self.active {
            bevy::log::debug!(
                "Sequencer: {:?} dropped, {:?} still running",
                name,
                active.name
            );
            return None;
        }
        let effects = schedule(name, self.motion);
        let end = effects
            .iter()
            .map(ScheduledEffect::end)
            .max()
            .unwrap_or_default();
        let id = RunId(self.next_run);
        self.next_run += 1;
        self.starts += 1;
        self.active = Some(ActiveRun {
            id,
            name,
            started_at: now,
            settled: vec![false; effects.len()],
            effects,
            emitted: 0,
            end,
            on_complete,
        });
        Some(id)
    }

    /// Emit tweens whose start has arrived, settle finished effects, and
    /// return the completion payload once the last effect has settled.
    ///
    /// The single-flight guard is already clear when the payload is
    /// returned, so handling it may start the next sequence.
    pub fn advance(&mut self, now: Duration, out: &mut Vec<TweenRequest>) -> Option<C> {
        let run = self.active.as_mut()?;
        let elapsed = now.saturating_sub(run.started_at);

        while let Some(effect) = run.effects.get(run.emitted) {
            if effect.start > elapsed {
                break;
            }
            out.push(TweenRequest {
                run: run.id,
                sequence: run.name,
                target: effect.spec.target,
                props: effect.spec.props.to_vec(),
                duration: effect.duration,
                ease: effect.spec.ease,
            });
            run.emitted += 1;
        }

        for (effect, settled) in run.effects.iter().zip(run.settled.iter_mut()) {
            if !*settled && effect.end() <= elapsed {
                self.layout.apply(effect.spec.target, effect.spec.props);
                *settled = true;
            }
        }

        if elapsed < run.end || run.emitted < run.effects.len() {
            return None;
        }
        self.active.take().map(|run| run.on_complete)
    }

    /// Halt the in-flight run without firing its completion.
    pub fn kill_all(&mut self) {
        if let Some(run) = self.active.take() {
            bevy::log::debug!("Sequencer: killed {:?}", run.name);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_sequence(&self) -> Option<SequenceName> {
        self.active.as_ref().map(|run| run.name)
    }

    /// Number of runs that actually started.
    pub fn starts(&self) -> u64 {
        self.starts
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn motion(&self) -> MotionPreference {
        self.motion
    }
}
