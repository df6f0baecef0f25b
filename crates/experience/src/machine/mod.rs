//! Application State Machine.
//!
//! [`Experience`] is the single owner of everything that changes over time:
//! current [`AppState`], the interaction lock, the sequencer, the media
//! watcher, the celebration engine and its own timers. Callers feed it
//! [`ExperienceEvent`]s with [`Experience::dispatch`], advance it with
//! [`Experience::pump`], and drain the resulting [`Directive`]s.
//!
//! | From     | Trigger                     | To       |
//! |----------|-----------------------------|----------|
//! | Locked   | deadline reached            | Unlocked |
//! | Locked   | locked envelope activated   | Locked (chime + popup) |
//! | Unlocked | envelope activated          | Playing  |
//! | Playing  | position >= retract threshold | Question |
//! | Question | affirmative control         | Final (after delay) |
//!
//! Events that don't apply to the current state, or arrive while the
//! interaction lock is held, are dropped without surfacing anything.

mod events;

use std::collections::VecDeque;
use std::time::Duration;

use bevy::log::{debug, info};
use bevy::prelude::Resource;
use chrono::{DateTime, Utc};

use crate::app_state::AppState;
use crate::config::{ExperienceConfig, MotionPreference};
use crate::deadline::{CountdownSnapshot, Deadline};
use crate::error::ConfigError;
use crate::media::{MediaOutput, MediaWatcher};
use crate::particles::ParticleEngine;
use crate::schedule::{Scheduler, Ticker, TimerId};
use crate::sequencer::{SequenceName, Sequencer};

pub use events::{Control, Directive, ExperienceEvent, TimerKind};

#[derive(Resource, Debug)]
pub struct Experience {
    config: ExperienceConfig,
    deadline: Deadline,
    ticker: Ticker,
    state: AppState,
    started: bool,
    interaction_locked: bool,
    retract_fired: bool,
    sequencer: Sequencer<ExperienceEvent>,
    media: MediaWatcher,
    particles: ParticleEngine,
    timers: Scheduler<TimerKind>,
    popup_timer: Option<TimerId>,
    inbox: VecDeque<ExperienceEvent>,
    outbox: Vec<Directive>,
}

impl Experience {
    pub fn new(config: ExperienceConfig, motion: MotionPreference) -> Result<Self, ConfigError> {
        config.validate()?;
        let deadline = config.deadline.resolve()?;
        Ok(Self {
            ticker: Ticker::new(config.poll_interval()),
            media: MediaWatcher::new(config.media_source.clone(), config.media_timeout()),
            particles: ParticleEngine::new(motion, config.seed),
            sequencer: Sequencer::new(motion),
            config,
            deadline,
            state: AppState::Locked,
            started: false,
            interaction_locked: false,
            retract_fired: false,
            timers: Scheduler::new(),
            popup_timer: None,
            inbox: VecDeque::new(),
            outbox: Vec::new(),
        })
    }

    /// Pick the initial state. The deadline is checked here, before any
    /// polling, so a session opened after the deadline starts `Unlocked`
    /// without passing through `Locked`.
    pub fn start(&mut self, now: Duration, wall: DateTime<Utc>) {
        if self.started {
            return;
        }
        self.started = true;
        if self.deadline.has_reached(wall) {
            info!("Experience: deadline already passed, starting unlocked");
            self.state = AppState::Unlocked;
            self.emit(Directive::Countdown(CountdownSnapshot::REACHED));
            self.emit(Directive::EnterState(AppState::Unlocked));
            self.emit(Directive::EnvelopeInteractive(true));
        } else {
            self.state = AppState::Locked;
            self.emit(Directive::Countdown(self.deadline.remaining(wall)));
            self.emit(Directive::EnterState(AppState::Locked));
            self.emit(Directive::EnvelopeInteractive(false));
            self.ticker.start(now);
        }
    }

    /// Queue an event for the next [`pump`](Self::pump).
    pub fn dispatch(&mut self, event: ExperienceEvent) {
        self.inbox.push_back(event);
    }

    /// Advance every subsystem to `now` and handle queued events until
    /// nothing more is due.
    pub fn pump(&mut self, now: Duration, wall: DateTime<Utc>) {
        if !self.started {
            self.start(now, wall);
        }

        if self.ticker.poll(now) {
            if self.deadline.has_reached(wall) {
                self.ticker.cancel();
                self.dispatch(ExperienceEvent::DeadlineReached);
            } else {
                self.emit(Directive::Countdown(self.deadline.remaining(wall)));
            }
        }

        loop {
            self.collect_due(now);
            if self.inbox.is_empty() {
                break;
            }
            while let Some(event) = self.inbox.pop_front() {
                self.handle(event, now);
            }
        }
    }

    /// Hand over every directive decided since the last call.
    pub fn take_directives(&mut self) -> Vec<Directive> {
        std::mem::take(&mut self.outbox)
    }

    /// Stop everything in flight without firing completions.
    pub fn teardown(&mut self) {
        self.sequencer.kill_all();
        self.particles.clear();
        self.timers.clear();
        self.popup_timer = None;
        self.ticker.cancel();
        self.inbox.clear();
        let mut media_out = Vec::new();
        self.media.stop(&mut media_out);
        self.route_media(media_out);
        self.emit(Directive::ClearParticles);
        self.interaction_locked = false;
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn emit(&mut self, directive: Directive) {
        self.outbox.push(directive);
    }

    fn transition(&mut self, to: AppState) {
        info!("Experience: {:?} -> {:?}", self.state, to);
        self.state = to;
        self.emit(Directive::EnterState(to));
    }

    /// Turn everything that has come due into events or directives.
    fn collect_due(&mut self, now: Duration) {
        while let Some(kind) = self.timers.pop_due(now) {
            self.inbox.push_back(ExperienceEvent::Timer(kind));
        }

        let mut media_out = Vec::new();
        self.media.poll(now, &mut media_out);
        self.route_media(media_out);

        let mut tweens = Vec::new();
        let finished = self.sequencer.advance(now, &mut tweens);
        self.outbox.extend(tweens.into_iter().map(Directive::Tween));
        if let Some(event) = finished {
            self.inbox.push_back(event);
        }

        let mut bursts = Vec::new();
        self.particles.poll(now, &mut bursts);
        self.outbox.extend(bursts.into_iter().map(Directive::Burst));
    }

    /// Forward watcher output. Positions are handled by the caller.
    fn route_media(&mut self, outputs: Vec<MediaOutput>) -> Vec<f64> {
        let mut positions = Vec::new();
        for output in outputs {
            match output {
                MediaOutput::Command(command) => self.emit(Directive::Media(command)),
                MediaOutput::Notice(notice) => self.emit(Directive::MediaNotice(notice)),
                MediaOutput::Position(p) => positions.push(p),
            }
        }
        positions
    }

    fn handle(&mut self, event: ExperienceEvent, now: Duration) {
        match event {
            ExperienceEvent::DeadlineReached => self.on_deadline_reached(),
            ExperienceEvent::Activate(control) => self.on_activate(control, now),
            ExperienceEvent::Media(signal) => {
                let mut media_out = Vec::new();
                self.media.handle(signal, &mut media_out);
                for position in self.route_media(media_out) {
                    self.on_position(position, now);
                }
            }
            ExperienceEvent::AnimationFinished(name) => self.on_animation_finished(name, now),
            ExperienceEvent::Timer(kind) => self.on_timer(kind, now),
            ExperienceEvent::ParticleShapeUnavailable => self.particles.mark_shape_unavailable(),
        }
    }

    fn on_deadline_reached(&mut self) {
        if self.state != AppState::Locked {
            debug!("Experience: deadline event ignored in {:?}", self.state);
            return;
        }
        info!("Experience: envelope unlocked");
        self.ticker.cancel();
        if let Some(id) = self.popup_timer.take() {
            self.timers.cancel(id);
            self.emit(Directive::PatiencePopup(false));
        }
        self.emit(Directive::Countdown(CountdownSnapshot::REACHED));
        self.transition(AppState::Unlocked);
        self.emit(Directive::EnvelopeInteractive(true));
    }

    fn on_activate(&mut self, control: Control, now: Duration) {
        match (self.state, control) {
            (_, Control::PatiencePopup) => {
                if let Some(id) = self.popup_timer.take() {
                    self.timers.cancel(id);
                    self.emit(Directive::PatiencePopup(false));
                }
            }
            (AppState::Playing | AppState::Question, Control::MediaIndicator) => {
                let mut media_out = Vec::new();
                if !self.media.activate_affordance(now, &mut media_out) {
                    debug!("Experience: media indicator has no affordance");
                }
                self.route_media(media_out);
            }
            (AppState::Locked, Control::LockedEnvelope) => {
                self.emit(Directive::PlayLockedChime);
                self.emit(Directive::PatiencePopup(true));
                if let Some(id) = self.popup_timer.take() {
                    self.timers.cancel(id);
                }
                let hide_at = now + self.config.popup_hide();
                self.popup_timer = Some(self.timers.schedule_at(hide_at, TimerKind::HidePopup));
            }
            (AppState::Unlocked, Control::Envelope) if !self.interaction_locked => {
                self.open_envelope(now);
            }
            (AppState::Question, c) if c.is_affirmative() && !self.interaction_locked => {
                self.accept(now);
            }
            (state, control) => {
                debug!(
                    "Experience: dropped {:?} in {:?} (locked: {})",
                    control, state, self.interaction_locked
                );
            }
        }
    }

    fn open_envelope(&mut self, now: Duration) {
        self.interaction_locked = true;
        self.retract_fired = false;
        self.transition(AppState::Playing);
        self.emit(Directive::EnvelopeInteractive(false));

        let mut media_out = Vec::new();
        self.media.begin_load(now, &mut media_out);
        self.route_media(media_out);

        let done = ExperienceEvent::AnimationFinished(SequenceName::Open);
        if self.sequencer.run(SequenceName::Open, now, done).is_none() {
            self.interaction_locked = false;
        }
    }

    /// Retraction check, evaluated on every playback tick. Fires at most
    /// once per session; while the lock is held the check simply waits for
    /// a later tick.
    fn on_position(&mut self, position: f64, now: Duration) {
        if self.state != AppState::Playing || self.retract_fired {
            return;
        }
        if position < self.config.retract_at_secs {
            return;
        }
        if self.interaction_locked {
            debug!("Experience: retraction deferred, interaction locked");
            return;
        }
        let done = ExperienceEvent::AnimationFinished(SequenceName::Retract);
        let started = self.sequencer.run(SequenceName::Retract, now, done);
        if started.is_some() {
            info!("Experience: retracting letter at {position:.1}s");
            self.retract_fired = true;
            self.interaction_locked = true;
        }
    }

    fn on_animation_finished(&mut self, name: SequenceName, now: Duration) {
        match name {
            SequenceName::Open => {
                self.interaction_locked = false;
            }
            SequenceName::Retract => {
                if !self.config.keep_audio_playing {
                    let mut media_out = Vec::new();
                    self.media.stop(&mut media_out);
                    self.route_media(media_out);
                }
                self.transition(AppState::Question);
                self.emit(Directive::QuestionControlsEnabled(true));
                let fade_at = now + self.config.envelope_fade_delay();
                self.timers.schedule_at(fade_at, TimerKind::FadeOutEnvelope);
                self.interaction_locked = false;
            }
            SequenceName::FadeOut => self.emit(Directive::HideEnvelope),
        }
    }

    fn accept(&mut self, now: Duration) {
        info!("Experience: accepted, celebrating");
        self.interaction_locked = true;
        self.emit(Directive::QuestionControlsEnabled(false));

        let mut media_out = Vec::new();
        let fade = self.config.audio_fade();
        self.media.fade_out(fade, &mut media_out);
        self.route_media(media_out);

        self.particles.celebrate(now);
        let commit_at = now + self.config.final_commit_delay();
        self.timers.schedule_at(commit_at, TimerKind::CommitFinal);
    }

    fn on_timer(&mut self, kind: TimerKind, now: Duration) {
        match kind {
            TimerKind::HidePopup => {
                self.popup_timer = None;
                self.emit(Directive::PatiencePopup(false));
            }
            TimerKind::FadeOutEnvelope => {
                let done = ExperienceEvent::AnimationFinished(SequenceName::FadeOut);
                self.sequencer.run(SequenceName::FadeOut, now, done);
            }
            TimerKind::CommitFinal => {
                self.transition(AppState::Final);
                self.interaction_locked = false;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn is_interaction_locked(&self) -> bool {
        self.interaction_locked
    }

    pub fn retract_fired(&self) -> bool {
        self.retract_fired
    }

    pub fn deadline(&self) -> &Deadline {
        &self.deadline
    }

    pub fn config(&self) -> &ExperienceConfig {
        &self.config
    }

    pub fn sequencer(&self) -> &Sequencer<ExperienceEvent> {
        &self.sequencer
    }

    pub fn media(&self) -> &MediaWatcher {
        &self.media
    }

    pub fn particles(&self) -> &ParticleEngine {
        &self.particles
    }
}
