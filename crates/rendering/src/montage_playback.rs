//! Media backend for the montage.
//!
//! Executes the watcher's [`MediaCommand`]s against Bevy's asset server and
//! audio sinks, and reports back [`MediaSignal`]s for the same session:
//! load results, playback start, refusal and throttled position updates.
//! Bevy has no native video decoder, so the montage's soundtrack drives the
//! playback clock while the letter shows the video panel.

use std::time::Duration;

use bevy::asset::io::AssetReaderError;
use bevy::asset::{AssetLoadError, LoadState};
use bevy::audio::{AudioSink, AudioSinkPlayback, PlaybackSettings};
use bevy::prelude::*;

use experience::machine::{Directive, ExperienceEvent};
use experience::media::{MediaCommand, MediaFault, MediaSignal, MediaSignalKind, SessionId};
use experience::{ExperienceDirective, ExperienceInput, ExperienceSet};

/// Cadence of position reports while playing.
pub const TIME_UPDATE_INTERVAL: Duration = Duration::from_millis(250);

/// How long a spawned player may go without an audio sink before playback
/// counts as refused.
pub const PLAY_START_GRACE: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct LoadingMontage {
    session: SessionId,
    handle: Handle<AudioSource>,
    reported: bool,
}

/// The one montage source the watcher currently cares about.
#[derive(Resource, Debug, Default)]
pub struct MontageBackend {
    current: Option<LoadingMontage>,
}

/// Playback position with throttled reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayClock {
    position: Duration,
    since_report: Duration,
    finished: bool,
}

impl PlayClock {
    /// Advance by `dt`; returns the position in seconds when a report is
    /// due. A finished clock never reports again.
    pub fn advance(&mut self, dt: Duration) -> Option<f64> {
        if self.finished {
            return None;
        }
        self.position += dt;
        self.since_report += dt;
        if self.since_report < TIME_UPDATE_INTERVAL {
            return None;
        }
        self.since_report = Duration::ZERO;
        Some(self.position.as_secs_f64())
    }

    /// The clip has run out; freeze the position.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn position(&self) -> Duration {
        self.position
    }
}

/// What a `Play` command does for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayAction {
    /// Resume the existing audio sink.
    Resume,
    /// The player never got an audio output: replace it with a fresh one.
    Respawn,
    /// No player yet.
    Spawn,
}

pub fn play_action(has_player: bool, has_sink: bool) -> PlayAction {
    match (has_player, has_sink) {
        (true, true) => PlayAction::Resume,
        (true, false) => PlayAction::Respawn,
        (false, _) => PlayAction::Spawn,
    }
}

/// Linear volume ramp to silence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeFade {
    elapsed: Duration,
    duration: Duration,
}

impl VolumeFade {
    pub fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration,
        }
    }

    /// Volume after advancing by `dt`, and whether the ramp has finished.
    pub fn step(&mut self, dt: Duration) -> (f32, bool) {
        self.elapsed += dt;
        if self.duration.is_zero() || self.elapsed >= self.duration {
            return (0.0, true);
        }
        (1.0 - self.elapsed.as_secs_f32() / self.duration.as_secs_f32(), false)
    }
}

#[derive(Component, Debug)]
pub struct MontagePlayer {
    session: SessionId,
    clock: PlayClock,
    waiting: Duration,
    started: bool,
    paused: bool,
    fade: Option<VolumeFade>,
}

impl MontagePlayer {
    fn new(session: SessionId) -> Self {
        Self {
            session,
            clock: PlayClock::default(),
            waiting: Duration::ZERO,
            started: false,
            paused: false,
            fade: None,
        }
    }
}

/// Map an asset load failure to the watcher's fault categories.
pub fn classify_load_error(err: &AssetLoadError) -> MediaFault {
    match err {
        AssetLoadError::AssetReaderError(AssetReaderError::NotFound(_)) => {
            MediaFault::SourceNotSupported
        }
        AssetLoadError::AssetReaderError(_) => MediaFault::Network,
        AssetLoadError::MissingAssetLoaderForExtension(_)
        | AssetLoadError::MissingAssetLoaderForTypeName(_) => MediaFault::SourceNotSupported,
        AssetLoadError::AssetLoaderError(_) | AssetLoadError::AssetLoaderPanic { .. } => {
            MediaFault::Decode
        }
        _ => MediaFault::Unknown,
    }
}

fn signal(session: SessionId, kind: MediaSignalKind) -> ExperienceInput {
    ExperienceInput(ExperienceEvent::Media(MediaSignal { session, kind }))
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

fn run_media_commands(
    mut commands: Commands,
    mut directives: EventReader<ExperienceDirective>,
    mut backend: ResMut<MontageBackend>,
    asset_server: Res<AssetServer>,
    mut players: Query<(Entity, &mut MontagePlayer, Option<&AudioSink>)>,
) {
    for ExperienceDirective(directive) in directives.read() {
        let Directive::Media(command) = directive else {
            continue;
        };
        match command {
            MediaCommand::Load { session, source } => {
                for (entity, _, _) in &players {
                    commands.entity(entity).despawn();
                }
                info!("Montage: loading {source} for session {}", session.0);
                backend.current = Some(LoadingMontage {
                    session: *session,
                    handle: asset_server.load(source.clone()),
                    reported: false,
                });
            }
            MediaCommand::Play { session } => {
                let existing = players.iter_mut().find(|(_, p, _)| p.session == *session);
                let has_sink = existing.as_ref().is_some_and(|(_, _, sink)| sink.is_some());
                match (play_action(existing.is_some(), has_sink), existing) {
                    (PlayAction::Resume, Some((_, mut player, Some(sink)))) => {
                        player.paused = false;
                        player.waiting = Duration::ZERO;
                        player.started = false;
                        sink.play();
                        continue;
                    }
                    (PlayAction::Respawn, Some((entity, _, _))) => {
                        debug!("Montage: respawning player for session {}", session.0);
                        commands.entity(entity).despawn();
                    }
                    _ => {}
                }
                let Some(montage) = backend.current.as_ref().filter(|m| m.session == *session)
                else {
                    debug!("Montage: play for unknown session {}", session.0);
                    continue;
                };
                commands.spawn((
                    AudioPlayer(montage.handle.clone()),
                    PlaybackSettings::ONCE,
                    MontagePlayer::new(*session),
                ));
            }
            MediaCommand::Pause { session } => {
                for (_, mut player, sink) in &mut players {
                    if player.session == *session {
                        player.paused = true;
                        if let Some(sink) = sink {
                            sink.pause();
                        }
                    }
                }
            }
            MediaCommand::FadeOutAndPause { session, duration } => {
                for (_, mut player, _) in &mut players {
                    if player.session == *session {
                        player.fade = Some(VolumeFade::new(*duration));
                    }
                }
            }
        }
    }
}

/// Report the montage's load result once per session.
fn poll_montage_load(
    asset_server: Res<AssetServer>,
    mut backend: ResMut<MontageBackend>,
    mut inputs: EventWriter<ExperienceInput>,
) {
    let Some(montage) = backend.current.as_mut() else {
        return;
    };
    if montage.reported {
        return;
    }
    match asset_server.load_state(&montage.handle) {
        LoadState::Loaded => {
            // A fully decoded clip is both "data loaded" and "can play";
            // the watcher treats the second as a no-op.
            montage.reported = true;
            inputs.send(signal(montage.session, MediaSignalKind::LoadedData));
            inputs.send(signal(montage.session, MediaSignalKind::CanPlay));
        }
        LoadState::Failed(err) => {
            montage.reported = true;
            let fault = classify_load_error(&err);
            warn!("Montage: load failed ({fault:?}): {err}");
            inputs.send(signal(montage.session, MediaSignalKind::Failed(fault)));
        }
        LoadState::NotLoaded | LoadState::Loading => {}
    }
}

/// Start/refusal detection, position updates and volume fades.
fn track_montage_playback(
    time: Res<Time>,
    mut players: Query<(&mut MontagePlayer, Option<&AudioSink>)>,
    mut inputs: EventWriter<ExperienceInput>,
) {
    let dt = time.delta();
    for (mut player, sink) in &mut players {
        if player.paused {
            continue;
        }
        let Some(sink) = sink else {
            if player.started {
                continue;
            }
            player.waiting += dt;
            if player.waiting >= PLAY_START_GRACE {
                warn!("Montage: no audio output, playback refused");
                player.paused = true;
                inputs.send(signal(player.session, MediaSignalKind::PlayRejected));
            }
            continue;
        };
        if !player.started {
            player.started = true;
            inputs.send(signal(player.session, MediaSignalKind::PlayStarted));
        }
        if sink.empty() && !player.clock.is_finished() {
            debug!("Montage: clip finished for session {}", player.session.0);
            player.clock.finish();
        }
        if let Some(position) = player.clock.advance(dt) {
            let kind = MediaSignalKind::TimeUpdate(position);
            inputs.send(signal(player.session, kind));
        }
        if let Some(mut fade) = player.fade {
            let (volume, done) = fade.step(dt);
            sink.set_volume(volume);
            player.fade = if done { None } else { Some(fade) };
            if done {
                sink.pause();
                player.paused = true;
            }
        }
    }
}

pub struct MontagePlaybackPlugin;

impl Plugin for MontagePlaybackPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MontageBackend>()
            .add_systems(
                Update,
                (poll_montage_load, track_montage_playback).in_set(ExperienceSet::Input),
            )
            .add_systems(Update, run_media_commands.in_set(ExperienceSet::Present));
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_play_clock_throttles_reports() {
        let mut clock = PlayClock::default();
        let frame = Duration::from_millis(100);
        assert_eq!(clock.advance(frame), None);
        assert_eq!(clock.advance(frame), None);
        let report = clock.advance(frame).expect("report after 300ms");
        assert!((report - 0.3).abs() < 1e-9);
        assert_eq!(clock.advance(frame), None);
        assert_eq!(clock.position(), Duration::from_millis(400));
    }

    #[test]
    fn test_finished_clock_stops_reporting() {
        let mut clock = PlayClock::default();
        assert!(clock.advance(TIME_UPDATE_INTERVAL).is_some());
        clock.finish();
        assert_eq!(clock.advance(TIME_UPDATE_INTERVAL), None);
        assert_eq!(clock.advance(Duration::from_secs(5)), None);
        assert_eq!(clock.position(), TIME_UPDATE_INTERVAL);
    }

    #[test]
    fn test_play_without_sink_respawns_player() {
        assert_eq!(play_action(true, true), PlayAction::Resume);
        assert_eq!(play_action(true, false), PlayAction::Respawn);
        assert_eq!(play_action(false, false), PlayAction::Spawn);
    }

    #[test]
    fn test_volume_fade_ramps_to_silence() {
        let mut fade = VolumeFade::new(Duration::from_millis(200));
        let (v, done) = fade.step(Duration::from_millis(50));
        assert!(!done);
        assert!((v - 0.75).abs() < 1e-6);
        assert_eq!(fade.step(Duration::from_millis(200)), (0.0, true));
        let mut instant = VolumeFade::new(Duration::ZERO);
        assert_eq!(instant.step(Duration::ZERO), (0.0, true));
    }

    #[test]
    fn test_missing_file_is_source_not_supported() {
        let err = AssetLoadError::AssetReaderError(AssetReaderError::NotFound(PathBuf::from(
            "video/montage.ogg",
        )));
        assert_eq!(classify_load_error(&err), MediaFault::SourceNotSupported);
    }

    #[test]
    fn test_reader_failures_are_network_errors() {
        let http = AssetLoadError::AssetReaderError(AssetReaderError::HttpError(503));
        assert_eq!(classify_load_error(&http), MediaFault::Network);
        let io = AssetLoadError::AssetReaderError(AssetReaderError::Io(Arc::new(
            std::io::Error::other("connection reset"),
        )));
        assert_eq!(classify_load_error(&io), MediaFault::Network);
    }
}
