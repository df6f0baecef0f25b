//! Media Playback Watcher.
//!
//! Tracks one montage load/play attempt ("session") at a time:
//!
//! ```text
//! NotLoaded -> Loading -> Ready -> Playing
//!                 |          \        |
//!                 v           v       v
//!              TimedOut     Errored <-+   (playback rejected / failed)
//! ```
//!
//! The watcher never touches the media element itself. It emits
//! [`MediaCommand`]s for the backend and consumes [`MediaSignal`]s from it.
//! Every signal carries the session it belongs to; signals from a torn-down
//! session are dropped, so a stale timeout or listener can never fire into a
//! newer session.

use std::fmt;
use std::time::Duration;

use bevy::log::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    NotLoaded,
    Loading,
    Ready,
    Playing,
    Errored,
    TimedOut,
}

/// What the user can do about a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    /// Start a fresh load.
    Retry,
    /// Start playback from a user gesture (autoplay was refused).
    TapToPlay,
}

/// Media failure categories, each with its own diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFault {
    TimedOut,
    Aborted,
    Network,
    Decode,
    SourceNotSupported,
    Unknown,
    /// The platform refused to start playback without a user gesture.
    PlaybackBlocked,
}

impl MediaFault {
    pub fn message(self) -> &'static str {
        match self {
            MediaFault::TimedOut => "Video loading timed out. Tap here to retry.",
            MediaFault::Aborted => "Video loading was aborted. Tap here to retry.",
            MediaFault::Network => "Network error while loading video. Tap here to retry.",
            MediaFault::Decode => "Video file is corrupted or in wrong format. Tap here to retry.",
            MediaFault::SourceNotSupported => {
                "Video file not found or not supported. Tap here to retry."
            }
            MediaFault::Unknown => "Unknown video error occurred. Tap here to retry.",
            MediaFault::PlaybackBlocked => "Tap here to play video",
        }
    }

    pub fn affordance(self) -> Affordance {
        match self {
            MediaFault::PlaybackBlocked => Affordance::TapToPlay,
            _ => Affordance::Retry,
        }
    }
}

impl fmt::Display for MediaFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for MediaFault {}

/// Text for the loading indicator. `affordance` is `Some` when clicking the
/// indicator should do something.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaNotice {
    pub message: String,
    pub affordance: Option<Affordance>,
    pub is_error: bool,
}

impl MediaNotice {
    fn loading() -> Self {
        Self {
            message: "Loading...".to_string(),
            affordance: None,
            is_error: false,
        }
    }

    fn fault(fault: MediaFault) -> Self {
        Self {
            message: fault.message().to_string(),
            affordance: Some(fault.affordance()),
            is_error: fault != MediaFault::PlaybackBlocked,
        }
    }
}

/// Instructions for the media backend.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCommand {
    Load { session: SessionId, source: String },
    Play { session: SessionId },
    Pause { session: SessionId },
    /// Ramp volume to zero over `duration`, then pause.
    FadeOutAndPause {
        session: SessionId,
        duration: Duration,
    },
}

/// Events reported by the media backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaSignalKind {
    /// Enough data to start playing.
    CanPlay,
    /// First frame available; treated like `CanPlay`.
    LoadedData,
    Failed(MediaFault),
    PlayStarted,
    PlayRejected,
    /// Current playback position in seconds.
    TimeUpdate(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaSignal {
    pub session: SessionId,
    pub kind: MediaSignalKind,
}

/// Everything the watcher produces for its owner.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaOutput {
    Command(MediaCommand),
    /// `None` hides the indicator.
    Notice(Option<MediaNotice>),
    /// Playback position while `Playing`.
    Position(f64),
}

#[derive(Debug)]
pub struct MediaWatcher {
    source: String,
    timeout: Duration,
    state: PlaybackState,
    session: Option<SessionId>,
    next_session: u64,
    timeout_at: Option<Duration>,
    fault: Option<MediaFault>,
    position: f64,
}

impl MediaWatcher {
    pub fn new(source: impl Into<String>, timeout: Duration) -> Self {
        Self {
            source: source.into(),
            timeout,
            state: PlaybackState::NotLoaded,
            session: None,
            next_session: 0,
            timeout_at: None,
            fault: None,
            position: 0.0,
        }
    }

    /// Start a new session, invalidating any previous one.
    pub fn begin_load(&mut self, now: Duration, out: &mut Vec<MediaOutput>) -> SessionId {
        let session = SessionId(self.next_session);
        self.next_session += 1;
        self.session = Some(session);
        self.state = PlaybackState::Loading;
        self.timeout_at = Some(now + self.timeout);
        self.fault = None;
        self.position = 0.0;
        info!("Media: session {} loading {}", session.0, self.source);
        out.push(MediaOutput::Command(MediaCommand::Load {
            session,
            source: self.source.clone(),
        }));
        out.push(MediaOutput::Notice(Some(MediaNotice::loading())));
        session
    }

    /// Fire the load timeout if it has come due. Fires at most once per
    /// session.
    pub fn poll(&mut self, now: Duration, out: &mut Vec<MediaOutput>) {
        let Some(due) = self.timeout_at else {
            return;
        };
        if now < due || self.state != PlaybackState::Loading {
            return;
        }
        self.timeout_at = None;
        warn!(
            "Media: session {:?} timed out after {:?}",
            self.session, self.timeout
        );
        self.enter_fault(MediaFault::TimedOut, out);
    }

    pub fn handle(&mut self, signal: MediaSignal, out: &mut Vec<MediaOutput>) {
        if self.session != Some(signal.session) {
            debug!("Media: dropping {:?} from stale session", signal.kind);
            return;
        }
        let session = signal.session;
        match signal.kind {
            MediaSignalKind::CanPlay | MediaSignalKind::LoadedData => {
                // A late readiness signal after a timeout still recovers.
                if !matches!(self.state, PlaybackState::Loading | PlaybackState::TimedOut) {
                    return;
                }
                self.state = PlaybackState::Ready;
                self.timeout_at = None;
                self.fault = None;
                out.push(MediaOutput::Notice(None));
                out.push(MediaOutput::Command(MediaCommand::Play { session }));
            }
            MediaSignalKind::Failed(fault) => {
                if matches!(
                    self.state,
                    PlaybackState::Errored | PlaybackState::NotLoaded
                ) {
                    return;
                }
                self.timeout_at = None;
                warn!("Media: session {} failed: {:?}", session.0, fault);
                self.enter_fault(fault, out);
            }
            MediaSignalKind::PlayStarted => {
                let blocked = self.fault == Some(MediaFault::PlaybackBlocked);
                if self.state == PlaybackState::Ready || blocked {
                    self.state = PlaybackState::Playing;
                    self.fault = None;
                    out.push(MediaOutput::Notice(None));
                }
            }
            MediaSignalKind::PlayRejected => {
                if matches!(self.state, PlaybackState::Ready | PlaybackState::Playing) {
                    warn!("Media: playback rejected, waiting for a tap");
                    self.enter_fault(MediaFault::PlaybackBlocked, out);
                }
            }
            MediaSignalKind::TimeUpdate(position) => {
                if self.state == PlaybackState::Playing {
                    self.position = position;
                    out.push(MediaOutput::Position(position));
                }
            }
        }
    }

    /// Run the current fault's affordance. Returns `false` when there is
    /// nothing to do.
    pub fn activate_affordance(&mut self, now: Duration, out: &mut Vec<MediaOutput>) -> bool {
        match self.fault.map(MediaFault::affordance) {
            Some(Affordance::Retry) => {
                self.begin_load(now, out);
                true
            }
            Some(Affordance::TapToPlay) => {
                let Some(session) = self.session else {
                    return false;
                };
                out.push(MediaOutput::Notice(None));
                out.push(MediaOutput::Command(MediaCommand::Play { session }));
                true
            }
            None => false,
        }
    }

    /// Ask the backend to fade the montage out. Only meaningful while
    /// playing.
    pub fn fade_out(&mut self, duration: Duration, out: &mut Vec<MediaOutput>) -> bool {
        match (self.state, self.session) {
            (PlaybackState::Playing, Some(session)) => {
                out.push(MediaOutput::Command(MediaCommand::FadeOutAndPause {
                    session,
                    duration,
                }));
                true
            }
            _ => false,
        }
    }

    /// Tear down the session: pause it and forget its signals and timeout.
    pub fn stop(&mut self, out: &mut Vec<MediaOutput>) {
        if let Some(session) = self.session.take() {
            out.push(MediaOutput::Command(MediaCommand::Pause { session }));
            out.push(MediaOutput::Notice(None));
        }
        self.state = PlaybackState::NotLoaded;
        self.timeout_at = None;
        self.fault = None;
    }

    fn enter_fault(&mut self, fault: MediaFault, out: &mut Vec<MediaOutput>) {
        self.state = if fault == MediaFault::TimedOut {
            PlaybackState::TimedOut
        } else {
            PlaybackState::Errored
        };
        self.fault = Some(fault);
        out.push(MediaOutput::Notice(Some(MediaNotice::fault(fault))));
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn fault(&self) -> Option<MediaFault> {
        self.fault
    }

    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn watcher() -> MediaWatcher {
        MediaWatcher::new("video/montage.ogg", TIMEOUT)
    }

    fn signal(session: SessionId, kind: MediaSignalKind) -> MediaSignal {
        MediaSignal { session, kind }
    }

    fn notices(out: &[MediaOutput]) -> Vec<Option<MediaNotice>> {
        out.iter()
            .filter_map(|o| match o {
                MediaOutput::Notice(n) => Some(n.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_begin_load_emits_load_and_loading_notice() {
        let mut w = watcher();
        let mut out = Vec::new();
        let session = w.begin_load(Duration::ZERO, &mut out);
        assert_eq!(w.state(), PlaybackState::Loading);
        assert_eq!(
            out[0],
            MediaOutput::Command(MediaCommand::Load {
                session,
                source: "video/montage.ogg".to_string()
            })
        );
        let first = notices(&out)[0].clone();
        assert_eq!(first.map(|n| n.message), Some("Loading...".to_string()));
    }

    #[test]
    fn test_ready_starts_playback_and_cancels_timeout() {
        let mut w = watcher();
        let mut out = Vec::new();
        let s = w.begin_load(Duration::ZERO, &mut out);
        out.clear();
        w.handle(signal(s, MediaSignalKind::CanPlay), &mut out);
        assert_eq!(w.state(), PlaybackState::Ready);
        let play = MediaOutput::Command(MediaCommand::Play { session: s });
        assert!(out.contains(&play));

        out.clear();
        w.poll(Duration::from_secs(30), &mut out);
        assert!(out.is_empty(), "timeout was disarmed by readiness");
        w.handle(signal(s, MediaSignalKind::PlayStarted), &mut out);
        assert!(w.is_playing());
    }

    #[test]
    fn test_timeout_fires_exactly_once_with_retry() {
        let mut w = watcher();
        let mut out = Vec::new();
        w.begin_load(Duration::ZERO, &mut out);
        out.clear();
        w.poll(Duration::from_millis(9_999), &mut out);
        assert_eq!(w.state(), PlaybackState::Loading);
        w.poll(TIMEOUT, &mut out);
        w.poll(TIMEOUT + Duration::from_secs(5), &mut out);
        assert_eq!(w.state(), PlaybackState::TimedOut);
        let shown = notices(&out);
        assert_eq!(shown.len(), 1, "timeout notice published once");
        let affordance = shown[0].as_ref().and_then(|n| n.affordance);
        assert_eq!(affordance, Some(Affordance::Retry));
        assert_eq!(w.fault(), Some(MediaFault::TimedOut));
    }

    #[test]
    fn test_retry_opens_new_session_and_ignores_stale_signals() {
        let mut w = watcher();
        let mut out = Vec::new();
        let first = w.begin_load(Duration::ZERO, &mut out);
        w.poll(TIMEOUT, &mut out);
        assert!(w.activate_affordance(TIMEOUT, &mut out));
        let second = w.session().expect("new session");
        assert_ne!(first, second);
        assert_eq!(w.state(), PlaybackState::Loading);

        out.clear();
        w.handle(signal(first, MediaSignalKind::CanPlay), &mut out);
        assert!(out.is_empty(), "stale session signal dropped");
        assert_eq!(w.state(), PlaybackState::Loading);

        // New session's own timeout is relative to the retry.
        w.poll(TIMEOUT + Duration::from_secs(9), &mut out);
        assert_eq!(w.state(), PlaybackState::Loading);
    }

    #[test]
    fn test_each_failure_has_distinct_message() {
        let faults = [
            MediaFault::TimedOut,
            MediaFault::Aborted,
            MediaFault::Network,
            MediaFault::Decode,
            MediaFault::SourceNotSupported,
            MediaFault::Unknown,
            MediaFault::PlaybackBlocked,
        ];
        let mut messages: Vec<&str> = faults.iter().map(|f| f.message()).collect();
        messages.sort_unstable();
        messages.dedup();
        assert_eq!(messages.len(), faults.len());
        assert_eq!(
            MediaFault::PlaybackBlocked.affordance(),
            Affordance::TapToPlay
        );
        assert_eq!(MediaFault::Decode.affordance(), Affordance::Retry);
    }

    #[test]
    fn test_decode_error_exposes_retry() {
        let mut w = watcher();
        let mut out = Vec::new();
        let s = w.begin_load(Duration::ZERO, &mut out);
        out.clear();
        let decode = MediaSignalKind::Failed(MediaFault::Decode);
        w.handle(signal(s, decode), &mut out);
        assert_eq!(w.state(), PlaybackState::Errored);
        let notice = notices(&out).pop().flatten().expect("diagnostic shown");
        assert!(notice.is_error);
        assert_eq!(notice.affordance, Some(Affordance::Retry));

        // Timeout cannot fire after the error.
        out.clear();
        w.poll(TIMEOUT * 2, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_rejected_playback_offers_tap_to_play() {
        let mut w = watcher();
        let mut out = Vec::new();
        let s = w.begin_load(Duration::ZERO, &mut out);
        w.handle(signal(s, MediaSignalKind::CanPlay), &mut out);
        w.handle(signal(s, MediaSignalKind::PlayRejected), &mut out);
        assert_eq!(w.state(), PlaybackState::Errored);
        assert_eq!(w.fault(), Some(MediaFault::PlaybackBlocked));

        out.clear();
        assert!(w.activate_affordance(Duration::from_secs(1), &mut out));
        let play = MediaOutput::Command(MediaCommand::Play { session: s });
        assert!(out.contains(&play));
        assert_eq!(w.session(), Some(s), "tap-to-play keeps the session");

        w.handle(signal(s, MediaSignalKind::PlayStarted), &mut out);
        assert!(w.is_playing());
        assert_eq!(w.fault(), None);
    }

    #[test]
    fn test_playing_falls_back_to_errored() {
        for (kind, fault, affordance) in [
            (
                MediaSignalKind::PlayRejected,
                MediaFault::PlaybackBlocked,
                Affordance::TapToPlay,
            ),
            (
                MediaSignalKind::Failed(MediaFault::Network),
                MediaFault::Network,
                Affordance::Retry,
            ),
        ] {
            let mut w = watcher();
            let mut out = Vec::new();
            let s = w.begin_load(Duration::ZERO, &mut out);
            w.handle(signal(s, MediaSignalKind::CanPlay), &mut out);
            w.handle(signal(s, MediaSignalKind::PlayStarted), &mut out);
            w.handle(signal(s, MediaSignalKind::TimeUpdate(12.0)), &mut out);
            assert!(w.is_playing());

            out.clear();
            w.handle(signal(s, kind), &mut out);
            assert_eq!(w.state(), PlaybackState::Errored);
            assert_eq!(w.fault(), Some(fault));
            let notice = notices(&out).pop().flatten().expect("diagnostic shown");
            assert_eq!(notice.affordance, Some(affordance));

            out.clear();
            w.handle(signal(s, MediaSignalKind::TimeUpdate(13.0)), &mut out);
            assert!(out.is_empty(), "no positions after the error");
            assert_eq!(w.position(), 12.0);
        }
    }

    #[test]
    fn test_time_updates_only_while_playing() {
        let mut w = watcher();
        let mut out = Vec::new();
        let s = w.begin_load(Duration::ZERO, &mut out);
        out.clear();
        w.handle(signal(s, MediaSignalKind::TimeUpdate(3.0)), &mut out);
        assert!(out.is_empty());
        w.handle(signal(s, MediaSignalKind::LoadedData), &mut out);
        w.handle(signal(s, MediaSignalKind::PlayStarted), &mut out);
        out.clear();
        w.handle(signal(s, MediaSignalKind::TimeUpdate(4.5)), &mut out);
        assert_eq!(out, vec![MediaOutput::Position(4.5)]);
        assert_eq!(w.position(), 4.5);
    }

    #[test]
    fn test_duplicate_ready_is_idempotent() {
        let mut w = watcher();
        let mut out = Vec::new();
        let s = w.begin_load(Duration::ZERO, &mut out);
        w.handle(signal(s, MediaSignalKind::CanPlay), &mut out);
        out.clear();
        w.handle(signal(s, MediaSignalKind::LoadedData), &mut out);
        assert!(out.is_empty(), "second readiness signal is ignored");
    }

    #[test]
    fn test_stop_discards_session() {
        let mut w = watcher();
        let mut out = Vec::new();
        let s = w.begin_load(Duration::ZERO, &mut out);
        out.clear();
        w.stop(&mut out);
        let pause = MediaOutput::Command(MediaCommand::Pause { session: s });
        assert!(out.contains(&pause));
        assert_eq!(w.session(), None);
        out.clear();
        w.handle(signal(s, MediaSignalKind::CanPlay), &mut out);
        w.poll(TIMEOUT, &mut out);
        assert!(out.is_empty());
        assert_eq!(w.state(), PlaybackState::NotLoaded);
    }

    #[test]
    fn test_fade_out_only_while_playing() {
        let mut w = watcher();
        let mut out = Vec::new();
        assert!(!w.fade_out(Duration::from_millis(250), &mut out));
        let s = w.begin_load(Duration::ZERO, &mut out);
        w.handle(signal(s, MediaSignalKind::CanPlay), &mut out);
        w.handle(signal(s, MediaSignalKind::PlayStarted), &mut out);
        out.clear();
        assert!(w.fade_out(Duration::from_millis(250), &mut out));
        assert_eq!(
            out,
            vec![MediaOutput::Command(MediaCommand::FadeOutAndPause {
                session: s,
                duration: Duration::from_millis(250),
            })]
        );
    }
}
