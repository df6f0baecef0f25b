use crate::app_state::AppState;
use crate::deadline::CountdownSnapshot;
use crate::media::{MediaCommand, MediaNotice, MediaSignal};
use crate::particles::ParticleBurst;
use crate::sequencer::{SequenceName, TweenRequest};

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Activatable elements. Pointer clicks and Enter/Space key presses on an
/// element both map to the same `Activate(control)` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    LockedEnvelope,
    Envelope,
    /// First affirmative button.
    Yes,
    /// Second affirmative button, same meaning as `Yes`.
    OfCourse,
    PatiencePopup,
    /// The loading/diagnostic indicator (retry or tap-to-play).
    MediaIndicator,
}

impl Control {
    pub fn is_affirmative(self) -> bool {
        matches!(self, Control::Yes | Control::OfCourse)
    }
}

/// Timers owned by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    HidePopup,
    FadeOutEnvelope,
    CommitFinal,
}

/// Everything the state machine reacts to, delivered through one FIFO
/// queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExperienceEvent {
    Activate(Control),
    DeadlineReached,
    Media(MediaSignal),
    AnimationFinished(SequenceName),
    Timer(TimerKind),
    /// The renderer could not load the rose particle shape.
    ParticleShapeUnavailable,
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Side effects requested from the outside world, in the order they were
/// decided.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    EnterState(AppState),
    Countdown(CountdownSnapshot),
    EnvelopeInteractive(bool),
    PatiencePopup(bool),
    PlayLockedChime,
    Tween(TweenRequest),
    Media(MediaCommand),
    /// `None` hides the loading indicator.
    MediaNotice(Option<MediaNotice>),
    QuestionControlsEnabled(bool),
    Burst(ParticleBurst),
    ClearParticles,
    HideEnvelope,
}
