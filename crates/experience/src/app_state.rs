//! Top-level application state.
//!
//! [`AppState`] is both the state machine's own state value and a Bevy
//! [`States`] enum, so the UI and rendering crates can gate systems with
//! `in_state(AppState::Question)` and friends. Only
//! [`Experience`](crate::machine::Experience) decides transitions; the
//! plugin mirrors them into `NextState<AppState>`.

use bevy::prelude::*;

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    /// Countdown running, envelope sealed.
    #[default]
    Locked,
    /// Deadline reached, envelope can be opened.
    Unlocked,
    /// Envelope opened, montage loading or playing.
    Playing,
    /// Letter retracted, the question is on screen.
    Question,
    /// Celebration done. Terminal.
    Final,
}
