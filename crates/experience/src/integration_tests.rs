//! Integration tests for the experience plugin using the `TestExperience`
//! harness.
//!
//! These run a headless Bevy App and check that the state machine, the
//! `AppState` mirror and the directive stream agree with each other.

mod app_state_tests;
