//! `AppState` startup and mirroring through the plugin.

use chrono::{DateTime, TimeZone, Utc};

use crate::app_state::AppState;
use crate::config::{DeadlineConfig, ExperienceConfig, MotionPreference};
use crate::deadline::CountdownSnapshot;
use crate::machine::Directive;
use crate::test_harness::TestExperience;

fn deadline_utc() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 13, 13, 0, 0).unwrap()
}

#[test]
fn test_app_state_default_is_locked() {
    assert_eq!(AppState::default(), AppState::Locked);
}

#[test]
fn test_opened_after_deadline_starts_unlocked() {
    let game = TestExperience::new(deadline_utc() + chrono::Duration::days(3));
    assert_eq!(game.state(), AppState::Unlocked);
    assert_eq!(
        game.count(|d| *d == Directive::EnterState(AppState::Locked)),
        0,
        "startup must not pass through Locked"
    );
    assert!(game
        .directives()
        .contains(&Directive::Countdown(CountdownSnapshot::REACHED)));
}

#[test]
fn test_opened_before_deadline_starts_locked() {
    let game = TestExperience::new(deadline_utc() - chrono::Duration::days(1));
    assert_eq!(game.state(), AppState::Locked);
    let first_countdown = game.directives().iter().find_map(|d| match d {
        Directive::Countdown(snapshot) => Some(*snapshot),
        _ => None,
    });
    assert_eq!(
        first_countdown,
        Some(CountdownSnapshot::from_total_seconds(86_400)),
        "countdown published on the first frame"
    );
}

#[test]
fn test_countdown_reaches_deadline_and_state_follows() {
    let mut game = TestExperience::new(deadline_utc() - chrono::Duration::seconds(2));
    game.advance(std::time::Duration::from_millis(2_500));
    assert_eq!(game.machine_state(), AppState::Unlocked);
    game.tick(1);
    assert_eq!(
        game.state(),
        AppState::Unlocked,
        "Bevy state mirrors the machine"
    );
    assert_eq!(
        game.count(|d| *d == Directive::EnterState(AppState::Unlocked)),
        1
    );
}

#[test]
fn test_invalid_config_falls_back_to_defaults() {
    let config = ExperienceConfig {
        deadline: DeadlineConfig {
            timezone: "Mars/Olympus_Mons".to_string(),
            ..Default::default()
        },
        ..Default::default()
    };
    let game = TestExperience::with_config(
        config,
        MotionPreference::Full,
        deadline_utc() + chrono::Duration::hours(1),
    );
    assert_eq!(
        game.resource::<ExperienceConfig>().deadline.timezone,
        "Australia/Sydney"
    );
    assert_eq!(game.state(), AppState::Unlocked);
}
