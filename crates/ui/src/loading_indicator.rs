//! Loading and diagnostic indicator for the montage.
//!
//! While the montage loads, a "Loading..." line with animated dots sits
//! below the letter. Failures replace it with a diagnostic; when the
//! notice carries an affordance (retry, tap to play) the whole indicator
//! becomes a button that sends `Activate(MediaIndicator)`.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use experience::machine::Control;
use experience::media::MediaNotice;
use experience::ExperienceInput;

use crate::theme;
use crate::ui_state::UiState;

const INDICATOR_BUTTON_SIZE: egui::Vec2 = egui::Vec2::new(220.0, 36.0);

/// Animated dots for the loading message.
#[derive(Resource)]
pub struct LoadingAnimation {
    /// Number of dots currently shown (cycles 1 -> 2 -> 3 -> 1 ...).
    pub dots: usize,
    pub timer: Timer,
}

impl Default for LoadingAnimation {
    fn default() -> Self {
        Self {
            dots: 1,
            timer: Timer::from_seconds(0.4, TimerMode::Repeating),
        }
    }
}

/// Text shown for `notice`. Plain loading messages get the animated dots
/// in place of any trailing ellipsis.
pub fn indicator_text(notice: &MediaNotice, dots: usize) -> String {
    if notice.is_error || notice.affordance.is_some() {
        return notice.message.clone();
    }
    let base = notice.message.trim_end_matches('.');
    format!("{base}{}", ".".repeat(dots))
}

pub fn loading_indicator_ui(
    mut contexts: EguiContexts,
    ui_state: Res<UiState>,
    time: Res<Time>,
    mut animation: ResMut<LoadingAnimation>,
    mut inputs: EventWriter<ExperienceInput>,
) {
    let Some(notice) = ui_state.notice.as_ref() else {
        animation.dots = 1;
        animation.timer.reset();
        return;
    };

    animation.timer.tick(time.delta());
    if animation.timer.just_finished() {
        animation.dots = animation.dots % 3 + 1;
    }

    let text = indicator_text(notice, animation.dots);
    let color = if notice.is_error {
        theme::ERROR
    } else {
        theme::TEXT
    };
    let actionable = ui_state.indicator_actionable();

    let ctx = contexts.ctx_mut();
    egui::Area::new(egui::Id::new("loading_indicator"))
        .anchor(egui::Align2::CENTER_BOTTOM, egui::Vec2::new(0.0, -24.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            let label = egui::RichText::new(text)
                .size(theme::FONT_BODY)
                .color(color);
            if actionable {
                let button = egui::Button::new(label).min_size(INDICATOR_BUTTON_SIZE);
                if ui.add(button).clicked() {
                    inputs.send(ExperienceInput::activate(Control::MediaIndicator));
                }
            } else {
                ui.label(label);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use experience::media::Affordance;

    fn notice(message: &str, affordance: Option<Affordance>, is_error: bool) -> MediaNotice {
        MediaNotice {
            message: message.to_string(),
            affordance,
            is_error,
        }
    }

    #[test]
    fn test_loading_text_cycles_dots() {
        let loading = notice("Loading...", None, false);
        assert_eq!(indicator_text(&loading, 1), "Loading.");
        assert_eq!(indicator_text(&loading, 3), "Loading...");
    }

    #[test]
    fn test_diagnostics_are_shown_verbatim() {
        let failed = notice(
            "Network error. Tap to retry.",
            Some(Affordance::Retry),
            true,
        );
        assert_eq!(indicator_text(&failed, 2), "Network error. Tap to retry.");
    }

    #[test]
    fn test_animation_starts_at_one_dot() {
        assert_eq!(LoadingAnimation::default().dots, 1);
    }
}
