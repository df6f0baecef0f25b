//! Screen-facing mirror of the state machine's directives.
//!
//! The egui screens never talk to the machine directly. They read
//! [`UiState`], which absorbs every directive once per frame, and they send
//! `ExperienceInput` events back when something is activated.

use bevy::prelude::*;

use experience::deadline::CountdownSnapshot;
use experience::machine::Directive;
use experience::media::MediaNotice;
use experience::ExperienceDirective;

#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct UiState {
    pub countdown: CountdownSnapshot,
    pub popup_visible: bool,
    /// Loading indicator content; `None` hides it.
    pub notice: Option<MediaNotice>,
    pub question_enabled: bool,
}

impl UiState {
    pub fn absorb(&mut self, directive: &Directive) {
        match directive {
            Directive::Countdown(snapshot) => self.countdown = *snapshot,
            Directive::PatiencePopup(visible) => self.popup_visible = *visible,
            Directive::MediaNotice(notice) => self.notice = notice.clone(),
            Directive::QuestionControlsEnabled(enabled) => self.question_enabled = *enabled,
            _ => {}
        }
    }

    /// Whether clicking the loading indicator does anything.
    pub fn indicator_actionable(&self) -> bool {
        self.notice.as_ref().is_some_and(|n| n.affordance.is_some())
    }
}

/// Which affirmative button keyboard activation targets.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum QuestionFocus {
    #[default]
    Yes,
    OfCourse,
}

impl QuestionFocus {
    pub fn toggled(self) -> Self {
        match self {
            QuestionFocus::Yes => QuestionFocus::OfCourse,
            QuestionFocus::OfCourse => QuestionFocus::Yes,
        }
    }
}

pub fn absorb_directives(
    mut directives: EventReader<ExperienceDirective>,
    mut ui: ResMut<UiState>,
) {
    for ExperienceDirective(directive) in directives.read() {
        ui.absorb(directive);
    }
}
