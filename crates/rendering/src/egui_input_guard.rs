//! Egui input guard: keeps clicks on egui widgets from reaching the scene.
//!
//! The countdown panel, popup and question buttons are egui; a click on
//! them must not also count as a click on the envelope underneath.

use bevy_egui::EguiContexts;

/// Returns `true` when egui wants the pointer, i.e. the cursor is over an
/// egui area or egui is handling a click. Scene input systems should
/// early-return when this is `true`.
#[inline]
pub fn egui_wants_pointer(contexts: &mut EguiContexts) -> bool {
    let ctx = contexts.ctx_mut();
    ctx.wants_pointer_input() || ctx.is_pointer_over_area()
}
