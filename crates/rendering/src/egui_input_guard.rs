//! Egui input guard: prevents click-through from UI elements to the map.
//!
//! When egui (toolbar, dialogs, simulator panel) is handling pointer input,
//! the map's pan and zoom systems should skip processing so a button press
//! never also grabs the map underneath it.

use bevy_egui::EguiContexts;

/// Returns `true` when egui wants the pointer, i.e. the cursor is over an
/// egui panel or egui is actively handling a drag/click. Map input systems
/// should early-return when this is `true`.
#[inline]
pub fn egui_wants_pointer(contexts: &mut EguiContexts) -> bool {
    let ctx = contexts.ctx_mut();
    ctx.wants_pointer_input() || ctx.is_pointer_over_area()
}
