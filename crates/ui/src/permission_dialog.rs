//! Simulated system location-permission prompt.
//!
//! Real mobile platforms draw this dialog themselves; the desktop build has
//! no OS to do it, so the simulated device parks in a prompt-pending state
//! and this module draws the equivalent dialog. The choice lands back in the
//! simulator exactly as a platform callback would.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use location::SimulatorLink;

// =============================================================================
// Plugin
// =============================================================================

pub struct PermissionDialogPlugin;

impl Plugin for PermissionDialogPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            permission_dialog_ui.run_if(resource_exists::<SimulatorLink>),
        );
    }
}

// =============================================================================
// Systems
// =============================================================================

/// Renders the modal permission prompt while the simulated device has one
/// pending.
fn permission_dialog_ui(mut contexts: EguiContexts, link: Res<SimulatorLink>) {
    if !link.status().prompt_pending {
        return;
    }

    let ctx = contexts.ctx_mut();

    // Semi-transparent backdrop to block interaction with the map while the
    // prompt is up.
    let screen_rect = ctx.screen_rect();
    egui::Area::new(egui::Id::new("permission_dialog_backdrop"))
        .fixed_pos(screen_rect.min)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            let painter = ui.painter();
            painter.rect_filled(
                screen_rect,
                egui::CornerRadius::ZERO,
                egui::Color32::from_black_alpha(120),
            );
            ui.allocate_rect(screen_rect, egui::Sense::click());
        });

    egui::Window::new("Location Permission")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .default_width(300.0)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.spacing_mut().item_spacing.y = 10.0;
                ui.add_space(12.0);

                ui.heading("Allow ParkMark to use your location?");
                ui.add_space(4.0);
                ui.label(
                    "Your position is shown on the map and used to find \
                     the way back to your parked car.",
                );
                ui.add_space(12.0);

                let button_size = egui::Vec2::new(220.0, 32.0);

                if ui
                    .add_sized(button_size, egui::Button::new("Allow While Using App"))
                    .clicked()
                {
                    link.resolve_prompt(true);
                }

                if ui
                    .add_sized(button_size, egui::Button::new("Don't Allow"))
                    .clicked()
                {
                    link.resolve_prompt(false);
                }

                ui.add_space(12.0);
            });
        });
}
