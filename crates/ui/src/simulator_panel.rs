//! Developer panel for the simulated location device.
//!
//! Toggled with F9. Shows the simulator's view of the world (authorization,
//! drive state, position, seed) and offers overrides: pausing the walk,
//! teleporting to presets, and forcing any authorization state so permission
//! handling can be exercised without touching system settings.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use location::{AuthorizationState, Coordinate, SimulatorLink};
use store::ParkingPin;

// =============================================================================
// Resources
// =============================================================================

/// Whether the simulator panel is visible.
#[derive(Resource, Default)]
pub struct SimulatorPanelVisible(pub bool);

// =============================================================================
// Teleport presets
// =============================================================================

const PRESETS: &[(&str, Coordinate)] = &[
    (
        "Times Square",
        Coordinate {
            latitude: 40.7580,
            longitude: -73.9855,
        },
    ),
    (
        "Shibuya",
        Coordinate {
            latitude: 35.6595,
            longitude: 139.7005,
        },
    ),
];

// =============================================================================
// Systems
// =============================================================================

/// Toggles the panel on F9. Ignored while egui has keyboard focus.
pub fn simulator_panel_keybind(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut visible: ResMut<SimulatorPanelVisible>,
    mut contexts: EguiContexts,
) {
    if contexts.ctx_mut().wants_keyboard_input() {
        return;
    }
    if keyboard.just_pressed(KeyCode::F9) {
        visible.0 = !visible.0;
    }
}

/// Renders the simulator window.
pub fn simulator_panel_ui(
    mut contexts: EguiContexts,
    mut visible: ResMut<SimulatorPanelVisible>,
    link: Res<SimulatorLink>,
    pin: Res<ParkingPin>,
) {
    if !visible.0 {
        return;
    }

    let status = link.status();

    let mut open = true;
    egui::Window::new("Location Simulator")
        .open(&mut open)
        .resizable(false)
        .default_width(280.0)
        .show(contexts.ctx_mut(), |ui| {
            ui.spacing_mut().item_spacing.y = 8.0;

            // --- Device state ---
            ui.label(format!("Authorization: {}", status.authorization.label()));
            ui.label(format!(
                "Updates: {}",
                if status.started { "started" } else { "stopped" }
            ));
            ui.label(format!("Position: {}", status.position));
            ui.label(
                egui::RichText::new(format!("Seed: {}", status.seed))
                    .small()
                    .color(egui::Color32::from_rgb(150, 150, 150)),
            );

            ui.separator();

            // --- Random walk ---
            let drive_label = if status.driving {
                "Driving (click to pause)"
            } else {
                "Paused (click to drive)"
            };
            if ui.selectable_label(status.driving, drive_label).clicked() {
                link.set_driving(!status.driving);
            }

            ui.separator();

            // --- Teleport ---
            ui.label("Teleport:");
            ui.horizontal(|ui| {
                if ui.button("Home").clicked() {
                    link.teleport(status.home);
                }
                for (name, coordinate) in PRESETS {
                    if ui.button(*name).clicked() {
                        link.teleport(*coordinate);
                    }
                }
                if ui
                    .add_enabled(pin.is_present(), egui::Button::new("Pin"))
                    .clicked()
                {
                    if let Some(target) = pin.recenter_target() {
                        link.teleport(target);
                    }
                }
            });

            ui.separator();

            // --- Authorization override ---
            ui.label("Authorization override:");
            ui.horizontal(|ui| {
                authorization_button(
                    ui,
                    &link,
                    status.authorization,
                    AuthorizationState::AuthorizedWhenInUse,
                    "When in Use",
                );
                authorization_button(
                    ui,
                    &link,
                    status.authorization,
                    AuthorizationState::AuthorizedAlways,
                    "Always",
                );
            });
            ui.horizontal(|ui| {
                authorization_button(
                    ui,
                    &link,
                    status.authorization,
                    AuthorizationState::Denied,
                    "Denied",
                );
                authorization_button(
                    ui,
                    &link,
                    status.authorization,
                    AuthorizationState::Restricted,
                    "Restricted",
                );
                authorization_button(
                    ui,
                    &link,
                    status.authorization,
                    AuthorizationState::Undetermined,
                    "Reset",
                );
            });
        });

    if !open {
        visible.0 = false;
    }
}

fn authorization_button(
    ui: &mut egui::Ui,
    link: &SimulatorLink,
    current: AuthorizationState,
    target: AuthorizationState,
    label: &str,
) {
    if ui.selectable_label(current == target, label).clicked() {
        link.set_authorization(target);
    }
}

// =============================================================================
// Tests
// =============================================================================
