use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use location::{AuthorizationState, LocateRequestEvent, LocationSession};
use rendering::camera::{ZOOM_IN_STEP, ZOOM_OUT_STEP};
use rendering::{FollowMode, MapViewport};
use store::{ClearPinEvent, ParkingPin, PlacePinEvent};

// ---------------------------------------------------------------------------
// Status helpers
// ---------------------------------------------------------------------------

fn authorization_color(state: AuthorizationState) -> egui::Color32 {
    if state.is_authorized() {
        egui::Color32::from_rgb(110, 220, 130)
    } else if state.is_blocked() {
        egui::Color32::from_rgb(230, 90, 80)
    } else {
        egui::Color32::from_rgb(180, 185, 195)
    }
}

// ---------------------------------------------------------------------------
// Main toolbar system
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
pub fn toolbar_ui(
    mut contexts: EguiContexts,
    session: Res<LocationSession>,
    pin: Res<ParkingPin>,
    mut viewport: ResMut<MapViewport>,
    mut follow: ResMut<FollowMode>,
    mut locate_requests: EventWriter<LocateRequestEvent>,
    mut place_events: EventWriter<PlacePinEvent>,
    mut clear_events: EventWriter<ClearPinEvent>,
) {
    // ---- Top status strip ----
    egui::TopBottomPanel::top("status_bar")
        .exact_height(30.0)
        .show(contexts.ctx_mut(), |ui| {
            ui.horizontal_centered(|ui| {
                ui.spacing_mut().item_spacing.x = 10.0;

                let auth = session.authorization;
                ui.label(
                    egui::RichText::new(auth.label())
                        .strong()
                        .color(authorization_color(auth)),
                );

                ui.separator();

                match session.last_known_coordinate() {
                    Some(coordinate) => ui.label(format!("You: {coordinate}")),
                    None => ui.label(egui::RichText::new("Unknown Location").italics()),
                };

                ui.separator();

                match pin.recenter_target() {
                    Some(coordinate) => ui.label(format!("Car: {coordinate}")),
                    None => ui.label(egui::RichText::new("No spot saved").weak()),
                };
            });
        });

    // ---- Bottom action bar ----
    egui::TopBottomPanel::bottom("action_bar")
        .exact_height(48.0)
        .show(contexts.ctx_mut(), |ui| {
            ui.horizontal_centered(|ui| {
                ui.spacing_mut().item_spacing.x = 8.0;

                let button_size = egui::Vec2::new(96.0, 32.0);

                if ui
                    .add_sized(button_size, egui::Button::new("Locate"))
                    .clicked()
                {
                    locate_requests.send(LocateRequestEvent);
                    follow.enabled = true;
                    if let Some(coordinate) = session.last_known_coordinate() {
                        viewport.center_on(coordinate);
                    }
                }

                if ui
                    .add_sized(button_size, egui::Button::new("Park Here"))
                    .clicked()
                {
                    place_events.send(PlacePinEvent {
                        coordinate: viewport.center,
                    });
                }

                if ui
                    .add_enabled(
                        pin.is_present(),
                        egui::Button::new("Find My Car").min_size(button_size),
                    )
                    .clicked()
                {
                    if let Some(target) = pin.recenter_target() {
                        viewport.center_on(target);
                        follow.enabled = false;
                    }
                }

                if ui
                    .add_enabled(
                        pin.is_present(),
                        egui::Button::new("Clear Spot").min_size(button_size),
                    )
                    .clicked()
                {
                    clear_events.send(ClearPinEvent);
                }

                // Zoom controls, pinned to the right edge
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let zoom_size = egui::Vec2::new(32.0, 32.0);
                    if ui.add_sized(zoom_size, egui::Button::new("+")).clicked() {
                        viewport.zoom_by(ZOOM_IN_STEP);
                    }
                    if ui.add_sized(zoom_size, egui::Button::new("-")).clicked() {
                        viewport.zoom_by(ZOOM_OUT_STEP);
                    }
                });
            });
        });
}
